//! The per-client record: the core's central piece of mutable state.
//!
//! Split into "hot" (touched on most ticks) and "cold" (string-heavy,
//! rarely touched) halves per the specification's data model. Both live
//! inside a single [`Slotmap`](crate::handle::Slotmap) entry; there is no
//! separate cold-data arena indirection because a per-client `String` is
//! already a heap allocation, the thing the spec's "cold, arena-owned"
//! language is protecting against is *re-allocating on every identical
//! property reload*, which [`ClientCold::set_wm_class`] and friends handle
//! directly by comparing before replacing.
use crate::geometry::{Rect, Strut};
use crate::handle::Handle;
use crate::Xid;

/// Where a client sits in its managed lifecycle (§3, §4.D).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientState {
    New,
    Mapping,
    Mapped,
    Unmapping,
    Destroyed,
}

/// Progress through the asynchronous "Phase 1" property discovery that runs
/// before a newly managed client is actually mapped (§4.D).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManagePhase {
    Phase1,
    Phase2,
    Done,
}

/// EWMH stacking layers, in fixed bottom-to-top order (§4.E).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Layer {
    Desktop,
    Below,
    Normal,
    Above,
    Dock,
    Fullscreen,
    Overlay,
}

impl Layer {
    pub const ALL: [Layer; 7] = [
        Layer::Desktop,
        Layer::Below,
        Layer::Normal,
        Layer::Above,
        Layer::Dock,
        Layer::Fullscreen,
        Layer::Overlay,
    ];
}

/// The EWMH window type, as last decoded from `_NET_WM_WINDOW_TYPE` (§4.F).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindowType {
    #[default]
    Normal,
    Desktop,
    Dock,
    Toolbar,
    Menu,
    Utility,
    Splash,
    Dialog,
}

bitflags::bitflags! {
    /// Client-visible state flags, the source of truth for `_NET_WM_STATE` (§4.E).
    #[derive(Default)]
    pub struct ClientFlags: u16 {
        const UNDECORATED    = 0b0000_0001;
        const STICKY         = 0b0000_0010;
        const FULLSCREEN     = 0b0000_0100;
        const MAXIMIZED_H    = 0b0000_1000;
        const MAXIMIZED_V    = 0b0001_0000;
        const MODAL          = 0b0010_0000;
        const DEMANDS_ATTENTION = 0b0100_0000;
    }
}

bitflags::bitflags! {
    /// Per-client dirty bits consumed and cleared by the flusher (§4.E).
    #[derive(Default)]
    pub struct DirtyFlags: u8 {
        const GEOM           = 0b0000_0001;
        const STATE          = 0b0000_0010;
        const TITLE          = 0b0000_0100;
        const ICON           = 0b0000_1000;
        const STACKING       = 0b0001_0000;
        const FRAME_EXTENTS  = 0b0010_0000;
    }
}

bitflags::bitflags! {
    /// Root-level dirty bits consumed and cleared by the root publisher (§4.H).
    #[derive(Default)]
    pub struct RootDirty: u8 {
        const CLIENT_LIST     = 0b0000_0001;
        const ACTIVE_WINDOW   = 0b0000_0010;
        const WORKAREA        = 0b0000_0100;
        const DESKTOP_META    = 0b0000_1000;
    }
}

/// GTK client-side-decoration shadow insets, from `_GTK_FRAME_EXTENTS` (§4.D, §4.F).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameExtents {
    pub left: u32,
    pub right: u32,
    pub top: u32,
    pub bottom: u32,
}

/// Fields touched on most ticks: geometry, state machine position, dirty
/// bits, stacking and the intrusive list nodes used by the focus ring and
/// transient-child traversal.
#[derive(Debug, Clone)]
pub struct ClientHot {
    pub xid: Xid,
    pub frame: Xid,
    pub state: ClientState,
    pub manage_phase: ManagePhase,
    pub window_type: WindowType,
    pub type_from_net: bool,
    pub layer: Layer,
    pub base_layer: Layer,
    pub desktop: u32,
    pub desired: Rect,
    pub server: Rect,
    pub depth: u8,
    pub visual_id: u32,
    pub flags: ClientFlags,
    pub gtk_frame_extents_set: bool,
    pub frame_extents: FrameExtents,
    pub dirty: DirtyFlags,
    pub stacking_index: i32,
    pub ignore_unmap: u32,
    pub pending_replies: u32,
    pub focus_override: bool,
    pub transient_for: Handle,

    // intrusive focus-history list node (§9: "raw pointer graphs" re-architected
    // as handle-linked lists so a stale reference simply fails a lookup)
    pub focus_prev: Handle,
    pub focus_next: Handle,

    // intrusive transient-child list: `transient_children_head` is the head of
    // the singly-linked list of this client's transient children, threaded
    // through their `transient_sibling_next`.
    pub transient_children_head: Handle,
    pub transient_sibling_next: Handle,

    pub self_handle: Handle,
}

impl ClientHot {
    pub fn new(xid: Xid, self_handle: Handle) -> Self {
        Self {
            xid,
            frame: Xid(0),
            state: ClientState::New,
            manage_phase: ManagePhase::Phase1,
            window_type: WindowType::default(),
            type_from_net: false,
            layer: Layer::Normal,
            base_layer: Layer::Normal,
            desktop: 0,
            desired: Rect::default(),
            server: Rect::default(),
            depth: 0,
            visual_id: 0,
            flags: ClientFlags::empty(),
            gtk_frame_extents_set: false,
            frame_extents: FrameExtents::default(),
            dirty: DirtyFlags::empty(),
            stacking_index: -1,
            ignore_unmap: 0,
            pending_replies: 0,
            focus_override: false,
            transient_for: Handle::INVALID,
            focus_prev: Handle::INVALID,
            focus_next: Handle::INVALID,
            transient_children_head: Handle::INVALID,
            transient_sibling_next: Handle::INVALID,
            self_handle,
        }
    }
}

/// ICCCM `WM_NORMAL_HINTS`, kept only in cold storage: consulted when
/// computing a configure response, never on the hot per-tick path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SizeHints {
    pub min_w: Option<u32>,
    pub min_h: Option<u32>,
    pub max_w: Option<u32>,
    pub max_h: Option<u32>,
    pub base_w: Option<u32>,
    pub base_h: Option<u32>,
}

/// Rarely touched, string-heavy fields.
#[derive(Debug, Clone, Default)]
pub struct ClientCold {
    pub wm_instance: Option<String>,
    pub wm_class: Option<String>,
    pub base_title: String,
    pub visible_title: String,
    pub has_net_wm_name: bool,
    pub size_hints: SizeHints,
    pub pid: Option<u32>,
    pub machine: Option<String>,
    pub icon: Vec<u32>,
    /// Last validated `_NET_WM_STRUT_PARTIAL`; `None` if absent or rejected
    /// (§4.F: a malformed record leaves the workarea unaffected).
    pub strut: Option<Strut>,
}

impl ClientCold {
    /// Update `(wm_instance, wm_class)`, reusing the existing `String`
    /// allocations when the decoded value is unchanged (§4.F: "property spam
    /// cannot exhaust the arena across identical reloads").
    pub fn set_wm_class(&mut self, instance: String, class: String) -> bool {
        let instance_changed = self.wm_instance.as_deref() != Some(instance.as_str());
        let class_changed = self.wm_class.as_deref() != Some(class.as_str());

        if instance_changed {
            self.wm_instance = Some(instance);
        }
        if class_changed {
            self.wm_class = Some(class);
        }

        instance_changed || class_changed
    }

    /// Update the base title (from `WM_NAME`/`_NET_WM_NAME`), returning
    /// whether it actually changed.
    pub fn set_base_title(&mut self, title: String) -> bool {
        if self.base_title == title {
            return false;
        }
        self.base_title = title;
        true
    }
}

/// The full per-client record.
#[derive(Debug, Clone)]
pub struct ClientRecord {
    pub hot: ClientHot,
    pub cold: ClientCold,
}

impl ClientRecord {
    pub fn new(xid: Xid, self_handle: Handle) -> Self {
        Self {
            hot: ClientHot::new(xid, self_handle),
            cold: ClientCold::default(),
        }
    }
}
