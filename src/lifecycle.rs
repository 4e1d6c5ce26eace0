//! The client state machine: discovery through Phase-1 property fan-out,
//! mapping, and eventual unmanage (§3, §4.D).
use std::collections::HashMap;

use tracing::{debug, trace};

use crate::atom::Atom;
use crate::client::{ClientRecord, ClientState, DirtyFlags, ManagePhase, RootDirty};
use crate::config::WmConfig;
use crate::cookie_jar::CookieJar;
use crate::geometry::Rect;
use crate::handle::{Handle, Slotmap};
use crate::x::event::ConfigureRequestEvent;
use crate::x::{WmState, XConn};
use crate::Xid;

/// The atoms fetched during Phase 1, fired off in parallel as soon as a
/// client is first seen (§4.D).
const PHASE1_PROPERTIES: &[Atom] = &[
    Atom::WmClass,
    Atom::WmName,
    Atom::NetWmName,
    Atom::WmHints,
    Atom::WmNormalHints,
    Atom::WmTransientFor,
    Atom::WmProtocols,
    Atom::NetWmState,
    Atom::NetWmWindowType,
    Atom::NetWmStrutPartial,
    Atom::NetWmUserTime,
    Atom::NetWmPid,
    Atom::GtkFrameExtents,
    Atom::NetWmIcon,
];

pub struct ClientLifecycle {
    clients: Slotmap<ClientRecord>,
    by_xid: HashMap<Xid, Handle>,
    by_frame: HashMap<Xid, Handle>,
    map_order: Vec<Handle>,
    focus_head: Handle,
    focused: Handle,
    pub root_dirty: RootDirty,
}

impl ClientLifecycle {
    pub fn new() -> Self {
        Self {
            clients: Slotmap::new(),
            by_xid: HashMap::new(),
            by_frame: HashMap::new(),
            map_order: Vec::new(),
            focus_head: Handle::INVALID,
            focused: Handle::INVALID,
            root_dirty: RootDirty::empty(),
        }
    }

    pub fn get(&self, handle: Handle) -> Option<&ClientRecord> {
        self.clients.get(handle)
    }

    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut ClientRecord> {
        self.clients.get_mut(handle)
    }

    /// Borrow a record mutably alongside a window-lookup closure that only
    /// touches the (disjoint) `by_xid` map, so callers can resolve e.g.
    /// `WM_TRANSIENT_FOR` targets while mutating the reply's own client.
    pub fn get_mut_with_resolver(
        &mut self,
        handle: Handle,
    ) -> Option<(&mut ClientRecord, impl Fn(Xid) -> Option<Handle> + '_)> {
        let record = self.clients.get_mut(handle)?;
        let by_xid = &self.by_xid;
        Some((record, move |xid: Xid| by_xid.get(&xid).copied()))
    }

    pub fn handle_for_xid(&self, xid: Xid) -> Option<Handle> {
        self.by_xid.get(&xid).copied()
    }

    pub fn handle_for_frame(&self, xid: Xid) -> Option<Handle> {
        self.by_frame.get(&xid).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Handle, &ClientRecord)> {
        self.clients.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Handle, &mut ClientRecord)> {
        self.clients.iter_mut()
    }

    /// Map order, oldest managed first — the order `_NET_CLIENT_LIST` uses (§4.H).
    pub fn map_order(&self) -> &[Handle] {
        &self.map_order
    }

    pub fn focused(&self) -> Handle {
        self.focused
    }

    /// `MapRequest` (or startup adoption): create the slot, the frame, and
    /// fire off the Phase-1 property fan-out.
    ///
    /// `override_redirect` and `already_mapped_elsewhere` gate adoption
    /// (§4.D: override-redirect and unmapped children are skipped during
    /// adoption); callers doing a live `MapRequest` always pass `false`.
    pub fn manage<X: XConn>(
        &mut self,
        x: &X,
        jar: &mut CookieJar,
        xid: Xid,
        depth: u8,
        visual_id: u32,
        override_redirect: bool,
    ) -> Option<Handle> {
        if override_redirect || self.by_xid.contains_key(&xid) {
            return None;
        }

        let handle = self.clients.alloc(ClientRecord::new(xid, Handle::INVALID));
        {
            let record = self.clients.get_mut(handle).unwrap();
            record.hot.self_handle = handle;
            record.hot.depth = depth;
            record.hot.visual_id = visual_id;
            record.hot.state = ClientState::Mapping;
        }
        self.by_xid.insert(xid, handle);

        let frame = match x.create_frame(xid, depth, visual_id, Rect::default()) {
            Ok(frame) => frame,
            Err(_) => {
                self.by_xid.remove(&xid);
                self.clients.free(handle);
                return None;
            }
        };
        self.by_frame.insert(frame, handle);
        self.clients.get_mut(handle).unwrap().hot.frame = frame;

        let _ = x.reparent_window(xid, frame, 0, 0);
        let _ = x.select_substructure_events(frame);
        let _ = x.select_substructure_events(xid);

        // A `send_*` that fails to even dispatch returns sequence 0 (no
        // transport ever hands out that sequence for a real request); such
        // a send has no reply coming, so it must not be registered — doing
        // so would both collide with any other failed send in this batch
        // (same jar key) and leave `pending_replies` permanently non-zero,
        // since nothing will ever resolve that cookie.
        let mut pending = 0u32;
        let geom_seq = x.send_get_geometry(xid);
        if geom_seq != 0 {
            jar.register(geom_seq, handle, crate::x::ReplyKind::GetGeometry);
            pending += 1;
        }

        let attrs_seq = x.send_get_window_attributes(xid);
        if attrs_seq != 0 {
            jar.register(attrs_seq, handle, crate::x::ReplyKind::GetWindowAttributes);
            pending += 1;
        }

        for &atom in PHASE1_PROPERTIES {
            let seq = x.send_get_property(xid, atom);
            if seq != 0 {
                jar.register(seq, handle, crate::x::ReplyKind::GetProperty(atom));
                pending += 1;
            }
        }

        self.clients.get_mut(handle).unwrap().hot.pending_replies = pending;
        debug!(?handle, %xid, pending, "client entering Phase 1");
        Some(handle)
    }

    /// Called by the property decoder / cookie jar drain after every reply
    /// (success or error) that was issued during Phase 1, so the lifecycle
    /// can notice when it is time to finish discovery and map the client.
    pub fn note_reply_resolved<X: XConn>(&mut self, x: &X, config: &WmConfig, handle: Handle) {
        let ready = match self.clients.get_mut(handle) {
            Some(record) if record.hot.manage_phase == ManagePhase::Phase1 => {
                record.hot.pending_replies = record.hot.pending_replies.saturating_sub(1);
                record.hot.pending_replies == 0
            }
            _ => false,
        };

        if ready {
            self.finish_phase1(x, config, handle);
        }
    }

    fn finish_phase1<X: XConn>(&mut self, x: &X, config: &WmConfig, handle: Handle) {
        let Some(record) = self.clients.get_mut(handle) else { return };
        record.hot.manage_phase = ManagePhase::Phase2;

        let (w, h) = {
            let d = record.hot.desired;
            if config.tiny_geometry_rescue.needs_rescue(d.w, d.h) {
                config.tiny_geometry_rescue.rescued()
            } else {
                (d.w, d.h)
            }
        };
        record.hot.desired.w = w;
        record.hot.desired.h = h;
        record.hot.dirty |= DirtyFlags::GEOM | DirtyFlags::STACKING;

        let xid = record.hot.xid;
        let frame = record.hot.frame;

        // client first, frame second (§4.D)
        let _ = x.map_window(xid);
        let _ = x.map_window(frame);
        let _ = x.change_property_cardinals(xid, Atom::WmState, &[WmState::Normal.as_u32(), 0]);

        if let Some(record) = self.clients.get_mut(handle) {
            record.hot.state = ClientState::Mapped;
            record.hot.manage_phase = ManagePhase::Done;
        }
        self.map_order.push(handle);
        self.push_focus(handle);
        self.root_dirty |= RootDirty::CLIENT_LIST | RootDirty::ACTIVE_WINDOW;
        debug!(?handle, %xid, "client mapped");
    }

    /// `UnmapNotify` for a client we manage: our own unmap (`ignore_unmap >
    /// 0`) is swallowed; an unmap the client itself caused proceeds to
    /// unmanage (§4.D).
    pub fn handle_unmap_notify(&mut self, jar: &mut CookieJar, xid: Xid) {
        let Some(&handle) = self.by_xid.get(&xid) else { return };
        let Some(record) = self.clients.get_mut(handle) else { return };

        if record.hot.ignore_unmap > 0 {
            record.hot.ignore_unmap -= 1;
            trace!(?handle, "swallowed our own unmap");
            return;
        }

        record.hot.state = ClientState::Unmapping;
        self.unmanage(jar, handle);
    }

    pub fn handle_destroy_notify(&mut self, jar: &mut CookieJar, xid: Xid) {
        let Some(&handle) = self.by_xid.get(&xid) else { return };
        if let Some(record) = self.clients.get_mut(handle) {
            record.hot.state = ClientState::Destroyed;
        }
        self.unmanage(jar, handle);
    }

    /// Detach `handle` from every index and free its slot. Outstanding
    /// cookies are orphaned rather than waited on (§4.B, §9).
    pub fn unmanage(&mut self, jar: &mut CookieJar, handle: Handle) {
        let Some(record) = self.clients.get(handle) else { return };
        let xid = record.hot.xid;
        let frame = record.hot.frame;

        self.by_xid.remove(&xid);
        if frame != Xid(0) {
            self.by_frame.remove(&frame);
        }
        self.map_order.retain(|&h| h != handle);
        self.unlink_focus(handle);

        jar.orphan_all(handle);
        self.clients.free(handle);
        self.root_dirty |= RootDirty::CLIENT_LIST | RootDirty::ACTIVE_WINDOW;
        debug!(?handle, %xid, "client unmanaged");
    }

    /// `ConfigureRequest`: update logical geometry without touching the
    /// server. The flusher reconciles `desired` against `server` on its own
    /// schedule (§4.D, §4.E). Unknown windows (not managed by us) pass the
    /// request straight through.
    pub fn handle_configure_request<X: XConn>(&mut self, x: &X, req: ConfigureRequestEvent) {
        let Some(&handle) = self.by_xid.get(&req.window) else {
            let _ = x.configure_window(
                req.window,
                crate::x::ConfigureWindow {
                    r: req.r,
                    border_px: None,
                    stack_above: None,
                },
            );
            return;
        };

        if let Some(record) = self.clients.get_mut(handle) {
            use crate::x::event::ConfigureMask;
            let d = &mut record.hot.desired;
            if req.mask.contains(ConfigureMask::X) {
                d.x = req.r.x;
            }
            if req.mask.contains(ConfigureMask::Y) {
                d.y = req.r.y;
            }
            if req.mask.contains(ConfigureMask::WIDTH) {
                d.w = req.r.w;
            }
            if req.mask.contains(ConfigureMask::HEIGHT) {
                d.h = req.r.h;
            }
            record.hot.dirty |= DirtyFlags::GEOM;
        }
    }

    fn push_focus(&mut self, handle: Handle) {
        if let Some(record) = self.clients.get_mut(handle) {
            record.hot.focus_prev = self.focus_head;
            record.hot.focus_next = Handle::INVALID;
        }
        if let Some(prev) = self.clients.get_mut(self.focus_head) {
            prev.hot.focus_next = handle;
        }
        self.focus_head = handle;
        self.focused = handle;
    }

    fn unlink_focus(&mut self, handle: Handle) {
        let (prev, next) = match self.clients.get(handle) {
            Some(r) => (r.hot.focus_prev, r.hot.focus_next),
            None => return,
        };
        if let Some(p) = self.clients.get_mut(prev) {
            p.hot.focus_next = next;
        }
        if let Some(n) = self.clients.get_mut(next) {
            n.hot.focus_prev = prev;
        }
        if self.focus_head == handle {
            self.focus_head = prev;
        }
        if self.focused == handle {
            self.focused = next;
            if self.focused.is_invalid() {
                self.focused = prev;
            }
        }
    }
}

impl Default for ClientLifecycle {
    fn default() -> Self {
        Self::new()
    }
}
