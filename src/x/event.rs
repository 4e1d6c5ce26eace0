//! The event types the core consumes from an [`XConn`](super::XConn).
use crate::geometry::Rect;
use crate::Xid;

/// A raw server sequence number, used by the cookie jar to correlate
/// asynchronous replies to the request that caused them.
pub type Sequence = u32;

bitflags::bitflags! {
    /// Which fields of a `ConfigureRequest` the client actually specified.
    #[derive(Default)]
    pub struct ConfigureMask: u16 {
        const X      = 0b0000_0001;
        const Y      = 0b0000_0010;
        const WIDTH  = 0b0000_0100;
        const HEIGHT = 0b0000_1000;
        const BORDER = 0b0001_0000;
        const SIBLING = 0b0010_0000;
        const STACK_MODE = 0b0100_0000;
    }
}

/// A coalesced `ConfigureRequest`: `mask` is the OR of every mask seen this
/// tick and `r` holds the most recently specified value for each masked
/// field (§4.C).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigureRequestEvent {
    pub window: Xid,
    pub mask: ConfigureMask,
    pub r: Rect,
}

/// A `ClientMessage`'s 20 bytes of data, widened to `i64` to keep the 8/16/32
/// bit format variants representable without truncation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientMessageData(pub Vec<i64>);

impl ClientMessageData {
    pub fn get(&self, idx: usize) -> i64 {
        self.0.get(idx).copied().unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientMessageEvent {
    pub window: Xid,
    pub message_type: Xid,
    pub data: ClientMessageData,
}

/// Events as delivered by [`XConn::next_event`](super::XConn::next_event),
/// already demultiplexed from the wire protocol into the semantic categories
/// the coalescing pipeline (§4.C) operates on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XEvent {
    Expose { window: Xid, region: Rect },
    DamageNotify { drawable: Xid, region: Rect },
    MotionNotify { window: Xid, root_x: i32, root_y: i32 },
    ConfigureRequest(ConfigureRequestEvent),
    ConfigureNotify { window: Xid, r: Rect, is_root: bool },
    PropertyNotify { window: Xid, atom: Xid },
    DestroyNotify { window: Xid },
    UnmapNotify { window: Xid },
    MapRequest { window: Xid },
    KeyPress { window: Xid, code: u8, state: u16 },
    ButtonPress { window: Xid, button: u8, state: u16 },
    ButtonRelease { window: Xid, button: u8, state: u16 },
    ClientMessage(ClientMessageEvent),
    RandrScreenChange { width: u32, height: u32 },
    ReparentNotify { window: Xid, parent: Xid },
}

impl XEvent {
    /// The window this event is "about", for bucketing purposes. `None` for
    /// events that are not keyed per-window (there are none currently, but
    /// this keeps the bucketing code from special-casing variants).
    pub fn window(&self) -> Xid {
        match self {
            XEvent::Expose { window, .. } => *window,
            XEvent::DamageNotify { drawable, .. } => *drawable,
            XEvent::MotionNotify { window, .. } => *window,
            XEvent::ConfigureRequest(e) => e.window,
            XEvent::ConfigureNotify { window, .. } => *window,
            XEvent::PropertyNotify { window, .. } => *window,
            XEvent::DestroyNotify { window } => *window,
            XEvent::UnmapNotify { window } => *window,
            XEvent::MapRequest { window } => *window,
            XEvent::KeyPress { window, .. } => *window,
            XEvent::ButtonPress { window, .. } => *window,
            XEvent::ButtonRelease { window, .. } => *window,
            XEvent::ClientMessage(e) => e.window,
            XEvent::RandrScreenChange { .. } => Xid(0),
            XEvent::ReparentNotify { window, .. } => *window,
        }
    }
}
