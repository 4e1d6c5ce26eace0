//! The abstract interface to the X server.
//!
//! Everything in this module is the *collaborator* boundary described in the
//! specification's §6: the core only ever talks to an [`XConn`] impl, never
//! to a concrete transport. Production code drives this trait with the
//! `x11rb`-backed implementation in [`crate::backend`]; tests drive it with
//! [`mock::MockXConn`].
use crate::atom::Atom;
use crate::geometry::{Point, Rect};
use crate::Result;
use crate::Xid;

pub mod event;
pub mod property;

#[cfg(test)]
pub mod mock;

pub use event::{Sequence, XEvent};
pub use property::{Prop, WindowAttributes, WmState};

/// The kind of an in-flight asynchronous request, used by the cookie jar to
/// know how to interpret the eventual reply (§4.B).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReplyKind {
    GetGeometry,
    GetWindowAttributes,
    GetProperty(Atom),
    TranslateCoordinates,
    QueryTree,
}

/// The decoded payload of a reply, once it arrives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyPayload {
    Geometry(Rect),
    WindowAttributes(WindowAttributes),
    Property(Option<Prop>),
    TranslatedPoint(Point),
    Tree(Vec<Xid>),
}

/// The outcome of polling the transport for a specific sequence number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// The reply has not arrived yet; try again on a later tick.
    Pending,
    /// The request succeeded.
    Reply(ReplyPayload),
    /// The server returned an X error in place of a reply.
    Error,
}

/// Absolute or relative geometry to apply to a window via `ConfigureWindow`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigureWindow {
    pub r: Rect,
    pub border_px: Option<u32>,
    pub stack_above: Option<Xid>,
}

/// A handle on a running X11 connection the core uses for issuing requests
/// and receiving events.
///
/// All request-issuing methods that have an asynchronous reply return a
/// [`Sequence`] rather than blocking; the caller registers that sequence
/// with the [`CookieJar`](crate::cookie_jar::CookieJar) and polls for the
/// reply on a later tick via [`XConn::poll_for_reply`].
pub trait XConn {
    /// The window manager's root window for this screen.
    fn root(&self) -> Xid;

    /// The raw fd the tick scheduler polls alongside signal/timer fds.
    fn as_raw_fd(&self) -> i32;

    /// Non-blocking poll for the next queued event, if any.
    fn poll_for_event(&self) -> Option<XEvent>;

    /// Flush any buffered requests to the server.
    fn flush(&self);

    /// Resolve an [`Atom`] to its interned [`Xid`]. Atoms are interned
    /// eagerly at startup (§4.G); this is always a local table lookup.
    fn atom_xid(&self, atom: Atom) -> Xid;

    // -- asynchronous requests: issue now, poll for reply later --

    fn send_get_geometry(&self, window: Xid) -> Sequence;
    fn send_get_window_attributes(&self, window: Xid) -> Sequence;
    fn send_get_property(&self, window: Xid, atom: Atom) -> Sequence;
    fn send_translate_coordinates(&self, window: Xid) -> Sequence;
    fn send_query_tree(&self, window: Xid) -> Sequence;

    /// Poll for the reply to a previously issued request.
    fn poll_for_reply(&self, kind: ReplyKind, sequence: Sequence) -> PollOutcome;

    // -- synchronous requests --

    fn create_frame(&self, for_client: Xid, depth: u8, visual: u32, r: Rect) -> Result<Xid>;
    fn reparent_window(&self, window: Xid, new_parent: Xid, x: i32, y: i32) -> Result<()>;
    fn map_window(&self, window: Xid) -> Result<()>;
    fn unmap_window(&self, window: Xid) -> Result<()>;
    fn destroy_window(&self, window: Xid) -> Result<()>;
    fn configure_window(&self, window: Xid, cfg: ConfigureWindow) -> Result<()>;
    fn select_substructure_events(&self, window: Xid) -> Result<()>;

    fn change_property_atoms(&self, window: Xid, prop: Atom, values: &[Atom]) -> Result<()>;
    fn change_property_cardinals(&self, window: Xid, prop: Atom, values: &[u32]) -> Result<()>;
    fn change_property_string(&self, window: Xid, prop: Atom, value: &str) -> Result<()>;
    fn change_property_strings(&self, window: Xid, prop: Atom, values: &[String]) -> Result<()>;
    fn change_property_window(&self, window: Xid, prop: Atom, value: Xid) -> Result<()>;
    fn change_property_window_list(&self, window: Xid, prop: Atom, values: &[Xid]) -> Result<()>;
    fn delete_property(&self, window: Xid, prop: Atom) -> Result<()>;

    /// Attempt to become the owner of `WM_S0`, returning the previous owner.
    fn get_selection_owner(&self, selection: Atom) -> Result<Option<Xid>>;
    fn set_selection_owner(&self, selection: Atom, owner: Xid) -> Result<()>;

    /// Attempt the `SubstructureRedirect | SubstructureNotify` grab on the
    /// root window. Returns `Err` (`SubstructureRedirectDenied`) if another
    /// WM already holds it (§4.G, §7).
    fn grab_substructure_redirect(&self) -> Result<()>;
}
