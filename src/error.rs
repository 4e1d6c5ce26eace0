//! Crate-wide error and result types.
use crate::handle::Handle;
use crate::Xid;

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the core state machine.
///
/// Most of the conditions described in the specification's error taxonomy
/// never reach this type: stale cookies, malformed properties and reply
/// errors are swallowed where they occur and logged instead, since the whole
/// point of the cookie jar and property decoder is to make those conditions
/// unobservable to the rest of the system. `Error` is reserved for the two
/// surfaces the core is allowed to fail on: acquisition at startup and
/// transport failure at runtime.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Another process already owns `WM_S0` on this root.
    #[error("WM_S0 selection is already owned by another client on this root")]
    SelectionAlreadyOwned,

    /// The root window refused our `SubstructureRedirect` grab, meaning a
    /// different window manager is already running.
    #[error("root window refused SubstructureRedirect: another window manager is running")]
    SubstructureRedirectDenied,

    /// The underlying transport reported an unrecoverable condition.
    #[error("X connection failed: {0}")]
    Transport(String),

    /// Looked up a handle that does not resolve to a live client.
    ///
    /// This is returned by the public slotmap API; the cookie jar and
    /// dispatch paths treat the same condition as a silent no-op rather than
    /// propagating it, per the robustness property in the spec.
    #[error("handle does not refer to a live client: {0:?}")]
    UnknownHandle(Handle),

    /// No client is registered for the given X window id.
    #[error("no managed client for window {0}")]
    UnknownWindow(Xid),

    /// A property reply had the wrong format or length for the type being decoded.
    #[error("malformed property payload for atom {atom}: {reason}")]
    MalformedProperty { atom: String, reason: String },
}
