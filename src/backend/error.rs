//! The ways the x11rb transport can fail.
use crate::Error;

/// Errors surfaced by the concrete x11rb [`XConn`](crate::x::XConn) impl,
/// wrapped into [`Error::Transport`] at the boundary so the rest of the
/// crate only ever sees the abstract error taxonomy.
#[derive(thiserror::Error, Debug)]
pub enum BackendError {
    #[error(transparent)]
    Connect(#[from] x11rb::errors::ConnectError),

    #[error(transparent)]
    Connection(#[from] x11rb::errors::ConnectionError),

    #[error(transparent)]
    Reply(#[from] x11rb::errors::ReplyError),

    #[error(transparent)]
    ReplyOrId(#[from] x11rb::errors::ReplyOrIdError),

    /// The X11 server does not support the RandR extension this crate
    /// requires for output-change notification.
    #[error("the X11 server does not support the RandR extension")]
    MissingRandRSupport,
}

impl From<BackendError> for Error {
    fn from(e: BackendError) -> Self {
        Error::Transport(e.to_string())
    }
}
