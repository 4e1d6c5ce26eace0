//! Core state machine for a reparenting X11 window manager.
//!
//! This crate implements the part of a window manager that is genuinely
//! hard to get right: turning an unreliable, asynchronous stream of server
//! events and out-of-order property replies into a consistent, coalesced
//! view of the client population. It does not draw anything — decoration
//! rendering, the root menu, keybinding resolution and monitor discovery are
//! all external collaborators that talk to this crate through the [`x::XConn`]
//! trait and the [`scheduler::WindowManager`] entry point.
//!
//! See [`scheduler`] for the tick loop that ties every other module
//! together.
use std::fmt;
use std::ops::Deref;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub mod acquisition;
pub mod atom;
pub mod client;
pub mod config;
pub mod cookie_jar;
pub mod error;
pub mod event_buckets;
pub mod flusher;
pub mod geometry;
pub mod handle;
pub mod lifecycle;
pub mod property_decoder;
pub mod root_publisher;
pub mod scheduler;
pub mod x;

#[cfg(feature = "x11rb")]
pub mod backend;

pub use config::WmConfig;
pub use error::{Error, Result};
pub use handle::Handle;
pub use scheduler::WindowManager;

/// An X11 resource id (window, atom, pixmap, ...).
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Default, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy)]
pub struct Xid(pub u32);

impl fmt::Display for Xid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

impl Deref for Xid {
    type Target = u32;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<u32> for Xid {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl From<Xid> for u32 {
    fn from(id: Xid) -> Self {
        id.0
    }
}
