//! Correlates outstanding asynchronous X requests back to the client that
//! issued them (§4.B).
//!
//! This is the central robustness mechanism of the core: a client can be
//! destroyed while one of its Phase-1 property requests is still in flight,
//! and the eventual reply must be safe to receive without touching freed
//! state. Rather than cancel in-flight requests (X has no such operation)
//! the jar tracks an `orphaned` bit per slot; [`CookieJar::orphan_all`] is
//! called once by the lifecycle when a client is unmanaged, after which the
//! slot is freed immediately and any later reply for it is simply dropped.
use std::collections::BTreeMap;

use tracing::trace;

use crate::handle::Handle;
use crate::x::{PollOutcome, ReplyKind, Sequence, XConn};

/// A single outstanding request, keyed by its server sequence number so
/// drains happen in server order (§4.B, §5).
#[derive(Debug, Clone, Copy)]
struct CookieSlot {
    handle: Handle,
    kind: ReplyKind,
    orphaned: bool,
}

/// The result of successfully draining one cookie: `None` if the slot had
/// been orphaned (the caller should not touch the client) or `Some` with the
/// live handle, reply kind and server outcome to hand to the property
/// decoder.
pub struct DrainedReply {
    pub handle: Handle,
    pub kind: ReplyKind,
    pub outcome: PollOutcome,
}

#[derive(Default)]
pub struct CookieJar {
    slots: BTreeMap<Sequence, CookieSlot>,
}

impl CookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of requests still awaiting a reply.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Register a just-issued request so its reply can be correlated later.
    pub fn register(&mut self, sequence: Sequence, handle: Handle, kind: ReplyKind) {
        self.slots.insert(
            sequence,
            CookieSlot {
                handle,
                kind,
                orphaned: false,
            },
        );
    }

    /// Mark every outstanding cookie for `handle` as orphaned. Called once
    /// when a client is unmanaged; the client's slot can then be freed
    /// immediately (invariant 4/6) because any later reply for these
    /// cookies will be dropped on arrival instead of dereferencing it.
    pub fn orphan_all(&mut self, handle: Handle) {
        for slot in self.slots.values_mut() {
            if slot.handle == handle {
                slot.orphaned = true;
            }
        }
    }

    /// Drain up to `budget` outstanding cookies, polling the transport for
    /// each in ascending sequence order. Cookies whose reply has not arrived
    /// yet are left in the jar for a later tick. Orphaned cookies are
    /// resolved and removed silently — the transport reply is fetched (so it
    /// doesn't leak in the backend) but never surfaced to the caller.
    pub fn drain<X: XConn>(&mut self, x: &X, budget: usize) -> Vec<DrainedReply> {
        let mut drained = Vec::new();
        let mut resolved = Vec::new();

        for (&sequence, slot) in self.slots.iter().take(budget) {
            match x.poll_for_reply(slot.kind, sequence) {
                PollOutcome::Pending => continue,
                outcome => {
                    resolved.push(sequence);
                    if slot.orphaned {
                        trace!(?sequence, "dropping reply for orphaned cookie");
                    } else {
                        drained.push(DrainedReply {
                            handle: slot.handle,
                            kind: slot.kind,
                            outcome,
                        });
                    }
                }
            }
        }

        for sequence in resolved {
            self.slots.remove(&sequence);
        }

        drained
    }
}
