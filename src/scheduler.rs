//! The tick loop that ties every other component together (§4.I).
use nix::sys::signal::{self, SigHandler, Signal};
use tracing::{span, Level};

use crate::acquisition::{self, Acquisition};
use crate::client::RootDirty;
use crate::config::WmConfig;
use crate::cookie_jar::CookieJar;
use crate::event_buckets::EventBuckets;
use crate::flusher;
use crate::geometry::Rect;
use crate::lifecycle::ClientLifecycle;
use crate::property_decoder;
use crate::x::XConn;
use crate::{Result, Xid};

/// Owns every piece of per-process state and drives one tick at a time.
///
/// `tick()` is the unit the specification's "one iteration" (§4.I) maps to;
/// `run` is a thin convenience loop around it for hosts that don't need
/// their own poll integration (real deployments drive `tick()` themselves
/// from an epoll/signalfd/timerfd loop, per §5 and §6 — that plumbing is an
/// external collaborator, not this crate).
pub struct WindowManager<X: XConn> {
    x: X,
    config: WmConfig,
    lifecycle: ClientLifecycle,
    cookie_jar: CookieJar,
    buckets: EventBuckets,
    screen: Rect,
    acquisition: Acquisition,
    x_poll_immediate: bool,
}

impl<X: XConn> WindowManager<X> {
    /// Acquire ownership of the screen and construct the manager. Ignores
    /// `SIGCHLD` so windows spawned by launched clients don't leave zombies
    /// behind, mirroring the convention of ignoring child-reap bookkeeping
    /// the core otherwise has no use for.
    pub fn new(x: X, config: WmConfig, screen: Rect) -> Result<Self> {
        unsafe {
            let _ = signal::signal(Signal::SIGCHLD, SigHandler::SigIgn);
        }

        let acquisition = acquisition::acquire(&x)?;

        Ok(Self {
            x,
            config,
            lifecycle: ClientLifecycle::new(),
            cookie_jar: CookieJar::new(),
            buckets: EventBuckets::new(),
            screen,
            acquisition,
            x_poll_immediate: false,
        })
    }

    pub fn supporting_wm_check(&self) -> Xid {
        self.acquisition.supporting_wm_check
    }

    /// Whether the host's poll should use a zero timeout on the next
    /// iteration because the per-tick event cap was hit with events still
    /// queued (§4.C).
    pub fn should_poll_immediately(&self) -> bool {
        self.x_poll_immediate
    }

    pub fn lifecycle(&self) -> &ClientLifecycle {
        &self.lifecycle
    }

    /// Run one full iteration: ingest, drain cookies, dispatch, flush,
    /// publish, reset.
    pub fn tick(&mut self) {
        let _span = span!(Level::DEBUG, "tick").entered();

        self.ingest_events();
        self.drain_cookies();
        self.dispatch_buckets();
        self.flush_dirty();

        let root_dirty = self.lifecycle.root_dirty;
        if !root_dirty.is_empty() {
            crate::root_publisher::publish(&self.x, &self.lifecycle, &self.config, self.screen, root_dirty);
            self.lifecycle.root_dirty = RootDirty::empty();
        }
    }

    /// Loop calling [`tick`](Self::tick) until `should_continue` returns
    /// `false`, checked once per iteration.
    pub fn run(&mut self, mut should_continue: impl FnMut() -> bool) {
        while should_continue() {
            self.tick();
        }
    }

    fn ingest_events(&mut self) {
        let mut count = 0;
        while count < self.config.max_events_per_tick {
            match self.x.poll_for_event() {
                Some(event) => {
                    self.buckets.ingest(event);
                    count += 1;
                }
                None => {
                    self.x_poll_immediate = false;
                    return;
                }
            }
        }
        // Hit the cap; unknown whether more are queued, so force an
        // immediate re-poll next iteration rather than blocking (§4.C).
        self.x_poll_immediate = true;
    }

    fn drain_cookies(&mut self) {
        let drained = self.cookie_jar.drain(&self.x, self.config.cookie_drain_budget);
        for reply in drained {
            if let Some((record, resolve)) = self.lifecycle.get_mut_with_resolver(reply.handle) {
                property_decoder::apply_reply(record, reply.kind, &reply.outcome, &self.config, resolve);
            }
            self.lifecycle.note_reply_resolved(&self.x, &self.config, reply.handle);
        }
    }

    fn dispatch_buckets(&mut self) {
        for window in self.buckets.take_map_requests() {
            if self.lifecycle.handle_for_xid(window).is_none() {
                self.lifecycle
                    .manage(&self.x, &mut self.cookie_jar, window, 24, 0, false);
            }
        }

        for window in self.buckets.take_destroyed() {
            self.lifecycle.handle_destroy_notify(&mut self.cookie_jar, window);
        }

        for window in self.buckets.take_unmapped() {
            self.lifecycle.handle_unmap_notify(&mut self.cookie_jar, window);
        }

        for req in self.buckets.take_configure_requests() {
            self.lifecycle.handle_configure_request(&self.x, req);
        }

        for msg in self.buckets.take_client_messages() {
            self.dispatch_client_message(msg);
        }

        if let Some((w, h)) = self.buckets.take_randr() {
            self.screen = Rect::new(0, 0, w, h);
            self.lifecycle.root_dirty |= RootDirty::WORKAREA;
        }

        // Expose/damage/motion/key/button buckets are drained here so they
        // don't leak into the next tick's arena, but redraw, focus and
        // keybinding policy are external collaborators (§6) this crate does
        // not implement.
        let _ = self.buckets.take_expose();
        let _ = self.buckets.take_damage();
        let _ = self.buckets.take_motion();
        let _ = self.buckets.take_key_press();
        let _ = self.buckets.take_button_press();
        let _ = self.buckets.take_button_release();
        let _ = self.buckets.take_property_notify();
    }

    fn dispatch_client_message(&mut self, msg: crate::x::event::ClientMessageEvent) {
        let Some(handle) = self.lifecycle.handle_for_xid(msg.window) else { return };
        let net_wm_state = self.x.atom_xid(crate::atom::Atom::NetWmState);
        if msg.message_type != net_wm_state {
            return;
        }

        let x = &self.x;
        let (action, atoms) = flusher::decode_net_wm_state_message(&msg.data, |xid| {
            reverse_lookup_atom(x, xid)
        });

        if let Some(record) = self.lifecycle.get_mut(handle) {
            property_decoder::apply_net_wm_state_message(record, action, atoms);
        }
    }

    fn flush_dirty(&mut self) {
        let config = &self.config;
        let mut restack_needed = false;
        for (_, record) in self.lifecycle.iter_mut() {
            if record.hot.dirty.contains(crate::client::DirtyFlags::STACKING) {
                restack_needed = true;
            }
            flusher::flush_client(&self.x, record, config);
        }

        if restack_needed {
            let mut refs: Vec<_> = self.lifecycle.iter_mut().map(|(_, r)| r).collect();
            flusher::restack(&self.x, &mut refs);
        }
    }
}

/// Best-effort reverse lookup of an interned atom's name; used only to
/// decode the two target atoms in a `_NET_WM_STATE` `ClientMessage`.
fn reverse_lookup_atom<X: XConn>(x: &X, xid: Xid) -> Option<crate::atom::Atom> {
    use strum::IntoEnumIterator;
    crate::atom::Atom::iter().find(|&a| x.atom_xid(a) == xid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::x::mock::MockXConn;

    fn wm() -> WindowManager<MockXConn> {
        WindowManager::new(MockXConn::new(), WmConfig::default(), Rect::new(0, 0, 1920, 1080)).unwrap()
    }

    #[test]
    fn new_acquires_the_screen() {
        let manager = wm();
        assert_ne!(manager.supporting_wm_check(), Xid(0));
    }

    #[test]
    fn map_request_is_dispatched_into_lifecycle() {
        let mut manager = wm();
        manager.x.push_event(crate::x::XEvent::MapRequest { window: Xid(100) });

        manager.tick();

        assert!(manager.lifecycle().handle_for_xid(Xid(100)).is_some());
    }

    #[test]
    fn bounded_ingest_sets_poll_immediate_and_drains_the_rest_next_tick() {
        let mut manager = wm();
        let n = manager.config.max_events_per_tick + 4;
        for _ in 0..n {
            manager.x.push_event(crate::x::XEvent::KeyPress { window: Xid(1), code: 1, state: 0 });
        }

        manager.tick();
        assert!(manager.should_poll_immediately());

        manager.tick();
        assert!(!manager.should_poll_immediately());
    }
}
