//! Per-tick event coalescing (§4.C).
//!
//! Events pulled off the wire this tick are folded into a small set of
//! buckets instead of a raw queue: a window dragged across the screen
//! produces dozens of `MotionNotify` and `ConfigureNotify` events but the
//! dispatch stage only ever needs the latest one. Buckets are drained (and
//! implicitly reset) once per tick by the scheduler; nothing here persists
//! across ticks.
use std::collections::{HashMap, HashSet};

use crate::geometry::{Point, Rect};
use crate::x::event::{ClientMessageEvent, ConfigureRequestEvent};
use crate::x::XEvent;
use crate::Xid;

#[derive(Default)]
pub struct EventBuckets {
    expose: HashMap<Xid, Rect>,
    damage: HashMap<Xid, Rect>,
    motion: HashMap<Xid, Point>,
    configure_request: HashMap<Xid, ConfigureRequestEvent>,
    configure_notify: HashMap<Xid, (Rect, bool)>,
    property_notify: HashSet<(Xid, Xid)>,
    destroyed: HashSet<Xid>,
    unmapped: Vec<Xid>,
    map_requests: Vec<Xid>,
    key_press: Vec<(Xid, u8, u16)>,
    button_press: Vec<(Xid, u8, u16)>,
    button_release: Vec<(Xid, u8, u16)>,
    client_messages: Vec<ClientMessageEvent>,
    randr: Option<(u32, u32)>,
}

impl EventBuckets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one server event into the buckets. `ReparentNotify` is dropped
    /// unconditionally (§9 open question: the core never reparents into
    /// anything but its own frames, so the notification carries no signal
    /// regardless of the new parent).
    pub fn ingest(&mut self, event: XEvent) {
        match event {
            XEvent::Expose { window, region } => {
                self.expose
                    .entry(window)
                    .and_modify(|r| *r = r.union(&region))
                    .or_insert(region);
            }
            XEvent::DamageNotify { drawable, region } => {
                self.damage
                    .entry(drawable)
                    .and_modify(|r| *r = r.union(&region))
                    .or_insert(region);
            }
            XEvent::MotionNotify { window, root_x, root_y } => {
                self.motion.insert(window, Point::new(root_x, root_y));
            }
            XEvent::ConfigureRequest(req) => {
                self.configure_request
                    .entry(req.window)
                    .and_modify(|existing| {
                        existing.mask |= req.mask;
                        if req.mask.contains(crate::x::event::ConfigureMask::X) {
                            existing.r.x = req.r.x;
                        }
                        if req.mask.contains(crate::x::event::ConfigureMask::Y) {
                            existing.r.y = req.r.y;
                        }
                        if req.mask.contains(crate::x::event::ConfigureMask::WIDTH) {
                            existing.r.w = req.r.w;
                        }
                        if req.mask.contains(crate::x::event::ConfigureMask::HEIGHT) {
                            existing.r.h = req.r.h;
                        }
                    })
                    .or_insert(req);
            }
            XEvent::ConfigureNotify { window, r, is_root } => {
                self.configure_notify.insert(window, (r, is_root));
            }
            XEvent::PropertyNotify { window, atom } => {
                self.property_notify.insert((window, atom));
            }
            XEvent::DestroyNotify { window } => {
                self.destroyed.insert(window);
            }
            XEvent::UnmapNotify { window } => {
                if !self.destroyed.contains(&window) {
                    self.unmapped.push(window);
                }
            }
            XEvent::MapRequest { window } => self.map_requests.push(window),
            XEvent::KeyPress { window, code, state } => self.key_press.push((window, code, state)),
            XEvent::ButtonPress { window, button, state } => {
                self.button_press.push((window, button, state))
            }
            XEvent::ButtonRelease { window, button, state } => {
                self.button_release.push((window, button, state))
            }
            XEvent::ClientMessage(msg) => self.client_messages.push(msg),
            XEvent::RandrScreenChange { width, height } => self.randr = Some((width, height)),
            XEvent::ReparentNotify { .. } => {}
        }
    }

    pub fn take_expose(&mut self) -> Vec<(Xid, Rect)> {
        self.expose.drain().collect()
    }

    pub fn take_damage(&mut self) -> Vec<(Xid, Rect)> {
        self.damage.drain().collect()
    }

    pub fn take_motion(&mut self) -> Vec<(Xid, Point)> {
        self.motion.drain().collect()
    }

    pub fn take_configure_requests(&mut self) -> Vec<ConfigureRequestEvent> {
        self.configure_request.drain().map(|(_, v)| v).collect()
    }

    pub fn take_configure_notify(&mut self) -> Vec<(Xid, Rect, bool)> {
        self.configure_notify
            .drain()
            .map(|(w, (r, is_root))| (w, r, is_root))
            .collect()
    }

    pub fn take_property_notify(&mut self) -> Vec<(Xid, Xid)> {
        self.property_notify.drain().collect()
    }

    pub fn take_destroyed(&mut self) -> Vec<Xid> {
        self.destroyed.drain().collect()
    }

    pub fn take_unmapped(&mut self) -> Vec<Xid> {
        std::mem::take(&mut self.unmapped)
    }

    pub fn take_map_requests(&mut self) -> Vec<Xid> {
        std::mem::take(&mut self.map_requests)
    }

    pub fn take_key_press(&mut self) -> Vec<(Xid, u8, u16)> {
        std::mem::take(&mut self.key_press)
    }

    pub fn take_button_press(&mut self) -> Vec<(Xid, u8, u16)> {
        std::mem::take(&mut self.button_press)
    }

    pub fn take_button_release(&mut self) -> Vec<(Xid, u8, u16)> {
        std::mem::take(&mut self.button_release)
    }

    pub fn take_client_messages(&mut self) -> Vec<ClientMessageEvent> {
        std::mem::take(&mut self.client_messages)
    }

    pub fn take_randr(&mut self) -> Option<(u32, u32)> {
        self.randr.take()
    }

    /// Whether every bucket is empty. Mostly useful in tests.
    pub fn is_empty(&self) -> bool {
        self.expose.is_empty()
            && self.damage.is_empty()
            && self.motion.is_empty()
            && self.configure_request.is_empty()
            && self.configure_notify.is_empty()
            && self.property_notify.is_empty()
            && self.destroyed.is_empty()
            && self.unmapped.is_empty()
            && self.map_requests.is_empty()
            && self.key_press.is_empty()
            && self.button_press.is_empty()
            && self.button_release.is_empty()
            && self.client_messages.is_empty()
            && self.randr.is_none()
    }
}
