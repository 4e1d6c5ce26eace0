//! An in-memory [`XConn`] test double.
//!
//! `MockXConn` records every outgoing request it is asked to issue instead of
//! talking to a real server, so tests can assert on exactly what the core
//! would have sent (this is how the flusher idempotence and ordering
//! scenarios in the specification are exercised). Asynchronous requests are
//! genuinely asynchronous: `send_*` returns a fresh sequence number and the
//! reply only becomes visible to `poll_for_reply` once the test calls
//! [`MockXConn::complete`].
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};

use crate::atom::Atom;
use crate::geometry::Rect;
use crate::x::{
    ConfigureWindow, PollOutcome, ReplyKind, ReplyPayload, XConn, XEvent,
};
use crate::{Error, Result, Xid};

/// A single recorded outgoing request, for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recorded {
    CreateFrame { for_client: Xid, r: Rect },
    ReparentWindow { window: Xid, parent: Xid, x: i32, y: i32 },
    MapWindow(Xid),
    UnmapWindow(Xid),
    DestroyWindow(Xid),
    ConfigureWindow { window: Xid, cfg: ConfigureWindow },
    SelectSubstructureEvents(Xid),
    ChangePropertyAtoms { window: Xid, prop: Atom, values: Vec<Atom> },
    ChangePropertyCardinals { window: Xid, prop: Atom, values: Vec<u32> },
    ChangePropertyString { window: Xid, prop: Atom, value: String },
    ChangePropertyStrings { window: Xid, prop: Atom, values: Vec<String> },
    ChangePropertyWindow { window: Xid, prop: Atom, value: Xid },
    ChangePropertyWindowList { window: Xid, prop: Atom, values: Vec<Xid> },
    DeleteProperty { window: Xid, prop: Atom },
    SetSelectionOwner { selection: Atom, owner: Xid },
}

#[derive(Default)]
struct Inner {
    events: VecDeque<XEvent>,
    next_seq: u32,
    next_xid: u32,
    pending: HashMap<u32, Option<PollOutcome>>,
    log: Vec<Recorded>,
    selection_owners: HashMap<Atom, Xid>,
    grab_denied: bool,
}

pub struct MockXConn {
    root: Xid,
    inner: RefCell<Inner>,
}

impl MockXConn {
    pub fn new() -> Self {
        Self {
            root: Xid(1),
            inner: RefCell::new(Inner {
                next_xid: 1000,
                ..Default::default()
            }),
        }
    }

    /// Queue an event to be returned by future `poll_for_event` calls, in order.
    pub fn push_event(&self, event: XEvent) {
        self.inner.borrow_mut().events.push_back(event);
    }

    /// Queue several events at once, preserving order.
    pub fn push_events(&self, events: impl IntoIterator<Item = XEvent>) {
        let mut inner = self.inner.borrow_mut();
        inner.events.extend(events);
    }

    /// Resolve a previously issued sequence number with the given outcome.
    pub fn complete(&self, sequence: u32, outcome: PollOutcome) {
        self.inner.borrow_mut().pending.insert(sequence, Some(outcome));
    }

    /// The full, ordered log of requests issued so far.
    pub fn log(&self) -> Vec<Recorded> {
        self.inner.borrow().log.clone()
    }

    pub fn clear_log(&self) {
        self.inner.borrow_mut().log.clear();
    }

    /// Make the next [`XConn::grab_substructure_redirect`] call fail, as if
    /// another window manager were already running.
    pub fn deny_substructure_redirect(&self) {
        self.inner.borrow_mut().grab_denied = true;
    }

    /// Pre-seed the owner of a selection, as if another client already holds it.
    pub fn set_existing_selection_owner(&self, selection: Atom, owner: Xid) {
        self.inner.borrow_mut().selection_owners.insert(selection, owner);
    }

    fn next_seq(&self) -> u32 {
        let mut inner = self.inner.borrow_mut();
        inner.next_seq += 1;
        inner.pending.insert(inner.next_seq, None);
        inner.next_seq
    }
}

impl Default for MockXConn {
    fn default() -> Self {
        Self::new()
    }
}

impl XConn for MockXConn {
    fn root(&self) -> Xid {
        self.root
    }

    fn as_raw_fd(&self) -> i32 {
        -1
    }

    fn poll_for_event(&self) -> Option<XEvent> {
        self.inner.borrow_mut().events.pop_front()
    }

    fn flush(&self) {}

    fn atom_xid(&self, atom: Atom) -> Xid {
        // Stable, collision-free mapping for tests: atom discriminant order
        // plus an offset clear of any real client/frame xid range.
        use strum::IntoEnumIterator;
        let idx = Atom::iter().position(|a| a == atom).unwrap_or(0);
        Xid(10_000 + idx as u32)
    }

    fn send_get_geometry(&self, _window: Xid) -> u32 {
        self.next_seq()
    }

    fn send_get_window_attributes(&self, _window: Xid) -> u32 {
        self.next_seq()
    }

    fn send_get_property(&self, _window: Xid, _atom: Atom) -> u32 {
        self.next_seq()
    }

    fn send_translate_coordinates(&self, _window: Xid) -> u32 {
        self.next_seq()
    }

    fn send_query_tree(&self, _window: Xid) -> u32 {
        self.next_seq()
    }

    fn poll_for_reply(&self, _kind: ReplyKind, sequence: u32) -> PollOutcome {
        let mut inner = self.inner.borrow_mut();
        match inner.pending.get_mut(&sequence) {
            None => PollOutcome::Pending,
            Some(slot) => match slot.take() {
                Some(outcome) => {
                    inner.pending.remove(&sequence);
                    outcome
                }
                None => PollOutcome::Pending,
            },
        }
    }

    fn create_frame(&self, for_client: Xid, _depth: u8, _visual: u32, r: Rect) -> Result<Xid> {
        let mut inner = self.inner.borrow_mut();
        inner.next_xid += 1;
        let frame = Xid(inner.next_xid);
        inner.log.push(Recorded::CreateFrame { for_client, r });
        Ok(frame)
    }

    fn reparent_window(&self, window: Xid, new_parent: Xid, x: i32, y: i32) -> Result<()> {
        self.inner.borrow_mut().log.push(Recorded::ReparentWindow {
            window,
            parent: new_parent,
            x,
            y,
        });
        Ok(())
    }

    fn map_window(&self, window: Xid) -> Result<()> {
        self.inner.borrow_mut().log.push(Recorded::MapWindow(window));
        Ok(())
    }

    fn unmap_window(&self, window: Xid) -> Result<()> {
        self.inner.borrow_mut().log.push(Recorded::UnmapWindow(window));
        Ok(())
    }

    fn destroy_window(&self, window: Xid) -> Result<()> {
        self.inner.borrow_mut().log.push(Recorded::DestroyWindow(window));
        Ok(())
    }

    fn configure_window(&self, window: Xid, cfg: ConfigureWindow) -> Result<()> {
        self.inner
            .borrow_mut()
            .log
            .push(Recorded::ConfigureWindow { window, cfg });
        Ok(())
    }

    fn select_substructure_events(&self, window: Xid) -> Result<()> {
        self.inner
            .borrow_mut()
            .log
            .push(Recorded::SelectSubstructureEvents(window));
        Ok(())
    }

    fn change_property_atoms(&self, window: Xid, prop: Atom, values: &[Atom]) -> Result<()> {
        self.inner.borrow_mut().log.push(Recorded::ChangePropertyAtoms {
            window,
            prop,
            values: values.to_vec(),
        });
        Ok(())
    }

    fn change_property_cardinals(&self, window: Xid, prop: Atom, values: &[u32]) -> Result<()> {
        self.inner
            .borrow_mut()
            .log
            .push(Recorded::ChangePropertyCardinals {
                window,
                prop,
                values: values.to_vec(),
            });
        Ok(())
    }

    fn change_property_string(&self, window: Xid, prop: Atom, value: &str) -> Result<()> {
        self.inner.borrow_mut().log.push(Recorded::ChangePropertyString {
            window,
            prop,
            value: value.to_string(),
        });
        Ok(())
    }

    fn change_property_strings(&self, window: Xid, prop: Atom, values: &[String]) -> Result<()> {
        self.inner.borrow_mut().log.push(Recorded::ChangePropertyStrings {
            window,
            prop,
            values: values.to_vec(),
        });
        Ok(())
    }

    fn change_property_window(&self, window: Xid, prop: Atom, value: Xid) -> Result<()> {
        self.inner.borrow_mut().log.push(Recorded::ChangePropertyWindow {
            window,
            prop,
            value,
        });
        Ok(())
    }

    fn change_property_window_list(&self, window: Xid, prop: Atom, values: &[Xid]) -> Result<()> {
        self.inner.borrow_mut().log.push(Recorded::ChangePropertyWindowList {
            window,
            prop,
            values: values.to_vec(),
        });
        Ok(())
    }

    fn delete_property(&self, window: Xid, prop: Atom) -> Result<()> {
        self.inner
            .borrow_mut()
            .log
            .push(Recorded::DeleteProperty { window, prop });
        Ok(())
    }

    fn get_selection_owner(&self, selection: Atom) -> Result<Option<Xid>> {
        Ok(self.inner.borrow().selection_owners.get(&selection).copied())
    }

    fn set_selection_owner(&self, selection: Atom, owner: Xid) -> Result<()> {
        let mut inner = self.inner.borrow_mut();
        inner.selection_owners.insert(selection, owner);
        inner.log.push(Recorded::SetSelectionOwner { selection, owner });
        Ok(())
    }

    fn grab_substructure_redirect(&self) -> Result<()> {
        if self.inner.borrow().grab_denied {
            Err(Error::SubstructureRedirectDenied)
        } else {
            Ok(())
        }
    }
}
