//! A recording [`XConn`] test double for the integration scenarios.
//!
//! This mirrors `src/x/mock.rs`'s `MockXConn`, but lives here rather than
//! being re-exported from the library, since that internal test double is
//! only compiled into the crate's own `#[cfg(test)]` build.
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use fenestra::atom::Atom;
use fenestra::geometry::Rect;
use fenestra::x::{ConfigureWindow, PollOutcome, ReplyKind, XConn, XEvent};
use fenestra::{Error, Result, Xid};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recorded {
    CreateFrame { for_client: Xid, r: Rect },
    ReparentWindow { window: Xid, parent: Xid },
    MapWindow(Xid),
    UnmapWindow(Xid),
    DestroyWindow(Xid),
    ConfigureWindow { window: Xid, cfg: ConfigureWindow },
    ChangePropertyWindowList { window: Xid, prop: Atom, values: Vec<Xid> },
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

/// Cheaply `Clone`-able so a test can hand a copy to a [`WindowManager`]
/// (which takes its `XConn` by value) while keeping one to push events and
/// inspect the log with.
#[derive(Clone)]
pub struct TestXConn {
    root: Xid,
    inner: Rc<RefCell<Inner>>,
}

impl TestXConn {
    pub fn new() -> Self {
        Self {
            root: Xid(1),
            inner: Rc::new(RefCell::new(Inner {
                next_xid: 1000,
                ..Default::default()
            })),
        }
    }

    pub fn push_event(&self, event: XEvent) {
        self.inner.borrow_mut().events.push_back(event);
    }

    pub fn complete(&self, sequence: u32, outcome: PollOutcome) {
        self.inner.borrow_mut().pending.insert(sequence, Some(outcome));
    }

    pub fn log(&self) -> Vec<Recorded> {
        self.inner.borrow().log.clone()
    }

    pub fn clear_log(&self) {
        self.inner.borrow_mut().log.clear();
    }

    pub fn deny_substructure_redirect(&self) {
        self.inner.borrow_mut().grab_denied = true;
    }

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

impl XConn for TestXConn {
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

    fn reparent_window(&self, window: Xid, new_parent: Xid, _x: i32, _y: i32) -> Result<()> {
        self.inner
            .borrow_mut()
            .log
            .push(Recorded::ReparentWindow { window, parent: new_parent });
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

    fn select_substructure_events(&self, _window: Xid) -> Result<()> {
        Ok(())
    }

    fn change_property_atoms(&self, _window: Xid, _prop: Atom, _values: &[Atom]) -> Result<()> {
        Ok(())
    }

    fn change_property_cardinals(&self, _window: Xid, _prop: Atom, _values: &[u32]) -> Result<()> {
        Ok(())
    }

    fn change_property_string(&self, _window: Xid, _prop: Atom, _value: &str) -> Result<()> {
        Ok(())
    }

    fn change_property_strings(&self, _window: Xid, _prop: Atom, _values: &[String]) -> Result<()> {
        Ok(())
    }

    fn change_property_window(&self, _window: Xid, _prop: Atom, _value: Xid) -> Result<()> {
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

    fn delete_property(&self, _window: Xid, _prop: Atom) -> Result<()> {
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
