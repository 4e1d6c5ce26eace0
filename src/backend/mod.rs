//! The x11rb-backed [`XConn`] implementation (§6's concrete transport
//! collaborator).
//!
//! Every request that has an asynchronous reply is issued with `send_*` and
//! then `.forget()`-ten: x11rb keeps the reply buffered against its
//! sequence number until something reads it, which is exactly the
//! poll-later model the cookie jar needs. Nothing here blocks on a reply.
use std::collections::HashMap;
use std::os::unix::io::AsRawFd;

use strum::IntoEnumIterator;
use x11rb::connection::Connection as _;
use x11rb::cookie::Cookie;
use x11rb::protocol::randr::{self, ConnectionExt as _};
use x11rb::protocol::xproto::{
    self, AtomEnum, ChangeWindowAttributesAux, ConfigureWindowAux, ConnectionExt as _,
    CreateWindowAux, EventMask, PropMode, StackMode, Window, WindowClass,
};
use x11rb::protocol::Event;
use x11rb::rust_connection::RustConnection;
use x11rb::x11_utils::TryParse;

mod error;
pub use error::BackendError;

use crate::atom::Atom;
use crate::geometry::{Point, Rect};
use crate::x::event::{ClientMessageData, ClientMessageEvent, ConfigureMask, ConfigureRequestEvent, Sequence, XEvent};
use crate::x::property::{Prop, WindowAttributes, WmHints, WmNormalHints};
use crate::x::{ConfigureWindow, PollOutcome, ReplyKind, ReplyPayload, XConn};
use crate::{Error, Result, Xid};

/// A live connection to an X server, driving every [`XConn`] request over
/// x11rb's `RustConnection`.
pub struct X11rbConn {
    conn: RustConnection,
    root: Window,
    black_pixel: u32,
    atoms: HashMap<Atom, u32>,
}

impl X11rbConn {
    /// Connect to the X server named by `$DISPLAY` and intern every known
    /// atom eagerly (§4.G).
    pub fn connect() -> Result<Self> {
        let (conn, screen_num) = x11rb::connect(None).map_err(BackendError::from)?;
        let screen = conn.setup().roots[screen_num].clone();
        let root = screen.root;

        conn.prefetch_extension_information(randr::X11_EXTENSION_NAME)
            .map_err(BackendError::from)?;

        let cookies: Vec<(Atom, _)> = Atom::iter()
            .map(|atom| {
                let cookie = conn
                    .intern_atom(false, atom.as_ref().as_bytes())
                    .map_err(BackendError::from)?;
                Ok::<_, Error>((atom, cookie))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut atoms = HashMap::with_capacity(cookies.len());
        for (atom, cookie) in cookies {
            let reply = cookie.reply().map_err(BackendError::from)?;
            atoms.insert(atom, reply.atom);
        }

        if conn
            .extension_information(randr::X11_EXTENSION_NAME)
            .map_err(BackendError::from)?
            .is_none()
        {
            return Err(BackendError::MissingRandRSupport.into());
        }
        let mask = randr::NotifyMask::OUTPUT_CHANGE
            | randr::NotifyMask::CRTC_CHANGE
            | randr::NotifyMask::SCREEN_CHANGE;
        conn.randr_select_input(root, mask).map_err(BackendError::from)?;

        conn.flush().map_err(BackendError::from)?;

        Ok(Self {
            conn,
            root,
            black_pixel: screen.black_pixel,
            atoms,
        })
    }

    fn known_atom(&self, atom: Atom) -> u32 {
        *self
            .atoms
            .get(&atom)
            .expect("every Atom variant is interned by X11rbConn::connect")
    }

    fn atom_name(&self, atom_id: u32) -> Option<String> {
        self.conn
            .get_atom_name(atom_id)
            .ok()?
            .reply()
            .ok()
            .and_then(|r| String::from_utf8(r.name).ok())
    }

    fn decode_property(&self, atom: Atom, reply: &xproto::GetPropertyReply) -> Option<Prop> {
        match atom {
            Atom::WmClass | Atom::WmName | Atom::NetWmName | Atom::NetWmVisibleName => {
                let bytes: Vec<u8> = reply.value8()?.collect();
                let s = String::from_utf8_lossy(&bytes).into_owned();
                Some(Prop::UTF8String(s.split('\0').map(str::to_owned).filter(|p| !p.is_empty()).collect()))
            }
            Atom::WmHints => {
                let words: Vec<u32> = reply.value32()?.collect();
                WmHints::try_from_bytes(&words).map(Prop::WmHints)
            }
            Atom::WmNormalHints => {
                let words: Vec<u32> = reply.value32()?.collect();
                WmNormalHints::try_from_bytes(&words).map(Prop::WmNormalHints)
            }
            Atom::WmTransientFor => {
                let words: Vec<u32> = reply.value32()?.collect();
                Some(Prop::Window(words.into_iter().map(Xid).collect()))
            }
            Atom::NetWmState | Atom::NetWmWindowType => {
                let words: Vec<u32> = reply.value32()?.collect();
                let names = words.into_iter().filter_map(|a| self.atom_name(a)).collect();
                Some(Prop::Atom(names))
            }
            Atom::NetWmStrutPartial => {
                let words: Vec<u32> = reply.value32()?.collect();
                if words.len() == 12 {
                    let mut arr = [0u32; 12];
                    arr.copy_from_slice(&words);
                    Some(Prop::StrutPartial(arr))
                } else {
                    None
                }
            }
            Atom::NetWmPid | Atom::GtkFrameExtents | Atom::NetWmIcon => {
                Some(Prop::Cardinal(reply.value32()?.collect()))
            }
            _ => None,
        }
    }
}

impl XConn for X11rbConn {
    fn root(&self) -> Xid {
        Xid(self.root)
    }

    fn as_raw_fd(&self) -> i32 {
        self.conn.as_raw_fd()
    }

    fn poll_for_event(&self) -> Option<XEvent> {
        loop {
            let event = match self.conn.poll_for_event() {
                Ok(Some(event)) => event,
                Ok(None) | Err(_) => return None,
            };
            if let Some(translated) = self.translate_event(event) {
                return Some(translated);
            }
            // Events we don't model (FocusIn, EnterNotify, MappingNotify, ...)
            // are dropped and we keep polling for the next one.
        }
    }

    fn flush(&self) {
        let _ = self.conn.flush();
    }

    fn atom_xid(&self, atom: Atom) -> Xid {
        Xid(self.known_atom(atom))
    }

    fn send_get_geometry(&self, window: Xid) -> Sequence {
        match self.conn.get_geometry(window.0) {
            Ok(cookie) => forget_and_sequence(cookie),
            Err(_) => 0,
        }
    }

    fn send_get_window_attributes(&self, window: Xid) -> Sequence {
        match self.conn.get_window_attributes(window.0) {
            Ok(cookie) => forget_and_sequence(cookie),
            Err(_) => 0,
        }
    }

    fn send_get_property(&self, window: Xid, atom: Atom) -> Sequence {
        match self
            .conn
            .get_property(false, window.0, self.known_atom(atom), AtomEnum::ANY, 0, 1024)
        {
            Ok(cookie) => forget_and_sequence(cookie),
            Err(_) => 0,
        }
    }

    fn send_translate_coordinates(&self, window: Xid) -> Sequence {
        match self.conn.translate_coordinates(window.0, self.root, 0, 0) {
            Ok(cookie) => forget_and_sequence(cookie),
            Err(_) => 0,
        }
    }

    fn send_query_tree(&self, window: Xid) -> Sequence {
        match self.conn.query_tree(window.0) {
            Ok(cookie) => forget_and_sequence(cookie),
            Err(_) => 0,
        }
    }

    fn poll_for_reply(&self, kind: ReplyKind, sequence: Sequence) -> PollOutcome {
        let buf = match x11rb::connection::Connection::poll_for_reply(&self.conn, sequence as u64) {
            Ok(Some(buf)) => buf,
            Ok(None) => return PollOutcome::Pending,
            Err(_) => return PollOutcome::Error,
        };

        match kind {
            ReplyKind::GetGeometry => match xproto::GetGeometryReply::try_parse(&buf) {
                Ok((reply, _)) => PollOutcome::Reply(ReplyPayload::Geometry(Rect::new(
                    reply.x as i32,
                    reply.y as i32,
                    reply.width as u32,
                    reply.height as u32,
                ))),
                Err(_) => PollOutcome::Error,
            },
            ReplyKind::GetWindowAttributes => match xproto::GetWindowAttributesReply::try_parse(&buf) {
                Ok((reply, _)) => PollOutcome::Reply(ReplyPayload::WindowAttributes(WindowAttributes {
                    override_redirect: reply.override_redirect,
                    mapped: reply.map_state == xproto::MapState::VIEWABLE,
                })),
                Err(_) => PollOutcome::Error,
            },
            ReplyKind::GetProperty(atom) => match xproto::GetPropertyReply::try_parse(&buf) {
                Ok((reply, _)) => {
                    if reply.value_len == 0 {
                        PollOutcome::Reply(ReplyPayload::Property(None))
                    } else {
                        PollOutcome::Reply(ReplyPayload::Property(self.decode_property(atom, &reply)))
                    }
                }
                Err(_) => PollOutcome::Error,
            },
            ReplyKind::TranslateCoordinates => match xproto::TranslateCoordinatesReply::try_parse(&buf) {
                Ok((reply, _)) => PollOutcome::Reply(ReplyPayload::TranslatedPoint(Point::new(
                    reply.dst_x as i32,
                    reply.dst_y as i32,
                ))),
                Err(_) => PollOutcome::Error,
            },
            ReplyKind::QueryTree => match xproto::QueryTreeReply::try_parse(&buf) {
                Ok((reply, _)) => {
                    PollOutcome::Reply(ReplyPayload::Tree(reply.children.into_iter().map(Xid).collect()))
                }
                Err(_) => PollOutcome::Error,
            },
        }
    }

    fn create_frame(&self, _for_client: Xid, depth: u8, visual: u32, r: Rect) -> Result<Xid> {
        let frame = self.conn.generate_id().map_err(BackendError::from)?;
        let aux = CreateWindowAux::new()
            .background_pixel(self.black_pixel)
            .event_mask(EventMask::SUBSTRUCTURE_REDIRECT | EventMask::SUBSTRUCTURE_NOTIFY);
        self.conn
            .create_window(
                depth,
                frame,
                self.root,
                r.x as i16,
                r.y as i16,
                r.w as u16,
                r.h as u16,
                0,
                WindowClass::INPUT_OUTPUT,
                visual,
                &aux,
            )
            .map_err(BackendError::from)?;
        Ok(Xid(frame))
    }

    fn reparent_window(&self, window: Xid, new_parent: Xid, x: i32, y: i32) -> Result<()> {
        self.conn
            .reparent_window(window.0, new_parent.0, x as i16, y as i16)
            .map_err(BackendError::from)?;
        Ok(())
    }

    fn map_window(&self, window: Xid) -> Result<()> {
        self.conn.map_window(window.0).map_err(BackendError::from)?;
        Ok(())
    }

    fn unmap_window(&self, window: Xid) -> Result<()> {
        self.conn.unmap_window(window.0).map_err(BackendError::from)?;
        Ok(())
    }

    fn destroy_window(&self, window: Xid) -> Result<()> {
        self.conn.destroy_window(window.0).map_err(BackendError::from)?;
        Ok(())
    }

    fn configure_window(&self, window: Xid, cfg: ConfigureWindow) -> Result<()> {
        let mut aux = ConfigureWindowAux::new()
            .x(cfg.r.x)
            .y(cfg.r.y)
            .width(cfg.r.w)
            .height(cfg.r.h);
        if let Some(border) = cfg.border_px {
            aux = aux.border_width(border);
        }
        if let Some(sibling) = cfg.stack_above {
            aux = aux.sibling(sibling.0).stack_mode(StackMode::ABOVE);
        }
        self.conn.configure_window(window.0, &aux).map_err(BackendError::from)?;
        Ok(())
    }

    fn select_substructure_events(&self, window: Xid) -> Result<()> {
        let aux = ChangeWindowAttributesAux::new()
            .event_mask(EventMask::SUBSTRUCTURE_NOTIFY | EventMask::SUBSTRUCTURE_REDIRECT | EventMask::PROPERTY_CHANGE);
        self.conn
            .change_window_attributes(window.0, &aux)
            .map_err(BackendError::from)?;
        Ok(())
    }

    fn change_property_atoms(&self, window: Xid, prop: Atom, values: &[Atom]) -> Result<()> {
        let data: Vec<u32> = values.iter().map(|a| self.known_atom(*a)).collect();
        self.conn
            .change_property32(PropMode::REPLACE, window.0, self.known_atom(prop), AtomEnum::ATOM, &data)
            .map_err(BackendError::from)?;
        Ok(())
    }

    fn change_property_cardinals(&self, window: Xid, prop: Atom, values: &[u32]) -> Result<()> {
        self.conn
            .change_property32(PropMode::REPLACE, window.0, self.known_atom(prop), AtomEnum::CARDINAL, values)
            .map_err(BackendError::from)?;
        Ok(())
    }

    fn change_property_string(&self, window: Xid, prop: Atom, value: &str) -> Result<()> {
        self.conn
            .change_property8(
                PropMode::REPLACE,
                window.0,
                self.known_atom(prop),
                self.known_atom(Atom::Utf8String),
                value.as_bytes(),
            )
            .map_err(BackendError::from)?;
        Ok(())
    }

    fn change_property_strings(&self, window: Xid, prop: Atom, values: &[String]) -> Result<()> {
        let mut buf = Vec::new();
        for value in values {
            buf.extend_from_slice(value.as_bytes());
            buf.push(0);
        }
        self.conn
            .change_property8(
                PropMode::REPLACE,
                window.0,
                self.known_atom(prop),
                self.known_atom(Atom::Utf8String),
                &buf,
            )
            .map_err(BackendError::from)?;
        Ok(())
    }

    fn change_property_window(&self, window: Xid, prop: Atom, value: Xid) -> Result<()> {
        self.conn
            .change_property32(PropMode::REPLACE, window.0, self.known_atom(prop), AtomEnum::WINDOW, &[value.0])
            .map_err(BackendError::from)?;
        Ok(())
    }

    fn change_property_window_list(&self, window: Xid, prop: Atom, values: &[Xid]) -> Result<()> {
        let data: Vec<u32> = values.iter().map(|x| x.0).collect();
        self.conn
            .change_property32(PropMode::REPLACE, window.0, self.known_atom(prop), AtomEnum::WINDOW, &data)
            .map_err(BackendError::from)?;
        Ok(())
    }

    fn delete_property(&self, window: Xid, prop: Atom) -> Result<()> {
        self.conn
            .delete_property(window.0, self.known_atom(prop))
            .map_err(BackendError::from)?;
        Ok(())
    }

    fn get_selection_owner(&self, selection: Atom) -> Result<Option<Xid>> {
        let reply = self
            .conn
            .get_selection_owner(self.known_atom(selection))
            .map_err(BackendError::from)?
            .reply()
            .map_err(BackendError::from)?;
        Ok(if reply.owner == 0 { None } else { Some(Xid(reply.owner)) })
    }

    fn set_selection_owner(&self, selection: Atom, owner: Xid) -> Result<()> {
        self.conn
            .set_selection_owner(owner.0, self.known_atom(selection), x11rb::CURRENT_TIME)
            .map_err(BackendError::from)?;
        Ok(())
    }

    fn grab_substructure_redirect(&self) -> Result<()> {
        let aux = ChangeWindowAttributesAux::new()
            .event_mask(EventMask::SUBSTRUCTURE_REDIRECT | EventMask::SUBSTRUCTURE_NOTIFY);
        self.conn
            .change_window_attributes(self.root, &aux)
            .map_err(BackendError::from)?
            .check()
            .map_err(|_| Error::SubstructureRedirectDenied)?;
        Ok(())
    }
}

impl X11rbConn {
    fn translate_event(&self, event: Event) -> Option<XEvent> {
        match event {
            Event::Expose(e) => Some(XEvent::Expose {
                window: Xid(e.window),
                region: Rect::new(e.x as i32, e.y as i32, e.width as u32, e.height as u32),
            }),
            Event::MotionNotify(e) => Some(XEvent::MotionNotify {
                window: Xid(e.event),
                root_x: e.root_x as i32,
                root_y: e.root_y as i32,
            }),
            Event::ConfigureRequest(e) => {
                let vm = u16::from(e.value_mask);
                let mut mask = ConfigureMask::empty();
                if vm & 1 != 0 {
                    mask |= ConfigureMask::X;
                }
                if vm & 2 != 0 {
                    mask |= ConfigureMask::Y;
                }
                if vm & 4 != 0 {
                    mask |= ConfigureMask::WIDTH;
                }
                if vm & 8 != 0 {
                    mask |= ConfigureMask::HEIGHT;
                }
                if vm & 16 != 0 {
                    mask |= ConfigureMask::BORDER;
                }
                if vm & 32 != 0 {
                    mask |= ConfigureMask::SIBLING;
                }
                if vm & 64 != 0 {
                    mask |= ConfigureMask::STACK_MODE;
                }

                Some(XEvent::ConfigureRequest(ConfigureRequestEvent {
                    window: Xid(e.window),
                    mask,
                    r: Rect::new(e.x as i32, e.y as i32, e.width as u32, e.height as u32),
                }))
            }
            Event::ConfigureNotify(e) => Some(XEvent::ConfigureNotify {
                window: Xid(e.window),
                r: Rect::new(e.x as i32, e.y as i32, e.width as u32, e.height as u32),
                is_root: e.window == self.root,
            }),
            Event::PropertyNotify(e) => Some(XEvent::PropertyNotify {
                window: Xid(e.window),
                atom: Xid(e.atom),
            }),
            Event::DestroyNotify(e) => Some(XEvent::DestroyNotify { window: Xid(e.window) }),
            Event::UnmapNotify(e) => Some(XEvent::UnmapNotify { window: Xid(e.window) }),
            Event::MapRequest(e) => Some(XEvent::MapRequest { window: Xid(e.window) }),
            Event::KeyPress(e) => Some(XEvent::KeyPress {
                window: Xid(e.event),
                code: e.detail,
                state: u16::from(e.state),
            }),
            Event::ButtonPress(e) => Some(XEvent::ButtonPress {
                window: Xid(e.event),
                button: e.detail,
                state: u16::from(e.state),
            }),
            Event::ButtonRelease(e) => Some(XEvent::ButtonRelease {
                window: Xid(e.event),
                button: e.detail,
                state: u16::from(e.state),
            }),
            Event::ClientMessage(e) => {
                let data = match e.format {
                    8 => e.data.as_data8().iter().map(|&b| b as i64).collect(),
                    16 => e.data.as_data16().iter().map(|&w| w as i64).collect(),
                    32 => e.data.as_data32().iter().map(|&d| d as i64).collect(),
                    _ => Vec::new(),
                };
                Some(XEvent::ClientMessage(ClientMessageEvent {
                    window: Xid(e.window),
                    message_type: Xid(e.type_),
                    data: ClientMessageData(data),
                }))
            }
            Event::RandrScreenChangeNotify(e) => Some(XEvent::RandrScreenChange {
                width: e.width as u32,
                height: e.height as u32,
            }),
            Event::ReparentNotify(e) => Some(XEvent::ReparentNotify {
                window: Xid(e.window),
                parent: Xid(e.parent),
            }),
            _ => None,
        }
    }
}

/// Stop tracking `cookie` for automatic discard-on-drop: the reply stays
/// buffered against its sequence number for [`XConn::poll_for_reply`] to
/// retrieve later, instead of being read (and freed) right away.
fn forget_and_sequence<C, R>(cookie: Cookie<'_, C, R>) -> Sequence
where
    C: x11rb::connection::RequestConnection,
{
    let seq = cookie.sequence_number() as u32;
    cookie.forget();
    seq
}
