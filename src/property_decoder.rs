//! `(client, atom, reply|error) → state delta` (§4.F).
//!
//! Every function here takes `&mut ClientRecord` and a decoded reply and
//! mutates in place; none of them touch the slotmap, the window maps, or
//! issue X requests themselves. `resolve_window` is the one injected seam
//! (window xid → handle) needed to decode `WM_TRANSIENT_FOR`, since that
//! lookup lives in [`crate::lifecycle::ClientLifecycle`], not here.
use std::str::FromStr;

use tracing::trace;

use crate::atom::{Atom, KNOWN_WINDOW_TYPES};
use crate::client::{ClientFlags, ClientRecord, DirtyFlags, WindowType};
use crate::config::WmConfig;
use crate::geometry::{Rect, Strut};
use crate::handle::Handle;
use crate::x::property::Prop;
use crate::x::{PollOutcome, ReplyKind, ReplyPayload};
use crate::Xid;

/// Apply one resolved cookie-jar reply (or error) to the client it belongs
/// to. Called once per [`crate::cookie_jar::DrainedReply`] before the
/// lifecycle is told the reply resolved (so `pending_replies` bookkeeping
/// stays in the lifecycle, state mutation stays here).
pub fn apply_reply(
    record: &mut ClientRecord,
    kind: ReplyKind,
    outcome: &PollOutcome,
    config: &WmConfig,
    resolve_window: impl Fn(Xid) -> Option<Handle>,
) {
    let payload = match outcome {
        PollOutcome::Reply(payload) => payload,
        PollOutcome::Error | PollOutcome::Pending => {
            trace!(?kind, "reply error or still pending, leaving prior state");
            return;
        }
    };

    match (kind, payload) {
        (ReplyKind::GetGeometry, ReplyPayload::Geometry(r)) => apply_geometry(record, *r, config),
        (ReplyKind::GetWindowAttributes, ReplyPayload::WindowAttributes(attrs)) => {
            record.hot.type_from_net = record.hot.type_from_net && !attrs.override_redirect;
        }
        (ReplyKind::GetProperty(atom), ReplyPayload::Property(prop)) => {
            apply_property(record, atom, prop.as_ref(), resolve_window);
        }
        _ => {}
    }
}

fn apply_geometry(record: &mut ClientRecord, r: Rect, config: &WmConfig) {
    let (w, h) = if config.tiny_geometry_rescue.needs_rescue(r.w, r.h) {
        config.tiny_geometry_rescue.rescued()
    } else {
        (r.w, r.h)
    };
    record.hot.desired = Rect { w, h, ..r };
    record.hot.dirty |= DirtyFlags::GEOM;
}

fn apply_property(
    record: &mut ClientRecord,
    atom: Atom,
    prop: Option<&Prop>,
    resolve_window: impl Fn(Xid) -> Option<Handle>,
) {
    match atom {
        Atom::WmClass => {
            if let Some(Prop::UTF8String(strings)) = prop {
                let instance = strings.first().cloned().unwrap_or_default();
                let class = strings.get(1).cloned().unwrap_or_default();
                if record.cold.set_wm_class(instance, class) {
                    record.hot.dirty |= DirtyFlags::TITLE;
                }
            }
        }
        Atom::WmName => {
            if !record.cold.has_net_wm_name {
                if let Some(Prop::UTF8String(strings)) = prop {
                    if let Some(title) = strings.first() {
                        if record.cold.set_base_title(title.clone()) {
                            record.hot.dirty |= DirtyFlags::TITLE;
                        }
                    }
                }
            }
        }
        Atom::NetWmName => {
            if let Some(Prop::UTF8String(strings)) = prop {
                if let Some(title) = strings.first() {
                    record.cold.has_net_wm_name = true;
                    if record.cold.set_base_title(title.clone()) {
                        record.hot.dirty |= DirtyFlags::TITLE;
                    }
                }
            }
        }
        Atom::WmHints => {
            if let Some(Prop::WmHints(hints)) = prop {
                record.hot.flags.set(ClientFlags::DEMANDS_ATTENTION, hints.urgent);
                record.hot.dirty |= DirtyFlags::STATE;
            }
        }
        Atom::WmNormalHints => {
            if let Some(Prop::WmNormalHints(hints)) = prop {
                record.cold.size_hints.min_w = hints.min_w;
                record.cold.size_hints.min_h = hints.min_h;
                record.cold.size_hints.max_w = hints.max_w;
                record.cold.size_hints.max_h = hints.max_h;
                record.cold.size_hints.base_w = hints.base_w;
                record.cold.size_hints.base_h = hints.base_h;
            }
        }
        Atom::WmTransientFor => {
            if let Some(Prop::Window(windows)) = prop {
                if let Some(&xid) = windows.first() {
                    if let Some(handle) = resolve_window(xid) {
                        record.hot.transient_for = handle;
                    }
                }
            }
        }
        Atom::NetWmState => {
            if let Some(Prop::Atom(names)) = prop {
                record.hot.flags |= parse_net_wm_state(names);
                record.hot.dirty |= DirtyFlags::STATE;
            }
        }
        Atom::NetWmWindowType => {
            if let Some(Prop::Atom(names)) = prop {
                if let Some(known) = names
                    .iter()
                    .filter_map(|n| Atom::from_str(n).ok())
                    .find(|a| KNOWN_WINDOW_TYPES.contains(a))
                {
                    record.hot.window_type = window_type_from_atom(*known);
                    record.hot.type_from_net = true;
                }
            }
        }
        Atom::NetWmStrutPartial => {
            if let Some(Prop::StrutPartial(values)) = prop {
                apply_strut_partial(record, values);
            }
        }
        Atom::NetWmPid => {
            if let Some(Prop::Cardinal(values)) = prop {
                record.cold.pid = values.first().copied();
            }
        }
        Atom::GtkFrameExtents => match prop {
            Some(Prop::Cardinal(values)) if values.len() == 4 => {
                record.hot.gtk_frame_extents_set = true;
                record.hot.frame_extents = crate::client::FrameExtents {
                    left: values[0],
                    right: values[1],
                    top: values[2],
                    bottom: values[3],
                };
                record.hot.dirty |= DirtyFlags::GEOM | DirtyFlags::FRAME_EXTENTS;
            }
            _ => {
                if record.hot.gtk_frame_extents_set {
                    record.hot.gtk_frame_extents_set = false;
                    record.hot.frame_extents = Default::default();
                    record.hot.dirty |= DirtyFlags::GEOM;
                }
            }
        },
        Atom::NetWmIcon => {
            if let Some(Prop::Cardinal(values)) = prop {
                record.cold.icon = values.clone();
                record.hot.dirty |= DirtyFlags::ICON;
            }
        }
        // WM_PROTOCOLS, _NET_WM_USER_TIME: fetched in Phase 1 but not
        // modelled beyond acknowledging the reply arrived.
        Atom::WmProtocols | Atom::NetWmUserTime => {}
        _ => {}
    }
}

fn window_type_from_atom(atom: Atom) -> WindowType {
    match atom {
        Atom::NetWmWindowTypeDesktop => WindowType::Desktop,
        Atom::NetWmWindowTypeDock => WindowType::Dock,
        Atom::NetWmWindowTypeToolbar => WindowType::Toolbar,
        Atom::NetWmWindowTypeMenu => WindowType::Menu,
        Atom::NetWmWindowTypeUtility => WindowType::Utility,
        Atom::NetWmWindowTypeSplash => WindowType::Splash,
        Atom::NetWmWindowTypeDialog => WindowType::Dialog,
        _ => WindowType::Normal,
    }
}

fn net_wm_state_flag(atom: Atom) -> Option<ClientFlags> {
    match atom {
        Atom::NetWmStateModal => Some(ClientFlags::MODAL),
        Atom::NetWmStateSticky => Some(ClientFlags::STICKY),
        Atom::NetWmStateMaximizedVert => Some(ClientFlags::MAXIMIZED_V),
        Atom::NetWmStateMaximizedHorz => Some(ClientFlags::MAXIMIZED_H),
        Atom::NetWmStateFullscreen => Some(ClientFlags::FULLSCREEN),
        Atom::NetWmStateDemandsAttention => Some(ClientFlags::DEMANDS_ATTENTION),
        _ => None,
    }
}

fn parse_net_wm_state(names: &[String]) -> ClientFlags {
    names
        .iter()
        .filter_map(|n| Atom::from_str(n).ok())
        .filter_map(net_wm_state_flag)
        .fold(ClientFlags::empty(), |acc, f| acc | f)
}

/// `_NET_WM_STATE` via `ClientMessage`: `action` is 0 (remove), 1 (add), or
/// 2 (toggle); `atoms` holds the one or two target state atoms. Idempotent
/// across repeated sequences because it only ever sets/clears bits (§4.F,
/// §8 invariant 5).
pub fn apply_net_wm_state_message(record: &mut ClientRecord, action: u32, atoms: [Option<Atom>; 2]) {
    for atom in atoms.into_iter().flatten() {
        let Some(flag) = net_wm_state_flag(atom) else { continue };
        match action {
            0 => record.hot.flags.remove(flag),
            1 => record.hot.flags.insert(flag),
            2 => record.hot.flags.toggle(flag),
            _ => {}
        }
    }
    record.hot.dirty |= DirtyFlags::STATE;
}

/// `_NET_WM_STRUT_PARTIAL`: 12 CARDINALs, `[left, right, top, bottom,
/// left_y1, left_y2, right_y1, right_y2, top_x1, top_x2, bottom_x1,
/// bottom_x2]`. Any `start > end` pair rejects the whole record (§4.F).
fn apply_strut_partial(record: &mut ClientRecord, values: &[u32; 12]) {
    let pairs = [(4, 5), (6, 7), (8, 9), (10, 11)];
    if pairs.iter().any(|&(s, e)| values[s] > values[e]) {
        record.cold.strut = None;
        return;
    }

    record.cold.strut = Some(Strut {
        left: values[0],
        right: values[1],
        top: values[2],
        bottom: values[3],
    });
}
