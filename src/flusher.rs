//! Converts accumulated per-client dirty bits into the minimal set of X
//! requests needed to reconcile server state with the logical model (§4.E).
use tracing::trace;

use crate::atom::Atom;
use crate::client::{ClientRecord, DirtyFlags, Layer};
use crate::config::WmConfig;
use crate::geometry::Rect;
use crate::x::{ConfigureWindow, XConn};

/// Compute `(frame_rect, client_rect)` from a client's logical `desired`
/// geometry, honouring GTK client-side-decoration insets when present
/// (§4.D: "Configure request semantics").
pub fn compute_frame_and_client_rect(record: &ClientRecord, config: &WmConfig) -> (Rect, Rect) {
    let desired = record.hot.desired;

    if record.hot.gtk_frame_extents_set {
        let e = record.hot.frame_extents;
        let frame = Rect::new(desired.x - e.left as i32, desired.y - e.top as i32, desired.w, desired.h);
        let client = Rect::new(0, 0, desired.w, desired.h);
        (frame, client)
    } else {
        let border = config.decoration.border_px;
        let title = config.decoration.title_height_px;
        let frame = desired.inflated(border, border, title + border, border);
        let client = Rect::new(border as i32, (title + border) as i32, desired.w, desired.h);
        (frame, client)
    }
}

/// Flush one client's dirty bits, emitting the matching X requests and
/// clearing every bit handled (§4.E). Returns whether anything was sent, so
/// the scheduler can decide whether to touch `_NET_FRAME_EXTENTS` etc. A
/// client with `dirty.is_empty()` is skipped entirely — this is what keeps a
/// repeated flush with no new dispatch a no-op (§8 invariant 4).
pub fn flush_client<X: XConn>(x: &X, record: &mut ClientRecord, config: &WmConfig) {
    if record.hot.dirty.is_empty() {
        return;
    }

    if record.hot.dirty.contains(DirtyFlags::GEOM) {
        flush_geom(x, record, config);
    }
    if record.hot.dirty.contains(DirtyFlags::STATE) {
        flush_state(x, record);
    }
    if record.hot.dirty.contains(DirtyFlags::TITLE) {
        flush_title(x, record);
    }
    if record.hot.dirty.intersects(DirtyFlags::GEOM | DirtyFlags::FRAME_EXTENTS) {
        flush_frame_extents(x, record);
    }

    record.hot.dirty = DirtyFlags::empty();
}

fn flush_geom<X: XConn>(x: &X, record: &mut ClientRecord, config: &WmConfig) {
    let (frame_rect, client_rect) = compute_frame_and_client_rect(record, config);

    let _ = x.configure_window(
        record.hot.frame,
        ConfigureWindow {
            r: frame_rect,
            border_px: None,
            stack_above: None,
        },
    );
    let _ = x.configure_window(
        record.hot.xid,
        ConfigureWindow {
            r: client_rect,
            border_px: None,
            stack_above: None,
        },
    );

    // `server` tracks the frame's screen position with the client's content
    // size, matching the split the geometry-query answering path expects.
    record.hot.server = Rect::new(frame_rect.x, frame_rect.y, client_rect.w, client_rect.h);
}

fn flush_state<X: XConn>(x: &X, record: &ClientRecord) {
    use crate::client::ClientFlags;
    let pairs = [
        (ClientFlags::MODAL, Atom::NetWmStateModal),
        (ClientFlags::STICKY, Atom::NetWmStateSticky),
        (ClientFlags::MAXIMIZED_V, Atom::NetWmStateMaximizedVert),
        (ClientFlags::MAXIMIZED_H, Atom::NetWmStateMaximizedHorz),
        (ClientFlags::FULLSCREEN, Atom::NetWmStateFullscreen),
        (ClientFlags::DEMANDS_ATTENTION, Atom::NetWmStateDemandsAttention),
    ];

    let atoms: Vec<Atom> = pairs
        .into_iter()
        .filter(|(flag, _)| record.hot.flags.contains(*flag))
        .map(|(_, atom)| atom)
        .collect();

    let _ = x.change_property_atoms(record.hot.xid, Atom::NetWmState, &atoms);
    let _ = x.change_property_atoms(record.hot.xid, Atom::NetWmAllowedActions, crate::atom::NET_WM_ALLOWED_ACTIONS);
}

fn flush_title<X: XConn>(x: &X, record: &ClientRecord) {
    let _ = x.change_property_string(record.hot.xid, Atom::NetWmVisibleName, &record.cold.base_title);
}

fn flush_frame_extents<X: XConn>(x: &X, record: &ClientRecord) {
    let e = if record.hot.gtk_frame_extents_set {
        record.hot.frame_extents
    } else {
        crate::client::FrameExtents {
            left: 0,
            right: 0,
            top: 0,
            bottom: 0,
        }
    };

    let _ = x.change_property_cardinals(
        record.hot.xid,
        Atom::NetFrameExtents,
        &[e.left, e.right, e.top, e.bottom],
    );
}

/// Restack: within each client's layer first (by `stacking_index`), then the
/// layers themselves bottom to top in the fixed EWMH order (§4.E). Takes the
/// full live set since stacking is inherently a cross-client operation,
/// unlike the rest of the flush which is per-client.
pub fn restack<X: XConn>(x: &X, clients: &mut [&mut ClientRecord]) {
    clients.sort_by_key(|c| (layer_rank(c.hot.layer), c.hot.stacking_index));

    let mut above: Option<crate::Xid> = None;
    for client in clients.iter() {
        let _ = x.configure_window(
            client.hot.frame,
            ConfigureWindow {
                r: client.hot.server,
                border_px: None,
                stack_above: above,
            },
        );
        above = Some(client.hot.frame);
    }
    trace!(n = clients.len(), "restacked");
}

fn layer_rank(layer: Layer) -> u8 {
    Layer::ALL.iter().position(|&l| l == layer).unwrap_or(0) as u8
}

/// Decode a `_NET_WM_STATE` `ClientMessage`'s `data[]` into `(action, atoms)`,
/// resolving the two target-atom xids through `resolve`. Used by the
/// scheduler to route a `ClientMessage` bucket entry into
/// [`crate::property_decoder::apply_net_wm_state_message`].
pub fn decode_net_wm_state_message(
    data: &crate::x::event::ClientMessageData,
    resolve: impl Fn(crate::Xid) -> Option<Atom>,
) -> (u32, [Option<Atom>; 2]) {
    let action = data.get(0) as u32;
    let a1 = resolve(crate::Xid(data.get(1) as u32));
    let a2 = resolve(crate::Xid(data.get(2) as u32));
    (action, [a1, a2])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::FrameExtents;
    use crate::handle::Handle;
    use crate::x::mock::{MockXConn, Recorded};
    use crate::Xid;

    fn client_with(desired: Rect, extents: FrameExtents) -> ClientRecord {
        let mut r = ClientRecord::new(Xid(100), Handle::INVALID);
        r.hot.frame = Xid(200);
        r.hot.desired = desired;
        r.hot.gtk_frame_extents_set = true;
        r.hot.frame_extents = extents;
        r.hot.dirty = DirtyFlags::GEOM;
        r
    }

    #[test]
    fn gtk_extents_flush_emits_frame_then_client_configure() {
        let x = MockXConn::new();
        let config = WmConfig::default();
        let mut record = client_with(
            Rect::new(50, 50, 400, 300),
            FrameExtents { left: 10, right: 10, top: 20, bottom: 20 },
        );

        flush_client(&x, &mut record, &config);

        let log = x.log();
        let configures: Vec<_> = log
            .iter()
            .filter_map(|r| match r {
                Recorded::ConfigureWindow { window, cfg } => Some((*window, cfg.r)),
                _ => None,
            })
            .collect();

        assert_eq!(configures[0], (Xid(200), Rect::new(40, 30, 400, 300)));
        assert_eq!(configures[1], (Xid(100), Rect::new(0, 0, 400, 300)));
    }

    #[test]
    fn second_flush_with_no_new_dirty_bits_emits_nothing() {
        let x = MockXConn::new();
        let config = WmConfig::default();
        let mut record = client_with(
            Rect::new(50, 50, 400, 300),
            FrameExtents { left: 10, right: 10, top: 20, bottom: 20 },
        );

        flush_client(&x, &mut record, &config);
        x.clear_log();
        flush_client(&x, &mut record, &config);

        assert!(x.log().is_empty());
    }

    #[test]
    fn non_csd_client_gets_border_and_titlebar_inflated_frame() {
        let x = MockXConn::new();
        let config = WmConfig::default();
        let mut record = ClientRecord::new(Xid(100), Handle::INVALID);
        record.hot.frame = Xid(200);
        record.hot.desired = Rect::new(0, 0, 400, 300);
        record.hot.dirty = DirtyFlags::GEOM;

        flush_client(&x, &mut record, &config);

        let log = x.log();
        let frame_cfg = log
            .iter()
            .find_map(|r| match r {
                Recorded::ConfigureWindow { window, cfg } if *window == Xid(200) => Some(cfg.r),
                _ => None,
            })
            .unwrap();
        // border 1px, title 20px: width/height inflated by 2 and 22 respectively.
        assert_eq!(frame_cfg, Rect::new(0, 0, 402, 322));
    }

    #[quickcheck_macros::quickcheck]
    fn a_flush_with_no_new_dirty_bits_is_always_a_no_op(
        x: i16,
        y: i16,
        w: u16,
        h: u16,
        gtk: bool,
        left: u8,
        right: u8,
        top: u8,
        bottom: u8,
    ) -> bool {
        let conn = MockXConn::new();
        let config = WmConfig::default();
        let mut record = ClientRecord::new(Xid(100), Handle::INVALID);
        record.hot.frame = Xid(200);
        record.hot.desired = Rect::new(x as i32, y as i32, w as u32, h as u32);
        record.hot.gtk_frame_extents_set = gtk;
        record.hot.frame_extents = FrameExtents {
            left: left as u32,
            right: right as u32,
            top: top as u32,
            bottom: bottom as u32,
        };
        record.hot.dirty = DirtyFlags::GEOM;

        flush_client(&conn, &mut record, &config);
        conn.clear_log();
        flush_client(&conn, &mut record, &config);

        conn.log().is_empty()
    }
}
