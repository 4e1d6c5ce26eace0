//! Publishes root-window EWMH properties from `root_dirty` bits (§4.H).
use crate::atom::Atom;
use crate::client::RootDirty;
use crate::config::WmConfig;
use crate::geometry::Rect;
use crate::lifecycle::ClientLifecycle;
use crate::x::XConn;
use crate::Xid;

/// Publish every root property named by `dirty`, then return. Callers clear
/// `dirty` themselves (it lives on [`ClientLifecycle`], which owns the only
/// things that can mark it).
pub fn publish<X: XConn>(
    x: &X,
    lifecycle: &ClientLifecycle,
    config: &WmConfig,
    screen: Rect,
    dirty: RootDirty,
) {
    let root = x.root();

    if dirty.contains(RootDirty::CLIENT_LIST) {
        let map_order: Vec<Xid> = lifecycle
            .map_order()
            .iter()
            .filter_map(|&h| lifecycle.get(h).map(|r| r.hot.xid))
            .collect();
        let _ = x.change_property_window_list(root, Atom::NetClientList, &map_order);

        let mut stacking = map_order.clone();
        stacking.sort_by_key(|&xid| {
            lifecycle
                .handle_for_xid(xid)
                .and_then(|h| lifecycle.get(h))
                .map(|r| r.hot.stacking_index)
                .unwrap_or(0)
        });
        let _ = x.change_property_window_list(root, Atom::NetClientListStacking, &stacking);
    }

    if dirty.contains(RootDirty::ACTIVE_WINDOW) {
        let active = lifecycle
            .get(lifecycle.focused())
            .map(|r| r.hot.xid)
            .unwrap_or(Xid(0));
        let _ = x.change_property_window(root, Atom::NetActiveWindow, active);
    }

    if dirty.contains(RootDirty::WORKAREA) {
        publish_workarea(x, lifecycle, config, screen);
    }

    if dirty.contains(RootDirty::DESKTOP_META) {
        publish_desktop_meta(x, config, screen);
    }
}

fn publish_workarea<X: XConn>(x: &X, lifecycle: &ClientLifecycle, config: &WmConfig, screen: Rect) {
    let root = x.root();
    let n = config.desktop_names.len().max(1);

    let mut values = Vec::with_capacity(n * 4);
    for desktop in 0..n as u32 {
        let mut area = screen;
        for (_, record) in lifecycle.iter() {
            if record.hot.desktop != desktop {
                continue;
            }
            if let Some(strut) = record.cold.strut {
                area = strut.apply_to(area);
            }
        }
        values.extend_from_slice(&[area.x as u32, area.y as u32, area.w, area.h]);
    }

    let _ = x.change_property_cardinals(root, Atom::NetWorkarea, &values);
}

fn publish_desktop_meta<X: XConn>(x: &X, config: &WmConfig, screen: Rect) {
    let root = x.root();
    let n = config.desktop_names.len() as u32;

    let _ = x.change_property_cardinals(root, Atom::NetNumberOfDesktops, &[n]);
    let _ = x.change_property_cardinals(root, Atom::NetCurrentDesktop, &[0]);
    let _ = x.change_property_strings(root, Atom::NetDesktopNames, &config.desktop_names);
    let _ = x.change_property_cardinals(root, Atom::NetDesktopGeometry, &[screen.w, screen.h]);

    let viewport: Vec<u32> = (0..n).flat_map(|_| [0u32, 0u32]).collect();
    let _ = x.change_property_cardinals(root, Atom::NetDesktopViewport, &viewport);
}
