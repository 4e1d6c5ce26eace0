//! The fixed set of ICCCM and EWMH atoms the core interns and understands.
//!
//! Atom names are shared between all X11 API libraries, so this enum exists
//! purely for type safety around their use inside the core: the backend is
//! responsible for interning every variant eagerly at startup (§4.G) and
//! treating the resulting table as immutable afterwards.
use strum::{AsRefStr, EnumIter, EnumString};

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(AsRefStr, EnumString, EnumIter, Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum Atom {
    // ICCCM
    #[strum(serialize = "WM_PROTOCOLS")]
    WmProtocols,
    #[strum(serialize = "WM_DELETE_WINDOW")]
    WmDeleteWindow,
    #[strum(serialize = "WM_TAKE_FOCUS")]
    WmTakeFocus,
    #[strum(serialize = "WM_STATE")]
    WmState,
    #[strum(serialize = "WM_CLASS")]
    WmClass,
    #[strum(serialize = "WM_NAME")]
    WmName,
    #[strum(serialize = "WM_HINTS")]
    WmHints,
    #[strum(serialize = "WM_NORMAL_HINTS")]
    WmNormalHints,
    #[strum(serialize = "WM_TRANSIENT_FOR")]
    WmTransientFor,
    #[strum(serialize = "WM_CHANGE_STATE")]
    WmChangeState,
    #[strum(serialize = "WM_COLORMAP_WINDOWS")]
    WmColormapWindows,
    #[strum(serialize = "WM_CLIENT_MACHINE")]
    WmClientMachine,
    #[strum(serialize = "WM_COMMAND")]
    WmCommand,

    // EWMH: root / session
    #[strum(serialize = "_NET_SUPPORTED")]
    NetSupported,
    #[strum(serialize = "_NET_SUPPORTING_WM_CHECK")]
    NetSupportingWmCheck,
    #[strum(serialize = "_NET_CLIENT_LIST")]
    NetClientList,
    #[strum(serialize = "_NET_CLIENT_LIST_STACKING")]
    NetClientListStacking,
    #[strum(serialize = "_NET_ACTIVE_WINDOW")]
    NetActiveWindow,
    #[strum(serialize = "_NET_NUMBER_OF_DESKTOPS")]
    NetNumberOfDesktops,
    #[strum(serialize = "_NET_CURRENT_DESKTOP")]
    NetCurrentDesktop,
    #[strum(serialize = "_NET_DESKTOP_NAMES")]
    NetDesktopNames,
    #[strum(serialize = "_NET_DESKTOP_VIEWPORT")]
    NetDesktopViewport,
    #[strum(serialize = "_NET_DESKTOP_GEOMETRY")]
    NetDesktopGeometry,
    #[strum(serialize = "_NET_WORKAREA")]
    NetWorkarea,

    // EWMH: per client
    #[strum(serialize = "_NET_WM_NAME")]
    NetWmName,
    #[strum(serialize = "_NET_WM_VISIBLE_NAME")]
    NetWmVisibleName,
    #[strum(serialize = "_NET_WM_STATE")]
    NetWmState,
    #[strum(serialize = "_NET_WM_ALLOWED_ACTIONS")]
    NetWmAllowedActions,
    #[strum(serialize = "_NET_WM_WINDOW_TYPE")]
    NetWmWindowType,
    #[strum(serialize = "_NET_WM_STRUT_PARTIAL")]
    NetWmStrutPartial,
    #[strum(serialize = "_NET_WM_USER_TIME")]
    NetWmUserTime,
    #[strum(serialize = "_NET_WM_PID")]
    NetWmPid,
    #[strum(serialize = "_NET_WM_ICON")]
    NetWmIcon,
    #[strum(serialize = "_NET_WM_DESKTOP")]
    NetWmDesktop,
    #[strum(serialize = "_NET_FRAME_EXTENTS")]
    NetFrameExtents,
    #[strum(serialize = "_NET_WM_MOVERESIZE")]
    NetWmMoveresize,
    #[strum(serialize = "_NET_WM_BYPASS_COMPOSITOR")]
    NetWmBypassCompositor,
    #[strum(serialize = "_NET_WM_SYNC_REQUEST")]
    NetWmSyncRequest,

    // EWMH: window type atoms
    #[strum(serialize = "_NET_WM_WINDOW_TYPE_DESKTOP")]
    NetWmWindowTypeDesktop,
    #[strum(serialize = "_NET_WM_WINDOW_TYPE_DOCK")]
    NetWmWindowTypeDock,
    #[strum(serialize = "_NET_WM_WINDOW_TYPE_TOOLBAR")]
    NetWmWindowTypeToolbar,
    #[strum(serialize = "_NET_WM_WINDOW_TYPE_MENU")]
    NetWmWindowTypeMenu,
    #[strum(serialize = "_NET_WM_WINDOW_TYPE_UTILITY")]
    NetWmWindowTypeUtility,
    #[strum(serialize = "_NET_WM_WINDOW_TYPE_SPLASH")]
    NetWmWindowTypeSplash,
    #[strum(serialize = "_NET_WM_WINDOW_TYPE_DIALOG")]
    NetWmWindowTypeDialog,
    #[strum(serialize = "_NET_WM_WINDOW_TYPE_NORMAL")]
    NetWmWindowTypeNormal,

    // EWMH: state atoms
    #[strum(serialize = "_NET_WM_STATE_MODAL")]
    NetWmStateModal,
    #[strum(serialize = "_NET_WM_STATE_STICKY")]
    NetWmStateSticky,
    #[strum(serialize = "_NET_WM_STATE_MAXIMIZED_VERT")]
    NetWmStateMaximizedVert,
    #[strum(serialize = "_NET_WM_STATE_MAXIMIZED_HORZ")]
    NetWmStateMaximizedHorz,
    #[strum(serialize = "_NET_WM_STATE_FULLSCREEN")]
    NetWmStateFullscreen,
    #[strum(serialize = "_NET_WM_STATE_HIDDEN")]
    NetWmStateHidden,
    #[strum(serialize = "_NET_WM_STATE_DEMANDS_ATTENTION")]
    NetWmStateDemandsAttention,
    #[strum(serialize = "_NET_WM_STATE_ABOVE")]
    NetWmStateAbove,
    #[strum(serialize = "_NET_WM_STATE_BELOW")]
    NetWmStateBelow,

    // EWMH: allowed-action atoms
    #[strum(serialize = "_NET_WM_ACTION_MOVE")]
    NetWmActionMove,
    #[strum(serialize = "_NET_WM_ACTION_RESIZE")]
    NetWmActionResize,
    #[strum(serialize = "_NET_WM_ACTION_MINIMIZE")]
    NetWmActionMinimize,
    #[strum(serialize = "_NET_WM_ACTION_SHADE")]
    NetWmActionShade,
    #[strum(serialize = "_NET_WM_ACTION_STICK")]
    NetWmActionStick,
    #[strum(serialize = "_NET_WM_ACTION_MAXIMIZE_HORZ")]
    NetWmActionMaximizeHorz,
    #[strum(serialize = "_NET_WM_ACTION_MAXIMIZE_VERT")]
    NetWmActionMaximizeVert,
    #[strum(serialize = "_NET_WM_ACTION_FULLSCREEN")]
    NetWmActionFullscreen,
    #[strum(serialize = "_NET_WM_ACTION_CHANGE_DESKTOP")]
    NetWmActionChangeDesktop,
    #[strum(serialize = "_NET_WM_ACTION_CLOSE")]
    NetWmActionClose,

    // Misc
    #[strum(serialize = "_MOTIF_WM_HINTS")]
    MotifWmHints,
    #[strum(serialize = "_GTK_FRAME_EXTENTS")]
    GtkFrameExtents,
    #[strum(serialize = "UTF8_STRING")]
    Utf8String,
    #[strum(serialize = "COMPOUND_TEXT")]
    CompoundText,
    #[strum(serialize = "WM_S0")]
    WmS0,
}

/// Window types that default to floating/undecorated behaviour when first seen.
pub const AUTO_FLOAT_WINDOW_TYPES: &[Atom] = &[
    Atom::NetWmWindowTypeDialog,
    Atom::NetWmWindowTypeUtility,
    Atom::NetWmWindowTypeSplash,
    Atom::NetWmWindowTypeToolbar,
    Atom::NetWmWindowTypeMenu,
];

/// The full `_NET_SUPPORTED` set published at startup (§4.G, §4.H).
pub const EWMH_SUPPORTED_ATOMS: &[Atom] = &[
    Atom::NetSupported,
    Atom::NetSupportingWmCheck,
    Atom::NetClientList,
    Atom::NetClientListStacking,
    Atom::NetActiveWindow,
    Atom::NetNumberOfDesktops,
    Atom::NetCurrentDesktop,
    Atom::NetDesktopNames,
    Atom::NetDesktopViewport,
    Atom::NetDesktopGeometry,
    Atom::NetWorkarea,
    Atom::NetWmName,
    Atom::NetWmVisibleName,
    Atom::NetWmState,
    Atom::NetWmAllowedActions,
    Atom::NetWmWindowType,
    Atom::NetWmStrutPartial,
    Atom::NetWmUserTime,
    Atom::NetWmPid,
    Atom::NetWmIcon,
    Atom::NetWmDesktop,
    Atom::NetFrameExtents,
    Atom::NetWmMoveresize,
    Atom::NetWmBypassCompositor,
    Atom::NetWmSyncRequest,
    Atom::NetWmWindowTypeDesktop,
    Atom::NetWmWindowTypeDock,
    Atom::NetWmWindowTypeToolbar,
    Atom::NetWmWindowTypeMenu,
    Atom::NetWmWindowTypeUtility,
    Atom::NetWmWindowTypeSplash,
    Atom::NetWmWindowTypeDialog,
    Atom::NetWmWindowTypeNormal,
    Atom::NetWmStateModal,
    Atom::NetWmStateSticky,
    Atom::NetWmStateMaximizedVert,
    Atom::NetWmStateMaximizedHorz,
    Atom::NetWmStateFullscreen,
    Atom::NetWmStateHidden,
    Atom::NetWmStateDemandsAttention,
    Atom::NetWmStateAbove,
    Atom::NetWmStateBelow,
    Atom::NetWmActionMove,
    Atom::NetWmActionResize,
    Atom::NetWmActionMinimize,
    Atom::NetWmActionShade,
    Atom::NetWmActionStick,
    Atom::NetWmActionMaximizeHorz,
    Atom::NetWmActionMaximizeVert,
    Atom::NetWmActionFullscreen,
    Atom::NetWmActionChangeDesktop,
    Atom::NetWmActionClose,
];

/// The fixed set of actions every managed client allows, published as
/// `_NET_WM_ALLOWED_ACTIONS` (§4.E, §6). This core has no per-client action
/// gating, so the set is the same for every client rather than computed
/// from its current state.
pub const NET_WM_ALLOWED_ACTIONS: &[Atom] = &[
    Atom::NetWmActionMove,
    Atom::NetWmActionResize,
    Atom::NetWmActionMinimize,
    Atom::NetWmActionShade,
    Atom::NetWmActionStick,
    Atom::NetWmActionMaximizeHorz,
    Atom::NetWmActionMaximizeVert,
    Atom::NetWmActionFullscreen,
    Atom::NetWmActionChangeDesktop,
    Atom::NetWmActionClose,
];

/// All known window-type atoms, in the priority order `_NET_WM_WINDOW_TYPE`
/// decoding uses to pick the first recognised entry (§4.F).
pub const KNOWN_WINDOW_TYPES: &[Atom] = &[
    Atom::NetWmWindowTypeDesktop,
    Atom::NetWmWindowTypeDock,
    Atom::NetWmWindowTypeToolbar,
    Atom::NetWmWindowTypeMenu,
    Atom::NetWmWindowTypeUtility,
    Atom::NetWmWindowTypeSplash,
    Atom::NetWmWindowTypeDialog,
    Atom::NetWmWindowTypeNormal,
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn every_atom_round_trips_through_its_name() {
        for atom in Atom::iter() {
            let name = atom.as_ref();
            assert_eq!(Atom::from_str(name).unwrap(), atom);
        }
    }
}
