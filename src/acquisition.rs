//! The one-time startup sequence that claims ownership of a screen: intern
//! every known atom, grab `SubstructureRedirect`, publish the EWMH
//! supporting-WM-check window, then take `WM_S0` (§4.G).
use strum::IntoEnumIterator;
use tracing::{info, warn};

use crate::atom::{Atom, EWMH_SUPPORTED_ATOMS};
use crate::geometry::Rect;
use crate::x::XConn;
use crate::{Error, Result, Xid};

/// Outcome of a successful acquisition: the check window id, kept so the
/// root publisher and shutdown path can refer back to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Acquisition {
    pub supporting_wm_check: Xid,
}

/// Attempt to become the window manager for `x`'s root.
///
/// On any refusal — `SubstructureRedirect` denied, or the `WM_S0` selection
/// already owned — this aborts cleanly: the check window is never created
/// and nothing is published (§4.G, §8 scenarios S7/S8). Atom interning
/// happens unconditionally first since it has no visible side effect a
/// competing WM could object to.
pub fn acquire<X: XConn>(x: &X) -> Result<Acquisition> {
    for atom in Atom::iter() {
        let _ = x.atom_xid(atom);
    }

    if let Some(owner) = x.get_selection_owner(Atom::WmS0)? {
        warn!(%owner, "WM_S0 already owned, refusing to start");
        return Err(Error::SelectionAlreadyOwned);
    }

    x.grab_substructure_redirect().map_err(|e| {
        warn!("SubstructureRedirect grab refused, another WM is likely running");
        e
    })?;

    let root = x.root();
    let check = x.create_frame(root, 0, 0, Rect::new(-1, -1, 1, 1))?;

    x.change_property_window(root, Atom::NetSupportingWmCheck, check)?;
    x.change_property_window(check, Atom::NetSupportingWmCheck, check)?;
    x.map_window(check)?;

    let supported: Vec<Atom> = EWMH_SUPPORTED_ATOMS.to_vec();
    x.change_property_atoms(root, Atom::NetSupported, &supported)?;

    x.set_selection_owner(Atom::WmS0, check)?;

    info!(%check, "acquired WM_S0 and SubstructureRedirect");
    Ok(Acquisition { supporting_wm_check: check })
}
