//! Data types for the property payloads the [`PropertyDecoder`](crate::property_decoder)
//! understands, grounded in the ICCCM `WM_HINTS` / `WM_NORMAL_HINTS` layouts.
use crate::Xid;

/// A decoded property reply. Variants are the union of everything the core
/// ever reads back off a client or the root window; a mismatch between the
/// variant expected by the caller and the one actually produced by the
/// backend is always treated as "absent", never as a panic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prop {
    Atom(Vec<String>),
    Cardinal(Vec<u32>),
    UTF8String(Vec<String>),
    Window(Vec<Xid>),
    WmHints(WmHints),
    WmNormalHints(WmNormalHints),
    StrutPartial([u32; 12]),
}

bitflags::bitflags! {
    #[derive(Default)]
    pub struct WmHintsFlags: u32 {
        const INPUT_HINT        = 0b0000000001;
        const STATE_HINT        = 0b0000000010;
        const ICON_PIXMAP_HINT  = 0b0000000100;
        const ICON_WINDOW_HINT  = 0b0000001000;
        const ICON_POSITION_HINT = 0b0000010000;
        const ICON_MASK_HINT    = 0b0000100000;
        const WINDOW_GROUP_HINT = 0b0001000000;
        const URGENCY_HINT      = 0b0100000000;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitialWindowState {
    Withdrawn,
    Normal,
    Iconic,
}

/// `WM_HINTS`, decoded from the 9-`u32` `XWMHints` wire layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WmHints {
    pub flags: WmHintsFlags,
    pub accepts_input: bool,
    pub initial_state: InitialWindowState,
    pub urgent: bool,
}

impl WmHints {
    /// Parse the 9-`u32` `XWMHints` layout. Returns `None` (treated as
    /// absent by the decoder) on a malformed length rather than erroring,
    /// per the property decoder's "ignore, preserve prior state" rule.
    pub fn try_from_bytes(raw: &[u32]) -> Option<Self> {
        if raw.len() != 9 {
            return None;
        }

        let flags = WmHintsFlags::from_bits_truncate(raw[0]);
        let accepts_input = !flags.contains(WmHintsFlags::INPUT_HINT) || raw[1] != 0;
        let initial_state = match (flags.contains(WmHintsFlags::STATE_HINT), raw[2]) {
            (true, 0) => InitialWindowState::Withdrawn,
            (true, 2) => InitialWindowState::Iconic,
            _ => InitialWindowState::Normal,
        };

        Some(Self {
            flags,
            accepts_input,
            initial_state,
            urgent: flags.contains(WmHintsFlags::URGENCY_HINT),
        })
    }
}

/// `WM_NORMAL_HINTS`, decoded from the 18-`u32` `XSizeHints` wire layout.
/// Gravity, resize increments and aspect ratio are parsed but not honoured
/// by the core (they are a decoration concern), matching the lineage this
/// crate is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WmNormalHints {
    pub min_w: Option<u32>,
    pub min_h: Option<u32>,
    pub max_w: Option<u32>,
    pub max_h: Option<u32>,
    pub base_w: Option<u32>,
    pub base_h: Option<u32>,
}

impl WmNormalHints {
    pub fn try_from_bytes(raw: &[u32]) -> Option<Self> {
        if raw.len() != 18 {
            return None;
        }

        let some_if_positive = |v: u32| if v > 0 { Some(v) } else { None };

        Some(Self {
            min_w: some_if_positive(raw[5]),
            min_h: some_if_positive(raw[6]),
            max_w: some_if_positive(raw[7]),
            max_h: some_if_positive(raw[8]),
            base_w: some_if_positive(raw[15]),
            base_h: some_if_positive(raw[16]),
        })
    }

    /// Clamp `(w, h)` to this hint set's min/max, falling back to base size
    /// when a dimension would otherwise be clamped to zero.
    pub fn apply_to(&self, mut w: u32, mut h: u32) -> (u32, u32) {
        if let Some(min_w) = self.min_w {
            w = w.max(min_w);
        }
        if let Some(min_h) = self.min_h {
            h = h.max(min_h);
        }
        if let Some(max_w) = self.max_w {
            w = w.min(max_w);
        }
        if let Some(max_h) = self.max_h {
            h = h.min(max_h);
        }

        (w, h)
    }
}

/// The ICCCM `WM_STATE` values a client window can be placed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WmState {
    Withdrawn,
    Normal,
    Iconic,
}

impl WmState {
    /// The wire value of `WM_STATE`'s first `CARDINAL`, per ICCCM.
    pub fn as_u32(self) -> u32 {
        match self {
            WmState::Withdrawn => 0,
            WmState::Normal => 1,
            WmState::Iconic => 3,
        }
    }
}

/// The subset of `GetWindowAttributes` the core cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowAttributes {
    pub override_redirect: bool,
    pub mapped: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wm_hints_rejects_wrong_length() {
        assert!(WmHints::try_from_bytes(&[0; 8]).is_none());
    }

    #[test]
    fn wm_hints_defaults_to_accepting_input() {
        let raw = [0u32; 9];
        let hints = WmHints::try_from_bytes(&raw).unwrap();
        assert!(hints.accepts_input);
    }

    #[test]
    fn wm_normal_hints_clamps_to_min() {
        let mut raw = [0u32; 18];
        raw[5] = 100; // min width
        raw[6] = 50; // min height
        let hints = WmNormalHints::try_from_bytes(&raw).unwrap();

        assert_eq!(hints.apply_to(10, 10), (100, 50));
    }
}
