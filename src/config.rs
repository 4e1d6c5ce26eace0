//! In-process tunables for the core state machine.
//!
//! This is deliberately not a file-backed configuration layer: parsing a
//! config file and wiring it up to a running [`WmConfig`](crate::config::WmConfig)
//! is the embedder's job (see the crate-level docs for the external
//! collaborators list). What lives here are the handful of constants the
//! specification calls out as "policy, not hard-coded fact": the per-tick
//! event cap, the cookie drain budget and the tiny-geometry rescue
//! thresholds.

/// Rescue thresholds applied to a client's first `GetGeometry` reply.
///
/// A window that reports a implausibly small size (most commonly a client
/// that has not yet been mapped and so has no real geometry) is expanded to
/// `default_w x default_h` rather than trusted, so pathological 1x1 windows
/// don't end up unusable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TinyGeometryRescue {
    pub min_w: u32,
    pub min_h: u32,
    pub default_w: u32,
    pub default_h: u32,
}

impl Default for TinyGeometryRescue {
    fn default() -> Self {
        Self {
            min_w: 50,
            min_h: 20,
            default_w: 800,
            default_h: 600,
        }
    }
}

impl TinyGeometryRescue {
    /// Whether `(w, h)` is small enough to need rescuing.
    pub fn needs_rescue(&self, w: u32, h: u32) -> bool {
        w < self.min_w || h < self.min_h
    }

    /// The rescued size for a geometry that failed [`needs_rescue`](Self::needs_rescue).
    pub fn rescued(&self) -> (u32, u32) {
        (self.default_w, self.default_h)
    }
}

/// Decoration geometry applied to clients without their own CSD.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecorationMetrics {
    pub border_px: u32,
    pub title_height_px: u32,
}

impl Default for DecorationMetrics {
    fn default() -> Self {
        Self {
            border_px: 1,
            title_height_px: 20,
        }
    }
}

/// Tunable knobs for a running [`WindowManager`](crate::scheduler::WindowManager).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WmConfig {
    /// Hard cap on events ingested from a single poll pass (§4.C).
    pub max_events_per_tick: usize,
    /// Hard cap on cookie-jar replies drained in a single tick (§4.B).
    pub cookie_drain_budget: usize,
    /// Rescue thresholds for implausibly small initial client geometry.
    pub tiny_geometry_rescue: TinyGeometryRescue,
    /// Border/title metrics applied to non-CSD clients.
    pub decoration: DecorationMetrics,
    /// Names assigned to desktops at startup; also determines the initial
    /// desktop count for `_NET_NUMBER_OF_DESKTOPS`.
    pub desktop_names: Vec<String>,
}

impl Default for WmConfig {
    fn default() -> Self {
        Self {
            max_events_per_tick: 256,
            cookie_drain_budget: 32,
            tiny_geometry_rescue: TinyGeometryRescue::default(),
            decoration: DecorationMetrics::default(),
            desktop_names: (1..=9).map(|n| n.to_string()).collect(),
        }
    }
}

impl WmConfig {
    pub fn with_max_events_per_tick(mut self, n: usize) -> Self {
        self.max_events_per_tick = n;
        self
    }

    pub fn with_cookie_drain_budget(mut self, n: usize) -> Self {
        self.cookie_drain_budget = n;
        self
    }
}
