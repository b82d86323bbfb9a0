//! Tolerance and default constants (internal and pipeline-facing).
//!
//! Policy
//! - Tolerances are fixed constants; there is no tolerance juggling at call sites.
//!   Tunables that callers legitimately vary (hull k, raster resolution, anchor
//!   cap) live in `pipeline::PipelineCfg` and default to the values below.

/// Generic geometric tolerance for orientation tests and point dedup.
pub(crate) const GEOM_EPS: f64 = 1e-12;
/// Area below which a ring counts as empty for overlap metrics.
pub(crate) const AREA_EPS: f64 = 1e-12;
/// Slack on the total turning angle when testing convexity.
pub(crate) const TURN_EPS: f64 = 1e-6;

/// Smallest accepted raster resolution (cells per side).
pub const MIN_RASTER_RESOLUTION: usize = 8;
/// Largest accepted raster resolution; larger requests are clamped.
pub const MAX_RASTER_RESOLUTION: usize = 4096;
/// Resolution used by the non-convex fallback inside `calculate_iou`
/// and by the compare pipeline.
pub const DEFAULT_RASTER_RESOLUTION: usize = 512;

/// Default neighbourhood size for the concave hull walk.
pub const DEFAULT_HULL_K: usize = 8;
/// Upper bound on Procrustes anchors taken from the head of each set.
pub const DEFAULT_MAX_ANCHORS: usize = 50;
