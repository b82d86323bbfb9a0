//! Shape metrics between two rings.
//!
//! Every metric is total: empty or degenerate rings (fewer than 3 vertices, or
//! zero area for the overlap metrics) have a defined value and never panic.
//!
//! - Vertex distances: `hausdorff_distance`, `chamfer_distance`,
//!   `closest_vertex_distance`, `centroid_distance` (`+∞` when undefined).
//! - Overlaps: `calculate_iou`, `dice_coefficient` in [0, 1].
//! - Descriptors: `shape_features`, `boundary_fractal_score`,
//!   `polygon_similarity_composite` (see `descriptor`).
//! - Matrices: `pairwise_metric_matrix`, `overlap_matrix_iou` (see `matrix`).

mod descriptor;
mod matrix;

pub use descriptor::{
    boundary_fractal_score, polygon_similarity_composite, shape_features, ShapeFeatures,
};
pub use matrix::{
    overlap_matrix_iou, pairwise_metric_matrix, Metric, MetricFamily, MetricMatrix,
    MetricParseError, PairwiseMetric,
};

use crate::cfg::{AREA_EPS, DEFAULT_RASTER_RESOLUTION};
use crate::geom::{intersection_area, iou_raster, Point, Polygon};

fn directed_max_min(a: &[Point], b: &[Point]) -> f64 {
    a.iter()
        .map(|p| nearest(p, b))
        .fold(0.0, f64::max)
}

fn directed_mean_min(a: &[Point], b: &[Point]) -> f64 {
    a.iter().map(|p| nearest(p, b)).sum::<f64>() / a.len() as f64
}

#[inline]
fn nearest(p: &Point, pts: &[Point]) -> f64 {
    pts.iter()
        .map(|q| (p - q).norm())
        .fold(f64::INFINITY, f64::min)
}

/// Symmetric vertex Hausdorff distance; `+∞` if either ring is empty.
pub fn hausdorff_distance(a: &Polygon, b: &Polygon) -> f64 {
    if a.is_degenerate() || b.is_degenerate() {
        return f64::INFINITY;
    }
    directed_max_min(&a.pts, &b.pts).max(directed_max_min(&b.pts, &a.pts))
}

/// Symmetric chamfer distance: the larger of the two directed *mean*
/// nearest-vertex distances. `+∞` if either ring is empty.
pub fn chamfer_distance(a: &Polygon, b: &Polygon) -> f64 {
    if a.is_degenerate() || b.is_degenerate() {
        return f64::INFINITY;
    }
    directed_mean_min(&a.pts, &b.pts).max(directed_mean_min(&b.pts, &a.pts))
}

/// Smallest vertex-to-vertex gap; `+∞` if either ring is empty.
pub fn closest_vertex_distance(a: &Polygon, b: &Polygon) -> f64 {
    if a.is_degenerate() || b.is_degenerate() {
        return f64::INFINITY;
    }
    a.pts
        .iter()
        .map(|p| nearest(p, &b.pts))
        .fold(f64::INFINITY, f64::min)
}

/// Distance between vertex centroids; `+∞` when either ring has no vertices
/// (its centroid is only a sentinel).
pub fn centroid_distance(a: &Polygon, b: &Polygon) -> f64 {
    if a.is_empty() || b.is_empty() {
        return f64::INFINITY;
    }
    (a.centroid() - b.centroid()).norm()
}

/// Intersection area, evaluated in both clip orders and averaged so the value
/// does not depend on argument order.
fn overlap_area(a: &Polygon, b: &Polygon) -> f64 {
    0.5 * (intersection_area(a, b) + intersection_area(b, a))
}

/// Intersection over union.
///
/// - Both empty (area 0) ⇒ 1.0; exactly one empty ⇒ 0.0.
/// - Both convex ⇒ exact clip-based value.
/// - Otherwise ⇒ raster IoU at `DEFAULT_RASTER_RESOLUTION`.
///
/// Symmetric bit-for-bit in its arguments.
pub fn calculate_iou(a: &Polygon, b: &Polygon) -> f64 {
    let (area_a, area_b) = (a.area(), b.area());
    match (area_a <= AREA_EPS, area_b <= AREA_EPS) {
        (true, true) => return 1.0,
        (true, false) | (false, true) => return 0.0,
        _ => {}
    }
    if a.is_convex() && b.is_convex() {
        let inter = overlap_area(a, b);
        let union = area_a + area_b - inter;
        if union <= AREA_EPS {
            return 0.0;
        }
        (inter / union).clamp(0.0, 1.0)
    } else {
        iou_raster(a, b, DEFAULT_RASTER_RESOLUTION)
    }
}

/// Dice coefficient `2|A∩B| / (|A|+|B|)`, via the identity `2J / (1+J)` on the
/// IoU `J` so that convex and raster paths agree. Both empty ⇒ 1.0.
pub fn dice_coefficient(a: &Polygon, b: &Polygon) -> f64 {
    let j = calculate_iou(a, b);
    2.0 * j / (1.0 + j)
}
