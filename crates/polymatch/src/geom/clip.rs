//! Sutherland–Hodgman clipping and clip-based intersection area.
//!
//! Precondition (not runtime-checked): the clip ring is convex. A non-convex clip
//! ring gives an approximate result without panicking; callers that need
//! correctness there use `raster::iou_raster`.

use super::hull::dedup_ring;
use super::types::{cross, Point, Polygon};
use crate::cfg::GEOM_EPS;

/// Clip `subject` against every edge of `window`, keeping the part on the
/// interior (left-of-edge after CCW normalization) side.
///
/// Either ring having fewer than 3 points yields an empty polygon. When `window`
/// strictly contains `subject`, the subject is returned unchanged (same start
/// point, same order).
pub fn clip(subject: &Polygon, window: &Polygon) -> Polygon {
    if subject.is_degenerate() || window.is_degenerate() {
        return Polygon::default();
    }
    let window = window.to_ccw();
    let mut output = subject.pts.clone();
    for (a, b) in window.edges() {
        if output.is_empty() {
            break;
        }
        if (b - a).norm() <= GEOM_EPS {
            continue;
        }
        let input = std::mem::take(&mut output);
        let mut prev = input[input.len() - 1];
        let mut prev_in = cross(a, b, prev) >= 0.0;
        for &p in &input {
            let p_in = cross(a, b, p) >= 0.0;
            if p_in {
                if !prev_in {
                    output.push(edge_hit(prev, p, a, b));
                }
                output.push(p);
            } else if prev_in {
                output.push(edge_hit(prev, p, a, b));
            }
            prev = p;
            prev_in = p_in;
        }
    }
    let out = dedup_ring(output);
    if out.len() < 3 {
        return Polygon::default();
    }
    Polygon::new(out)
}

/// Point where segment `p → q` meets the infinite line `a → b`.
#[inline]
fn edge_hit(p: Point, q: Point, a: Point, b: Point) -> Point {
    let dp = cross(a, b, p);
    let dq = cross(a, b, q);
    let denom = dp - dq;
    if denom.abs() <= f64::MIN_POSITIVE {
        return q;
    }
    p + (q - p) * (dp / denom)
}

/// `area(clip(p1, p2))`; exact only when `p2` is convex.
pub fn intersection_area(p1: &Polygon, p2: &Polygon) -> f64 {
    clip(p1, p2).area()
}
