//! Hull builders: exact convex hull and the approximate k-NN concave hull.
//!
//! - `convex_hull`: Andrew's monotone chain, CCW output.
//! - `concave_hull_knn`: boundary walk over k nearest neighbours. This is a
//!   heuristic, not a guaranteed-valid concave hull: on adversarial point
//!   distributions the ring can self-intersect or leave points outside. Metrics
//!   downstream accept such rings and return best-effort values.

use std::cmp::Ordering;
use std::f64::consts::{FRAC_PI_2, TAU};

use super::types::{cross, Point, Polygon};
use crate::cfg::GEOM_EPS;

fn lex_cmp(a: &Point, b: &Point) -> Ordering {
    match a.x.partial_cmp(&b.x).unwrap_or(Ordering::Equal) {
        Ordering::Equal => a.y.partial_cmp(&b.y).unwrap_or(Ordering::Equal),
        o => o,
    }
}

/// Lexicographically sorted copy with near-duplicates removed.
/// Index 0 is the leftmost (then lowest) point.
fn sorted_unique(points: &[Point]) -> Vec<Point> {
    let mut pts: Vec<Point> = points
        .iter()
        .copied()
        .filter(|p| p.x.is_finite() && p.y.is_finite())
        .collect();
    pts.sort_by(lex_cmp);
    pts.dedup_by(|a, b| (*a - *b).norm() < GEOM_EPS);
    pts
}

/// Andrew's monotone chain convex hull (CCW, no repeated closing point).
///
/// - `<= 1` point: returned unchanged.
/// - All collinear: the two extreme points.
/// - Duplicates and collinear boundary points are dropped (`cross <= 0` pops).
pub fn convex_hull(points: &[Point]) -> Polygon {
    if points.len() <= 1 {
        return Polygon::new(points.to_vec());
    }
    let pts = sorted_unique(points);
    if pts.len() <= 2 {
        return Polygon::new(pts);
    }
    let mut lower: Vec<Point> = Vec::with_capacity(pts.len());
    for p in &pts {
        while lower.len() >= 2 && cross(lower[lower.len() - 2], lower[lower.len() - 1], *p) <= 0.0
        {
            lower.pop();
        }
        lower.push(*p);
    }
    let mut upper: Vec<Point> = Vec::with_capacity(pts.len());
    for p in pts.iter().rev() {
        while upper.len() >= 2 && cross(upper[upper.len() - 2], upper[upper.len() - 1], *p) <= 0.0
        {
            upper.pop();
        }
        upper.push(*p);
    }
    lower.pop();
    upper.pop();
    let mut hull = lower;
    hull.extend(upper);
    Polygon::new(hull)
}

/// Approximate concave hull by a k-nearest-neighbour boundary walk.
///
/// Walk
/// - Start at the leftmost (then lowest) point, as if arriving from straight above.
/// - At each step take the `k` nearest unvisited points (the start rejoins the
///   pool once three vertices are placed) and advance to the one with the
///   smallest counter-clockwise angle measured from the previous edge, i.e. the
///   tightest turn that keeps the remaining points on the left.
/// - Candidates whose edge would cross an already placed edge are skipped while a
///   non-crossing candidate exists.
/// - Stop on return to the start, when no candidate is left, or after `3·n` steps.
///
/// `k` is clamped to `[3, n-1]` (`n` distinct points). Small `k` hugs the points
/// tightly; `k = n-1` degenerates to gift wrapping and reproduces `convex_hull`.
/// Fewer than 4 distinct points, or a collinear set, yield `convex_hull`.
pub fn concave_hull_knn(points: &[Point], k: usize) -> Polygon {
    let pts = sorted_unique(points);
    let hull = convex_hull(&pts);
    let n = pts.len();
    if n < 4 || hull.len() < 3 {
        return hull;
    }
    let k = k.clamp(3, n - 1);

    let start = 0usize;
    let mut visited = vec![false; n];
    visited[start] = true;
    let mut ring: Vec<usize> = vec![start];
    let mut cur = start;
    let mut back_angle = FRAC_PI_2;

    for _ in 0..3 * n {
        let can_close = ring.len() >= 3;
        let mut near: Vec<(f64, usize)> = (0..n)
            .filter(|&j| j != cur && (!visited[j] || (can_close && j == start)))
            .map(|j| ((pts[j] - pts[cur]).norm_squared(), j))
            .collect();
        if near.is_empty() {
            break;
        }
        if near.len() > k {
            near.select_nth_unstable_by(k - 1, |a, b| {
                a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal)
            });
            near.truncate(k);
        }

        let mut ranked: Vec<(f64, f64, usize)> = near
            .into_iter()
            .map(|(d2, j)| {
                let dir = pts[j] - pts[cur];
                let mut dev = (dir.y.atan2(dir.x) - back_angle).rem_euclid(TAU);
                if dev < GEOM_EPS {
                    dev = TAU;
                }
                (dev, d2, j)
            })
            .collect();
        // Smallest deviation first; on ties prefer the farther point so collinear
        // runs collapse the same way the convex hull does.
        ranked.sort_by(|a, b| {
            a.0.partial_cmp(&b.0)
                .unwrap_or(Ordering::Equal)
                .then_with(|| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal))
        });

        let next = ranked
            .iter()
            .map(|&(_, _, j)| j)
            .find(|&j| !crosses_ring(&pts, &ring, cur, j))
            .unwrap_or(ranked[0].2);

        if next == start {
            break;
        }
        visited[next] = true;
        ring.push(next);
        let back = pts[cur] - pts[next];
        back_angle = back.y.atan2(back.x);
        cur = next;
    }

    let out = Polygon::new(dedup_ring(ring.into_iter().map(|i| pts[i]).collect()));
    if out.is_degenerate() || out.area() <= GEOM_EPS {
        return hull;
    }
    out.to_ccw()
}

/// Does the segment `cur → next` properly cross a placed ring edge?
/// Edges sharing an endpoint with the new segment are ignored.
fn crosses_ring(pts: &[Point], ring: &[usize], cur: usize, next: usize) -> bool {
    let (a, b) = (pts[cur], pts[next]);
    ring.windows(2).any(|w| {
        let (i, j) = (w[0], w[1]);
        if i == cur || j == cur || i == next || j == next {
            return false;
        }
        segments_cross(a, b, pts[i], pts[j])
    })
}

/// Strict (interior) crossing of segments `p1p2` and `q1q2`.
fn segments_cross(p1: Point, p2: Point, q1: Point, q2: Point) -> bool {
    let d1 = cross(q1, q2, p1);
    let d2 = cross(q1, q2, p2);
    let d3 = cross(p1, p2, q1);
    let d4 = cross(p1, p2, q2);
    ((d1 > GEOM_EPS && d2 < -GEOM_EPS) || (d1 < -GEOM_EPS && d2 > GEOM_EPS))
        && ((d3 > GEOM_EPS && d4 < -GEOM_EPS) || (d3 < -GEOM_EPS && d4 > GEOM_EPS))
}

/// Drop consecutive near-duplicates, including a repeated closing point.
pub(crate) fn dedup_ring(mut pts: Vec<Point>) -> Vec<Point> {
    pts.dedup_by(|a, b| (*a - *b).norm() < GEOM_EPS);
    while pts.len() > 1 {
        let (first, last) = (pts[0], pts[pts.len() - 1]);
        if (first - last).norm() < GEOM_EPS {
            pts.pop();
        } else {
            break;
        }
    }
    pts
}
