//! Point, polygon ring and bounding box.
//!
//! - `Point`: `nalgebra::Vector2<f64>`, a fixed-arity `(x, y)` pair.
//! - `Polygon`: an implicitly closed ring (edge `i → i+1 mod n`). Rings with
//!   fewer than 3 points are degenerate: area 0, treated as empty by metrics.
//! - `Bbox`: axis-aligned bounds, convertible to a CCW rectangle ring.

use nalgebra::Vector2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::cfg::{GEOM_EPS, TURN_EPS};

/// A 2D point.
pub type Point = Vector2<f64>;

/// Orientation of `c` relative to the directed line `a → b`.
/// Positive for a counter-clockwise turn, negative for clockwise, 0 if collinear.
#[inline]
pub(crate) fn cross(a: Point, b: Point, c: Point) -> f64 {
    let ab = b - a;
    let ac = c - a;
    ab.x * ac.y - ab.y * ac.x
}

/// Ordered ring of points; closure is implicit.
///
/// Invariants:
/// - The closing point is not duplicated (`pts[0] != pts[n-1]` for rings built
///   by this crate; foreign rings that repeat it still measure correctly).
/// - Orientation carries no meaning for area or metrics; hull builders emit CCW.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Polygon {
    pub pts: Vec<Point>,
}

impl Polygon {
    #[inline]
    pub fn new(pts: Vec<Point>) -> Self {
        Self { pts }
    }

    /// Build from `(x, y)` tuples.
    pub fn from_xy(xy: &[(f64, f64)]) -> Self {
        Self {
            pts: xy.iter().map(|&(x, y)| Point::new(x, y)).collect(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.pts.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pts.is_empty()
    }

    /// Fewer than 3 points: not a ring.
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.pts.len() < 3
    }

    /// Edges as `(start, end)` pairs, closing edge included.
    pub fn edges(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        let n = self.pts.len();
        (0..n).map(move |i| (self.pts[i], self.pts[(i + 1) % n]))
    }

    /// Shoelace sum; positive for CCW rings. 0 for fewer than 3 points.
    pub fn signed_area(&self) -> f64 {
        if self.is_degenerate() {
            return 0.0;
        }
        0.5 * self.edges().map(|(p, q)| p.x * q.y - q.x * p.y).sum::<f64>()
    }

    /// Absolute shoelace area. Self-intersecting rings give the usual signed-lobe
    /// cancellation; the value is best effort but always finite and `>= 0`.
    #[inline]
    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    /// Boundary length including the closing edge; 0 for fewer than 2 points.
    pub fn perimeter(&self) -> f64 {
        if self.pts.len() < 2 {
            return 0.0;
        }
        self.edges().map(|(p, q)| (q - p).norm()).sum()
    }

    /// Arithmetic mean of the vertices. `(0, 0)` for an empty ring; callers must
    /// treat that as a sentinel, not a location.
    pub fn centroid(&self) -> Point {
        if self.pts.is_empty() {
            return Point::zeros();
        }
        let sum = self.pts.iter().fold(Point::zeros(), |acc, p| acc + p);
        sum / self.pts.len() as f64
    }

    /// Lengths of all ring edges (closing edge included).
    pub fn edge_lengths(&self) -> Vec<f64> {
        if self.pts.len() < 2 {
            return Vec::new();
        }
        self.edges().map(|(p, q)| (q - p).norm()).collect()
    }

    pub fn bbox(&self) -> Option<Bbox> {
        Bbox::of_points(&self.pts)
    }

    #[inline]
    pub fn is_ccw(&self) -> bool {
        self.signed_area() > 0.0
    }

    /// Same ring, reversed if needed so that it runs counter-clockwise.
    pub fn to_ccw(&self) -> Polygon {
        let mut out = self.clone();
        if out.signed_area() < 0.0 {
            out.pts.reverse();
        }
        out
    }

    /// Convex, simple ring test.
    ///
    /// All non-degenerate turns share one sign and the total turning is one full
    /// revolution (rejects star-shaped self-intersecting rings like pentagrams).
    pub fn is_convex(&self) -> bool {
        let n = self.pts.len();
        if n < 3 {
            return false;
        }
        let mut sign = 0.0_f64;
        let mut turning = 0.0;
        for i in 0..n {
            let a = self.pts[(i + n - 1) % n];
            let b = self.pts[i];
            let c = self.pts[(i + 1) % n];
            let e1 = b - a;
            let e2 = c - b;
            if e1.norm() <= GEOM_EPS || e2.norm() <= GEOM_EPS {
                continue;
            }
            let z = e1.x * e2.y - e1.y * e2.x;
            if z.abs() > GEOM_EPS {
                if sign == 0.0 {
                    sign = z.signum();
                } else if z.signum() != sign {
                    return false;
                }
            }
            turning += z.atan2(e1.dot(&e2));
        }
        sign != 0.0 && (turning.abs() - std::f64::consts::TAU).abs() < TURN_EPS
    }

    /// Membership for convex rings via the left-of-edge test (either orientation).
    /// Boundary points count as inside within `eps`.
    pub fn contains_convex(&self, p: Point, eps: f64) -> bool {
        if self.is_degenerate() {
            return false;
        }
        let s = if self.signed_area() < 0.0 { -1.0 } else { 1.0 };
        self.edges().all(|(a, b)| {
            let len = (b - a).norm();
            len <= GEOM_EPS || s * cross(a, b, p) / len >= -eps
        })
    }

    /// Even-odd membership for arbitrary (possibly non-convex) rings.
    pub fn contains_point(&self, p: Point) -> bool {
        if self.is_degenerate() {
            return false;
        }
        let mut inside = false;
        for (a, b) in self.edges() {
            if (a.y > p.y) != (b.y > p.y) {
                let x = a.x + (p.y - a.y) * (b.x - a.x) / (b.y - a.y);
                if p.x < x {
                    inside = !inside;
                }
            }
        }
        inside
    }
}

impl From<Vec<Point>> for Polygon {
    fn from(pts: Vec<Point>) -> Self {
        Self { pts }
    }
}

/// Axis-aligned bounding box.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Bbox {
    pub min: Point,
    pub max: Point,
}

impl Bbox {
    /// Bounds of a point slice; `None` if empty or any coordinate is non-finite.
    pub fn of_points(pts: &[Point]) -> Option<Bbox> {
        let first = pts.first()?;
        let mut b = Bbox {
            min: *first,
            max: *first,
        };
        for p in pts {
            if !(p.x.is_finite() && p.y.is_finite()) {
                return None;
            }
            b.min.x = b.min.x.min(p.x);
            b.min.y = b.min.y.min(p.y);
            b.max.x = b.max.x.max(p.x);
            b.max.y = b.max.y.max(p.y);
        }
        Some(b)
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    /// Largest side length.
    #[inline]
    pub fn extent(&self) -> f64 {
        self.width().max(self.height())
    }

    pub fn union(&self, other: &Bbox) -> Bbox {
        Bbox {
            min: Point::new(self.min.x.min(other.min.x), self.min.y.min(other.min.y)),
            max: Point::new(self.max.x.max(other.max.x), self.max.y.max(other.max.y)),
        }
    }

    /// Grow by `margin` on every side.
    pub fn inflate(&self, margin: f64) -> Bbox {
        let m = Point::new(margin, margin);
        Bbox {
            min: self.min - m,
            max: self.max + m,
        }
    }

    /// Rectangle ring, counter-clockwise from `min`.
    pub fn to_polygon(&self) -> Polygon {
        Polygon::new(vec![
            self.min,
            Point::new(self.max.x, self.min.y),
            self.max,
            Point::new(self.min.x, self.max.y),
        ])
    }
}
