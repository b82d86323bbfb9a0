//! Rasterized IoU over a shared grid (robust for non-convex/self-intersecting rings).
//!
//! Both rings are scan-converted (even-odd rule, cell centres sampled) onto one
//! `res × res` grid spanning their combined bounding box. IoU is then
//! `cells(A∧B) / cells(A∨B)`.
//!
//! `RasterGrid` owns the `res²` scratch buffer so callers computing many pairs
//! at one resolution allocate once (the pairwise matrix keeps one per worker).

use super::types::{Bbox, Polygon};
use crate::cfg::{AREA_EPS, MAX_RASTER_RESOLUTION, MIN_RASTER_RESOLUTION};

const BIT_A: u8 = 0b01;
const BIT_B: u8 = 0b10;

/// Reusable raster scratch space.
#[derive(Clone, Debug)]
pub struct RasterGrid {
    res: usize,
    cells: Vec<u8>,
    xs: Vec<f64>,
}

impl RasterGrid {
    /// Allocate a grid; `resolution` is clamped to
    /// `[MIN_RASTER_RESOLUTION, MAX_RASTER_RESOLUTION]`.
    pub fn new(resolution: usize) -> Self {
        let res = resolution.clamp(MIN_RASTER_RESOLUTION, MAX_RASTER_RESOLUTION);
        Self {
            res,
            cells: vec![0; res * res],
            xs: Vec::new(),
        }
    }

    #[inline]
    pub fn resolution(&self) -> usize {
        self.res
    }

    /// IoU of `a` and `b` on this grid.
    ///
    /// Conventions: both rings empty (area 0) ⇒ 1.0; exactly one empty ⇒ 0.0.
    /// If both have area but neither touches a cell centre (slivers below the
    /// grid pitch), no overlap can be established and 0.0 is returned.
    pub fn iou(&mut self, a: &Polygon, b: &Polygon) -> f64 {
        let a_empty = a.area() <= AREA_EPS;
        let b_empty = b.area() <= AREA_EPS;
        match (a_empty, b_empty) {
            (true, true) => return 1.0,
            (true, false) | (false, true) => return 0.0,
            _ => {}
        }
        let bounds = match (a.bbox(), b.bbox()) {
            (Some(ba), Some(bb)) => ba.union(&bb),
            _ => return 0.0,
        };
        self.cells.fill(0);
        self.paint(a, &bounds, BIT_A);
        self.paint(b, &bounds, BIT_B);

        let mut inter = 0usize;
        let mut union = 0usize;
        for &c in &self.cells {
            if c != 0 {
                union += 1;
                if c == BIT_A | BIT_B {
                    inter += 1;
                }
            }
        }
        if union == 0 {
            return 0.0;
        }
        inter as f64 / union as f64
    }

    /// Scanline fill of one ring into `bit`.
    fn paint(&mut self, poly: &Polygon, bounds: &Bbox, bit: u8) {
        let res = self.res;
        let cw = bounds.width() / res as f64;
        let ch = bounds.height() / res as f64;
        if !(cw > 0.0 && ch > 0.0) {
            return;
        }
        for row in 0..res {
            let y = bounds.min.y + (row as f64 + 0.5) * ch;
            self.xs.clear();
            for (p, q) in poly.edges() {
                if (p.y > y) != (q.y > y) {
                    self.xs.push(p.x + (y - p.y) * (q.x - p.x) / (q.y - p.y));
                }
            }
            self.xs
                .sort_by(|u, v| u.partial_cmp(v).unwrap_or(std::cmp::Ordering::Equal));
            let base = row * res;
            for span in self.xs.chunks_exact(2) {
                let c0 = first_col(span[0], bounds.min.x, cw, res);
                let c1 = first_col(span[1], bounds.min.x, cw, res);
                for cell in &mut self.cells[base + c0..base + c1.max(c0)] {
                    *cell |= bit;
                }
            }
        }
    }
}

/// First column whose centre lies at or right of `x`.
#[inline]
fn first_col(x: f64, x0: f64, cw: f64, res: usize) -> usize {
    let c = ((x - x0) / cw - 0.5).ceil();
    if c <= 0.0 {
        0
    } else if c >= res as f64 {
        res
    } else {
        c as usize
    }
}

/// One-shot raster IoU (allocates a fresh grid).
pub fn iou_raster(p1: &Polygon, p2: &Polygon, resolution: usize) -> f64 {
    RasterGrid::new(resolution).iou(p1, p2)
}
