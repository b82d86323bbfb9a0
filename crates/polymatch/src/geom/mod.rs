//! 2D geometry: rings, hulls, clipping, rasterized overlap.
//!
//! Purpose
//! - Provide the primitive measures (area, perimeter, centroid, bounds) and the
//!   hull/clip/raster building blocks used by `metrics` and `pipeline`.
//!
//! Conventions
//! - Rings are implicitly closed and orientation-agnostic for all measures;
//!   builders emit CCW.
//! - Degenerate rings (fewer than 3 points) never panic: area 0, empty clip.
//! - Tolerances come from `crate::cfg`.

mod clip;
mod hull;
mod raster;
mod types;

pub use clip::{clip, intersection_area};
pub use hull::{concave_hull_knn, convex_hull};
pub use raster::{iou_raster, RasterGrid};
pub use types::{Bbox, Point, Polygon};

#[cfg(test)]
mod tests;
