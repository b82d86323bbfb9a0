//! Shape descriptors, boundary fractal score and the composite similarity.

use std::collections::HashSet;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::{calculate_iou, dice_coefficient, hausdorff_distance};
use crate::geom::{convex_hull, Polygon};

/// Relative box sizes (fractions of the bounding-box extent), descending.
const BOX_SCALES: [f64; 6] = [0.5, 0.25, 0.125, 0.0625, 0.03125, 0.015625];
/// Boundary samples per smallest box.
const SAMPLES_PER_BOX: f64 = 4.0;

const W_IOU: f64 = 0.3;
const W_DICE: f64 = 0.2;
const W_HAUSDORFF: f64 = 0.2;
const W_DESCRIPTOR: f64 = 0.3;

/// Per-ring feature record.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ShapeFeatures {
    pub area: f64,
    pub perimeter: f64,
    /// `4π·area / perimeter²` (1 for a disc).
    pub compactness: f64,
    /// `area / convex hull area`.
    pub convexity: f64,
    /// `var(edge lengths) / mean(edge lengths)²`.
    pub roughness: f64,
    pub fractal_dimension: f64,
}

impl ShapeFeatures {
    /// `[area, perimeter, compactness, convexity, roughness]`.
    pub fn descriptor(&self) -> [f64; 5] {
        [
            self.area,
            self.perimeter,
            self.compactness,
            self.convexity,
            self.roughness,
        ]
    }
}

/// Compute the feature record of one ring.
pub fn shape_features(poly: &Polygon) -> ShapeFeatures {
    let mut f = descriptor_features(poly);
    f.fractal_dimension = boundary_fractal_score(poly);
    f
}

fn descriptor_features(poly: &Polygon) -> ShapeFeatures {
    let area = poly.area();
    let perimeter = poly.perimeter();
    let compactness = if perimeter > 0.0 {
        4.0 * std::f64::consts::PI * area / (perimeter * perimeter)
    } else {
        0.0
    };
    let hull_area = convex_hull(&poly.pts).area();
    let convexity = if hull_area > 0.0 { area / hull_area } else { 0.0 };
    let edges = poly.edge_lengths();
    let roughness = if edges.is_empty() {
        0.0
    } else {
        let n = edges.len() as f64;
        let mean = edges.iter().sum::<f64>() / n;
        let var = edges.iter().map(|e| (e - mean).powi(2)).sum::<f64>() / n;
        if mean > 0.0 {
            var / (mean * mean)
        } else {
            0.0
        }
    };
    ShapeFeatures {
        area,
        perimeter,
        compactness,
        convexity,
        roughness,
        fractal_dimension: 1.0,
    }
}

/// Box-counting dimension of the boundary.
///
/// Samples the boundary densely, counts occupied boxes for each scale in
/// `BOX_SCALES` and returns `|slope|` of the least-squares fit of `ln(count)`
/// against `ln(1/scale)`. Rings with fewer than 4 vertices, or with zero extent,
/// return 1.0.
pub fn boundary_fractal_score(poly: &Polygon) -> f64 {
    if poly.len() < 4 {
        return 1.0;
    }
    let Some(bbox) = poly.bbox() else {
        return 1.0;
    };
    let extent = bbox.extent();
    if !(extent > 0.0) {
        return 1.0;
    }

    let step = extent * BOX_SCALES[BOX_SCALES.len() - 1] / SAMPLES_PER_BOX;
    let mut samples = Vec::new();
    for (p, q) in poly.edges() {
        let m = ((q - p).norm() / step).ceil().max(1.0) as usize;
        for i in 0..m {
            samples.push(p + (q - p) * (i as f64 / m as f64));
        }
    }

    let mut xs = Vec::with_capacity(BOX_SCALES.len());
    let mut ys = Vec::with_capacity(BOX_SCALES.len());
    for scale in BOX_SCALES {
        let size = extent * scale;
        let boxes: HashSet<(i64, i64)> = samples
            .iter()
            .map(|s| {
                (
                    ((s.x - bbox.min.x) / size).floor() as i64,
                    ((s.y - bbox.min.y) / size).floor() as i64,
                )
            })
            .collect();
        xs.push((1.0 / scale).ln());
        ys.push((boxes.len() as f64).ln());
    }
    least_squares_slope(&xs, &ys).abs()
}

fn least_squares_slope(xs: &[f64], ys: &[f64]) -> f64 {
    let n = xs.len() as f64;
    let mx = xs.iter().sum::<f64>() / n;
    let my = ys.iter().sum::<f64>() / n;
    let mut sxy = 0.0;
    let mut sxx = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        sxy += (x - mx) * (y - my);
        sxx += (x - mx) * (x - mx);
    }
    if sxx > 0.0 {
        sxy / sxx
    } else {
        0.0
    }
}

fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let na = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let nb = b.iter().map(|x| x * x).sum::<f64>().sqrt();
    match (na > 0.0, nb > 0.0) {
        (false, false) => 1.0,
        (true, true) => (dot / (na * nb)).clamp(-1.0, 1.0),
        _ => 0.0,
    }
}

/// Weighted blend in [0, 1]:
/// `0.3·IoU + 0.2·Dice + 0.2·1/(1+Hausdorff) + 0.3·cos(descA, descB)`.
pub fn polygon_similarity_composite(a: &Polygon, b: &Polygon) -> f64 {
    let iou = calculate_iou(a, b);
    let dice = dice_coefficient(a, b);
    let h = hausdorff_distance(a, b);
    let h_term = if h.is_finite() { 1.0 / (1.0 + h) } else { 0.0 };
    let da = descriptor_features(a).descriptor();
    let db = descriptor_features(b).descriptor();
    let cos = cosine_similarity(&da, &db);
    W_IOU * iou + W_DICE * dice + W_HAUSDORFF * h_term + W_DESCRIPTOR * cos
}
