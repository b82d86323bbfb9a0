//! Pairwise metric matrices.
//!
//! The upper triangle is partitioned over the rayon pool; each unordered pair is
//! evaluated exactly once and mirrored. The diagonal is never evaluated: it is
//! fixed to the metric family's self value (1.0 for similarities, 0.0 for
//! distances).

use std::fmt;
use std::str::FromStr;

use rayon::prelude::*;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::{
    calculate_iou, centroid_distance, chamfer_distance, dice_coefficient, hausdorff_distance,
    polygon_similarity_composite,
};
use crate::geom::{Polygon, RasterGrid};

/// Metrics that can fill a pairwise matrix.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Metric {
    Iou,
    Dice,
    Composite,
    Hausdorff,
    Chamfer,
    Centroid,
}

/// Similarity metrics have self value 1.0; distance metrics 0.0.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MetricFamily {
    Similarity,
    Distance,
}

impl Metric {
    pub const ALL: [Metric; 6] = [
        Metric::Iou,
        Metric::Dice,
        Metric::Composite,
        Metric::Hausdorff,
        Metric::Chamfer,
        Metric::Centroid,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Metric::Iou => "iou",
            Metric::Dice => "dice",
            Metric::Composite => "composite",
            Metric::Hausdorff => "hausdorff",
            Metric::Chamfer => "chamfer",
            Metric::Centroid => "centroid",
        }
    }

    pub fn family(&self) -> MetricFamily {
        match self {
            Metric::Iou | Metric::Dice | Metric::Composite => MetricFamily::Similarity,
            Metric::Hausdorff | Metric::Chamfer | Metric::Centroid => MetricFamily::Distance,
        }
    }

    /// Diagonal value of a pairwise matrix.
    #[inline]
    pub fn self_value(&self) -> f64 {
        match self.family() {
            MetricFamily::Similarity => 1.0,
            MetricFamily::Distance => 0.0,
        }
    }

    /// Evaluate on one pair.
    pub fn eval(&self, a: &Polygon, b: &Polygon) -> f64 {
        match self {
            Metric::Iou => calculate_iou(a, b),
            Metric::Dice => dice_coefficient(a, b),
            Metric::Composite => polygon_similarity_composite(a, b),
            Metric::Hausdorff => hausdorff_distance(a, b),
            Metric::Chamfer => chamfer_distance(a, b),
            Metric::Centroid => centroid_distance(a, b),
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

/// Unknown metric name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MetricParseError {
    pub name: String,
}

impl fmt::Display for MetricParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown metric '{}' (expected one of: iou, dice, composite, hausdorff, chamfer, centroid)",
            self.name
        )
    }
}

impl std::error::Error for MetricParseError {}

impl FromStr for Metric {
    type Err = MetricParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "iou" | "jaccard" => Ok(Metric::Iou),
            "dice" => Ok(Metric::Dice),
            "composite" | "similarity" => Ok(Metric::Composite),
            "hausdorff" => Ok(Metric::Hausdorff),
            "chamfer" => Ok(Metric::Chamfer),
            "centroid" | "centroid_distance" => Ok(Metric::Centroid),
            _ => Err(MetricParseError { name: s.to_string() }),
        }
    }
}

/// One cell of a keyed matrix.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PairwiseMetric {
    pub a: String,
    pub b: String,
    pub value: f64,
}

/// Symmetric matrix keyed by source.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MetricMatrix {
    pub metric: Metric,
    pub keys: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

impl MetricMatrix {
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn index_of(&self, key: &str) -> Option<usize> {
        self.keys.iter().position(|k| k == key)
    }

    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        Some(self.values[self.index_of(a)?][self.index_of(b)?])
    }

    /// Upper-triangle cells in row-major order.
    pub fn pairs(&self) -> Vec<PairwiseMetric> {
        upper_pairs(self.keys.len())
            .into_iter()
            .map(|(i, j)| PairwiseMetric {
                a: self.keys[i].clone(),
                b: self.keys[j].clone(),
                value: self.values[i][j],
            })
            .collect()
    }
}

fn upper_pairs(n: usize) -> Vec<(usize, usize)> {
    (0..n)
        .flat_map(|i| ((i + 1)..n).map(move |j| (i, j)))
        .collect()
}

fn assemble(n: usize, diag: f64, cells: Vec<((usize, usize), f64)>) -> Vec<Vec<f64>> {
    let mut matrix = vec![vec![0.0; n]; n];
    for (i, row) in matrix.iter_mut().enumerate() {
        row[i] = diag;
    }
    for ((i, j), v) in cells {
        matrix[i][j] = v;
        matrix[j][i] = v;
    }
    matrix
}

/// `n × n` matrix of `metric` over `polygons`.
pub fn pairwise_metric_matrix(polygons: &[Polygon], metric: Metric) -> Vec<Vec<f64>> {
    let n = polygons.len();
    if n == 0 {
        return Vec::new();
    }
    let cells: Vec<((usize, usize), f64)> = upper_pairs(n)
        .par_iter()
        .map(|&(i, j)| ((i, j), metric.eval(&polygons[i], &polygons[j])))
        .collect();
    assemble(n, metric.self_value(), cells)
}

/// Raster-IoU matrix; each worker reuses one `RasterGrid` at `resolution`.
pub fn overlap_matrix_iou(polygons: &[Polygon], resolution: usize) -> Vec<Vec<f64>> {
    let n = polygons.len();
    if n == 0 {
        return Vec::new();
    }
    let cells: Vec<((usize, usize), f64)> = upper_pairs(n)
        .par_iter()
        .map_init(
            || RasterGrid::new(resolution),
            |grid, &(i, j)| ((i, j), grid.iou(&polygons[i], &polygons[j])),
        )
        .collect();
    assemble(n, Metric::Iou.self_value(), cells)
}
