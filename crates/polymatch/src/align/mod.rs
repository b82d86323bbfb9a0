//! Vector alignment: embedding sets → a shared 2D frame.
//!
//! Steps used by the build pipeline, in order:
//! - `l2_normalize`: unit norm per vector (zero vectors stay zero).
//! - `z_whiten`: per-dimension standardization; a dimension with zero spread is
//!   centred but left unscaled.
//! - `procrustes_align`: similarity transform (rotation, uniform scale,
//!   translation) mapping a set onto the reference frame through anchor pairs.
//! - `Pca2`: top-2 principal axes, fitted once and reused across sets.
//!
//! Inputs are `&[Vec<f64>]`; outputs are always new vectors. Shape problems
//! (empty sets, ragged rows, NaN, mismatched anchors) are reported as
//! `AlignError`, never turned into geometry.

use std::fmt;

mod pca;
mod procrustes;

pub use pca::{pca2d, Pca2};
pub use procrustes::{procrustes_align, Procrustes};

/// Spread below which a dimension counts as constant.
const STD_EPS: f64 = 1e-12;

#[derive(Clone, Debug, PartialEq)]
pub enum AlignError {
    /// The vector set has no rows.
    EmptySet,
    /// Vectors have zero components.
    ZeroDimension,
    /// Row `index` has `found` components where `expected` were required.
    RaggedVectors {
        index: usize,
        expected: usize,
        found: usize,
    },
    /// Row `index` contains NaN or ±∞.
    NonFinite { index: usize },
    /// Source and reference vectors live in different dimensions.
    DimensionMismatch { source: usize, reference: usize },
    /// Source and reference anchor lists differ in length.
    AnchorCountMismatch { source: usize, reference: usize },
    /// Fewer than two anchor pairs.
    TooFewAnchors { found: usize },
    /// Anchors collapse to a single point, or the decomposition failed.
    Degenerate(&'static str),
}

impl fmt::Display for AlignError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlignError::EmptySet => write!(f, "vector set is empty"),
            AlignError::ZeroDimension => write!(f, "vectors have zero dimensions"),
            AlignError::RaggedVectors {
                index,
                expected,
                found,
            } => write!(
                f,
                "vector {} has {} components, expected {} (ragged input)",
                index, found, expected
            ),
            AlignError::NonFinite { index } => {
                write!(f, "vector {} contains a non-finite component", index)
            }
            AlignError::DimensionMismatch { source, reference } => write!(
                f,
                "dimension mismatch: source vectors have {} components, reference vectors {}",
                source, reference
            ),
            AlignError::AnchorCountMismatch { source, reference } => write!(
                f,
                "anchor count mismatch: {} source anchors vs {} reference anchors",
                source, reference
            ),
            AlignError::TooFewAnchors { found } => {
                write!(f, "alignment needs at least 2 anchors, got {}", found)
            }
            AlignError::Degenerate(what) => write!(f, "degenerate alignment input: {}", what),
        }
    }
}

impl std::error::Error for AlignError {}

/// Check that `vectors` is non-empty, rectangular and finite; returns the dimension.
pub(crate) fn validate(vectors: &[Vec<f64>]) -> Result<usize, AlignError> {
    let first = vectors.first().ok_or(AlignError::EmptySet)?;
    let dim = first.len();
    if dim == 0 {
        return Err(AlignError::ZeroDimension);
    }
    for (index, v) in vectors.iter().enumerate() {
        if v.len() != dim {
            return Err(AlignError::RaggedVectors {
                index,
                expected: dim,
                found: v.len(),
            });
        }
        if v.iter().any(|x| !x.is_finite()) {
            return Err(AlignError::NonFinite { index });
        }
    }
    Ok(dim)
}

/// Scale every vector to unit Euclidean norm; zero vectors are returned as-is.
pub fn l2_normalize(vectors: &[Vec<f64>]) -> Vec<Vec<f64>> {
    vectors
        .iter()
        .map(|v| {
            let norm = v.iter().map(|x| x * x).sum::<f64>().sqrt();
            if norm > 0.0 {
                v.iter().map(|x| x / norm).collect()
            } else {
                v.clone()
            }
        })
        .collect()
}

/// Per-dimension `(x - mean) / std` with the population standard deviation.
///
/// Constant dimensions (std ≈ 0) are centred only, so they come out as zeros
/// instead of NaN.
pub fn z_whiten(vectors: &[Vec<f64>]) -> Result<Vec<Vec<f64>>, AlignError> {
    let dim = validate(vectors)?;
    let n = vectors.len() as f64;
    let mut mean = vec![0.0; dim];
    for v in vectors {
        for (m, x) in mean.iter_mut().zip(v) {
            *m += x;
        }
    }
    mean.iter_mut().for_each(|m| *m /= n);

    let mut std = vec![0.0; dim];
    for v in vectors {
        for ((s, x), m) in std.iter_mut().zip(v).zip(&mean) {
            *s += (x - m) * (x - m);
        }
    }
    std.iter_mut().for_each(|s| *s = (*s / n).sqrt());

    Ok(vectors
        .iter()
        .map(|v| {
            v.iter()
                .zip(&mean)
                .zip(&std)
                .map(|((x, m), s)| if *s > STD_EPS { (x - m) / s } else { x - m })
                .collect()
        })
        .collect())
}
