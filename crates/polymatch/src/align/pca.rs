//! Two-component PCA.

use nalgebra::{DMatrix, DVector, SymmetricEigen};

use super::{validate, AlignError};
use crate::geom::Point;

/// A fitted 2D projection: `p = axes · (x - mean)`.
///
/// Inputs of dimension ≤ 2 are passed through (1D gets `y = 0`); for higher
/// dimensions the axes are the two leading eigenvectors of the covariance,
/// each flipped so that its largest-magnitude component is positive.
#[derive(Clone, Debug, PartialEq)]
pub struct Pca2 {
    mean: DVector<f64>,
    /// 2 × d, rows are the axes.
    axes: DMatrix<f64>,
    /// Variance captured by each axis (zeros on passthrough).
    variance: [f64; 2],
}

impl Pca2 {
    pub fn fit(vectors: &[Vec<f64>]) -> Result<Self, AlignError> {
        let dim = validate(vectors)?;
        if dim <= 2 {
            let mut axes = DMatrix::<f64>::zeros(2, dim);
            for i in 0..dim {
                axes[(i, i)] = 1.0;
            }
            return Ok(Pca2 {
                mean: DVector::zeros(dim),
                axes,
                variance: [0.0; 2],
            });
        }

        let n = vectors.len();
        let x = DMatrix::from_fn(n, dim, |i, j| vectors[i][j]);
        let mean = DVector::from_fn(dim, |j, _| x.column(j).sum() / n as f64);
        let xc = DMatrix::from_fn(n, dim, |i, j| x[(i, j)] - mean[j]);
        let cov = xc.transpose() * &xc / n as f64;
        let eig = SymmetricEigen::new(cov);

        let mut order: Vec<usize> = (0..dim).collect();
        order.sort_by(|&a, &b| eig.eigenvalues[b].total_cmp(&eig.eigenvalues[a]));

        let mut axes = DMatrix::<f64>::zeros(2, dim);
        let mut variance = [0.0; 2];
        for (r, &c) in order.iter().take(2).enumerate() {
            let mut axis = eig.eigenvectors.column(c).clone_owned();
            let lead = axis
                .iter()
                .fold(0.0_f64, |acc, v| if v.abs() > acc.abs() { *v } else { acc });
            if lead < 0.0 {
                axis.neg_mut();
            }
            axes.row_mut(r).copy_from(&axis.transpose());
            variance[r] = eig.eigenvalues[c].max(0.0);
        }
        Ok(Pca2 {
            mean,
            axes,
            variance,
        })
    }

    /// Input dimension the basis was fitted on.
    pub fn dim(&self) -> usize {
        self.mean.len()
    }

    pub fn explained_variance(&self) -> [f64; 2] {
        self.variance
    }

    pub fn project(&self, vectors: &[Vec<f64>]) -> Result<Vec<Point>, AlignError> {
        let dim = validate(vectors)?;
        if dim != self.dim() {
            return Err(AlignError::DimensionMismatch {
                source: dim,
                reference: self.dim(),
            });
        }
        Ok(vectors
            .iter()
            .map(|v| {
                let centred = DVector::from_column_slice(v) - &self.mean;
                let p = &self.axes * centred;
                Point::new(p[0], p[1])
            })
            .collect())
    }
}

/// Fit and project in one step.
pub fn pca2d(vectors: &[Vec<f64>]) -> Result<Vec<Point>, AlignError> {
    Pca2::fit(vectors)?.project(vectors)
}
