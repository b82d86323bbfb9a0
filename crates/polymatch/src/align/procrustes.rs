//! Orthogonal Procrustes with uniform scale.
//!
//! Given anchor pairs `(x_i, y_i)` find `s, R, t` minimizing
//! `Σ ‖y_i - (s·R·x_i + t)‖²` with `R` a proper rotation (`det R = +1`).
//!
//! With centred anchors `Xc`, `Yc` and `M = Ycᵀ·Xc = U·Σ·Vᵀ`:
//! - `R = U·D·Vᵀ`, `D = diag(1, …, 1, det(U·Vᵀ))` where the sign lands on the
//!   smallest singular value;
//! - `s = tr(Σ·D) / ‖Xc‖²`;
//! - `t = ȳ - s·R·x̄`.

use nalgebra::{DMatrix, DVector};

use super::{validate, AlignError};

/// A similarity transform `y = scale · rotation · x + translation`.
#[derive(Clone, Debug, PartialEq)]
pub struct Procrustes {
    pub rotation: DMatrix<f64>,
    pub scale: f64,
    pub translation: DVector<f64>,
}

impl Procrustes {
    pub fn dim(&self) -> usize {
        self.translation.len()
    }

    /// Map one vector; its length must match the fit.
    pub fn map(&self, v: &[f64]) -> Result<Vec<f64>, AlignError> {
        if v.len() != self.dim() {
            return Err(AlignError::DimensionMismatch {
                source: v.len(),
                reference: self.dim(),
            });
        }
        Ok(self.apply(v))
    }

    fn apply(&self, v: &[f64]) -> Vec<f64> {
        let x = DVector::from_column_slice(v);
        let y = &self.rotation * x * self.scale + &self.translation;
        y.iter().copied().collect()
    }

    /// Map every vector of a set; the dimension must match the fit.
    pub fn map_all(&self, vectors: &[Vec<f64>]) -> Result<Vec<Vec<f64>>, AlignError> {
        let dim = validate(vectors)?;
        if dim != self.dim() {
            return Err(AlignError::DimensionMismatch {
                source: dim,
                reference: self.dim(),
            });
        }
        Ok(vectors.iter().map(|v| self.apply(v)).collect())
    }
}

/// Fit the transform that carries `source` anchors onto `reference` anchors.
///
/// Both lists must hold the same number (≥ 2) of finite vectors of equal
/// dimension. Anchors that collapse to one point are rejected as degenerate.
pub fn procrustes_align(
    source: &[Vec<f64>],
    reference: &[Vec<f64>],
) -> Result<Procrustes, AlignError> {
    if source.len() != reference.len() {
        return Err(AlignError::AnchorCountMismatch {
            source: source.len(),
            reference: reference.len(),
        });
    }
    if source.len() < 2 {
        return Err(AlignError::TooFewAnchors {
            found: source.len(),
        });
    }
    let ds = validate(source)?;
    let dr = validate(reference)?;
    if ds != dr {
        return Err(AlignError::DimensionMismatch {
            source: ds,
            reference: dr,
        });
    }
    let (n, d) = (source.len(), ds);

    let x = DMatrix::from_fn(n, d, |i, j| source[i][j]);
    let y = DMatrix::from_fn(n, d, |i, j| reference[i][j]);
    let mx = DVector::from_fn(d, |j, _| x.column(j).sum() / n as f64);
    let my = DVector::from_fn(d, |j, _| y.column(j).sum() / n as f64);
    let xc = DMatrix::from_fn(n, d, |i, j| x[(i, j)] - mx[j]);
    let yc = DMatrix::from_fn(n, d, |i, j| y[(i, j)] - my[j]);

    let norm_x = xc.norm_squared();
    if !(norm_x > 0.0) {
        return Err(AlignError::Degenerate("source anchors coincide"));
    }

    let m = yc.transpose() * &xc;
    let svd = m.svd(true, true);
    let (Some(u), Some(v_t)) = (svd.u, svd.v_t) else {
        return Err(AlignError::Degenerate("SVD did not converge"));
    };
    let sigma = svd.singular_values;

    let mut signs = DVector::from_element(d, 1.0);
    if (&u * &v_t).determinant() < 0.0 {
        let weakest = sigma
            .iter()
            .enumerate()
            .min_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i)
            .unwrap_or(d - 1);
        signs[weakest] = -1.0;
    }
    let rotation = &u * DMatrix::from_diagonal(&signs) * &v_t;
    let scale = sigma.component_mul(&signs).sum() / norm_x;
    let translation = &my - &rotation * &mx * scale;

    if !scale.is_finite() || rotation.iter().any(|v| !v.is_finite()) {
        return Err(AlignError::Degenerate("non-finite transform"));
    }
    Ok(Procrustes {
        rotation,
        scale,
        translation,
    })
}
