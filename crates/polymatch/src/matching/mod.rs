//! Correspondences between sources.
//!
//! - `greedy_bipartite_assignment`: row-order greedy approximation of a minimum
//!   cost assignment. It is *not* the Hungarian algorithm: each row takes the
//!   cheapest column still free, so the total cost can exceed the optimum.
//!   Callers that need optimality must use an exact solver.
//! - `AssignmentConstraint`: pre-filters that mark cost cells as forbidden
//!   (`+∞`) before the greedy pass.
//! - `match_greedy_knn` / `knn_by` / `match_vectors_knn`: nearest-`k` ranking
//!   with `score = 1 / (1 + distance)`.
//! - `rank_by_matrix`: ranked candidates from a pairwise metric matrix.

use std::collections::BTreeMap;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::geom::Polygon;
use crate::metrics::{centroid_distance, Metric, MetricFamily, MetricMatrix};

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Candidate {
    pub target: String,
    pub score: f64,
}

/// How a `MatchResult` was produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Strategy {
    /// Centroid distance between hulls.
    GreedyKnn,
    /// Euclidean distance between raw vectors.
    VectorKnn,
    /// Row of a pairwise metric matrix.
    MetricRank(Metric),
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::GreedyKnn => write!(f, "greedy_knn"),
            Strategy::VectorKnn => write!(f, "vector_knn"),
            Strategy::MetricRank(m) => write!(f, "metric_rank:{}", m),
        }
    }
}

/// Ranked candidates for one source; best first.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MatchResult {
    pub source: String,
    pub candidates: Vec<Candidate>,
    pub strategy: Strategy,
    /// Targets that were compared, before truncation to `k`.
    pub total_candidates: usize,
}

impl MatchResult {
    pub fn best(&self) -> Option<&Candidate> {
        self.candidates.first()
    }
}

/// For each row in order, take the lowest-cost unused column.
///
/// Non-finite cells (and cells missing from short rows) are forbidden. Rows
/// left without a column are `None`. Ties go to the lower column index.
pub fn greedy_bipartite_assignment(cost: &[Vec<f64>]) -> Vec<Option<usize>> {
    let ncols = cost.iter().map(Vec::len).max().unwrap_or(0);
    let mut used = vec![false; ncols];
    cost.iter()
        .map(|row| {
            let pick = row
                .iter()
                .enumerate()
                .filter(|(j, c)| !used[*j] && c.is_finite())
                .min_by(|a, b| a.1.total_cmp(b.1))
                .map(|(j, _)| j);
            if let Some(j) = pick {
                used[j] = true;
            }
            pick
        })
        .collect()
}

/// Cost-matrix pre-filter.
#[derive(Clone, Debug, PartialEq)]
pub enum AssignmentConstraint {
    /// Row `i` may only take column `j` when `rows[i] == cols[j]`.
    EqualCategory { rows: Vec<String>, cols: Vec<String> },
    /// Cells above the bound are forbidden.
    MaxCost(f64),
}

impl AssignmentConstraint {
    /// Mark forbidden cells as `+∞`.
    pub fn apply(&self, cost: &mut [Vec<f64>]) {
        match self {
            AssignmentConstraint::EqualCategory { rows, cols } => {
                for (i, row) in cost.iter_mut().enumerate() {
                    for (j, c) in row.iter_mut().enumerate() {
                        let same = matches!(
                            (rows.get(i), cols.get(j)),
                            (Some(a), Some(b)) if a == b
                        );
                        if !same {
                            *c = f64::INFINITY;
                        }
                    }
                }
            }
            AssignmentConstraint::MaxCost(bound) => {
                for c in cost.iter_mut().flat_map(|row| row.iter_mut()) {
                    if *c > *bound {
                        *c = f64::INFINITY;
                    }
                }
            }
        }
    }
}

/// Apply every constraint to a copy of `cost`, then run the greedy pass.
pub fn constrained_assignment(
    cost: &[Vec<f64>],
    constraints: &[AssignmentConstraint],
) -> Vec<Option<usize>> {
    let mut filtered = cost.to_vec();
    for c in constraints {
        c.apply(&mut filtered);
    }
    greedy_bipartite_assignment(&filtered)
}

/// Generic nearest-`k` ranking.
///
/// Every source is compared with every target of a different key. Targets at a
/// non-finite distance are dropped; the rest are sorted by ascending distance
/// (stable, so ties keep target order) and truncated to `k`.
pub fn knn_by<'a, T, I, J, F>(
    sources: I,
    targets: J,
    k: usize,
    strategy: Strategy,
    distance: F,
) -> Vec<MatchResult>
where
    T: ?Sized + 'a,
    I: IntoIterator<Item = (&'a str, &'a T)>,
    J: IntoIterator<Item = (&'a str, &'a T)>,
    F: Fn(&T, &T) -> f64,
{
    let targets: Vec<(&str, &T)> = targets.into_iter().collect();
    sources
        .into_iter()
        .map(|(key, s)| {
            let mut ranked: Vec<(&str, f64)> = Vec::new();
            let mut total = 0;
            for &(tkey, t) in targets.iter().filter(|(tkey, _)| *tkey != key) {
                total += 1;
                let d = distance(s, t);
                if d.is_finite() {
                    ranked.push((tkey, d));
                }
            }
            ranked.sort_by(|a, b| a.1.total_cmp(&b.1));
            ranked.truncate(k);
            MatchResult {
                source: key.to_string(),
                candidates: ranked
                    .into_iter()
                    .map(|(target, d)| Candidate {
                        target: target.to_string(),
                        score: 1.0 / (1.0 + d),
                    })
                    .collect(),
                strategy,
                total_candidates: total,
            }
        })
        .collect()
}

/// Per source hull, the `k` targets with the nearest centroids.
///
/// A target whose key equals the source key is never a candidate, also when
/// `sources` and `targets` are different maps; keys identify one entity.
pub fn match_greedy_knn(
    sources: &BTreeMap<String, Polygon>,
    targets: &BTreeMap<String, Polygon>,
    k: usize,
) -> Vec<MatchResult> {
    knn_by(
        sources.iter().map(|(key, p)| (key.as_str(), p)),
        targets.iter().map(|(key, p)| (key.as_str(), p)),
        k,
        Strategy::GreedyKnn,
        centroid_distance,
    )
}

/// Euclidean nearest-`k` over raw vectors; mismatched lengths never match.
/// Same-key targets are skipped as in `match_greedy_knn`.
pub fn match_vectors_knn(
    sources: &[(String, Vec<f64>)],
    targets: &[(String, Vec<f64>)],
    k: usize,
) -> Vec<MatchResult> {
    knn_by(
        sources.iter().map(|(key, v)| (key.as_str(), v.as_slice())),
        targets.iter().map(|(key, v)| (key.as_str(), v.as_slice())),
        k,
        Strategy::VectorKnn,
        euclidean,
    )
}

fn euclidean(a: &[f64], b: &[f64]) -> f64 {
    if a.len() != b.len() {
        return f64::INFINITY;
    }
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}

/// One `MatchResult` per matrix row, best first, diagonal excluded.
///
/// Similarity metrics rank by value; distance metrics by `1 / (1 + d)`.
/// Non-finite cells are dropped. `top_k = None` keeps every candidate.
pub fn rank_by_matrix(matrix: &MetricMatrix, top_k: Option<usize>) -> Vec<MatchResult> {
    let family = matrix.metric.family();
    matrix
        .keys
        .iter()
        .enumerate()
        .map(|(i, key)| {
            let row = &matrix.values[i];
            let mut candidates: Vec<Candidate> = row
                .iter()
                .enumerate()
                .filter(|&(j, v)| j != i && v.is_finite())
                .map(|(j, &v)| Candidate {
                    target: matrix.keys[j].clone(),
                    score: match family {
                        MetricFamily::Similarity => v,
                        MetricFamily::Distance => 1.0 / (1.0 + v),
                    },
                })
                .collect();
            candidates.sort_by(|a, b| b.score.total_cmp(&a.score));
            if let Some(k) = top_k {
                candidates.truncate(k);
            }
            MatchResult {
                source: key.clone(),
                candidates,
                strategy: Strategy::MetricRank(matrix.metric),
                total_candidates: row.len().saturating_sub(1),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests;
