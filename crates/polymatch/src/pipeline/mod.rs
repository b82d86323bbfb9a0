//! End-to-end entry points: build hulls from embedding sets, compare hulls.
//!
//! The core never fetches or stores anything itself; callers plug in an
//! `EmbeddingProvider` and, optionally, a `HullStore`.

use std::collections::BTreeMap;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::align::AlignError;
use crate::cfg::{DEFAULT_HULL_K, DEFAULT_MAX_ANCHORS, DEFAULT_RASTER_RESOLUTION};
use crate::geom::Polygon;
use crate::matching::MatchResult;
use crate::metrics::{Metric, MetricMatrix, ShapeFeatures};

mod build;
mod compare;

pub use build::build_polygons;
pub use compare::{compare_polygons, compare_with_metric};

/// Source key → hull. Ordered so that every run iterates identically.
pub type HullMap = BTreeMap<String, Polygon>;
/// Source key → feature record of its hull.
pub type FeatureMap = BTreeMap<String, ShapeFeatures>;

/// Raw vectors for one source.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EmbeddingSet {
    pub source: String,
    pub items: Vec<Vec<f64>>,
    /// Parallel to `items` when present.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub labels: Option<Vec<String>>,
}

impl EmbeddingSet {
    pub fn new(source: impl Into<String>, items: Vec<Vec<f64>>) -> Self {
        Self {
            source: source.into(),
            items,
            labels: None,
        }
    }

    pub fn with_labels(mut self, labels: Vec<String>) -> Self {
        self.labels = Some(labels);
        self
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Shape check; returns the vector dimension.
    pub fn validate(&self) -> Result<usize, PipelineError> {
        let dim = crate::align::validate(&self.items).map_err(|error| PipelineError::Align {
            key: self.source.clone(),
            error,
        })?;
        if let Some(labels) = &self.labels {
            if labels.len() != self.items.len() {
                return Err(PipelineError::LabelMismatch {
                    key: self.source.clone(),
                    items: self.items.len(),
                    labels: labels.len(),
                });
            }
        }
        Ok(dim)
    }
}

/// Pipeline tunables. Missing fields deserialize to their defaults.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PipelineCfg {
    /// Neighbourhood size of the concave hull walk.
    pub hull_k: usize,
    /// Cap on Procrustes anchors per set.
    pub max_anchors: usize,
    /// Raster resolution for pairwise IoU.
    pub iou_resolution: usize,
    /// Candidates kept per source; `None` keeps all.
    pub top_k: Option<usize>,
    /// Metric used when the caller does not pick one.
    pub metric: Metric,
}

impl Default for PipelineCfg {
    fn default() -> Self {
        Self {
            hull_k: DEFAULT_HULL_K,
            max_anchors: DEFAULT_MAX_ANCHORS,
            iou_resolution: DEFAULT_RASTER_RESOLUTION,
            top_k: None,
            metric: Metric::Iou,
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum PipelineError {
    /// The provider could not deliver a set.
    Provider { key: String, message: String },
    /// A set failed a shape check or could not be aligned.
    Align { key: String, error: AlignError },
    /// `labels` is present but not parallel to `items`.
    LabelMismatch {
        key: String,
        items: usize,
        labels: usize,
    },
    /// The same source was requested twice.
    DuplicateSource { key: String },
    /// A hull store failed to read or write.
    Store { message: String },
}

impl PipelineError {
    pub fn provider(key: impl Into<String>, message: impl fmt::Display) -> Self {
        PipelineError::Provider {
            key: key.into(),
            message: message.to_string(),
        }
    }

    pub fn store(message: impl fmt::Display) -> Self {
        PipelineError::Store {
            message: message.to_string(),
        }
    }

    /// Source this error belongs to, if any.
    pub fn key(&self) -> Option<&str> {
        match self {
            PipelineError::Provider { key, .. }
            | PipelineError::Align { key, .. }
            | PipelineError::LabelMismatch { key, .. }
            | PipelineError::DuplicateSource { key } => Some(key),
            PipelineError::Store { .. } => None,
        }
    }
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::Provider { key, message } => {
                write!(f, "source '{}': provider failed: {}", key, message)
            }
            PipelineError::Align { key, error } => write!(f, "source '{}': {}", key, error),
            PipelineError::LabelMismatch { key, items, labels } => write!(
                f,
                "source '{}': {} labels for {} items",
                key, labels, items
            ),
            PipelineError::DuplicateSource { key } => {
                write!(f, "source '{}' requested more than once", key)
            }
            PipelineError::Store { message } => write!(f, "hull store: {}", message),
        }
    }
}

impl std::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PipelineError::Align { error, .. } => Some(error),
            _ => None,
        }
    }
}

/// Delivers raw vectors for a named source.
pub trait EmbeddingProvider {
    fn fetch(&self, source: &str) -> Result<EmbeddingSet, PipelineError>;
}

impl EmbeddingProvider for BTreeMap<String, EmbeddingSet> {
    fn fetch(&self, source: &str) -> Result<EmbeddingSet, PipelineError> {
        self.get(source)
            .cloned()
            .ok_or_else(|| PipelineError::provider(source, "unknown source"))
    }
}

/// Persistence boundary for built hulls and their feature records.
pub trait HullStore {
    fn save(&mut self, hulls: &HullMap, features: &FeatureMap) -> Result<(), PipelineError>;
    fn load(&self) -> Result<(HullMap, FeatureMap), PipelineError>;
}

/// Store that keeps the last saved maps in memory.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    hulls: HullMap,
    features: FeatureMap,
}

impl HullStore for MemoryStore {
    fn save(&mut self, hulls: &HullMap, features: &FeatureMap) -> Result<(), PipelineError> {
        self.hulls = hulls.clone();
        self.features = features.clone();
        Ok(())
    }

    fn load(&self) -> Result<(HullMap, FeatureMap), PipelineError> {
        Ok((self.hulls.clone(), self.features.clone()))
    }
}

/// Outcome of `build_polygons`. Failures are per source; the other sources
/// are still built.
#[derive(Debug, Default)]
pub struct BuildReport {
    pub hulls: HullMap,
    pub features: FeatureMap,
    /// Name of the set every other set was aligned to.
    pub reference: Option<String>,
    pub failures: Vec<PipelineError>,
}

impl BuildReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Hand hulls and features to a store.
    pub fn persist<S: HullStore + ?Sized>(&self, store: &mut S) -> Result<(), PipelineError> {
        store.save(&self.hulls, &self.features)
    }
}

/// Outcome of `compare_polygons` / `compare_with_metric`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CompareReport {
    pub matrix: MetricMatrix,
    pub matches: Vec<MatchResult>,
}
