//! Polygon similarity and matching.
//!
//! Turns per-source embedding sets into 2D outlines, compares outlines pairwise
//! and ranks correspondences between sources.
//!
//! Layout (leaf first)
//! - `geom`: points, polygons, convex/concave hulls, clipping, raster IoU.
//! - `metrics`: shape distances/overlaps, descriptors, pairwise matrices.
//! - `align`: L2 normalization, whitening, 2D PCA, Procrustes.
//! - `matching`: greedy bipartite assignment and k-NN ranking.
//! - `pipeline`: the two entry points, `build_polygons` and `compare_polygons`.
//!
//! Every function is pure and synchronous; nothing here performs I/O or keeps
//! process-wide state. Embedding providers and hull stores are traits the caller
//! implements.

pub mod align;
pub mod cfg;
pub mod geom;
pub mod matching;
pub mod metrics;
pub mod pipeline;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use nalgebra::Vector2 as Vec2;

/// Common exports for quick imports in callers.
pub mod prelude {
    pub use crate::align::{
        l2_normalize, pca2d, procrustes_align, z_whiten, AlignError, Pca2, Procrustes,
    };
    pub use crate::geom::{
        clip, concave_hull_knn, convex_hull, intersection_area, iou_raster, Bbox, Point,
        Polygon, RasterGrid,
    };
    pub use crate::matching::{
        constrained_assignment, greedy_bipartite_assignment, knn_by, match_greedy_knn,
        match_vectors_knn, rank_by_matrix, AssignmentConstraint, Candidate, MatchResult,
        Strategy,
    };
    pub use crate::metrics::{
        boundary_fractal_score, calculate_iou, centroid_distance, chamfer_distance,
        dice_coefficient, hausdorff_distance, overlap_matrix_iou, pairwise_metric_matrix,
        polygon_similarity_composite, shape_features, Metric, MetricMatrix, PairwiseMetric,
        ShapeFeatures,
    };
    pub use crate::pipeline::{
        build_polygons, compare_polygons, compare_with_metric, BuildReport, CompareReport,
        EmbeddingProvider, EmbeddingSet, FeatureMap, HullMap, HullStore, MemoryStore,
        PipelineCfg, PipelineError,
    };
}
