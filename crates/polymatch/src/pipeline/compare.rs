use tracing::info;

use super::{CompareReport, HullMap, PipelineCfg};
use crate::geom::Polygon;
use crate::matching::rank_by_matrix;
use crate::metrics::{overlap_matrix_iou, pairwise_metric_matrix, Metric, MetricMatrix};

/// Pairwise raster IoU at `cfg.iou_resolution`, ranked per source.
pub fn compare_polygons(hulls: &HullMap, cfg: &PipelineCfg) -> CompareReport {
    let (keys, polys) = split(hulls);
    let values = overlap_matrix_iou(&polys, cfg.iou_resolution);
    finish(Metric::Iou, keys, values, cfg)
}

/// Same as `compare_polygons` for any metric (IoU here uses `calculate_iou`:
/// exact on convex pairs, raster otherwise).
pub fn compare_with_metric(hulls: &HullMap, metric: Metric, cfg: &PipelineCfg) -> CompareReport {
    let (keys, polys) = split(hulls);
    let values = pairwise_metric_matrix(&polys, metric);
    finish(metric, keys, values, cfg)
}

fn split(hulls: &HullMap) -> (Vec<String>, Vec<Polygon>) {
    hulls.iter().map(|(k, p)| (k.clone(), p.clone())).unzip()
}

fn finish(
    metric: Metric,
    keys: Vec<String>,
    values: Vec<Vec<f64>>,
    cfg: &PipelineCfg,
) -> CompareReport {
    let matrix = MetricMatrix {
        metric,
        keys,
        values,
    };
    let matches = rank_by_matrix(&matrix, cfg.top_k);
    info!(
        sources = matrix.len(),
        pairs = matrix.len() * matrix.len().saturating_sub(1) / 2,
        metric = %metric,
        "compare finished"
    );
    CompareReport { matrix, matches }
}
