use std::collections::BTreeSet;

use tracing::{debug, info, warn};

use super::{BuildReport, EmbeddingProvider, EmbeddingSet, PipelineCfg, PipelineError};
use crate::align::{l2_normalize, procrustes_align, z_whiten, AlignError, Pca2};
use crate::geom::concave_hull_knn;
use crate::metrics::shape_features;

/// A set after normalize + whiten.
struct Prepared {
    key: String,
    vectors: Vec<Vec<f64>>,
}

/// Build one concave hull per source.
///
/// Per source: fetch → validate → L2 normalize → z-whiten. The first set that
/// survives is the reference; every other set is Procrustes-aligned onto it
/// using its first `min(max_anchors, |set|, |reference|)` items as anchors. A
/// PCA basis fitted on the reference projects every set to 2D, and
/// `concave_hull_knn(…, hull_k)` outlines it.
///
/// A failing source is logged, recorded in `failures` and skipped.
pub fn build_polygons<P, S>(provider: &P, sources: &[S], cfg: &PipelineCfg) -> BuildReport
where
    P: EmbeddingProvider + ?Sized,
    S: AsRef<str>,
{
    let mut report = BuildReport::default();
    let mut seen = BTreeSet::new();
    let mut prepared = Vec::with_capacity(sources.len());

    for source in sources {
        let key = source.as_ref();
        if !seen.insert(key.to_string()) {
            record(&mut report, PipelineError::DuplicateSource { key: key.into() });
            continue;
        }
        match provider.fetch(key).and_then(|set| prepare(key, set)) {
            Ok(p) => {
                debug!(source = key, items = p.vectors.len(), "prepared");
                prepared.push(p);
            }
            Err(e) => record(&mut report, e),
        }
    }

    let Some((reference, rest)) = prepared.split_first() else {
        info!(
            requested = sources.len(),
            failed = report.failures.len(),
            "build finished without a usable source"
        );
        return report;
    };
    report.reference = Some(reference.key.clone());

    let pca = match Pca2::fit(&reference.vectors) {
        Ok(pca) => pca,
        Err(e) => {
            record(&mut report, align_err(&reference.key, e));
            return report;
        }
    };

    let mut frames = vec![(reference.key.as_str(), reference.vectors.clone())];
    for set in rest {
        match align_to(set, reference, cfg.max_anchors) {
            Ok(aligned) => frames.push((set.key.as_str(), aligned)),
            Err(e) => record(&mut report, e),
        }
    }

    for (key, vectors) in frames {
        let points = match pca.project(&vectors) {
            Ok(points) => points,
            Err(e) => {
                record(&mut report, align_err(key, e));
                continue;
            }
        };
        let hull = concave_hull_knn(&points, cfg.hull_k);
        debug!(
            source = key,
            points = points.len(),
            vertices = hull.len(),
            area = hull.area(),
            "hull"
        );
        report.features.insert(key.to_string(), shape_features(&hull));
        report.hulls.insert(key.to_string(), hull);
    }

    info!(
        requested = sources.len(),
        built = report.hulls.len(),
        failed = report.failures.len(),
        reference = reference.key.as_str(),
        "build finished"
    );
    report
}

fn prepare(key: &str, set: EmbeddingSet) -> Result<Prepared, PipelineError> {
    set.validate()?;
    let normalized = l2_normalize(&set.items);
    let vectors = z_whiten(&normalized).map_err(|e| align_err(key, e))?;
    Ok(Prepared {
        key: key.to_string(),
        vectors,
    })
}

fn align_to(
    set: &Prepared,
    reference: &Prepared,
    max_anchors: usize,
) -> Result<Vec<Vec<f64>>, PipelineError> {
    let n = max_anchors
        .min(set.vectors.len())
        .min(reference.vectors.len());
    let map = procrustes_align(&set.vectors[..n], &reference.vectors[..n])
        .map_err(|e| align_err(&set.key, e))?;
    debug!(
        source = set.key.as_str(),
        anchors = n,
        scale = map.scale,
        "aligned"
    );
    map.map_all(&set.vectors).map_err(|e| align_err(&set.key, e))
}

fn align_err(key: &str, error: AlignError) -> PipelineError {
    PipelineError::Align {
        key: key.to_string(),
        error,
    }
}

fn record(report: &mut BuildReport, error: PipelineError) {
    warn!(error = %error, "source skipped");
    report.failures.push(error);
}
