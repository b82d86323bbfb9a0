//! Build → store → compare → match, through the public API only.

use polymatch::prelude::*;
use rand::{rngs::StdRng, Rng, SeedableRng};

/// Provider that synthesizes points around a per-source 2D shape and lifts
/// them into 8 dimensions with a fixed linear map.
struct ShapeProvider {
    dim: usize,
}

impl ShapeProvider {
    fn lift(&self, x: f64, y: f64) -> Vec<f64> {
        (0..self.dim)
            .map(|i| {
                let t = i as f64;
                x * (0.3 + 0.1 * t).cos() + y * (0.7 * t).sin() + 0.05 * t
            })
            .collect()
    }
}

/// Items drawn from one shared stream so Procrustes anchors pair up by index.
const SHARED_ITEMS: usize = 60;

impl EmbeddingProvider for ShapeProvider {
    fn fetch(&self, source: &str) -> Result<EmbeddingSet, PipelineError> {
        let (seed, stretch) = match source {
            "disc-1" => (1, 1.0),
            "disc-2" => (2, 1.0),
            "ellipse" => (3, 3.0),
            "offline" => return Err(PipelineError::provider(source, "connection refused")),
            _ => return Err(PipelineError::provider(source, "unknown source")),
        };
        let mut shared = StdRng::seed_from_u64(100);
        let mut own = StdRng::seed_from_u64(seed);
        let items = (0..120)
            .map(|i| {
                let rng = if i < SHARED_ITEMS { &mut shared } else { &mut own };
                let th: f64 = rng.gen::<f64>() * std::f64::consts::TAU;
                let r = rng.gen::<f64>().sqrt();
                self.lift(stretch * r * th.cos(), r * th.sin())
            })
            .collect();
        Ok(EmbeddingSet::new(source, items))
    }
}

#[test]
fn build_store_compare_match() {
    let provider = ShapeProvider { dim: 8 };
    let cfg = PipelineCfg::default();
    let report = build_polygons(&provider, &["disc-1", "offline", "disc-2", "ellipse"], &cfg);

    assert_eq!(report.hulls.len(), 3);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].key(), Some("offline"));
    assert!(report.failures[0].to_string().contains("connection refused"));

    let mut store = MemoryStore::default();
    report.persist(&mut store).unwrap();
    let (hulls, features) = store.load().unwrap();
    assert_eq!(hulls.len(), 3);
    for f in features.values() {
        assert!(f.area > 0.0);
        assert!((0.0..=1.0 + 1e-9).contains(&f.convexity));
        assert!(f.fractal_dimension > 0.0);
    }

    let cmp = compare_polygons(&hulls, &cfg);
    let iou = |a: &str, b: &str| cmp.matrix.get(a, b).unwrap();
    assert_eq!(iou("disc-1", "disc-1"), 1.0);
    assert_eq!(iou("disc-1", "disc-2"), iou("disc-2", "disc-1"));
    // Same disc, half the items in common: the aligned hulls mostly coincide.
    assert!(iou("disc-1", "disc-2") > 0.5, "iou {}", iou("disc-1", "disc-2"));
    let (a1, a2) = (hulls["disc-1"].area(), hulls["disc-2"].area());
    assert!((a1 - a2).abs() < 0.5 * a1, "areas {a1} vs {a2}");

    let pairs = cmp.matrix.pairs();
    assert_eq!(pairs.len(), 3);
    assert!(pairs.iter().all(|p| (0.0..=1.0).contains(&p.value)));

    for m in &cmp.matches {
        assert_eq!(m.total_candidates, 2);
        assert_eq!(m.strategy, Strategy::MetricRank(Metric::Iou));
        assert!(m.candidates.windows(2).all(|w| w[0].score >= w[1].score));
    }

    // Centroid k-NN over the same hulls, then a one-to-one assignment on 1 - IoU.
    let knn = match_greedy_knn(&hulls, &hulls, 1);
    assert!(knn.iter().all(|m| m.candidates.len() == 1));

    let cost: Vec<Vec<f64>> = cmp
        .matrix
        .values
        .iter()
        .enumerate()
        .map(|(i, row)| {
            row.iter()
                .enumerate()
                .map(|(j, v)| if i == j { f64::INFINITY } else { 1.0 - v })
                .collect()
        })
        .collect();
    let assignment = greedy_bipartite_assignment(&cost);
    assert_eq!(assignment.len(), 3);
    assert!(assignment.iter().enumerate().all(|(i, a)| *a != Some(i)));
}

#[test]
fn compare_with_every_metric() {
    let provider = ShapeProvider { dim: 8 };
    let cfg = PipelineCfg {
        top_k: Some(1),
        ..Default::default()
    };
    let report = build_polygons(&provider, &["disc-1", "disc-2", "ellipse"], &cfg);
    for metric in Metric::ALL {
        let cmp = compare_with_metric(&report.hulls, metric, &cfg);
        assert_eq!(cmp.matrix.metric, metric);
        assert_eq!(cmp.matrix.len(), 3);
        for m in &cmp.matches {
            assert!(m.candidates.len() <= 1);
            assert!(m.candidates.iter().all(|c| (0.0..=1.0).contains(&c.score)));
        }
    }
}
