use super::*;
use crate::metrics::pairwise_metric_matrix;

fn square_at(x: f64, y: f64) -> Polygon {
    Polygon::from_xy(&[(x, y), (x + 1.0, y), (x + 1.0, y + 1.0), (x, y + 1.0)])
}

fn hulls(entries: &[(&str, Polygon)]) -> BTreeMap<String, Polygon> {
    entries
        .iter()
        .map(|(k, p)| (k.to_string(), p.clone()))
        .collect()
}

#[test]
fn greedy_assignment_row_order() {
    let cost = vec![
        vec![4.0, 1.0, 3.0],
        vec![2.0, 0.0, 5.0],
        vec![3.0, 2.0, 2.0],
    ];
    // Row 0 takes column 1 first, so row 1 cannot; greedy, not optimal.
    assert_eq!(
        greedy_bipartite_assignment(&cost),
        vec![Some(1), Some(0), Some(2)]
    );
}

#[test]
fn greedy_assignment_unmatched_rows_and_forbidden_cells() {
    let cost = vec![
        vec![1.0, f64::INFINITY],
        vec![0.5, f64::NAN],
        vec![2.0, 3.0],
    ];
    assert_eq!(
        greedy_bipartite_assignment(&cost),
        vec![Some(0), None, Some(1)]
    );
    assert!(greedy_bipartite_assignment(&[]).is_empty());
    // Ties go to the lower column.
    assert_eq!(greedy_bipartite_assignment(&[vec![1.0, 1.0]]), vec![Some(0)]);
}

#[test]
fn constraints_pre_filter_costs() {
    let cost = vec![vec![1.0, 2.0], vec![1.0, 9.0]];
    let category = AssignmentConstraint::EqualCategory {
        rows: vec!["roof".into(), "wall".into()],
        cols: vec!["wall".into(), "roof".into()],
    };
    assert_eq!(
        constrained_assignment(&cost, &[category.clone()]),
        vec![Some(1), Some(0)]
    );
    assert_eq!(
        constrained_assignment(&cost, &[AssignmentConstraint::MaxCost(5.0)]),
        vec![Some(0), None]
    );
    assert_eq!(
        constrained_assignment(&cost, &[category, AssignmentConstraint::MaxCost(5.0)]),
        vec![Some(1), Some(0)]
    );
    // Input untouched.
    assert_eq!(cost[1][1], 9.0);
}

#[test]
fn knn_returns_two_nearest_ascending() {
    let sources = hulls(&[("src", square_at(0.0, 0.0))]);
    let targets = hulls(&[
        ("far", square_at(10.0, 0.0)),
        ("near", square_at(1.0, 0.0)),
        ("mid", square_at(0.0, 5.0)),
    ]);
    let out = match_greedy_knn(&sources, &targets, 2);
    assert_eq!(out.len(), 1);
    let m = &out[0];
    assert_eq!(m.source, "src");
    assert_eq!(m.strategy, Strategy::GreedyKnn);
    assert_eq!(m.total_candidates, 3);
    let names: Vec<&str> = m.candidates.iter().map(|c| c.target.as_str()).collect();
    assert_eq!(names, ["near", "mid"]);
    assert!((m.candidates[0].score - 0.5).abs() < 1e-12);
    assert!((m.candidates[1].score - 1.0 / 6.0).abs() < 1e-12);
    assert_eq!(m.best().map(|c| c.target.as_str()), Some("near"));
}

#[test]
fn knn_skips_self_and_empty_targets() {
    let map = hulls(&[
        ("a", square_at(0.0, 0.0)),
        ("b", square_at(3.0, 0.0)),
        ("empty", Polygon::default()),
    ]);
    let out = match_greedy_knn(&map, &map, 5);
    let a = &out[0];
    assert_eq!(a.source, "a");
    assert_eq!(a.total_candidates, 2);
    assert_eq!(a.candidates.len(), 1);
    assert_eq!(a.candidates[0].target, "b");
    let empty = out.iter().find(|m| m.source == "empty").unwrap();
    assert!(empty.candidates.is_empty());
}

#[test]
fn knn_skips_same_key_across_separate_maps() {
    let sources = hulls(&[("roof-1", square_at(0.0, 0.0))]);
    let targets = hulls(&[
        ("roof-1", square_at(0.0, 0.0)),
        ("roof-2", square_at(4.0, 0.0)),
    ]);
    let out = match_greedy_knn(&sources, &targets, 2);
    assert_eq!(out[0].total_candidates, 1);
    let names: Vec<&str> = out[0].candidates.iter().map(|c| c.target.as_str()).collect();
    assert_eq!(names, ["roof-2"]);
}

#[test]
fn vector_knn_uses_euclidean_distance() {
    let sources = vec![("q".to_string(), vec![0.0, 0.0])];
    let targets = vec![
        ("x".to_string(), vec![3.0, 4.0]),
        ("y".to_string(), vec![1.0, 0.0]),
        ("bad".to_string(), vec![1.0]),
    ];
    let out = match_vectors_knn(&sources, &targets, 3);
    let scores: Vec<(&str, f64)> = out[0]
        .candidates
        .iter()
        .map(|c| (c.target.as_str(), c.score))
        .collect();
    assert_eq!(scores, [("y", 0.5), ("x", 1.0 / 6.0)]);
    assert_eq!(out[0].strategy, Strategy::VectorKnn);
}

#[test]
fn rank_by_matrix_orders_by_family() {
    let polys = vec![square_at(0.0, 0.0), square_at(0.5, 0.0), square_at(5.0, 0.0)];
    let keys: Vec<String> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();
    for metric in [Metric::Iou, Metric::Hausdorff] {
        let mm = MetricMatrix {
            metric,
            keys: keys.clone(),
            values: pairwise_metric_matrix(&polys, metric),
        };
        let ranked = rank_by_matrix(&mm, Some(1));
        assert_eq!(ranked.len(), 3);
        assert_eq!(ranked[0].candidates.len(), 1);
        assert_eq!(ranked[0].candidates[0].target, "b", "{metric}");
        assert_eq!(ranked[0].total_candidates, 2);
        assert_eq!(ranked[1].candidates[0].target, "a", "{metric}");
        assert_eq!(ranked[0].strategy, Strategy::MetricRank(metric));
        for r in &ranked {
            assert!(r.candidates.iter().all(|c| (0.0..=1.0).contains(&c.score)));
        }
    }
    assert_eq!(
        Strategy::MetricRank(Metric::Dice).to_string(),
        "metric_rank:dice"
    );
}
