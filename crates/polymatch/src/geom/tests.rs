use super::*;
use nalgebra::vector;
use rand::{rngs::StdRng, Rng, SeedableRng};

fn unit_square() -> Polygon {
    Polygon::from_xy(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)])
}

fn random_cloud(n: usize, seed: u64) -> Vec<Point> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| Point::new(rng.gen_range(-3.0..3.0), rng.gen_range(-2.0..2.0)))
        .collect()
}

/// Points sampled on a 0.5 grid over an L-shaped region (two 4×1 arms).
fn l_shape_grid() -> Vec<Point> {
    let mut pts = Vec::new();
    for i in 0..=8 {
        for j in 0..=8 {
            let (x, y) = (i as f64 * 0.5, j as f64 * 0.5);
            if y <= 1.0 || x <= 1.0 {
                pts.push(Point::new(x, y));
            }
        }
    }
    pts
}

#[test]
fn area_perimeter_centroid_basics() {
    let sq = unit_square();
    assert!((sq.area() - 1.0).abs() < 1e-12);
    assert!((sq.perimeter() - 4.0).abs() < 1e-12);
    assert!((sq.centroid() - vector![0.5, 0.5]).norm() < 1e-12);

    // Orientation does not matter for area.
    let mut cw = sq.clone();
    cw.pts.reverse();
    assert!((cw.area() - 1.0).abs() < 1e-12);
    assert!(cw.signed_area() < 0.0);

    // Degenerate rings.
    assert_eq!(Polygon::default().area(), 0.0);
    assert_eq!(Polygon::from_xy(&[(0.0, 0.0), (5.0, 5.0)]).area(), 0.0);
    assert_eq!(Polygon::default().centroid(), Point::zeros());
}

#[test]
fn self_intersecting_ring_has_finite_area() {
    // Bow-tie: lobes cancel in the shoelace sum.
    let bow = Polygon::from_xy(&[(0.0, 0.0), (1.0, 1.0), (1.0, 0.0), (0.0, 1.0)]);
    let a = bow.area();
    assert!(a.is_finite() && a >= 0.0);
    assert!(!bow.is_convex());
}

#[test]
fn convexity_test() {
    assert!(unit_square().is_convex());
    let l = Polygon::from_xy(&[
        (0.0, 0.0),
        (2.0, 0.0),
        (2.0, 1.0),
        (1.0, 1.0),
        (1.0, 2.0),
        (0.0, 2.0),
    ]);
    assert!(!l.is_convex());
    // Pentagram: every turn has the same sign but winds twice.
    let star: Vec<Point> = (0..5)
        .map(|i| {
            let th = std::f64::consts::FRAC_PI_2 + (i * 2) as f64 * std::f64::consts::TAU / 5.0;
            Point::new(th.cos(), th.sin())
        })
        .collect();
    assert!(!Polygon::new(star).is_convex());
}

#[test]
fn convex_hull_small_and_degenerate_inputs() {
    let single = vec![Point::new(2.0, 3.0)];
    assert_eq!(convex_hull(&single).pts, single);
    assert!(convex_hull(&[]).is_empty());

    let collinear: Vec<Point> = (0..6).map(|i| Point::new(i as f64, 2.0 * i as f64)).collect();
    let h = convex_hull(&collinear);
    assert_eq!(h.len(), 2);
    assert!(h.pts.contains(&Point::new(0.0, 0.0)));
    assert!(h.pts.contains(&Point::new(5.0, 10.0)));

    let dups = vec![
        Point::new(0.0, 0.0),
        Point::new(1.0, 0.0),
        Point::new(1.0, 0.0),
        Point::new(0.0, 1.0),
        Point::new(0.0, 0.0),
        Point::new(0.25, 0.25),
    ];
    let h = convex_hull(&dups);
    assert_eq!(h.len(), 3);
    assert!(h.is_ccw());
}

#[test]
fn convex_hull_is_convex_and_contains_inputs() {
    for seed in 0..8 {
        let pts = random_cloud(60, seed);
        let h = convex_hull(&pts);
        assert!(h.is_ccw());
        assert!(h.is_convex());
        for p in &pts {
            assert!(h.contains_convex(*p, 1e-9), "seed {seed}: {p:?} outside hull");
        }
    }
}

#[test]
fn concave_hull_tighter_than_convex_on_l_shape() {
    let pts = l_shape_grid();
    let convex = convex_hull(&pts);
    let concave = concave_hull_knn(&pts, 5);
    assert!(concave.is_ccw());
    assert!(concave.area() > 0.0);
    assert!(
        concave.area() < 0.9 * convex.area(),
        "concave {} vs convex {}",
        concave.area(),
        convex.area()
    );
}

#[test]
fn concave_hull_with_max_k_matches_convex() {
    for seed in 10..14 {
        let pts = random_cloud(40, seed);
        let convex = convex_hull(&pts);
        let wrapped = concave_hull_knn(&pts, pts.len());
        assert!(
            (wrapped.area() - convex.area()).abs() < 1e-9 * convex.area().max(1.0),
            "seed {seed}: {} vs {}",
            wrapped.area(),
            convex.area()
        );
    }
}

#[test]
fn concave_hull_output_has_no_repeated_points() {
    let mut pts = random_cloud(80, 3);
    // Exact duplicates must not survive into the ring.
    pts.extend_from_slice(&pts.clone()[..20]);
    let h = concave_hull_knn(&pts, 6);
    for i in 0..h.len() {
        for j in (i + 1)..h.len() {
            assert!((h.pts[i] - h.pts[j]).norm() > 0.0);
        }
    }
}

#[test]
fn concave_hull_terminates_on_degenerate_inputs() {
    // All collinear → convex hull segment.
    let line: Vec<Point> = (0..50).map(|i| Point::new(i as f64, 0.0)).collect();
    assert_eq!(concave_hull_knn(&line, 8).len(), 2);
    // All identical.
    let same = vec![Point::new(1.0, 1.0); 30];
    assert_eq!(concave_hull_knn(&same, 8).len(), 1);
    // Tiny k on a dense cluster still returns a ring.
    let h = concave_hull_knn(&random_cloud(300, 99), 1);
    assert!(h.len() >= 3);
}

#[test]
fn clip_overlapping_and_disjoint_squares() {
    let a = Polygon::from_xy(&[(0.0, 0.0), (2.0, 0.0), (2.0, 2.0), (0.0, 2.0)]);
    let b = Polygon::from_xy(&[(1.0, 1.0), (3.0, 1.0), (3.0, 3.0), (1.0, 3.0)]);
    assert!((intersection_area(&a, &b) - 1.0).abs() < 1e-12);

    let far = Polygon::from_xy(&[(10.0, 10.0), (11.0, 10.0), (11.0, 11.0), (10.0, 11.0)]);
    assert!(clip(&a, &far).is_empty());
    assert_eq!(intersection_area(&a, &far), 0.0);

    // Degenerate on either side.
    assert!(clip(&Polygon::default(), &a).is_empty());
    assert!(clip(&a, &Polygon::from_xy(&[(0.0, 0.0), (1.0, 1.0)])).is_empty());
}

#[test]
fn clip_with_clockwise_window() {
    let a = Polygon::from_xy(&[(0.0, 0.0), (2.0, 0.0), (2.0, 2.0), (0.0, 2.0)]);
    let mut w = Polygon::from_xy(&[(1.0, -1.0), (3.0, -1.0), (3.0, 3.0), (1.0, 3.0)]);
    w.pts.reverse();
    assert!((intersection_area(&a, &w) - 2.0).abs() < 1e-12);
}

#[test]
fn clip_by_enclosing_bbox_is_identity() {
    let poly = Polygon::from_xy(&[
        (0.0, 0.0),
        (3.0, 0.5),
        (2.0, 1.0),
        (3.0, 2.5),
        (0.5, 2.0),
    ]);
    let window = convex_hull(&poly.bbox().unwrap().inflate(0.5).to_polygon().pts);
    let out = clip(&poly, &window);
    assert_eq!(out, poly);
}

#[test]
fn raster_iou_matches_exact_on_simple_cases() {
    let a = Polygon::from_xy(&[(0.0, 0.0), (2.0, 0.0), (2.0, 2.0), (0.0, 2.0)]);
    assert_eq!(iou_raster(&a, &a, 128), 1.0);

    let b = Polygon::from_xy(&[(1.0, 0.0), (3.0, 0.0), (3.0, 2.0), (1.0, 2.0)]);
    // Exact IoU = 2 / 6.
    let iou = iou_raster(&a, &b, 300);
    assert!((iou - 1.0 / 3.0).abs() < 0.01, "iou {iou}");

    let far = Polygon::from_xy(&[(10.0, 10.0), (11.0, 10.0), (11.0, 11.0), (10.0, 11.0)]);
    assert_eq!(iou_raster(&a, &far, 64), 0.0);
}

#[test]
fn raster_iou_empty_conventions_and_clamping() {
    let a = unit_square();
    let empty = Polygon::default();
    assert_eq!(iou_raster(&empty, &empty, 64), 1.0);
    assert_eq!(iou_raster(&a, &empty, 64), 0.0);
    assert_eq!(iou_raster(&empty, &a, 64), 0.0);

    assert_eq!(RasterGrid::new(0).resolution(), crate::cfg::MIN_RASTER_RESOLUTION);
    assert_eq!(
        RasterGrid::new(1 << 20).resolution(),
        crate::cfg::MAX_RASTER_RESOLUTION
    );
}

#[test]
fn raster_grid_reuse_is_stateless() {
    let a = unit_square();
    let b = Polygon::from_xy(&[(0.5, 0.0), (1.5, 0.0), (1.5, 1.0), (0.5, 1.0)]);
    let mut grid = RasterGrid::new(200);
    let first = grid.iou(&a, &b);
    let _ = grid.iou(&a, &a);
    let again = grid.iou(&a, &b);
    assert_eq!(first, again);
}

#[test]
fn raster_iou_handles_non_convex_and_self_intersecting() {
    let l = Polygon::from_xy(&[
        (0.0, 0.0),
        (2.0, 0.0),
        (2.0, 1.0),
        (1.0, 1.0),
        (1.0, 2.0),
        (0.0, 2.0),
    ]);
    let sq = Polygon::from_xy(&[(0.0, 0.0), (2.0, 0.0), (2.0, 2.0), (0.0, 2.0)]);
    // L covers 3 of the square's 4 unit cells.
    let iou = iou_raster(&l, &sq, 256);
    assert!((iou - 0.75).abs() < 0.01, "iou {iou}");

    let bow = Polygon::from_xy(&[(0.0, 0.0), (1.0, 1.0), (1.0, 0.0), (0.0, 1.0)]);
    let v = iou_raster(&bow, &unit_square(), 128);
    assert!((0.0..=1.0).contains(&v));
}
