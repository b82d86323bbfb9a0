//! Print hull and metric summaries for a few synthetic point clouds.
//!
//! Usage:
//!   cargo run -p polymatch --example hull_shapes -- hulls
//!   cargo run -p polymatch --example hull_shapes -- metrics
//!
//! - hulls mode: convex vs concave vertex counts and areas per k
//! - metrics mode: the full metric table between an L shape and a square

use polymatch::geom::{concave_hull_knn, convex_hull, Point, Polygon};
use polymatch::metrics::{shape_features, Metric};
use rand::{rngs::StdRng, Rng, SeedableRng};

fn main() {
    let mode = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "hulls".to_string());
    match mode.as_str() {
        "hulls" => show_hulls(),
        "metrics" => show_metrics(),
        _ => {
            eprintln!("usage: hull_shapes [hulls|metrics]");
        }
    }
}

/// Uniform samples from an L made of two 4×1 arms.
fn l_cloud(n: usize, seed: u64) -> Vec<Point> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut pts = Vec::with_capacity(n);
    while pts.len() < n {
        let (x, y) = (rng.gen_range(0.0..4.0), rng.gen_range(0.0..4.0));
        if x <= 1.0 || y <= 1.0 {
            pts.push(Point::new(x, y));
        }
    }
    pts
}

fn show_hulls() {
    let pts = l_cloud(400, 2025);
    let convex = convex_hull(&pts);
    println!(
        "convex: V={}, area={:.3} (true L area 7.0)",
        convex.len(),
        convex.area()
    );
    for k in [3, 5, 8, 15, 30] {
        let h = concave_hull_knn(&pts, k);
        println!("concave k={k:>2}: V={}, area={:.3}", h.len(), h.area());
    }
}

fn show_metrics() {
    let l = concave_hull_knn(&l_cloud(300, 7), 8);
    let sq = Polygon::from_xy(&[(0.0, 0.0), (4.0, 0.0), (4.0, 4.0), (0.0, 4.0)]);
    for metric in Metric::ALL {
        println!("{:>10}: {:.4}", metric, metric.eval(&l, &sq));
    }
    let f = shape_features(&l);
    println!(
        "L features: compactness={:.3} convexity={:.3} roughness={:.3} fractal={:.3}",
        f.compactness, f.convexity, f.roughness, f.fractal_dimension
    );
}
