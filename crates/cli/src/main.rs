use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use polymatch::metrics::Metric;
use polymatch::pipeline::{
    build_polygons, compare_polygons, compare_with_metric, HullStore, PipelineCfg,
};
use serde_json::json;
use std::path::PathBuf;
use tracing_subscriber::fmt::SubscriberBuilder;

mod files;
mod provenance;

use files::{read_cfg, write_json, write_matrix_csv, FileProvider, JsonHullStore};

#[derive(Parser)]
#[command(name = "polymatch")]
#[command(about = "Build hulls from embedding sets and compare them pairwise")]
struct Cmd {
    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand)]
enum Action {
    /// Build one concave hull per source and store them as JSON
    Build(BuildArgs),
    /// Compare stored hulls pairwise and rank candidates per source
    Compare(CompareArgs),
    /// Print a small provenance JSON block, plus a hull summary when given
    Report {
        #[arg(long)]
        hulls: Option<PathBuf>,
    },
}

#[derive(Args)]
struct BuildArgs {
    /// Embedding sets (.json, .csv or .parquet)
    #[arg(long)]
    input: PathBuf,
    /// Hull file to write
    #[arg(long)]
    out: PathBuf,
    /// Sources to build, comma separated; defaults to every source in file order
    #[arg(long, value_delimiter = ',')]
    sources: Vec<String>,
    /// Concave hull neighbourhood size
    #[arg(long)]
    k: Option<usize>,
    /// Cap on Procrustes anchors per source
    #[arg(long)]
    anchors: Option<usize>,
    /// PipelineCfg JSON; flags override its fields
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Args)]
struct CompareArgs {
    /// Hull file written by `build`
    #[arg(long)]
    hulls: PathBuf,
    /// Report JSON to write (matrix + ranked matches)
    #[arg(long)]
    out: PathBuf,
    /// iou, dice, composite, hausdorff, chamfer or centroid
    #[arg(long)]
    metric: Option<Metric>,
    /// Raster resolution for IoU
    #[arg(long)]
    resolution: Option<usize>,
    /// Candidates kept per source
    #[arg(long)]
    top_k: Option<usize>,
    /// Also write the matrix as CSV
    #[arg(long)]
    csv: Option<PathBuf>,
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    SubscriberBuilder::default().with_target(false).init();
    let cmd = Cmd::parse();
    match cmd.action {
        Action::Build(args) => build(args),
        Action::Compare(args) => compare(args),
        Action::Report { hulls } => report(hulls),
    }
}

fn load_cfg(path: Option<&PathBuf>) -> Result<PipelineCfg> {
    match path {
        Some(p) => read_cfg(p),
        None => Ok(PipelineCfg::default()),
    }
}

fn build(args: BuildArgs) -> Result<()> {
    let mut cfg = load_cfg(args.config.as_ref())?;
    if let Some(k) = args.k {
        cfg.hull_k = k;
    }
    if let Some(anchors) = args.anchors {
        cfg.max_anchors = anchors;
    }

    let provider = FileProvider::open(&args.input)?;
    let sources = if args.sources.is_empty() {
        provider.sources().to_vec()
    } else {
        args.sources.clone()
    };
    tracing::info!(
        input = %args.input.display(),
        sources = sources.len(),
        k = cfg.hull_k,
        "build"
    );

    let report = build_polygons(&provider, &sources, &cfg);
    let failures: Vec<String> = report.failures.iter().map(|e| e.to_string()).collect();
    if report.hulls.is_empty() {
        bail!("no hull could be built: {}", failures.join("; "));
    }

    let mut store = JsonHullStore::new(&args.out);
    report
        .persist(&mut store)
        .with_context(|| format!("storing hulls in {}", store.path().display()))?;

    provenance::write_sidecar(
        "build",
        json!({
            "input": args.input.to_string_lossy(),
            "sources": sources,
            "cfg": cfg,
        }),
        json!({
            "reference": report.reference,
            "built": report.hulls.len(),
            "failures": failures,
        }),
        &[args.out.as_path()],
    )?;
    Ok(())
}

fn compare(args: CompareArgs) -> Result<()> {
    let mut cfg = load_cfg(args.config.as_ref())?;
    if let Some(metric) = args.metric {
        cfg.metric = metric;
    }
    if let Some(res) = args.resolution {
        cfg.iou_resolution = res;
    }
    if args.top_k.is_some() {
        cfg.top_k = args.top_k;
    }

    let (hulls, _) = JsonHullStore::new(&args.hulls)
        .load()
        .with_context(|| format!("loading hulls from {}", args.hulls.display()))?;
    tracing::info!(hulls = hulls.len(), metric = %cfg.metric, "compare");

    // IoU goes through the raster matrix; other metrics through the generic one.
    let report = match cfg.metric {
        Metric::Iou => compare_polygons(&hulls, &cfg),
        metric => compare_with_metric(&hulls, metric, &cfg),
    };
    write_json(&args.out, &report)?;

    let mut outputs = vec![args.out.as_path()];
    if let Some(csv) = &args.csv {
        write_matrix_csv(csv, &report.matrix)?;
        outputs.push(csv.as_path());
    }

    let best: Vec<_> = report
        .matches
        .iter()
        .map(|m| json!({"source": m.source, "best": m.best()}))
        .collect();
    provenance::write_sidecar(
        "compare",
        json!({
            "hulls": args.hulls.to_string_lossy(),
            "cfg": cfg,
        }),
        json!({
            "sources": report.matrix.len(),
            "best": best,
        }),
        &outputs,
    )?;
    Ok(())
}

fn report(hulls: Option<PathBuf>) -> Result<()> {
    let summary = match &hulls {
        Some(path) => {
            let (hulls, features) = JsonHullStore::new(path).load()?;
            let rows: Vec<_> = hulls
                .iter()
                .map(|(key, poly)| {
                    json!({
                        "source": key,
                        "vertices": poly.len(),
                        "area": poly.area(),
                        "features": features.get(key),
                    })
                })
                .collect();
            json!(rows)
        }
        None => json!([]),
    };
    let obj = json!({
        "code_rev": provenance::current_git_rev(),
        "polymatch_version": polymatch::VERSION,
        "defaults": PipelineCfg::default(),
        "hulls": summary,
    });
    println!("{}", serde_json::to_string_pretty(&obj)?);
    Ok(())
}
