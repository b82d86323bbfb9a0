//! File-backed collaborators: embedding input, hull store, matrix output.
//!
//! Embedding input is one of
//! - `.json`: `[{"source": "...", "items": [[...], ...], "labels": [...]}, ...]`
//! - `.csv` / `.parquet`: one row per item, a `source` column, an optional
//!   `label` column, every other column a numeric dimension.

use anyhow::{bail, Context, Result};
use polars::prelude::*;
use polymatch::metrics::MetricMatrix;
use polymatch::pipeline::{
    EmbeddingProvider, EmbeddingSet, FeatureMap, HullMap, HullStore, PipelineCfg, PipelineError,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

const SOURCE_COL: &str = "source";
const LABEL_COL: &str = "label";

/// Embedding sets loaded from one file; sources keep file order.
pub struct FileProvider {
    order: Vec<String>,
    sets: BTreeMap<String, EmbeddingSet>,
}

impl FileProvider {
    pub fn open(path: &Path) -> Result<Self> {
        let sets = match extension(path).as_str() {
            "json" => {
                let bytes =
                    fs::read(path).with_context(|| format!("reading {}", path.display()))?;
                serde_json::from_slice::<Vec<EmbeddingSet>>(&bytes)
                    .with_context(|| format!("parsing embedding sets in {}", path.display()))?
            }
            "csv" => {
                let df = LazyCsvReader::new(path)
                    .with_infer_schema_length(Some(100))
                    .finish()?
                    .collect()
                    .with_context(|| format!("reading {}", path.display()))?;
                sets_from_frame(&df)?
            }
            "parquet" => {
                let df = LazyFrame::scan_parquet(path, ScanArgsParquet::default())?
                    .collect()
                    .with_context(|| format!("reading {}", path.display()))?;
                sets_from_frame(&df)?
            }
            other => bail!(
                "unsupported embedding file extension '{}' (expected json, csv or parquet)",
                other
            ),
        };
        Ok(Self::from_sets(sets))
    }

    pub fn from_sets(sets: Vec<EmbeddingSet>) -> Self {
        let mut order = Vec::new();
        let mut map = BTreeMap::new();
        for set in sets {
            if !map.contains_key(&set.source) {
                order.push(set.source.clone());
            }
            map.insert(set.source.clone(), set);
        }
        Self { order, sets: map }
    }

    /// Source names in file order.
    pub fn sources(&self) -> &[String] {
        &self.order
    }
}

impl EmbeddingProvider for FileProvider {
    fn fetch(&self, source: &str) -> Result<EmbeddingSet, PipelineError> {
        self.sets.fetch(source)
    }
}

fn extension(path: &Path) -> String {
    path.extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default()
}

/// Group frame rows by `source`, in order of first appearance.
fn sets_from_frame(df: &DataFrame) -> Result<Vec<EmbeddingSet>> {
    let sources = df
        .column(SOURCE_COL)
        .with_context(|| format!("embedding table needs a '{}' column", SOURCE_COL))?
        .str()
        .with_context(|| format!("column '{}' must hold strings", SOURCE_COL))?;
    let labels = match df.column(LABEL_COL) {
        Ok(col) => Some(col.cast(&DataType::String)?),
        Err(_) => None,
    };
    let labels = labels.as_ref().map(|s| s.str()).transpose()?;

    let mut dims = Vec::new();
    for col in df.get_columns() {
        let name = col.name().to_string();
        if name == SOURCE_COL || name == LABEL_COL {
            continue;
        }
        let values = col
            .cast(&DataType::Float64)
            .with_context(|| format!("column '{}' is not numeric", name))?;
        dims.push(values);
    }
    if dims.is_empty() {
        bail!("embedding table has no numeric columns");
    }
    let dims = dims
        .iter()
        .map(|s| s.f64().map(|ca| ca.into_iter().collect::<Vec<_>>()))
        .collect::<PolarsResult<Vec<_>>>()?;

    let mut order: Vec<String> = Vec::new();
    let mut grouped: BTreeMap<String, (Vec<Vec<f64>>, Vec<String>)> = BTreeMap::new();
    for (row, source) in sources.into_iter().enumerate() {
        let Some(source) = source else {
            bail!("row {} has no source", row);
        };
        let entry = grouped.entry(source.to_string()).or_insert_with(|| {
            order.push(source.to_string());
            (Vec::new(), Vec::new())
        });
        // Nulls become NaN and are rejected by validation downstream.
        entry
            .0
            .push(dims.iter().map(|d| d[row].unwrap_or(f64::NAN)).collect());
        if let Some(labels) = labels {
            entry
                .1
                .push(labels.get(row).unwrap_or_default().to_string());
        }
    }

    Ok(order
        .into_iter()
        .filter_map(|source| {
            let (items, labels) = grouped.remove(&source)?;
            let set = EmbeddingSet::new(source, items);
            Some(if labels.is_empty() {
                set
            } else {
                set.with_labels(labels)
            })
        })
        .collect())
}

/// On-disk hull document.
#[derive(Serialize, Deserialize)]
struct HullDoc {
    hulls: HullMap,
    #[serde(default)]
    features: FeatureMap,
}

/// Hull store backed by one JSON file.
pub struct JsonHullStore {
    path: PathBuf,
}

impl JsonHullStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HullStore for JsonHullStore {
    fn save(&mut self, hulls: &HullMap, features: &FeatureMap) -> Result<(), PipelineError> {
        let doc = HullDoc {
            hulls: hulls.clone(),
            features: features.clone(),
        };
        ensure_parent(&self.path).map_err(PipelineError::store)?;
        let bytes = serde_json::to_vec_pretty(&doc).map_err(PipelineError::store)?;
        fs::write(&self.path, bytes)
            .map_err(|e| PipelineError::store(format!("writing {}: {}", self.path.display(), e)))
    }

    fn load(&self) -> Result<(HullMap, FeatureMap), PipelineError> {
        let bytes = fs::read(&self.path)
            .map_err(|e| PipelineError::store(format!("reading {}: {}", self.path.display(), e)))?;
        let doc: HullDoc = serde_json::from_slice(&bytes).map_err(|e| {
            PipelineError::store(format!("parsing {}: {}", self.path.display(), e))
        })?;
        Ok((doc.hulls, doc.features))
    }
}

/// Load a `PipelineCfg` from JSON; missing fields keep their defaults.
pub fn read_cfg(path: &Path) -> Result<PipelineCfg> {
    let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_slice(&bytes).with_context(|| format!("parsing config {}", path.display()))
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    ensure_parent(path)?;
    fs::write(path, serde_json::to_vec_pretty(value)?)
        .with_context(|| format!("writing {}", path.display()))
}

/// Square matrix as CSV: a `source` column, then one column per key.
pub fn write_matrix_csv(path: &Path, matrix: &MetricMatrix) -> Result<()> {
    let mut columns = Vec::with_capacity(matrix.len() + 1);
    columns.push(Series::new(SOURCE_COL.into(), matrix.keys.clone()));
    for (j, key) in matrix.keys.iter().enumerate() {
        let col: Vec<f64> = matrix.values.iter().map(|row| row[j]).collect();
        columns.push(Series::new(key.as_str().into(), col));
    }
    let mut df = DataFrame::new(columns)?;

    ensure_parent(path)?;
    let mut file = fs::File::create(path).with_context(|| format!("creating {}", path.display()))?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(&mut df)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

fn ensure_parent(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
