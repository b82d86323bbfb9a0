use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;
use std::ffi::OsString;
use std::fs;
use std::panic::Location;
use std::path::{Path, PathBuf};
use std::process::Command;

/// `<artifact>.provenance.json` contents.
#[derive(Serialize)]
pub struct Sidecar {
    pub code_rev: String,
    pub polymatch_version: &'static str,
    /// Subcommand that produced the artifact (`build`, `compare`).
    pub command: &'static str,
    pub callsite: Callsite,
    /// Effective pipeline configuration and inputs.
    pub params: Value,
    /// Run summary: counts, failures, reference source.
    pub summary: Value,
    pub outputs: Vec<String>,
}

#[derive(Serialize)]
pub struct Callsite {
    pub file: &'static str,
    pub line: u32,
}

/// Write the sidecar next to the first of `outputs`; returns its path.
#[track_caller]
pub fn write_sidecar(
    command: &'static str,
    params: Value,
    summary: Value,
    outputs: &[&Path],
) -> Result<PathBuf> {
    let primary = outputs
        .first()
        .context("provenance needs at least one output")?;
    let path = provenance_path(primary);
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating provenance dir {}", parent.display()))?;
        }
    }

    let callsite = Location::caller();
    let doc = Sidecar {
        code_rev: current_git_rev(),
        polymatch_version: polymatch::VERSION,
        command,
        callsite: Callsite {
            file: callsite.file(),
            line: callsite.line(),
        },
        params,
        summary,
        outputs: outputs
            .iter()
            .map(|p| p.to_string_lossy().into_owned())
            .collect(),
    };
    fs::write(&path, serde_json::to_vec_pretty(&doc)?)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(path)
}

fn provenance_path(artifact: &Path) -> PathBuf {
    let mut name = artifact
        .file_stem()
        .map(|s| s.to_os_string())
        .unwrap_or_else(|| OsString::from("artifact"));
    name.push(".provenance.json");
    artifact.with_file_name(name)
}

/// Build-time `GIT_COMMIT`, then the runtime variable, then `git rev-parse`.
pub fn current_git_rev() -> String {
    let from_build = option_env!("GIT_COMMIT").filter(|s| !s.is_empty());
    if let Some(rev) = from_build {
        return rev.to_string();
    }
    if let Some(rev) = std::env::var("GIT_COMMIT").ok().filter(|s| !s.is_empty()) {
        return rev;
    }
    Command::new("git")
        .args(["rev-parse", "HEAD"])
        .output()
        .ok()
        .filter(|out| out.status.success())
        .and_then(|out| String::from_utf8(out.stdout).ok())
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
