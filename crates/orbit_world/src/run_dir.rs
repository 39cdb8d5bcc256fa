use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Contents of `run_info.json`, written once when a run starts.
#[derive(Debug, Clone, Serialize)]
pub struct RunInfo {
    pub run_id: String,
    pub seed: u64,
    pub config_version: String,
    pub start_year: f64,
    pub dt_hours: f64,
    pub ticks: u64,
    pub print_every: u64,
    pub runner: &'static str,
    /// Command-line overrides as given, keyed by override name.
    pub overrides: BTreeMap<String, serde_json::Value>,
}

/// `YYYYMMDD_HHMMSS_seed<seed>` in UTC.
pub fn generate_run_id(seed: u64) -> String {
    let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M%S");
    format!("{timestamp}_seed{seed}")
}

pub fn create_run_dir(base: &Path, run_id: &str) -> Result<PathBuf> {
    let dir = base.join(run_id);
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("creating run directory: {}", dir.display()))?;
    Ok(dir)
}

pub fn write_run_info(dir: &Path, info: &RunInfo) -> Result<()> {
    let path = dir.join("run_info.json");
    let file =
        std::fs::File::create(&path).with_context(|| format!("creating {}", path.display()))?;
    serde_json::to_writer_pretty(file, info)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}
