//! Rotating CSV sink for per-tick `MetricsSnapshot` rows.

use anyhow::{Context, Result};
use orbit_core::MetricsSnapshot;
use std::fs::File;
use std::path::{Path, PathBuf};

pub const MAX_ROWS_PER_FILE: usize = 50_000;

/// Writes snapshots to `metrics_000.csv`, `metrics_001.csv`, ... in a run
/// directory. Each file carries its own header row.
pub struct MetricsFileWriter {
    run_dir: PathBuf,
    file_index: u32,
    rows_in_current_file: usize,
    max_rows_per_file: usize,
    writer: csv::Writer<File>,
}

impl MetricsFileWriter {
    pub fn new(run_dir: PathBuf) -> Result<Self> {
        Self::with_max_rows(run_dir, MAX_ROWS_PER_FILE)
    }

    pub fn with_max_rows(run_dir: PathBuf, max_rows_per_file: usize) -> Result<Self> {
        let writer = open_csv_file(&run_dir, 0)?;
        Ok(Self {
            run_dir,
            file_index: 0,
            rows_in_current_file: 0,
            max_rows_per_file: max_rows_per_file.max(1),
            writer,
        })
    }

    /// Append one snapshot row, rotating to a new file if the current one is full.
    pub fn write_row(&mut self, snapshot: &MetricsSnapshot) -> Result<()> {
        if self.rows_in_current_file >= self.max_rows_per_file {
            self.writer.flush().context("flushing metrics file")?;
            self.file_index += 1;
            self.writer = open_csv_file(&self.run_dir, self.file_index)?;
            self.rows_in_current_file = 0;
        }
        self.writer
            .serialize(snapshot)
            .context("serializing metrics row")?;
        self.rows_in_current_file += 1;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush().context("flushing metrics file")
    }

    pub fn current_path(&self) -> PathBuf {
        csv_path(&self.run_dir, self.file_index)
    }
}

fn csv_path(run_dir: &Path, index: u32) -> PathBuf {
    run_dir.join(format!("metrics_{index:03}.csv"))
}

fn open_csv_file(run_dir: &Path, index: u32) -> Result<csv::Writer<File>> {
    let path = csv_path(run_dir, index);
    csv::Writer::from_path(&path).with_context(|| format!("creating {}", path.display()))
}
