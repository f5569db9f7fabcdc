//! # Report Post-Processing Module
//!
//! This module turns the per-site duration reports written by the record-duration
//! experiment into the tables used to judge how short a recording can get before the
//! fundamental peak drifts.
//!
//! ## Overview
//!
//! Both steps work purely on CSV files, so they can be rerun on old outputs without
//! touching the HVSR pipeline again:
//!
//! - [`relative_error`] - Reads a `time_interval_sec, peak_frequency` report and
//!   expresses every peak as an absolute relative error against the first
//!   (longest-duration) row
//! - [`merge`] - Collects the relative-error column of many sites into one table and
//!   computes per-duration five-number summaries for box plots
//!
//! ## Error Model
//!
//! A single unusable report never aborts a batch. Readers return [`SeriesError`],
//! which callers log and skip; only directory and output failures surface as
//! [`ReportError`].

use std::path::{Path, PathBuf};
use thiserror::Error;

pub mod merge;
pub mod relative_error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to read report directory '{path}': {source}", path = path.display())]
    DirectoryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to write '{path}': {source}", path = path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("No usable reports found in '{path}'", path = path.display())]
    NoUsableReports { path: PathBuf },
}

/// Why a single report file cannot be used.
#[derive(Debug, Error)]
pub enum SeriesError {
    #[error("Failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("Report has no data rows")]
    Empty,
    #[error("Report has {found} column(s), at least {required} required")]
    TooFewColumns { found: usize, required: usize },
    #[error("Row {row} holds a non-numeric peak frequency '{value}'")]
    NonNumericPeak { row: usize, value: String },
    #[error("Reference peak frequency is zero")]
    ZeroReference,
}

/// Lists the `*.csv` files directly inside `dir`, sorted by file name.
pub fn list_csv_files(dir: &Path) -> Result<Vec<PathBuf>, ReportError> {
    let read_err = |source| ReportError::DirectoryRead {
        path: dir.to_path_buf(),
        source,
    };
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(read_err)? {
        let path = entry.map_err(read_err)?.path();
        let is_csv = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("csv"));
        if is_csv && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn lists_only_csv_files_sorted() {
        let dir = tempdir().unwrap();
        for name in ["b.csv", "a.CSV", "notes.txt", "c.csv.bak"] {
            std::fs::write(dir.path().join(name), "").unwrap();
        }
        std::fs::create_dir(dir.path().join("d.csv")).unwrap();

        let files = list_csv_files(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, vec!["a.CSV", "b.csv"]);
    }
}
