use crate::core::report::merge::{ErrorColumn, MergedTable, write_summaries};
use crate::core::report::relative_error::PeakSeries;
use crate::core::report::{ReportError, SeriesError, list_csv_files};
use crate::engine::error::EngineError;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchSummary {
    pub written: Vec<PathBuf>,
    pub skipped: Vec<(PathBuf, String)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MergeSummary {
    pub merged_path: PathBuf,
    pub summary_path: PathBuf,
    pub columns: usize,
    pub rows: usize,
    pub skipped: Vec<(PathBuf, String)>,
}

fn open_report(path: &Path) -> Result<File, SeriesError> {
    File::open(path).map_err(|e| SeriesError::Csv(e.into()))
}

fn write_csv<F>(path: &Path, write: F) -> Result<(), ReportError>
where
    F: FnOnce(File) -> Result<(), csv::Error>,
{
    let to_err = |source| ReportError::Write {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(|e| to_err(e.into()))?;
    write(file).map_err(to_err)
}

/// Writes a relative-error report for every usable duration report in
/// `input_dir`, under the same file name in `output_dir`.
#[instrument(skip_all, name = "relative_error_workflow")]
pub fn compute_relative_errors(
    input_dir: &Path,
    output_dir: &Path,
) -> Result<BatchSummary, EngineError> {
    let files = list_csv_files(input_dir)?;
    std::fs::create_dir_all(output_dir).map_err(|source| EngineError::OutputDirectory {
        path: output_dir.to_path_buf(),
        source,
    })?;

    let mut summary = BatchSummary::default();
    for path in files {
        let series = match open_report(&path).and_then(PeakSeries::read) {
            Ok(series) => series,
            Err(e) => {
                warn!("Skipping {:?}: {}", path, e);
                summary.skipped.push((path, e.to_string()));
                continue;
            }
        };
        let Some(name) = path.file_name() else {
            continue;
        };
        let target = output_dir.join(name);
        write_csv(&target, |file| series.write_relative_errors(file))?;
        info!(
            "Wrote {} relative error(s) to {:?} (reference {} Hz).",
            series.peaks.len(),
            target,
            series.reference()
        );
        summary.written.push(target);
    }

    if summary.written.is_empty() {
        return Err(ReportError::NoUsableReports {
            path: input_dir.to_path_buf(),
        }
        .into());
    }
    Ok(summary)
}

/// Path of the five-number summary written next to a merged table.
pub fn summary_path_for(merged_path: &Path) -> PathBuf {
    let stem = merged_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("merged");
    merged_path.with_file_name(format!("{stem}_summary.csv"))
}

/// Merges the relative-error column of every report in `input_dir` into
/// `output_path` and writes per-duration summaries beside it.
#[instrument(skip_all, name = "merge_workflow")]
pub fn merge_relative_errors(
    input_dir: &Path,
    output_path: &Path,
) -> Result<MergeSummary, EngineError> {
    let mut columns = Vec::new();
    let mut skipped = Vec::new();
    for path in list_csv_files(input_dir)? {
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string();
        match open_report(&path).and_then(|file| ErrorColumn::read(name, file)) {
            Ok(column) => columns.push(column),
            Err(e) => {
                warn!("Skipping {:?}: {}", path, e);
                skipped.push((path, e.to_string()));
            }
        }
    }
    if columns.is_empty() {
        return Err(ReportError::NoUsableReports {
            path: input_dir.to_path_buf(),
        }
        .into());
    }

    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| EngineError::OutputDirectory {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let table = MergedTable::new(columns);
    write_csv(output_path, |file| table.write(file))?;
    let summary_path = summary_path_for(output_path);
    write_csv(&summary_path, |file| write_summaries(&table.summaries(), file))?;

    info!(
        "Merged {} report(s) into {:?} with {} row(s).",
        table.columns.len(),
        output_path,
        table.row_count()
    );
    Ok(MergeSummary {
        merged_path: output_path.to_path_buf(),
        summary_path,
        columns: table.columns.len(),
        rows: table.row_count(),
        skipped,
    })
}
