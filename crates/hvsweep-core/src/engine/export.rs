use super::outcome::{Measurement, Outcome};
use super::pipeline::VerdictThresholds;
use super::table::{ResultRow, SweepReport};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

pub const ERROR_MARKER: &str = "error";
pub const NOT_AVAILABLE: &str = "N/A";
const PASS: &str = "Pass";
const FAIL: &str = "Fail";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeColumn {
    PeakFrequency,
    PeakAmplitude,
    PassingWindows,
    ClarityPass,
    ReliabilityPass,
}

impl OutcomeColumn {
    pub fn column_name(self) -> &'static str {
        match self {
            OutcomeColumn::PeakFrequency => "peak_frequency",
            OutcomeColumn::PeakAmplitude => "peak_amplitude",
            OutcomeColumn::PassingWindows => "passing_windows",
            OutcomeColumn::ClarityPass => "clarity_pass",
            OutcomeColumn::ReliabilityPass => "reliability_pass",
        }
    }

    fn render(self, measurement: &Measurement, layout: &ReportLayout) -> String {
        let precision = layout.precision;
        let fixed = |value: Option<f64>| match value {
            Some(v) => format!("{v:.precision$}"),
            None => NOT_AVAILABLE.to_string(),
        };
        let verdict = |value: Option<bool>| match value {
            Some(true) => PASS.to_string(),
            Some(false) => FAIL.to_string(),
            None => NOT_AVAILABLE.to_string(),
        };
        match self {
            OutcomeColumn::PeakFrequency => fixed(measurement.peak_frequency()),
            OutcomeColumn::PeakAmplitude => fixed(measurement.peak_amplitude()),
            OutcomeColumn::PassingWindows => measurement.passing_windows.to_string(),
            OutcomeColumn::ClarityPass => verdict(measurement.clarity_pass(&layout.verdicts)),
            OutcomeColumn::ReliabilityPass => verdict(measurement.reliability_pass(&layout.verdicts)),
        }
    }
}

/// Which outcome columns a report carries, and how peak values are printed.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportLayout {
    pub outcomes: Vec<OutcomeColumn>,
    /// Decimal places for peak frequency and amplitude.
    pub precision: usize,
    pub verdicts: VerdictThresholds,
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Failed to create report file '{path}': {source}", path = path.display())]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to write report '{path}': {source}", path = path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

pub fn header(report: &SweepReport, layout: &ReportLayout) -> Vec<String> {
    report
        .parameters()
        .iter()
        .map(|p| p.column_name())
        .chain(layout.outcomes.iter().map(|c| c.column_name()))
        .map(str::to_string)
        .collect()
}

pub fn render_row(row: &ResultRow, layout: &ReportLayout) -> Vec<String> {
    let parameters = row.combination.values().map(|v| v.to_string());
    let outcomes: Vec<String> = match &row.outcome {
        Outcome::Completed(measurement) => layout
            .outcomes
            .iter()
            .map(|c| c.render(measurement, layout))
            .collect(),
        Outcome::Failed { .. } => vec![ERROR_MARKER.to_string(); layout.outcomes.len()],
    };
    parameters.chain(outcomes).collect()
}

/// Writes the header and one record per row to `writer` as CSV.
pub fn write_report<W: Write>(
    report: &SweepReport,
    layout: &ReportLayout,
    writer: W,
) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(header(report, layout))?;
    for row in report.rows() {
        csv_writer.write_record(render_row(row, layout))?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Writes `report` to `path`, replacing any existing file.
pub fn export_report(
    report: &SweepReport,
    layout: &ReportLayout,
    path: &Path,
) -> Result<(), ExportError> {
    let file = File::create(path).map_err(|source| ExportError::Create {
        path: path.to_path_buf(),
        source,
    })?;
    write_report(report, layout, file).map_err(|source| ExportError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    info!(
        "Wrote {} row(s) ({} failed) to {:?}.",
        report.len(),
        report.failure_count(),
        path
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::grid::{ParameterCombination, SweepParameter};
    use crate::engine::outcome::FailureKind;
    use crate::engine::pipeline::{Peak, SesameCounts};
    use crate::engine::table::ResultTable;
    use tempfile::tempdir;

    fn full_layout() -> ReportLayout {
        ReportLayout {
            outcomes: vec![
                OutcomeColumn::PeakFrequency,
                OutcomeColumn::PeakAmplitude,
                OutcomeColumn::PassingWindows,
                OutcomeColumn::ClarityPass,
                OutcomeColumn::ReliabilityPass,
            ],
            precision: 5,
            verdicts: VerdictThresholds::default(),
        }
    }

    fn sample_report() -> SweepReport {
        let params = vec![SweepParameter::WindowLength, SweepParameter::TaperWidth];
        let mut table = ResultTable::new(params.clone());
        let combo = |w: f64, t: f64| {
            ParameterCombination::new(vec![(params[0], w), (params[1], t)])
        };
        table.push(ResultRow {
            combination: combo(5.0, 0.1),
            outcome: Outcome::Completed(Measurement {
                peak: Some(Peak {
                    frequency: 1.234567,
                    amplitude: 3.5,
                }),
                passing_windows: 12,
                sesame: Some(SesameCounts {
                    clarity: 6,
                    reliability: 2,
                }),
            }),
        });
        table.push(ResultRow {
            combination: combo(10.0, 0.0),
            outcome: Outcome::failed(FailureKind::Pipeline, "no windows"),
        });
        table.push(ResultRow {
            combination: combo(15.0, 0.5),
            outcome: Outcome::Completed(Measurement {
                peak: None,
                passing_windows: 0,
                sesame: None,
            }),
        });
        table.finalize()
    }

    fn render(report: &SweepReport, layout: &ReportLayout) -> String {
        let mut buf = Vec::new();
        write_report(report, layout, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn rows_render_values_markers_and_verdicts() {
        let text = render(&sample_report(), &full_layout());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "window_length,taper_ratio,peak_frequency,peak_amplitude,passing_windows,clarity_pass,reliability_pass",
                "5,0.1,1.23457,3.50000,12,Pass,Fail",
                "10,0,error,error,error,error,error",
                "15,0.5,N/A,N/A,0,N/A,N/A",
            ]
        );
    }

    #[test]
    fn verdict_columns_follow_the_layout_thresholds() {
        let layout = ReportLayout {
            verdicts: VerdictThresholds::ANY_CRITERION,
            ..full_layout()
        };
        let text = render(&sample_report(), &layout);
        assert_eq!(text.lines().nth(1), Some("5,0.1,1.23457,3.50000,12,Pass,Pass"));

        let layout = ReportLayout {
            verdicts: VerdictThresholds {
                clarity: 6,
                reliability: 2,
            },
            ..full_layout()
        };
        let text = render(&sample_report(), &layout);
        assert_eq!(text.lines().nth(1), Some("5,0.1,1.23457,3.50000,12,Pass,Pass"));
    }

    #[test]
    fn layout_selects_outcome_columns_and_precision() {
        let layout = ReportLayout {
            outcomes: vec![OutcomeColumn::PeakFrequency],
            precision: 2,
            verdicts: VerdictThresholds::default(),
        };
        let text = render(&sample_report(), &layout);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "window_length,taper_ratio,peak_frequency");
        assert_eq!(lines[1], "5,0.1,1.23");
        assert_eq!(lines[2], "10,0,error");
    }

    #[test]
    fn export_overwrites_existing_file_with_identical_content() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("report.csv");
        std::fs::write(&path, "stale content that is longer than the report itself\n".repeat(20))
            .unwrap();

        let report = sample_report();
        export_report(&report, &full_layout(), &path).unwrap();
        let first = std::fs::read_to_string(&path).unwrap();
        export_report(&report, &full_layout(), &path).unwrap();
        let second = std::fs::read_to_string(&path).unwrap();

        assert_eq!(first, second);
        assert_eq!(first.lines().count(), 4);
        assert!(!first.contains("stale"));
    }

    #[test]
    fn export_into_missing_directory_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("report.csv");
        let err = export_report(&sample_report(), &full_layout(), &path).unwrap_err();
        assert!(matches!(err, ExportError::Create { .. }));
    }
}
