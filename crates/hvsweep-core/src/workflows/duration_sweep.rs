use crate::core::io::discovery::{ChannelLayout, find_component_groups, no_complete_group};
use crate::core::io::traits::RecordingLoader;
use crate::engine::config::{ConfigError, SweepConfig};
use crate::engine::driver::SweepDriver;
use crate::engine::error::EngineError;
use crate::engine::export::export_report;
use crate::engine::grid::SweepParameter;
use crate::engine::pipeline::HvsrPipeline;
use crate::engine::progress::{Progress, ProgressReporter};
use std::path::PathBuf;
use tracing::{error, info, instrument};

pub const REPORT_SUFFIX: &str = "_hvsr_peaks.csv";

#[derive(Debug, Clone, PartialEq)]
pub struct DurationJob {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub layout: ChannelLayout,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DurationSummary {
    pub exported: Vec<PathBuf>,
    /// Groups that could not be loaded, with the reason.
    pub skipped: Vec<(String, String)>,
}

/// Runs the duration sweep once per discovered channel group and writes one
/// `<prefix>_hvsr_peaks.csv` per group.
#[instrument(skip_all, name = "duration_workflow")]
pub fn run<L, P>(
    job: &DurationJob,
    config: &SweepConfig,
    loader: &L,
    pipeline: &P,
    reporter: &ProgressReporter,
) -> Result<DurationSummary, EngineError>
where
    L: RecordingLoader,
    P: HvsrPipeline,
{
    if !config.grid.contains(SweepParameter::RecordDuration) {
        return Err(ConfigError::MissingParameter("record-duration axis").into());
    }

    let groups = find_component_groups(&job.input_dir, &job.layout)?;
    if groups.is_empty() {
        return Err(no_complete_group(&job.input_dir, &job.layout).into());
    }
    std::fs::create_dir_all(&job.output_dir).map_err(|source| EngineError::OutputDirectory {
        path: job.output_dir.clone(),
        source,
    })?;
    info!("Processing {} channel group(s).", groups.len());

    let driver = SweepDriver::new(pipeline, reporter);
    let mut summary = DurationSummary::default();
    for group in &groups {
        reporter.phase(group.prefix.clone());
        let baseline = match loader.load(std::slice::from_ref(group)) {
            Ok(baseline) => baseline,
            Err(e) => {
                error!("Skipping '{}': {}", group.prefix, e);
                summary.skipped.push((group.prefix.clone(), e.to_string()));
                reporter.report(Progress::PhaseFinish);
                continue;
            }
        };

        let report = driver.run(&baseline, config);
        let path = job
            .output_dir
            .join(format!("{}{}", group.prefix, REPORT_SUFFIX));
        export_report(&report, &config.report, &path)?;
        summary.exported.push(path);
        reporter.report(Progress::PhaseFinish);
    }

    info!(
        "Exported {} report(s), skipped {} group(s).",
        summary.exported.len(),
        summary.skipped.len()
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::sac::SacLoader;
    use crate::engine::config::{SweepConfigBuilder, test_pipeline_config};
    use crate::engine::driver::tests::FakePipeline;
    use crate::engine::export::{OutcomeColumn, ReportLayout};
    use crate::engine::pipeline::VerdictThresholds;
    use crate::engine::grid::SweepAxis;
    use crate::workflows::parameter_sweep::tests::write_group;
    use tempfile::tempdir;

    fn duration_config(start: f64, stop: f64, step: f64) -> SweepConfig {
        SweepConfigBuilder::new()
            .baseline(test_pipeline_config())
            .axis(SweepAxis::stepped(SweepParameter::RecordDuration, start, stop, step).unwrap())
            .report(ReportLayout {
                outcomes: vec![OutcomeColumn::PeakFrequency],
                precision: 5,
                verdicts: VerdictThresholds::default(),
            })
            .build()
            .unwrap()
    }

    #[test]
    fn one_report_per_group_with_error_rows_for_long_durations() {
        let input = tempdir().unwrap();
        let output = tempdir().unwrap();
        write_group(input.path(), "SITE_A", 400);
        write_group(input.path(), "SITE_B", 200);
        std::fs::write(input.path().join("SITE_C.E.sac"), b"").unwrap();

        let job = DurationJob {
            input_dir: input.path().to_path_buf(),
            output_dir: output.path().join("peaks"),
            layout: ChannelLayout::default(),
        };
        let summary = run(
            &job,
            &duration_config(300.0, 100.0, -100.0),
            &SacLoader,
            &FakePipeline::default(),
            &ProgressReporter::new(),
        )
        .unwrap();

        assert_eq!(summary.exported.len(), 2);
        assert!(summary.skipped.is_empty());

        let a = std::fs::read_to_string(job.output_dir.join("SITE_A_hvsr_peaks.csv")).unwrap();
        let lines: Vec<&str> = a.lines().collect();
        assert_eq!(lines[0], "time_interval_sec,peak_frequency");
        assert_eq!(lines.len(), 4);
        assert!(lines[1..].iter().all(|l| !l.ends_with("error")));

        let b = std::fs::read_to_string(job.output_dir.join("SITE_B_hvsr_peaks.csv")).unwrap();
        let lines: Vec<&str> = b.lines().collect();
        assert_eq!(lines[1], "300,error");
        assert!(lines[2].starts_with("200,"));
        assert!(!lines[2].ends_with("error"));
    }

    #[test]
    fn unreadable_group_is_skipped() {
        let input = tempdir().unwrap();
        let output = tempdir().unwrap();
        write_group(input.path(), "GOOD", 400);
        for token in ["E", "N", "Z"] {
            std::fs::write(input.path().join(format!("BAD.{token}.sac")), b"garbage").unwrap();
        }

        let job = DurationJob {
            input_dir: input.path().to_path_buf(),
            output_dir: output.path().to_path_buf(),
            layout: ChannelLayout::default(),
        };
        let summary = run(
            &job,
            &duration_config(300.0, 100.0, -100.0),
            &SacLoader,
            &FakePipeline::default(),
            &ProgressReporter::new(),
        )
        .unwrap();

        assert_eq!(summary.exported, vec![output.path().join("GOOD_hvsr_peaks.csv")]);
        assert_eq!(summary.skipped.len(), 1);
        assert_eq!(summary.skipped[0].0, "BAD");
    }

    #[test]
    fn grid_without_duration_axis_is_rejected() {
        let input = tempdir().unwrap();
        let config = SweepConfigBuilder::new()
            .baseline(test_pipeline_config())
            .axis(SweepAxis::from_values(SweepParameter::WindowLength, vec![30.0]).unwrap())
            .report(ReportLayout {
                outcomes: vec![OutcomeColumn::PeakFrequency],
                precision: 5,
                verdicts: VerdictThresholds::default(),
            })
            .build()
            .unwrap();
        let job = DurationJob {
            input_dir: input.path().to_path_buf(),
            output_dir: input.path().to_path_buf(),
            layout: ChannelLayout::default(),
        };

        let err = run(
            &job,
            &config,
            &SacLoader,
            &FakePipeline::default(),
            &ProgressReporter::new(),
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::Config(ConfigError::MissingParameter(_))));
    }
}
