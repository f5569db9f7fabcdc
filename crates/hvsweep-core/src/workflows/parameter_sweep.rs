use crate::core::io::discovery::{ChannelLayout, find_first_group};
use crate::core::io::traits::RecordingLoader;
use crate::engine::config::SweepConfig;
use crate::engine::driver::SweepDriver;
use crate::engine::error::EngineError;
use crate::engine::export::export_report;
use crate::engine::pipeline::HvsrPipeline;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::table::SweepReport;
use std::path::PathBuf;
use tracing::{info, instrument};

#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSweepJob {
    pub input_dir: PathBuf,
    pub output_path: PathBuf,
    pub layout: ChannelLayout,
    /// Keep only the last this-many seconds of the baseline before sweeping.
    /// Recordings shorter than that are kept whole.
    pub baseline_trim_seconds: Option<f64>,
}

#[instrument(skip_all, name = "parameter_sweep_workflow")]
pub fn run<L, P>(
    job: &ParameterSweepJob,
    config: &SweepConfig,
    loader: &L,
    pipeline: &P,
    reporter: &ProgressReporter,
) -> Result<SweepReport, EngineError>
where
    L: RecordingLoader,
    P: HvsrPipeline,
{
    reporter.phase("Loading");
    let group = find_first_group(&job.input_dir, &job.layout)?;
    info!("Using channel group '{}' as the baseline.", group.prefix);
    let mut baseline = loader.load(std::slice::from_ref(&group))?;
    if let Some(seconds) = job.baseline_trim_seconds {
        baseline.keep_last(seconds)?;
        info!("Baseline trimmed to its last {} s.", seconds);
    }
    reporter.report(Progress::PhaseFinish);

    reporter.phase("Parameter sweep");
    info!(
        "Sweeping {} combination(s) over {} parameter(s).",
        config.grid.len(),
        config.grid.axes().len()
    );
    let report = SweepDriver::new(pipeline, reporter).run(&baseline, config);
    reporter.report(Progress::PhaseFinish);

    export_report(&report, &config.report, &job.output_path)?;
    Ok(report)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::core::io::discovery::DiscoveryError;
    use crate::core::io::sac::{SacLoader, SacTrace};
    use crate::core::models::timeseries::TimeSeries;
    use crate::engine::config::{SweepConfigBuilder, test_pipeline_config};
    use crate::engine::driver::tests::FakePipeline;
    use crate::engine::export::{OutcomeColumn, ReportLayout};
    use crate::engine::pipeline::VerdictThresholds;
    use crate::engine::grid::{SweepAxis, SweepParameter};
    use std::path::Path;
    use tempfile::tempdir;

    pub(crate) fn write_group(dir: &Path, prefix: &str, seconds: usize) {
        let series =
            TimeSeries::new(1.0, (0..=seconds).map(|i| (i as f64 * 0.1).sin()).collect()).unwrap();
        for token in ["E", "N", "Z"] {
            SacTrace::from_time_series(&series, Some(prefix), Some(token))
                .write_to_path(dir.join(format!("{prefix}.{token}.sac")))
                .unwrap();
        }
    }

    fn sweep_config() -> SweepConfig {
        SweepConfigBuilder::new()
            .baseline(test_pipeline_config())
            .axis(SweepAxis::from_values(SweepParameter::WindowLength, vec![5.0, 10.0]).unwrap())
            .axis(SweepAxis::from_values(SweepParameter::TaperWidth, vec![0.0, 0.5]).unwrap())
            .axis(SweepAxis::from_values(SweepParameter::SmoothingBandwidth, vec![10.0]).unwrap())
            .report(ReportLayout {
                outcomes: vec![OutcomeColumn::PeakFrequency],
                precision: 5,
                verdicts: VerdictThresholds::default(),
            })
            .build()
            .unwrap()
    }

    #[test]
    fn sweep_uses_first_group_and_exports_report() {
        let input = tempdir().unwrap();
        let output = tempdir().unwrap();
        write_group(input.path(), "B_SITE", 100);
        write_group(input.path(), "A_SITE", 200);

        let job = ParameterSweepJob {
            input_dir: input.path().to_path_buf(),
            output_path: output.path().join("sweep.csv"),
            layout: ChannelLayout::default(),
            baseline_trim_seconds: Some(60.0),
        };
        let pipeline = FakePipeline::default();

        let report = run(
            &job,
            &sweep_config(),
            &SacLoader,
            &pipeline,
            &ProgressReporter::new(),
        )
        .unwrap();

        assert_eq!(report.len(), 4);
        assert_eq!(*pipeline.seen_lengths.lock().unwrap(), vec![61; 4]);

        let text = std::fs::read_to_string(&job.output_path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], "window_length,taper_ratio,bandwidth,peak_frequency");
        assert_eq!(lines[2], "5,0.5,10,1.00000");
    }

    #[test]
    fn missing_inputs_abort_before_any_iteration() {
        let input = tempdir().unwrap();
        let output = tempdir().unwrap();
        std::fs::write(input.path().join("SITE.E.sac"), b"").unwrap();

        let job = ParameterSweepJob {
            input_dir: input.path().to_path_buf(),
            output_path: output.path().join("sweep.csv"),
            layout: ChannelLayout::default(),
            baseline_trim_seconds: None,
        };
        let pipeline = FakePipeline::default();

        let err = run(
            &job,
            &sweep_config(),
            &SacLoader,
            &pipeline,
            &ProgressReporter::new(),
        )
        .unwrap_err();

        assert!(matches!(
            err,
            EngineError::InputNotFound(DiscoveryError::NoCompleteGroup { .. })
        ));
        assert!(pipeline.seen_lengths.lock().unwrap().is_empty());
        assert!(!job.output_path.exists());
    }
}
