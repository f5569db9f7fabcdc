use super::config::{PipelineConfig, SweepConfig};
use super::grid::ParameterCombination;
use super::outcome::{FailureKind, Measurement, Outcome};
use super::pipeline::HvsrPipeline;
use super::progress::{Progress, ProgressReporter};
use super::table::{ResultRow, ResultTable, SweepReport};
use crate::core::models::recording::RecordingSet;
use tracing::{debug, instrument, warn};

/// Runs every combination of a grid against one baseline dataset.
///
/// The baseline is only ever read; each combination gets its own snapshot.
/// A failing combination is logged and recorded, and the sweep moves on.
pub struct SweepDriver<'a, P: HvsrPipeline> {
    pipeline: &'a P,
    reporter: &'a ProgressReporter<'a>,
}

impl<'a, P: HvsrPipeline> SweepDriver<'a, P> {
    pub fn new(pipeline: &'a P, reporter: &'a ProgressReporter<'a>) -> Self {
        Self { pipeline, reporter }
    }

    #[instrument(skip_all, name = "sweep", fields(combinations = config.grid.len()))]
    pub fn run(&self, baseline: &RecordingSet, config: &SweepConfig) -> SweepReport {
        let total = config.grid.len();
        self.reporter.report(Progress::SweepStart {
            total_combinations: total as u64,
        });

        let parameters = config.grid.parameters().collect();
        let mut table = ResultTable::with_capacity(parameters, total);
        for combination in &config.grid {
            let outcome = self.evaluate(baseline, &config.baseline, &combination);
            match &outcome {
                Outcome::Failed { kind, reason } => {
                    warn!("Combination [{}] failed ({}): {}", combination, kind, reason);
                }
                Outcome::Completed(m) => {
                    debug!(
                        "Combination [{}] peak at {:?} Hz.",
                        combination,
                        m.peak_frequency()
                    );
                }
            }
            self.reporter.report(Progress::CombinationFinished {
                failed: outcome.is_failure(),
            });
            table.push(ResultRow {
                combination,
                outcome,
            });
        }

        let report = table.finalize();
        self.reporter.report(Progress::SweepFinish {
            failures: report.failure_count(),
        });
        report
    }

    /// Evaluates a single combination against a fresh snapshot of `baseline`.
    pub fn evaluate(
        &self,
        baseline: &RecordingSet,
        base_config: &PipelineConfig,
        combination: &ParameterCombination,
    ) -> Outcome {
        let config = match combination.apply_to(base_config) {
            Ok(config) => config,
            Err(e) => return Outcome::failed(FailureKind::Configuration, e),
        };

        let mut working = baseline.snapshot();
        if let Some(duration) = config.record_duration_in_seconds {
            if let Err(e) = working.trim_to_last(duration) {
                return Outcome::failed(FailureKind::Trim, e);
            }
        }

        match self.pipeline.run(working, &config) {
            Ok(result) => Outcome::Completed(Measurement::from_result(&result)),
            Err(e) => Outcome::failed(FailureKind::Pipeline, e),
        }
    }
}

/// Convenience wrapper around [`SweepDriver::run`].
pub fn run_sweep<P: HvsrPipeline>(
    pipeline: &P,
    baseline: &RecordingSet,
    config: &SweepConfig,
    reporter: &ProgressReporter,
) -> SweepReport {
    SweepDriver::new(pipeline, reporter).run(baseline, config)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::core::models::recording::ThreeComponentRecording;
    use crate::core::models::timeseries::TimeSeries;
    use crate::engine::config::{
        PreprocessingSettings, ProcessingSettings, RejectionSettings, SweepConfigBuilder,
        test_pipeline_config,
    };
    use crate::engine::export::{OutcomeColumn, ReportLayout, write_report};
    use crate::engine::grid::{SweepAxis, SweepParameter};
    use crate::engine::pipeline::{HvsrResult, PipelineError, SesameCounts, VerdictThresholds};
    use std::sync::Mutex;

    pub(crate) fn recordings(seconds: usize, dt: f64) -> RecordingSet {
        let n = (seconds as f64 / dt) as usize + 1;
        let series = || TimeSeries::new(dt, (0..n).map(|i| (i as f64).sin()).collect()).unwrap();
        RecordingSet::new(vec![ThreeComponentRecording {
            name: "SITE".to_string(),
            ns: series(),
            ew: series(),
            vt: series(),
        }])
    }

    /// Pipeline double: peak frequency equals the window length divided by
    /// ten, and it zeroes its input to prove the baseline is never shared.
    #[derive(Default)]
    pub(crate) struct FakePipeline {
        pub fail_on_window: Option<f64>,
        pub seen_lengths: Mutex<Vec<usize>>,
    }

    impl HvsrPipeline for FakePipeline {
        type Preprocessed = (RecordingSet, f64);
        type Accepted = (RecordingSet, f64);

        fn preprocess(
            &self,
            mut records: RecordingSet,
            settings: &PreprocessingSettings,
        ) -> Result<Self::Preprocessed, PipelineError> {
            if self.fail_on_window == Some(settings.window_length_in_seconds) {
                return Err(PipelineError::Reported(
                    "window longer than record".to_string(),
                ));
            }
            let first = &records.records()[0].vt;
            self.seen_lengths.lock().unwrap().push(first.n_samples());
            for record in records.records_mut() {
                record.vt.amplitude_mut().iter_mut().for_each(|a| *a = 0.0);
            }
            Ok((records, settings.window_length_in_seconds))
        }

        fn reject_windows(
            &self,
            preprocessed: Self::Preprocessed,
            _settings: &RejectionSettings,
        ) -> Result<Self::Accepted, PipelineError> {
            Ok(preprocessed)
        }

        fn process(
            &self,
            (_, window): Self::Accepted,
            settings: &ProcessingSettings,
        ) -> Result<HvsrResult, PipelineError> {
            let peak = window / 10.0 + settings.window_width;
            Ok(HvsrResult {
                frequency: vec![peak / 2.0, peak, peak * 2.0],
                mean_curve: vec![1.0, 5.0, 1.0],
                valid_window_mask: vec![true; 4],
                sesame: Some(SesameCounts {
                    clarity: 6,
                    reliability: 3,
                }),
            })
        }
    }

    fn config(axes: Vec<SweepAxis>, outcomes: Vec<OutcomeColumn>) -> SweepConfig {
        SweepConfigBuilder::new()
            .baseline(test_pipeline_config())
            .axes(axes)
            .report(ReportLayout {
                outcomes,
                precision: 5,
                verdicts: VerdictThresholds::default(),
            })
            .build()
            .unwrap()
    }

    fn three_axis_config() -> SweepConfig {
        config(
            vec![
                SweepAxis::from_values(SweepParameter::WindowLength, vec![5.0, 10.0]).unwrap(),
                SweepAxis::from_values(SweepParameter::TaperWidth, vec![0.0, 0.5]).unwrap(),
                SweepAxis::from_values(SweepParameter::SmoothingBandwidth, vec![10.0]).unwrap(),
            ],
            vec![
                OutcomeColumn::PeakFrequency,
                OutcomeColumn::ClarityPass,
                OutcomeColumn::ReliabilityPass,
            ],
        )
    }

    fn csv_of(report: &SweepReport, config: &SweepConfig) -> String {
        let mut buf = Vec::new();
        write_report(report, &config.report, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn sweep_emits_one_row_per_combination_in_order() {
        let baseline = recordings(120, 1.0);
        let pipeline = FakePipeline::default();
        let config = three_axis_config();

        let report = run_sweep(&pipeline, &baseline, &config, &ProgressReporter::new());

        let points: Vec<Vec<f64>> = report
            .rows()
            .iter()
            .map(|r| r.combination.values().collect())
            .collect();
        assert_eq!(
            points,
            vec![
                vec![5.0, 0.0, 10.0],
                vec![5.0, 0.5, 10.0],
                vec![10.0, 0.0, 10.0],
                vec![10.0, 0.5, 10.0],
            ]
        );
        assert_eq!(report.failure_count(), 0);

        let text = csv_of(&report, &config);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(
            lines[0],
            "window_length,taper_ratio,bandwidth,peak_frequency,clarity_pass,reliability_pass"
        );
        assert_eq!(lines[1], "5,0,10,0.50000,Pass,Pass");
        assert_eq!(lines[4], "10,0.5,10,1.50000,Pass,Pass");
    }

    #[test]
    fn failing_combination_is_recorded_and_sweep_continues() {
        let baseline = recordings(120, 1.0);
        let pipeline = FakePipeline {
            fail_on_window: Some(5.0),
            ..Default::default()
        };
        let config = three_axis_config();

        let report = run_sweep(&pipeline, &baseline, &config, &ProgressReporter::new());

        assert_eq!(report.len(), 4);
        assert_eq!(report.failure_count(), 2);
        assert!(matches!(
            report.rows()[0].outcome,
            Outcome::Failed {
                kind: FailureKind::Pipeline,
                ..
            }
        ));

        let text = csv_of(&report, &config);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[1], "5,0,10,error,error,error");
        assert_eq!(lines[3], "10,0,10,1.00000,Pass,Pass");
    }

    #[test]
    fn baseline_is_untouched_and_every_run_sees_full_data() {
        let baseline = recordings(120, 1.0);
        let before = baseline.snapshot();
        let pipeline = FakePipeline::default();

        let report = run_sweep(
            &pipeline,
            &baseline,
            &three_axis_config(),
            &ProgressReporter::new(),
        );

        assert_eq!(report.failure_count(), 0);
        assert_eq!(baseline, before);
        assert_eq!(*pipeline.seen_lengths.lock().unwrap(), vec![121; 4]);
    }

    #[test]
    fn repeated_sweeps_produce_identical_reports() {
        let baseline = recordings(120, 1.0);
        let pipeline = FakePipeline::default();
        let config = three_axis_config();
        let reporter = ProgressReporter::new();

        let first = run_sweep(&pipeline, &baseline, &config, &reporter);
        let second = run_sweep(&pipeline, &baseline, &config, &reporter);
        assert_eq!(csv_of(&first, &config), csv_of(&second, &config));
    }

    #[test]
    fn duration_axis_trims_each_snapshot_and_records_short_records_as_failures() {
        let baseline = recordings(600, 1.0);
        let pipeline = FakePipeline::default();
        let config = config(
            vec![
                SweepAxis::stepped(SweepParameter::RecordDuration, 900.0, 300.0, -300.0).unwrap(),
            ],
            vec![OutcomeColumn::PeakFrequency],
        );

        let report = run_sweep(&pipeline, &baseline, &config, &ProgressReporter::new());

        assert_eq!(report.len(), 3);
        assert!(matches!(
            report.rows()[0].outcome,
            Outcome::Failed {
                kind: FailureKind::Trim,
                ..
            }
        ));
        assert!(!report.rows()[1].outcome.is_failure());
        assert_eq!(*pipeline.seen_lengths.lock().unwrap(), vec![601, 301]);
    }

    #[test]
    fn invalid_combination_becomes_configuration_failure() {
        let baseline = recordings(120, 1.0);
        let pipeline = FakePipeline::default();
        let config = config(
            vec![SweepAxis::from_values(SweepParameter::SmoothingBandwidth, vec![0.0, 40.0]).unwrap()],
            vec![OutcomeColumn::PeakFrequency],
        );

        let report = run_sweep(&pipeline, &baseline, &config, &ProgressReporter::new());

        assert!(matches!(
            report.rows()[0].outcome,
            Outcome::Failed {
                kind: FailureKind::Configuration,
                ..
            }
        ));
        assert!(!report.rows()[1].outcome.is_failure());
        assert_eq!(pipeline.seen_lengths.lock().unwrap().len(), 1);
    }

    #[test]
    fn progress_events_follow_the_sweep() {
        let baseline = recordings(120, 1.0);
        let pipeline = FakePipeline {
            fail_on_window: Some(10.0),
            ..Default::default()
        };
        let captured = Mutex::new(Vec::new());
        {
            let reporter = ProgressReporter::with_callback(Box::new(|event| {
                captured.lock().unwrap().push(event);
            }));
            run_sweep(&pipeline, &baseline, &three_axis_config(), &reporter);
        }

        let events = captured.into_inner().unwrap();
        assert_eq!(
            events.first(),
            Some(&Progress::SweepStart {
                total_combinations: 4
            })
        );
        let failed: Vec<bool> = events
            .iter()
            .filter_map(|e| match e {
                Progress::CombinationFinished { failed } => Some(*failed),
                _ => None,
            })
            .collect();
        assert_eq!(failed, vec![false, false, true, true]);
        assert_eq!(events.last(), Some(&Progress::SweepFinish { failures: 2 }));
    }
}
