use super::defaults::DefaultsConfig;
use super::file::{
    FileConfig, FileInputConfig, FileOutcomeColumn, FilePipelineConfig, FileProcessingConfig,
    FileRange, FileRejectionMethod,
};
use super::models::{DurationAppConfig, SweepAppConfig};
use crate::cli::{DurationArgs, PipelineArgs, SweepArgs};
use crate::error::{CliError, Result};
use hvsweep::core::io::discovery::ChannelLayout;
use hvsweep::engine::bridge::CommandPipeline;
use hvsweep::engine::config as core_config;
use hvsweep::engine::export::{OutcomeColumn, ReportLayout};
use hvsweep::engine::grid::{RangeSpec, SweepAxis, SweepParameter};
use hvsweep::engine::pipeline::VerdictThresholds;
use hvsweep::workflows::duration_sweep::DurationJob;
use hvsweep::workflows::parameter_sweep::ParameterSweepJob;
use std::str::FromStr;

pub fn build_sweep_config(args: &SweepArgs) -> Result<SweepAppConfig> {
    let defaults = DefaultsConfig::default();
    let mut file_config = load_file_config(&args.pipeline)?;

    let pipeline = build_pipeline_command(&args.pipeline, file_config.pipeline.take())?;
    let layout = build_layout(file_config.input.take(), &defaults);
    let verdicts = build_verdicts(file_config.processing.as_ref(), &defaults);
    let baseline = build_pipeline_config(&mut file_config, &defaults)?;

    let sweep_file = file_config.sweep.take().unwrap_or_default();
    let baseline_trim_seconds = args.baseline_trim.or(sweep_file.baseline_trim);
    if let Some(seconds) = baseline_trim_seconds {
        if !(seconds.is_finite() && seconds > 0.0) {
            return Err(CliError::Argument(format!(
                "Baseline trim must be a positive number of seconds, got {}",
                seconds
            )));
        }
    }

    let axis_specs: Vec<(SweepParameter, RangeSpec)> = match sweep_file.axes {
        Some(axes) if !axes.is_empty() => axes
            .iter()
            .map(|axis| {
                let parameter = SweepParameter::from(axis.parameter);
                Ok((parameter, build_range(parameter, axis.range())?))
            })
            .collect::<Result<_>>()?,
        _ => defaults.sweep_axes.clone(),
    };
    let axes = build_axes(axis_specs)?;

    let report = build_report_layout(
        sweep_file.outcomes,
        args.pipeline.precision.or(sweep_file.precision),
        &defaults.sweep_outcomes,
        verdicts,
        &defaults,
    );

    let sweep = core_config::SweepConfigBuilder::new()
        .baseline(baseline)
        .axes(axes)
        .report(report)
        .build()
        .map_err(|e| CliError::Config(e.to_string()))?;

    Ok(SweepAppConfig {
        job: ParameterSweepJob {
            input_dir: args.input.clone(),
            output_path: args.output.clone(),
            layout,
            baseline_trim_seconds,
        },
        sweep,
        pipeline,
    })
}

pub fn build_duration_config(args: &DurationArgs) -> Result<DurationAppConfig> {
    let defaults = DefaultsConfig::default();
    let mut file_config = load_file_config(&args.pipeline)?;

    let pipeline = build_pipeline_command(&args.pipeline, file_config.pipeline.take())?;
    let layout = build_layout(file_config.input.take(), &defaults);
    let verdicts = build_verdicts(file_config.processing.as_ref(), &defaults);
    let baseline = build_pipeline_config(&mut file_config, &defaults)?;

    let duration_file = file_config.duration.take().unwrap_or_default();
    let durations = match duration_file.durations {
        Some(range) => build_range(SweepParameter::RecordDuration, range)?,
        None => defaults.durations.clone(),
    };
    let axes = build_axes(vec![(SweepParameter::RecordDuration, durations)])?;

    let report = build_report_layout(
        duration_file.outcomes,
        args.pipeline.precision.or(duration_file.precision),
        &defaults.duration_outcomes,
        verdicts,
        &defaults,
    );

    let sweep = core_config::SweepConfigBuilder::new()
        .baseline(baseline)
        .axes(axes)
        .report(report)
        .build()
        .map_err(|e| CliError::Config(e.to_string()))?;

    Ok(DurationAppConfig {
        job: DurationJob {
            input_dir: args.input.clone(),
            output_dir: args.output.clone(),
            layout,
        },
        sweep,
        pipeline,
    })
}

fn load_file_config(args: &PipelineArgs) -> Result<FileConfig> {
    let file_config = match &args.config {
        Some(path) => FileConfig::from_file(path)?,
        None => FileConfig::default(),
    };
    apply_set_values(file_config, &args.set_values)
}

fn build_layout(file_val: Option<FileInputConfig>, defaults: &DefaultsConfig) -> ChannelLayout {
    let input = file_val.unwrap_or_default();
    ChannelLayout {
        extension: input.extension.unwrap_or_else(|| defaults.extension.clone()),
        east: input.east.unwrap_or_else(|| defaults.east.clone()),
        north: input.north.unwrap_or_else(|| defaults.north.clone()),
        vertical: input.vertical.unwrap_or_else(|| defaults.vertical.clone()),
    }
}

fn build_pipeline_command(
    args: &PipelineArgs,
    file_val: Option<FilePipelineConfig>,
) -> Result<CommandPipeline> {
    let file_val = file_val.unwrap_or_default();
    let program = args
        .pipeline_program
        .clone()
        .or(file_val.program)
        .ok_or_else(|| {
            CliError::Config(
                "A pipeline program is required: set `pipeline.program` in the config file or pass --pipeline."
                    .to_string(),
            )
        })?;
    let extra_args = if args.pipeline_args.is_empty() {
        file_val.args.unwrap_or_default()
    } else {
        args.pipeline_args.clone()
    };
    Ok(CommandPipeline::new(program).with_args(extra_args))
}

fn build_pipeline_config(
    file_config: &mut FileConfig,
    defaults: &DefaultsConfig,
) -> Result<core_config::PipelineConfig> {
    let preprocessing_file = file_config.preprocessing.take().unwrap_or_default();
    let filter = if preprocessing_file
        .bandpass_filter
        .unwrap_or(defaults.bandpass_filter)
    {
        (
            Some(
                preprocessing_file
                    .filter_low_corner
                    .unwrap_or(defaults.filter_low_corner),
            ),
            Some(
                preprocessing_file
                    .filter_high_corner
                    .unwrap_or(defaults.filter_high_corner),
            ),
        )
    } else {
        (None, None)
    };
    let preprocessing = core_config::PreprocessingSettings {
        detrend: preprocessing_file
            .detrend
            .map(Into::into)
            .unwrap_or(defaults.detrend),
        window_length_in_seconds: preprocessing_file
            .window_length
            .unwrap_or(defaults.window_length),
        orient_to_degrees_from_north: preprocessing_file
            .orient_to_degrees_from_north
            .unwrap_or(defaults.orient_to_degrees_from_north),
        filter_corner_frequencies_in_hz: filter,
        ignore_dissimilar_time_step_warning: preprocessing_file
            .ignore_dissimilar_time_step_warning
            .unwrap_or(false),
    };

    let rejection_file = file_config.rejection.take().unwrap_or_default();
    let sta_lta = match rejection_file.method {
        Some(FileRejectionMethod::StaLta) => true,
        Some(FileRejectionMethod::None) => false,
        None => defaults.sta_lta_rejection,
    };
    let rejection = if sta_lta {
        core_config::RejectionSettings::StaLta {
            sta_seconds: rejection_file.sta_seconds.unwrap_or(defaults.sta_seconds),
            lta_seconds: rejection_file.lta_seconds.unwrap_or(defaults.lta_seconds),
            min_sta_lta_ratio: rejection_file
                .min_sta_lta_ratio
                .unwrap_or(defaults.min_sta_lta_ratio),
            max_sta_lta_ratio: rejection_file
                .max_sta_lta_ratio
                .unwrap_or(defaults.max_sta_lta_ratio),
        }
    } else {
        core_config::RejectionSettings::None
    };

    let processing_file = file_config.processing.take().unwrap_or_default();
    let freqs = processing_file.center_frequencies.unwrap_or_default();
    let center_frequencies_in_hz = core_config::log_spaced_frequencies(
        freqs.min.unwrap_or(defaults.center_frequency_min),
        freqs.max.unwrap_or(defaults.center_frequency_max),
        freqs.count.unwrap_or(defaults.center_frequency_count),
    )
    .map_err(|e| CliError::Config(e.to_string()))?;
    let sesame = processing_file
        .sesame
        .unwrap_or(defaults.sesame)
        .then(|| core_config::SesameSettings {
            search_range_in_hz: (
                processing_file.sesame_min_frequency,
                processing_file.sesame_max_frequency,
            ),
        });
    let processing = core_config::ProcessingSettings {
        window_type: processing_file
            .window_type
            .map(Into::into)
            .unwrap_or(defaults.window_type),
        window_width: processing_file.taper_width.unwrap_or(defaults.taper_width),
        smoothing: core_config::SmoothingSettings {
            operator: processing_file
                .smoothing_operator
                .map(Into::into)
                .unwrap_or(defaults.smoothing_operator),
            bandwidth: processing_file
                .smoothing_bandwidth
                .unwrap_or(defaults.smoothing_bandwidth),
            center_frequencies_in_hz,
        },
        method_to_combine_horizontals: processing_file
            .combine_horizontals
            .map(Into::into)
            .unwrap_or(defaults.combine_horizontals),
        handle_dissimilar_time_steps_by: processing_file
            .dissimilar_time_steps
            .map(Into::into)
            .unwrap_or(defaults.dissimilar_time_steps),
        sesame,
    };

    Ok(core_config::PipelineConfig {
        preprocessing,
        rejection,
        processing,
        record_duration_in_seconds: None,
    })
}

fn build_range(parameter: SweepParameter, range: FileRange) -> Result<RangeSpec> {
    match range {
        FileRange {
            values: Some(values),
            start: None,
            stop: None,
            step: None,
        } => Ok(RangeSpec::Values(values)),
        FileRange {
            values: None,
            start: Some(start),
            stop: Some(stop),
            step: Some(step),
        } => Ok(RangeSpec::Stepped { start, stop, step }),
        _ => Err(CliError::Config(format!(
            "Range for '{}' needs either `values` or all of `start`, `stop` and `step`",
            parameter
        ))),
    }
}

fn build_axes(specs: Vec<(SweepParameter, RangeSpec)>) -> Result<Vec<SweepAxis>> {
    specs
        .into_iter()
        .map(|(parameter, spec)| {
            SweepAxis::new(parameter, spec).map_err(|e| CliError::Config(e.to_string()))
        })
        .collect()
}

fn build_verdicts(
    processing_file: Option<&FileProcessingConfig>,
    defaults: &DefaultsConfig,
) -> VerdictThresholds {
    VerdictThresholds {
        clarity: processing_file
            .and_then(|p| p.clarity_pass_threshold)
            .unwrap_or(defaults.clarity_pass_threshold),
        reliability: processing_file
            .and_then(|p| p.reliability_pass_threshold)
            .unwrap_or(defaults.reliability_pass_threshold),
    }
}

fn build_report_layout(
    file_outcomes: Option<Vec<FileOutcomeColumn>>,
    precision: Option<usize>,
    default_outcomes: &[OutcomeColumn],
    verdicts: VerdictThresholds,
    defaults: &DefaultsConfig,
) -> ReportLayout {
    ReportLayout {
        outcomes: file_outcomes
            .map(|cols| cols.into_iter().map(Into::into).collect())
            .unwrap_or_else(|| default_outcomes.to_vec()),
        precision: precision.unwrap_or(defaults.precision),
        verdicts,
    }
}

fn parse_value<T: FromStr>(key: &str, value: &str, kind: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| CliError::Config(format!("Invalid {} value for {}: {}", kind, key, value)))
}

fn apply_set_values(mut config: FileConfig, set_values: &[String]) -> Result<FileConfig> {
    for kv_pair in set_values {
        let Some((key, value_str)) = kv_pair.split_once('=') else {
            return Err(CliError::Config(format!(
                "Invalid --set format: '{}'. Expected KEY=VALUE.",
                kv_pair
            )));
        };

        match key {
            "pipeline.program" => {
                config.pipeline.get_or_insert_with(Default::default).program =
                    Some(value_str.to_string());
            }
            "preprocessing.window-length" => {
                config
                    .preprocessing
                    .get_or_insert_with(Default::default)
                    .window_length = Some(parse_value(key, value_str, "float")?);
            }
            "preprocessing.orient-to-degrees-from-north" => {
                config
                    .preprocessing
                    .get_or_insert_with(Default::default)
                    .orient_to_degrees_from_north = Some(parse_value(key, value_str, "float")?);
            }
            "preprocessing.bandpass-filter" => {
                config
                    .preprocessing
                    .get_or_insert_with(Default::default)
                    .bandpass_filter = Some(parse_value(key, value_str, "boolean")?);
            }
            "preprocessing.filter-low-corner" => {
                config
                    .preprocessing
                    .get_or_insert_with(Default::default)
                    .filter_low_corner = Some(parse_value(key, value_str, "float")?);
            }
            "preprocessing.filter-high-corner" => {
                config
                    .preprocessing
                    .get_or_insert_with(Default::default)
                    .filter_high_corner = Some(parse_value(key, value_str, "float")?);
            }
            "rejection.method" => {
                let method = match value_str {
                    "none" => FileRejectionMethod::None,
                    "sta-lta" => FileRejectionMethod::StaLta,
                    other => {
                        return Err(CliError::Config(format!(
                            "Invalid value for {}: '{}'. Expected 'none' or 'sta-lta'.",
                            key, other
                        )));
                    }
                };
                config.rejection.get_or_insert_with(Default::default).method = Some(method);
            }
            "rejection.sta-seconds" => {
                config.rejection.get_or_insert_with(Default::default).sta_seconds =
                    Some(parse_value(key, value_str, "float")?);
            }
            "rejection.lta-seconds" => {
                config.rejection.get_or_insert_with(Default::default).lta_seconds =
                    Some(parse_value(key, value_str, "float")?);
            }
            "rejection.min-sta-lta-ratio" => {
                config
                    .rejection
                    .get_or_insert_with(Default::default)
                    .min_sta_lta_ratio = Some(parse_value(key, value_str, "float")?);
            }
            "rejection.max-sta-lta-ratio" => {
                config
                    .rejection
                    .get_or_insert_with(Default::default)
                    .max_sta_lta_ratio = Some(parse_value(key, value_str, "float")?);
            }
            "processing.taper-width" => {
                config
                    .processing
                    .get_or_insert_with(Default::default)
                    .taper_width = Some(parse_value(key, value_str, "float")?);
            }
            "processing.smoothing-bandwidth" => {
                config
                    .processing
                    .get_or_insert_with(Default::default)
                    .smoothing_bandwidth = Some(parse_value(key, value_str, "float")?);
            }
            "processing.sesame" => {
                config.processing.get_or_insert_with(Default::default).sesame =
                    Some(parse_value(key, value_str, "boolean")?);
            }
            "processing.clarity-pass-threshold" => {
                config
                    .processing
                    .get_or_insert_with(Default::default)
                    .clarity_pass_threshold = Some(parse_value(key, value_str, "integer")?);
            }
            "processing.reliability-pass-threshold" => {
                config
                    .processing
                    .get_or_insert_with(Default::default)
                    .reliability_pass_threshold = Some(parse_value(key, value_str, "integer")?);
            }
            "sweep.baseline-trim" => {
                config.sweep.get_or_insert_with(Default::default).baseline_trim =
                    Some(parse_value(key, value_str, "float")?);
            }
            "sweep.precision" => {
                config.sweep.get_or_insert_with(Default::default).precision =
                    Some(parse_value(key, value_str, "integer")?);
            }
            "duration.precision" => {
                config.duration.get_or_insert_with(Default::default).precision =
                    Some(parse_value(key, value_str, "integer")?);
            }
            _ => {
                return Err(CliError::Config(format!(
                    "Unsupported configuration key for --set: '{}'",
                    key
                )));
            }
        }
    }
    Ok(config)
}
