use super::export::ReportLayout;
use super::grid::{ParameterGrid, SweepAxis};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Invalid value for '{parameter}': {value} ({reason})")]
    InvalidValue {
        parameter: &'static str,
        value: f64,
        reason: &'static str,
    },

    #[error("At least one sweep axis is required")]
    NoAxes,

    #[error("Sweep parameter '{0}' is declared on more than one axis")]
    DuplicateAxis(&'static str),

    #[error("Invalid range for sweep parameter '{parameter}': {reason}")]
    InvalidRange {
        parameter: &'static str,
        reason: String,
    },

    #[error("Sweep parameter '{parameter}' cannot be used here: {reason}")]
    AxisNotApplicable {
        parameter: &'static str,
        reason: &'static str,
    },

    #[error("At least one outcome column is required")]
    NoOutcomeColumns,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Detrend {
    None,
    Linear,
    Constant,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreprocessingSettings {
    pub detrend: Detrend,
    pub window_length_in_seconds: f64,
    pub orient_to_degrees_from_north: f64,
    pub filter_corner_frequencies_in_hz: (Option<f64>, Option<f64>),
    pub ignore_dissimilar_time_step_warning: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowType {
    Tukey,
    Hann,
    Boxcar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SmoothingOperator {
    KonnoAndOhmachi,
    Parzen,
    SavitzkyAndGolay,
    LinearRectangular,
    LogRectangular,
    LinearTriangular,
    LogTriangular,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SmoothingSettings {
    pub operator: SmoothingOperator,
    pub bandwidth: f64,
    pub center_frequencies_in_hz: Vec<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HorizontalCombination {
    TotalHorizontalEnergy,
    GeometricMean,
    SquaredAverage,
    VectorSummation,
    MaximumHorizontalValue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DissimilarTimeSteps {
    FrequencyDomainResampling,
    KeepSmallest,
    KeepMajority,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SesameSettings {
    pub search_range_in_hz: (Option<f64>, Option<f64>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessingSettings {
    pub window_type: WindowType,
    pub window_width: f64,
    pub smoothing: SmoothingSettings,
    pub method_to_combine_horizontals: HorizontalCombination,
    pub handle_dissimilar_time_steps_by: DissimilarTimeSteps,
    pub sesame: Option<SesameSettings>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum RejectionSettings {
    None,
    StaLta {
        sta_seconds: f64,
        lta_seconds: f64,
        min_sta_lta_ratio: f64,
        max_sta_lta_ratio: f64,
    },
}

/// Everything one pipeline invocation needs, derived from the baseline plus
/// one parameter combination.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineConfig {
    pub preprocessing: PreprocessingSettings,
    pub rejection: RejectionSettings,
    pub processing: ProcessingSettings,
    /// When set, each iteration cuts its snapshot to the last this-many
    /// seconds before preprocessing.
    pub record_duration_in_seconds: Option<f64>,
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_except(|_| false)
    }

    /// Like [`PipelineConfig::validate`], but skips the settings a sweep axis
    /// overrides. Those are checked per combination instead. A check that
    /// ties two settings together is skipped when either one is swept.
    pub fn validate_unswept(&self, grid: &ParameterGrid) -> Result<(), ConfigError> {
        self.validate_except(|name| grid.parameters().any(|p| p.name() == name))
    }

    fn validate_except(&self, swept: impl Fn(&str) -> bool) -> Result<(), ConfigError> {
        let pre = &self.preprocessing;
        if !swept("window-length") {
            require_positive("window-length", pre.window_length_in_seconds)?;
        }
        require_finite("orient-to-degrees-from-north", pre.orient_to_degrees_from_north)?;

        let (low, high) = pre.filter_corner_frequencies_in_hz;
        if let Some(low) = low.filter(|_| !swept("filter-low-corner")) {
            require_positive("filter-low-corner", low)?;
        }
        if let Some(high) = high.filter(|_| !swept("filter-high-corner")) {
            require_positive("filter-high-corner", high)?;
            if !swept("filter-low-corner") && low.is_some_and(|low| low >= high) {
                return Err(ConfigError::InvalidValue {
                    parameter: "filter-high-corner",
                    value: high,
                    reason: "must be above the low corner",
                });
            }
        }

        let processing = &self.processing;
        if !swept("taper-width") && !(0.0..=1.0).contains(&processing.window_width) {
            return Err(ConfigError::InvalidValue {
                parameter: "taper-width",
                value: processing.window_width,
                reason: "must lie in [0, 1]",
            });
        }
        if !swept("smoothing-bandwidth") {
            require_positive("smoothing-bandwidth", processing.smoothing.bandwidth)?;
        }
        if processing.smoothing.center_frequencies_in_hz.is_empty() {
            return Err(ConfigError::MissingParameter("center-frequencies"));
        }

        if let RejectionSettings::StaLta {
            sta_seconds,
            lta_seconds,
            min_sta_lta_ratio,
            max_sta_lta_ratio,
        } = self.rejection
        {
            require_positive("sta-seconds", sta_seconds)?;
            require_positive("lta-seconds", lta_seconds)?;
            if lta_seconds < sta_seconds {
                return Err(ConfigError::InvalidValue {
                    parameter: "lta-seconds",
                    value: lta_seconds,
                    reason: "must not be shorter than the STA window",
                });
            }
            let (min_swept, max_swept) = (swept("min-sta-lta-ratio"), swept("max-sta-lta-ratio"));
            if !min_swept && (!min_sta_lta_ratio.is_finite() || min_sta_lta_ratio < 0.0) {
                return Err(ConfigError::InvalidValue {
                    parameter: "min-sta-lta-ratio",
                    value: min_sta_lta_ratio,
                    reason: "must be non-negative",
                });
            }
            if !min_swept
                && !max_swept
                && (!max_sta_lta_ratio.is_finite() || max_sta_lta_ratio <= min_sta_lta_ratio)
            {
                return Err(ConfigError::InvalidValue {
                    parameter: "max-sta-lta-ratio",
                    value: max_sta_lta_ratio,
                    reason: "must exceed the minimum ratio",
                });
            }
        }

        if let Some(duration) = self
            .record_duration_in_seconds
            .filter(|_| !swept("record-duration"))
        {
            require_positive("record-duration", duration)?;
        }
        Ok(())
    }
}

fn require_finite(parameter: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue {
            parameter,
            value,
            reason: "must be finite",
        })
    }
}

fn require_positive(parameter: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue {
            parameter,
            value,
            reason: "must be positive",
        })
    }
}

/// `count` logarithmically spaced frequencies from `min_hz` to `max_hz`
/// inclusive.
pub fn log_spaced_frequencies(
    min_hz: f64,
    max_hz: f64,
    count: usize,
) -> Result<Vec<f64>, ConfigError> {
    require_positive("center-frequencies.min", min_hz)?;
    require_positive("center-frequencies.max", max_hz)?;
    if max_hz <= min_hz {
        return Err(ConfigError::InvalidValue {
            parameter: "center-frequencies.max",
            value: max_hz,
            reason: "must exceed the minimum frequency",
        });
    }
    match count {
        0 => Err(ConfigError::MissingParameter("center-frequencies.count")),
        1 => Ok(vec![min_hz]),
        _ => {
            let (log_min, log_max) = (min_hz.ln(), max_hz.ln());
            let step = (log_max - log_min) / (count - 1) as f64;
            let mut values: Vec<f64> = (0..count)
                .map(|i| (log_min + step * i as f64).exp())
                .collect();
            values[0] = min_hz;
            values[count - 1] = max_hz;
            Ok(values)
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SweepConfig {
    pub baseline: PipelineConfig,
    pub grid: ParameterGrid,
    pub report: ReportLayout,
}

#[derive(Default)]
pub struct SweepConfigBuilder {
    baseline: Option<PipelineConfig>,
    axes: Vec<SweepAxis>,
    report: Option<ReportLayout>,
}

impl SweepConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn baseline(mut self, config: PipelineConfig) -> Self {
        self.baseline = Some(config);
        self
    }
    pub fn axis(mut self, axis: SweepAxis) -> Self {
        self.axes.push(axis);
        self
    }
    pub fn axes(mut self, axes: impl IntoIterator<Item = SweepAxis>) -> Self {
        self.axes.extend(axes);
        self
    }
    pub fn report(mut self, layout: ReportLayout) -> Self {
        self.report = Some(layout);
        self
    }

    pub fn build(self) -> Result<SweepConfig, ConfigError> {
        let baseline = self
            .baseline
            .ok_or(ConfigError::MissingParameter("baseline"))?;
        let grid = ParameterGrid::new(self.axes)?;
        baseline.validate_unswept(&grid)?;
        let sta_lta_enabled = matches!(baseline.rejection, RejectionSettings::StaLta { .. });
        for parameter in grid.parameters() {
            if parameter.requires_sta_lta() && !sta_lta_enabled {
                return Err(ConfigError::AxisNotApplicable {
                    parameter: parameter.name(),
                    reason: "STA/LTA window rejection is disabled in the baseline",
                });
            }
        }

        let report = self.report.ok_or(ConfigError::MissingParameter("report"))?;
        if report.outcomes.is_empty() {
            return Err(ConfigError::NoOutcomeColumns);
        }
        report.verdicts.validate()?;

        Ok(SweepConfig {
            baseline,
            grid,
            report,
        })
    }
}

#[cfg(test)]
pub(crate) fn test_pipeline_config() -> PipelineConfig {
    PipelineConfig {
        preprocessing: PreprocessingSettings {
            detrend: Detrend::Linear,
            window_length_in_seconds: 30.0,
            orient_to_degrees_from_north: 0.0,
            filter_corner_frequencies_in_hz: (Some(0.5), Some(20.0)),
            ignore_dissimilar_time_step_warning: false,
        },
        rejection: RejectionSettings::StaLta {
            sta_seconds: 1.0,
            lta_seconds: 30.0,
            min_sta_lta_ratio: 0.2,
            max_sta_lta_ratio: 2.5,
        },
        processing: ProcessingSettings {
            window_type: WindowType::Tukey,
            window_width: 0.1,
            smoothing: SmoothingSettings {
                operator: SmoothingOperator::KonnoAndOhmachi,
                bandwidth: 40.0,
                center_frequencies_in_hz: vec![0.5, 1.0, 2.0, 5.0, 10.0, 20.0],
            },
            method_to_combine_horizontals: HorizontalCombination::TotalHorizontalEnergy,
            handle_dissimilar_time_steps_by: DissimilarTimeSteps::FrequencyDomainResampling,
            sesame: Some(SesameSettings {
                search_range_in_hz: (None, None),
            }),
        },
        record_duration_in_seconds: None,
    }
}
