use super::config::{ConfigError, PipelineConfig, RejectionSettings};
use std::fmt;

const SNAP_RESOLUTION: f64 = 1e-9;
const MAX_AXIS_VALUES: usize = 1_000_000;

/// A pipeline setting that a sweep axis can vary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SweepParameter {
    WindowLength,
    TaperWidth,
    SmoothingBandwidth,
    RecordDuration,
    MinStaLtaRatio,
    MaxStaLtaRatio,
    FilterLowCorner,
    FilterHighCorner,
}

impl SweepParameter {
    /// Name used in configuration files and error messages.
    pub fn name(self) -> &'static str {
        match self {
            SweepParameter::WindowLength => "window-length",
            SweepParameter::TaperWidth => "taper-width",
            SweepParameter::SmoothingBandwidth => "smoothing-bandwidth",
            SweepParameter::RecordDuration => "record-duration",
            SweepParameter::MinStaLtaRatio => "min-sta-lta-ratio",
            SweepParameter::MaxStaLtaRatio => "max-sta-lta-ratio",
            SweepParameter::FilterLowCorner => "filter-low-corner",
            SweepParameter::FilterHighCorner => "filter-high-corner",
        }
    }

    /// Only meaningful when the baseline rejects windows by STA/LTA.
    pub fn requires_sta_lta(self) -> bool {
        matches!(
            self,
            SweepParameter::MinStaLtaRatio | SweepParameter::MaxStaLtaRatio
        )
    }

    /// Header of this parameter's column in exported reports.
    pub fn column_name(self) -> &'static str {
        match self {
            SweepParameter::WindowLength => "window_length",
            SweepParameter::TaperWidth => "taper_ratio",
            SweepParameter::SmoothingBandwidth => "bandwidth",
            SweepParameter::RecordDuration => "time_interval_sec",
            SweepParameter::MinStaLtaRatio => "min_sta_lta_ratio",
            SweepParameter::MaxStaLtaRatio => "max_sta_lta_ratio",
            SweepParameter::FilterLowCorner => "filter_low_hz",
            SweepParameter::FilterHighCorner => "filter_high_hz",
        }
    }

    /// Writes `value` into the setting this parameter controls. Range checks
    /// are left to [`PipelineConfig::validate`].
    pub fn apply(self, config: &mut PipelineConfig, value: f64) -> Result<(), ConfigError> {
        match self {
            SweepParameter::WindowLength => config.preprocessing.window_length_in_seconds = value,
            SweepParameter::TaperWidth => config.processing.window_width = value,
            SweepParameter::SmoothingBandwidth => config.processing.smoothing.bandwidth = value,
            SweepParameter::RecordDuration => config.record_duration_in_seconds = Some(value),
            SweepParameter::FilterLowCorner => {
                config.preprocessing.filter_corner_frequencies_in_hz.0 = Some(value)
            }
            SweepParameter::FilterHighCorner => {
                config.preprocessing.filter_corner_frequencies_in_hz.1 = Some(value)
            }
            SweepParameter::MinStaLtaRatio | SweepParameter::MaxStaLtaRatio => {
                let RejectionSettings::StaLta {
                    min_sta_lta_ratio,
                    max_sta_lta_ratio,
                    ..
                } = &mut config.rejection
                else {
                    return Err(ConfigError::AxisNotApplicable {
                        parameter: self.name(),
                        reason: "STA/LTA window rejection is disabled",
                    });
                };
                if self == SweepParameter::MinStaLtaRatio {
                    *min_sta_lta_ratio = value;
                } else {
                    *max_sta_lta_ratio = value;
                }
            }
        }
        Ok(())
    }
}

impl fmt::Display for SweepParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How the values of one axis are declared.
#[derive(Debug, Clone, PartialEq)]
pub enum RangeSpec {
    Values(Vec<f64>),
    /// Arithmetic progression from `start` towards `stop`; `stop` is included
    /// when it lies on the progression.
    Stepped { start: f64, stop: f64, step: f64 },
}

/// One parameter together with its ordered, fully expanded candidate values.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepAxis {
    parameter: SweepParameter,
    values: Vec<f64>,
}

impl SweepAxis {
    pub fn new(parameter: SweepParameter, spec: RangeSpec) -> Result<Self, ConfigError> {
        match spec {
            RangeSpec::Values(values) => Self::from_values(parameter, values),
            RangeSpec::Stepped { start, stop, step } => Self::stepped(parameter, start, stop, step),
        }
    }

    pub fn from_values(parameter: SweepParameter, values: Vec<f64>) -> Result<Self, ConfigError> {
        if values.is_empty() {
            return Err(invalid_range(parameter, "value list is empty"));
        }
        if let Some(bad) = values.iter().find(|v| !v.is_finite()) {
            return Err(invalid_range(parameter, format!("value {bad} is not finite")));
        }
        Ok(Self { parameter, values })
    }

    pub fn stepped(
        parameter: SweepParameter,
        start: f64,
        stop: f64,
        step: f64,
    ) -> Result<Self, ConfigError> {
        if !(start.is_finite() && stop.is_finite() && step.is_finite()) {
            return Err(invalid_range(parameter, "start, stop and step must be finite"));
        }
        if step == 0.0 {
            return Err(invalid_range(parameter, "step must be non-zero"));
        }
        let span = stop - start;
        if span != 0.0 && span.signum() != step.signum() {
            return Err(invalid_range(
                parameter,
                format!("step {step} moves away from stop {stop}"),
            ));
        }

        let steps = (span / step + SNAP_RESOLUTION).floor();
        if steps >= MAX_AXIS_VALUES as f64 {
            return Err(invalid_range(
                parameter,
                format!("range expands to more than {MAX_AXIS_VALUES} values"),
            ));
        }
        let count = steps as usize + 1;
        let values = (0..count)
            .map(|i| snap(start + step * i as f64))
            .collect();
        Ok(Self { parameter, values })
    }

    pub fn parameter(&self) -> SweepParameter {
        self.parameter
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

fn snap(value: f64) -> f64 {
    let snapped = (value / SNAP_RESOLUTION).round() * SNAP_RESOLUTION;
    // Keep the exact decimal the user would have typed, e.g. 0.3 not 0.30000000000000004.
    let text = format!("{snapped:.9}");
    let parsed = text.parse().unwrap_or(snapped);
    if parsed == 0.0 { 0.0 } else { parsed }
}

fn invalid_range(parameter: SweepParameter, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidRange {
        parameter: parameter.name(),
        reason: reason.into(),
    }
}

/// The Cartesian product of all sweep axes, iterated with the last axis
/// varying fastest.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterGrid {
    axes: Vec<SweepAxis>,
}

impl ParameterGrid {
    pub fn new(axes: Vec<SweepAxis>) -> Result<Self, ConfigError> {
        if axes.is_empty() {
            return Err(ConfigError::NoAxes);
        }
        for (i, axis) in axes.iter().enumerate() {
            if axes[..i].iter().any(|a| a.parameter == axis.parameter) {
                return Err(ConfigError::DuplicateAxis(axis.parameter.name()));
            }
            if axis.is_empty() {
                return Err(invalid_range(axis.parameter, "value list is empty"));
            }
        }
        Ok(Self { axes })
    }

    pub fn axes(&self) -> &[SweepAxis] {
        &self.axes
    }

    pub fn parameters(&self) -> impl Iterator<Item = SweepParameter> + '_ {
        self.axes.iter().map(SweepAxis::parameter)
    }

    pub fn contains(&self, parameter: SweepParameter) -> bool {
        self.parameters().any(|p| p == parameter)
    }

    pub fn len(&self) -> usize {
        self.axes.iter().map(SweepAxis::len).product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> GridIter<'_> {
        GridIter {
            axes: &self.axes,
            indices: vec![0; self.axes.len()],
            remaining: self.len(),
        }
    }
}

impl<'a> IntoIterator for &'a ParameterGrid {
    type Item = ParameterCombination;
    type IntoIter = GridIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

pub struct GridIter<'a> {
    axes: &'a [SweepAxis],
    indices: Vec<usize>,
    remaining: usize,
}

impl Iterator for GridIter<'_> {
    type Item = ParameterCombination;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let entries = self
            .axes
            .iter()
            .zip(&self.indices)
            .map(|(axis, &i)| (axis.parameter, axis.values[i]))
            .collect();

        for (axis, index) in self.axes.iter().zip(self.indices.iter_mut()).rev() {
            *index += 1;
            if *index < axis.len() {
                break;
            }
            *index = 0;
        }
        self.remaining -= 1;

        Some(ParameterCombination { entries })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for GridIter<'_> {}

/// One point of the grid: a value for every axis, in axis order.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterCombination {
    entries: Vec<(SweepParameter, f64)>,
}

impl ParameterCombination {
    pub fn new(entries: Vec<(SweepParameter, f64)>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[(SweepParameter, f64)] {
        &self.entries
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.entries.iter().map(|&(_, v)| v)
    }

    pub fn get(&self, parameter: SweepParameter) -> Option<f64> {
        self.entries
            .iter()
            .find(|(p, _)| *p == parameter)
            .map(|&(_, v)| v)
    }

    /// Derives the configuration for this point: a copy of `baseline` with
    /// every swept setting overwritten, then validated.
    pub fn apply_to(&self, baseline: &PipelineConfig) -> Result<PipelineConfig, ConfigError> {
        let mut config = baseline.clone();
        for &(parameter, value) in &self.entries {
            parameter.apply(&mut config, value)?;
        }
        config.validate()?;
        Ok(config)
    }
}

impl fmt::Display for ParameterCombination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (parameter, value)) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}={}", parameter.column_name(), value)?;
        }
        Ok(())
    }
}
