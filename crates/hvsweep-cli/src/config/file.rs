use crate::error::{CliError, Result};
use hvsweep::engine::config as core_config;
use hvsweep::engine::export::OutcomeColumn;
use hvsweep::engine::grid::SweepParameter;
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileInputConfig {
    pub extension: Option<String>,
    pub east: Option<String>,
    pub north: Option<String>,
    pub vertical: Option<String>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FilePipelineConfig {
    pub program: Option<String>,
    pub args: Option<Vec<String>>,
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum FileDetrend {
    None,
    Linear,
    Constant,
}

impl From<FileDetrend> for core_config::Detrend {
    fn from(d: FileDetrend) -> Self {
        match d {
            FileDetrend::None => Self::None,
            FileDetrend::Linear => Self::Linear,
            FileDetrend::Constant => Self::Constant,
        }
    }
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FilePreprocessingConfig {
    pub detrend: Option<FileDetrend>,
    pub window_length: Option<f64>,
    pub orient_to_degrees_from_north: Option<f64>,
    pub bandpass_filter: Option<bool>,
    pub filter_low_corner: Option<f64>,
    pub filter_high_corner: Option<f64>,
    pub ignore_dissimilar_time_step_warning: Option<bool>,
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum FileRejectionMethod {
    None,
    StaLta,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileRejectionConfig {
    pub method: Option<FileRejectionMethod>,
    pub sta_seconds: Option<f64>,
    pub lta_seconds: Option<f64>,
    pub min_sta_lta_ratio: Option<f64>,
    pub max_sta_lta_ratio: Option<f64>,
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum FileWindowType {
    Tukey,
    Hann,
    Boxcar,
}

impl From<FileWindowType> for core_config::WindowType {
    fn from(w: FileWindowType) -> Self {
        match w {
            FileWindowType::Tukey => Self::Tukey,
            FileWindowType::Hann => Self::Hann,
            FileWindowType::Boxcar => Self::Boxcar,
        }
    }
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum FileSmoothingOperator {
    KonnoAndOhmachi,
    Parzen,
    SavitzkyAndGolay,
    LinearRectangular,
    LogRectangular,
    LinearTriangular,
    LogTriangular,
}

impl From<FileSmoothingOperator> for core_config::SmoothingOperator {
    fn from(o: FileSmoothingOperator) -> Self {
        match o {
            FileSmoothingOperator::KonnoAndOhmachi => Self::KonnoAndOhmachi,
            FileSmoothingOperator::Parzen => Self::Parzen,
            FileSmoothingOperator::SavitzkyAndGolay => Self::SavitzkyAndGolay,
            FileSmoothingOperator::LinearRectangular => Self::LinearRectangular,
            FileSmoothingOperator::LogRectangular => Self::LogRectangular,
            FileSmoothingOperator::LinearTriangular => Self::LinearTriangular,
            FileSmoothingOperator::LogTriangular => Self::LogTriangular,
        }
    }
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum FileHorizontalCombination {
    TotalHorizontalEnergy,
    GeometricMean,
    SquaredAverage,
    VectorSummation,
    MaximumHorizontalValue,
}

impl From<FileHorizontalCombination> for core_config::HorizontalCombination {
    fn from(h: FileHorizontalCombination) -> Self {
        match h {
            FileHorizontalCombination::TotalHorizontalEnergy => Self::TotalHorizontalEnergy,
            FileHorizontalCombination::GeometricMean => Self::GeometricMean,
            FileHorizontalCombination::SquaredAverage => Self::SquaredAverage,
            FileHorizontalCombination::VectorSummation => Self::VectorSummation,
            FileHorizontalCombination::MaximumHorizontalValue => Self::MaximumHorizontalValue,
        }
    }
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum FileDissimilarTimeSteps {
    FrequencyDomainResampling,
    KeepSmallest,
    KeepMajority,
}

impl From<FileDissimilarTimeSteps> for core_config::DissimilarTimeSteps {
    fn from(d: FileDissimilarTimeSteps) -> Self {
        match d {
            FileDissimilarTimeSteps::FrequencyDomainResampling => Self::FrequencyDomainResampling,
            FileDissimilarTimeSteps::KeepSmallest => Self::KeepSmallest,
            FileDissimilarTimeSteps::KeepMajority => Self::KeepMajority,
        }
    }
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileCenterFrequencies {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub count: Option<usize>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileProcessingConfig {
    pub window_type: Option<FileWindowType>,
    pub taper_width: Option<f64>,
    pub smoothing_operator: Option<FileSmoothingOperator>,
    pub smoothing_bandwidth: Option<f64>,
    pub center_frequencies: Option<FileCenterFrequencies>,
    pub combine_horizontals: Option<FileHorizontalCombination>,
    pub dissimilar_time_steps: Option<FileDissimilarTimeSteps>,
    pub sesame: Option<bool>,
    pub sesame_min_frequency: Option<f64>,
    pub sesame_max_frequency: Option<f64>,
    pub clarity_pass_threshold: Option<u8>,
    pub reliability_pass_threshold: Option<u8>,
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum FileSweepParameter {
    WindowLength,
    TaperWidth,
    SmoothingBandwidth,
    RecordDuration,
    MinStaLtaRatio,
    MaxStaLtaRatio,
    FilterLowCorner,
    FilterHighCorner,
}

impl From<FileSweepParameter> for SweepParameter {
    fn from(p: FileSweepParameter) -> Self {
        match p {
            FileSweepParameter::WindowLength => Self::WindowLength,
            FileSweepParameter::TaperWidth => Self::TaperWidth,
            FileSweepParameter::SmoothingBandwidth => Self::SmoothingBandwidth,
            FileSweepParameter::RecordDuration => Self::RecordDuration,
            FileSweepParameter::MinStaLtaRatio => Self::MinStaLtaRatio,
            FileSweepParameter::MaxStaLtaRatio => Self::MaxStaLtaRatio,
            FileSweepParameter::FilterLowCorner => Self::FilterLowCorner,
            FileSweepParameter::FilterHighCorner => Self::FilterHighCorner,
        }
    }
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum FileOutcomeColumn {
    PeakFrequency,
    PeakAmplitude,
    PassingWindows,
    ClarityPass,
    ReliabilityPass,
}

impl From<FileOutcomeColumn> for OutcomeColumn {
    fn from(c: FileOutcomeColumn) -> Self {
        match c {
            FileOutcomeColumn::PeakFrequency => Self::PeakFrequency,
            FileOutcomeColumn::PeakAmplitude => Self::PeakAmplitude,
            FileOutcomeColumn::PassingWindows => Self::PassingWindows,
            FileOutcomeColumn::ClarityPass => Self::ClarityPass,
            FileOutcomeColumn::ReliabilityPass => Self::ReliabilityPass,
        }
    }
}

/// A range given either as an explicit list or as `start`/`stop`/`step`.
#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileRange {
    pub values: Option<Vec<f64>>,
    pub start: Option<f64>,
    pub stop: Option<f64>,
    pub step: Option<f64>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileAxis {
    pub parameter: FileSweepParameter,
    pub values: Option<Vec<f64>>,
    pub start: Option<f64>,
    pub stop: Option<f64>,
    pub step: Option<f64>,
}

impl FileAxis {
    pub fn range(&self) -> FileRange {
        FileRange {
            values: self.values.clone(),
            start: self.start,
            stop: self.stop,
            step: self.step,
        }
    }
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileSweepConfig {
    pub baseline_trim: Option<f64>,
    pub axes: Option<Vec<FileAxis>>,
    pub outcomes: Option<Vec<FileOutcomeColumn>>,
    pub precision: Option<usize>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileDurationConfig {
    pub durations: Option<FileRange>,
    pub outcomes: Option<Vec<FileOutcomeColumn>>,
    pub precision: Option<usize>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileConfig {
    pub input: Option<FileInputConfig>,
    pub pipeline: Option<FilePipelineConfig>,
    pub preprocessing: Option<FilePreprocessingConfig>,
    pub rejection: Option<FileRejectionConfig>,
    pub processing: Option<FileProcessingConfig>,
    pub sweep: Option<FileSweepConfig>,
    pub duration: Option<FileDurationConfig>,
}

impl FileConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    pub fn from_toml_str(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn parses_full_configuration() {
        let toml = r#"
            [input]
            extension = "SAC"
            east = "HHE"

            [pipeline]
            program = "python3"
            args = ["run_hvsr.py"]

            [preprocessing]
            detrend = "constant"
            window-length = 60.0
            bandpass-filter = false

            [rejection]
            method = "none"

            [processing]
            window-type = "hann"
            smoothing-operator = "parzen"
            center-frequencies = { min = 0.1, max = 20.0, count = 50 }
            combine-horizontals = "geometric-mean"
            sesame = false

            [sweep]
            outcomes = ["peak-frequency", "peak-amplitude"]
            precision = 3

            [[sweep.axes]]
            parameter = "window-length"
            start = 5.0
            stop = 60.0
            step = 5.0

            [[sweep.axes]]
            parameter = "smoothing-bandwidth"
            values = [20.0, 40.0]

            [duration]
            durations = { start = 1800.0, stop = 600.0, step = -600.0 }
        "#;
        let config = FileConfig::from_toml_str(toml).unwrap();

        assert_eq!(config.input.unwrap().east.as_deref(), Some("HHE"));
        assert_eq!(
            config.preprocessing.unwrap().detrend,
            Some(FileDetrend::Constant)
        );
        assert_eq!(
            config.rejection.unwrap().method,
            Some(FileRejectionMethod::None)
        );
        let sweep = config.sweep.unwrap();
        let axes = sweep.axes.unwrap();
        assert_eq!(axes.len(), 2);
        assert_eq!(axes[0].parameter, FileSweepParameter::WindowLength);
        assert_eq!(axes[0].range().step, Some(5.0));
        assert_eq!(axes[1].values, Some(vec![20.0, 40.0]));
        assert_eq!(config.duration.unwrap().durations.unwrap().step, Some(-600.0));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(FileConfig::from_toml_str("[processing]\nbandwidth = 40.0\n").is_err());
        assert!(FileConfig::from_toml_str("threads = 4\n").is_err());
    }

    #[test]
    fn from_file_reports_path_on_parse_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(&path, "[sweep\n").unwrap();

        let err = FileConfig::from_file(&path).unwrap_err();
        assert!(matches!(err, CliError::FileParsing { path: p, .. } if p == path));
    }
}
