use super::config::{
    ConfigError, PipelineConfig, PreprocessingSettings, ProcessingSettings, RejectionSettings,
};
use crate::core::io::sac::SacError;
use crate::core::models::recording::RecordingSet;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Failed to stage recordings for the pipeline: {0}")]
    Staging(#[source] std::io::Error),

    #[error("Failed to write staged channel '{path}': {source}", path = path.display())]
    StagedWrite {
        path: PathBuf,
        #[source]
        source: SacError,
    },

    #[error("Failed to encode pipeline request: {0}")]
    Request(#[source] serde_json::Error),

    #[error("Failed to run pipeline command '{program}': {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Pipeline command exited with {status}: {stderr}")]
    CommandFailed { status: String, stderr: String },

    #[error("Pipeline returned a malformed response: {0}")]
    MalformedResponse(String),

    #[error("Pipeline reported an error: {0}")]
    Reported(String),

    #[error("Invalid HVSR result: {0}")]
    InvalidResult(String),
}

/// Number of SESAME criteria satisfied by a peak.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SesameCounts {
    pub clarity: u8,
    pub reliability: u8,
}

impl SesameCounts {
    pub const CLARITY_CRITERIA: u8 = 6;
    pub const RELIABILITY_CRITERIA: u8 = 3;

    pub fn is_clear(&self, thresholds: &VerdictThresholds) -> bool {
        self.clarity >= thresholds.clarity
    }

    pub fn is_reliable(&self, thresholds: &VerdictThresholds) -> bool {
        self.reliability >= thresholds.reliability
    }
}

/// Minimum number of satisfied criteria for a `Pass` verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VerdictThresholds {
    pub clarity: u8,
    pub reliability: u8,
}

impl VerdictThresholds {
    /// Passes a peak as soon as a single criterion holds.
    pub const ANY_CRITERION: Self = Self {
        clarity: 1,
        reliability: 1,
    };

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=SesameCounts::CLARITY_CRITERIA).contains(&self.clarity) {
            return Err(ConfigError::InvalidValue {
                parameter: "clarity-pass-threshold",
                value: f64::from(self.clarity),
                reason: "must lie in [1, 6]",
            });
        }
        if !(1..=SesameCounts::RELIABILITY_CRITERIA).contains(&self.reliability) {
            return Err(ConfigError::InvalidValue {
                parameter: "reliability-pass-threshold",
                value: f64::from(self.reliability),
                reason: "must lie in [1, 3]",
            });
        }
        Ok(())
    }
}

impl Default for VerdictThresholds {
    fn default() -> Self {
        Self {
            clarity: 5,
            reliability: 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Peak {
    pub frequency: f64,
    pub amplitude: f64,
}

/// Mean H/V curve and window statistics produced by one pipeline run.
/// JSON has no NaN, so undefined curve amplitudes travel as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HvsrResult {
    pub frequency: Vec<f64>,
    #[serde(deserialize_with = "nullable_amplitudes")]
    pub mean_curve: Vec<f64>,
    #[serde(default)]
    pub valid_window_mask: Vec<bool>,
    #[serde(default)]
    pub sesame: Option<SesameCounts>,
}

fn nullable_amplitudes<'de, D>(deserializer: D) -> Result<Vec<f64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let values: Vec<Option<f64>> = Deserialize::deserialize(deserializer)?;
    Ok(values.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect())
}

impl HvsrResult {
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.frequency.len() != self.mean_curve.len() {
            return Err(PipelineError::InvalidResult(format!(
                "{} frequencies but {} curve amplitudes",
                self.frequency.len(),
                self.mean_curve.len()
            )));
        }
        if let Some(count) = self.sesame {
            if count.clarity > SesameCounts::CLARITY_CRITERIA
                || count.reliability > SesameCounts::RELIABILITY_CRITERIA
            {
                return Err(PipelineError::InvalidResult(format!(
                    "SESAME counts {}/{} exceed the number of criteria",
                    count.clarity, count.reliability
                )));
            }
        }
        Ok(())
    }

    /// Frequency and amplitude at the maximum of the mean curve. Non-finite
    /// amplitudes are ignored; the first of several equal maxima wins.
    pub fn peak(&self) -> Option<Peak> {
        let mut best: Option<Peak> = None;
        for (&frequency, &amplitude) in self.frequency.iter().zip(&self.mean_curve) {
            if !amplitude.is_finite() || !frequency.is_finite() {
                continue;
            }
            if best.is_none_or(|b| amplitude > b.amplitude) {
                best = Some(Peak {
                    frequency,
                    amplitude,
                });
            }
        }
        best
    }

    pub fn passing_windows(&self) -> usize {
        self.valid_window_mask.iter().filter(|&&valid| valid).count()
    }
}

/// The external HVSR processing chain, split into its three stages.
///
/// Every stage consumes its input, so a pipeline is free to transform the
/// recordings in place; the sweep driver hands each invocation a fresh
/// snapshot of the baseline.
pub trait HvsrPipeline {
    type Preprocessed;
    type Accepted;

    fn preprocess(
        &self,
        records: RecordingSet,
        settings: &PreprocessingSettings,
    ) -> Result<Self::Preprocessed, PipelineError>;

    fn reject_windows(
        &self,
        preprocessed: Self::Preprocessed,
        settings: &RejectionSettings,
    ) -> Result<Self::Accepted, PipelineError>;

    fn process(
        &self,
        accepted: Self::Accepted,
        settings: &ProcessingSettings,
    ) -> Result<HvsrResult, PipelineError>;

    fn run(&self, records: RecordingSet, config: &PipelineConfig) -> Result<HvsrResult, PipelineError> {
        let preprocessed = self.preprocess(records, &config.preprocessing)?;
        let accepted = self.reject_windows(preprocessed, &config.rejection)?;
        let result = self.process(accepted, &config.processing)?;
        result.validate()?;
        Ok(result)
    }
}
