use super::pipeline::{HvsrResult, Peak, SesameCounts, VerdictThresholds};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The combination produced an invalid pipeline configuration.
    Configuration,
    /// The snapshot could not be cut to the requested record duration.
    Trim,
    /// Any pipeline stage failed.
    Pipeline,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FailureKind::Configuration => "configuration",
            FailureKind::Trim => "trim",
            FailureKind::Pipeline => "pipeline",
        };
        f.write_str(name)
    }
}

/// The values recorded for a combination whose pipeline run completed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    pub peak: Option<Peak>,
    pub passing_windows: usize,
    pub sesame: Option<SesameCounts>,
}

impl Measurement {
    pub fn from_result(result: &HvsrResult) -> Self {
        Self {
            peak: result.peak(),
            passing_windows: result.passing_windows(),
            sesame: result.sesame,
        }
    }

    pub fn peak_frequency(&self) -> Option<f64> {
        self.peak.map(|p| p.frequency)
    }

    pub fn peak_amplitude(&self) -> Option<f64> {
        self.peak.map(|p| p.amplitude)
    }

    pub fn clarity_pass(&self, thresholds: &VerdictThresholds) -> Option<bool> {
        self.sesame.map(|s| s.is_clear(thresholds))
    }

    pub fn reliability_pass(&self, thresholds: &VerdictThresholds) -> Option<bool> {
        self.sesame.map(|s| s.is_reliable(thresholds))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Completed(Measurement),
    Failed { kind: FailureKind, reason: String },
}

impl Outcome {
    pub fn failed(kind: FailureKind, reason: impl fmt::Display) -> Self {
        Outcome::Failed {
            kind,
            reason: reason.to_string(),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Failed { .. })
    }

    pub fn measurement(&self) -> Option<&Measurement> {
        match self {
            Outcome::Completed(m) => Some(m),
            Outcome::Failed { .. } => None,
        }
    }
}
