use thiserror::Error;

use super::config::ConfigError;
use super::export::ExportError;
use crate::core::io::discovery::DiscoveryError;
use crate::core::io::traits::LoadError;
use crate::core::models::timeseries::TrimError;
use crate::core::report::ReportError;
use std::path::PathBuf;

/// Errors that abort a whole workflow. Failures of a single combination
/// never surface here; they become rows of the report.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Input not found: {0}")]
    InputNotFound(#[from] DiscoveryError),

    #[error("Failed to load recordings: {0}")]
    Load(#[from] LoadError),

    #[error("Failed to trim baseline recordings: {0}")]
    BaselineTrim(#[from] TrimError),

    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to export report: {0}")]
    Export(#[from] ExportError),

    #[error("Failed to post-process reports: {0}")]
    Report(#[from] ReportError),

    #[error("Failed to create output directory '{path}': {source}", path = path.display())]
    OutputDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
