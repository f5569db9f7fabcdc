use super::discovery::ComponentGroup;
use super::sac::SacError;
use crate::core::models::recording::RecordingSet;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("No channel groups were given to load")]
    NoGroups,
    #[error("Failed to read '{path}': {source}", path = path.display())]
    Sac {
        path: PathBuf,
        #[source]
        source: SacError,
    },
    #[error(
        "Channels of '{prefix}' have different sample intervals (E {east} s, N {north} s, Z {vertical} s)"
    )]
    SampleIntervalMismatch {
        prefix: String,
        east: f64,
        north: f64,
        vertical: f64,
    },
}

/// Turns discovered channel groups into the in-memory baseline dataset.
///
/// This is the `load` stage of the processing pipeline. It runs once per
/// experiment, before any sweep iteration, so its failures are fatal for the
/// experiment rather than recorded per combination.
pub trait RecordingLoader {
    /// Loads one [`ThreeComponentRecording`](crate::core::models::recording::ThreeComponentRecording)
    /// per group, in the order given.
    ///
    /// # Errors
    ///
    /// Returns an error if `groups` is empty, any channel file cannot be read,
    /// or the three channels of a group are not sampled at the same rate.
    fn load(&self, groups: &[ComponentGroup]) -> Result<RecordingSet, LoadError>;
}
