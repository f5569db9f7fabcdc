//! Provides input/output functionality for seismic channel files.
//!
//! This module locates three-channel recording groups on disk, reads and writes
//! the SAC binary format, and defines the [`traits::RecordingLoader`] seam through
//! which experiments obtain their baseline dataset.

pub mod discovery;
pub mod sac;
pub mod traits;
