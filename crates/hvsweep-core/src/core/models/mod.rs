//! # Core Models Module
//!
//! This module contains the in-memory representation of the seismic recordings that
//! every sweep iteration starts from.
//!
//! ## Overview
//!
//! The models are deliberately small: the HVSR pipeline itself is an external
//! collaborator, so the crate only needs enough structure to hold the baseline
//! dataset, cut it to a record duration, and hand an independent copy to the
//! pipeline for each parameter combination.
//!
//! ## Key Components
//!
//! - [`timeseries`] - Uniformly sampled amplitude records with inclusive trimming
//! - [`recording`] - Three-component recordings and the [`recording::RecordingSet`]
//!   baseline dataset with its explicit snapshot operation
//!
//! ## Usage
//!
//! ```ignore
//! use hvsweep::core::models::recording::RecordingSet;
//!
//! let baseline: RecordingSet = loader.load(&groups)?;
//! let mut working = baseline.snapshot();
//! working.trim_to_last(600.0)?;
//! ```

pub mod recording;
pub mod timeseries;
