//! # hvsweep Core Library
//!
//! Parameter-sweep and record-duration sensitivity experiments for horizontal-to-vertical
//! spectral ratio (HVSR) processing of ambient seismic noise.
//!
//! ## Architectural Philosophy
//!
//! The library follows a strict three-layer architecture to keep concerns separate,
//! making it modular, testable, and extensible.
//!
//! - **[`core`]: The Foundation.** Stateless data models (`TimeSeries`, `RecordingSet`),
//!   the SAC codec, channel-group discovery, and CSV post-processing of reports.
//!
//! - **[`engine`]: The Logic Core.** Expands sweep axes into a parameter grid, drives the
//!   HVSR pipeline once per combination against a fresh snapshot of the baseline, and
//!   records each result or failure as a row of the final report.
//!
//! - **[`workflows`]: The Public API.** Ties `engine` and `core` together into complete
//!   experiments: the parameter sweep, the per-site record-duration batch, and the
//!   relative-error and merge post-processing steps.

pub mod core;
pub mod engine;
pub mod workflows;
