//! # Core Module
//!
//! This module provides the foundation of hvsweep: the in-memory representation of
//! ambient-noise recordings, the file formats they arrive in, and the CSV reports that
//! post-process sweep results.
//!
//! ## Overview
//!
//! Nothing in this layer knows about parameter grids or pipelines. It holds stateless
//! data models and pure I/O so that the [`crate::engine`] layer can concentrate on
//! orchestrating sweeps.
//!
//! ## Architecture
//!
//! - **Recording Representation** ([`models`]) - Time series, three-component recordings,
//!   and the baseline [`models::recording::RecordingSet`] with its snapshot contract
//! - **File I/O** ([`io`]) - Channel-group discovery and the SAC binary codec
//! - **Report Post-Processing** ([`report`]) - Relative-error reports, merged
//!   cross-site tables, and per-duration summaries
//!
//! ## Key Capabilities
//!
//! - **Inclusive time-window trimming** with sample-accurate index snapping
//! - **Byte-order detection** for SAC files written on either endianness
//! - **Deterministic discovery** of E/N/Z channel groups sorted by prefix
//! - **Batch-safe post-processing** where one bad report is skipped, not fatal

pub mod io;
pub mod models;
pub mod report;
