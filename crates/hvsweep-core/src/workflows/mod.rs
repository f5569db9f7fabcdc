//! # Workflows Module
//!
//! This module provides the complete experiments that hvsweep runs, each tying the
//! [`crate::core`] and [`crate::engine`] layers together from input discovery to the
//! written report.
//!
//! ## Overview
//!
//! Workflows are the top-level entry points for users of the library. Each one handles
//! input discovery, recording loading, progress reporting, and output placement, and
//! returns a summary of what it wrote.
//!
//! ## Architecture
//!
//! - **Parameter Sweep** ([`parameter_sweep`]) - Runs a multi-axis grid against the first
//!   discovered channel group and exports one CSV row per combination
//! - **Record-Duration Batch** ([`duration_sweep`]) - Runs a record-duration sweep for
//!   every channel group and exports one peak-frequency report per group
//! - **Post-Processing** ([`post_process`]) - Relative errors against the longest
//!   duration, merged cross-site tables, and per-duration summaries
//!
//! ## Key Capabilities
//!
//! - **Fatal-versus-recorded error split**: missing inputs abort before any iteration,
//!   while per-combination failures become report rows
//! - **Per-group isolation** in batch runs, where an unreadable group is skipped
//! - **Pluggable loaders and pipelines** through the `RecordingLoader` and
//!   `HvsrPipeline` traits

pub mod duration_sweep;
pub mod parameter_sweep;
pub mod post_process;
