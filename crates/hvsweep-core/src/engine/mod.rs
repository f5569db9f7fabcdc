//! # Engine Module
//!
//! This module implements the sweep engine: it expands parameter ranges into a grid,
//! runs the HVSR pipeline once per grid point, and collects one tagged outcome per point
//! into a report.
//!
//! ## Overview
//!
//! The HVSR computation itself lives behind the [`pipeline::HvsrPipeline`] trait. The
//! engine never mutates the baseline recordings: for every combination it derives a
//! fresh [`config::PipelineConfig`], takes a snapshot of the baseline, optionally trims
//! it to the requested record duration, and hands ownership of the snapshot to the
//! pipeline. Whatever happens inside one iteration is captured as an
//! [`outcome::Outcome`] and never reaches the next one.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Pipeline settings, validation, and the sweep builder
//! - **Parameter Space** ([`grid`]) - Sweep axes, range expansion, and the Cartesian
//!   product iterator
//! - **Pipeline Boundary** ([`pipeline`], [`bridge`]) - The three-stage pipeline trait
//!   and an implementation that drives an external program
//! - **Sweep Driver** ([`driver`]) - The per-combination loop with failure isolation
//! - **Results** ([`outcome`], [`table`], [`export`]) - Tagged outcomes, the append-only
//!   result table, and CSV export
//! - **Progress Monitoring** ([`progress`]) - Callback-based progress events
//! - **Error Handling** ([`error`]) - Errors that abort a whole workflow
//!
//! ## Key Capabilities
//!
//! - **Deterministic iteration order** with the last axis varying fastest
//! - **Per-combination failure isolation** without retries
//! - **Explicit snapshot semantics** so pipelines may transform their input in place
//! - **Stable report layout** with configurable outcome columns

pub mod bridge;
pub mod config;
pub mod driver;
pub mod error;
pub mod export;
pub mod grid;
pub mod outcome;
pub mod pipeline;
pub mod progress;
pub mod table;
