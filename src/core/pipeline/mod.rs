//! # Pipeline Module
//!
//! Orchestrates a full reconcile-and-join run: index both inputs,
//! classify by stem, route the four copy batches, optionally join the
//! matched pairs, and forward everything to the CSV and console sinks.

mod executor;

pub use executor::{Pipeline, PipelineBuilder, PipelineConfig, PipelineResult};
