//! # Flowline
//!
//! A small concurrent data-processing pipeline framework: independently
//! scheduled stages (source, transform, fan-out, fan-in, sink) joined by
//! bounded channels, with cooperative cancellation and per-stage error
//! reports merged into a single completion signal.
//!
//! - **Stage runners**: each stage is a spawned task that hands back its
//!   output stream and its error-report stream before doing any work
//! - **Fan-out / fan-in**: round-robin distribution across branches and
//!   race-free merging back into one stream
//! - **Error aggregation**: every stage's error stream merges into one
//!   channel whose closure signals that the whole run has finished
//! - **Cooperative cancellation**: every blocking send races a shared
//!   token, so no stage outlives its pipeline run
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use flowline::prelude::*;
//!
//! let results = run_square_pipeline(100).await?;
//! for unit in &results {
//!     println!("{unit}");
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod cancellation;
pub mod core;
pub mod errors;
pub mod observability;
pub mod pipeline;
pub mod stages;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::cancellation::{CancelGuard, CancellationToken};
    pub use crate::core::{PipelineStatus, Unit};
    pub use crate::errors::PipelineError;
    pub use crate::observability::{LogBuffer, LogEntry};
    pub use crate::pipeline::{
        merge_errors, run_fanned_square_pipeline, run_square_pipeline, Composer,
    };
    pub use crate::stages::{
        spawn_fan_in, spawn_fan_out, spawn_sink, spawn_source, spawn_transform,
        ErrorStream, ResultStream, UnitStream,
    };
}
