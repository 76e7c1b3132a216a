//! Error types for flowline pipelines.

use thiserror::Error;

/// The error type carried on stage error-report streams and returned by
/// pipeline entry points.
///
/// A stage reports at most one error per lifetime; absence of a report
/// before its stream closes means the stage succeeded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    /// A stage reported a processing failure.
    #[error("stage `{stage}` failed: {message}")]
    Stage {
        /// Name of the failing stage.
        stage: String,
        /// What went wrong.
        message: String,
    },

    /// The pipeline run was cancelled before completion.
    #[error("pipeline cancelled: {0}")]
    Cancelled(String),

    /// The merged error stream drained clean but the sink never delivered
    /// its result. Reachable only when the run was cancelled externally.
    #[error("pipeline finished without producing a result")]
    MissingResult,
}

impl PipelineError {
    /// Creates a stage processing error.
    #[must_use]
    pub fn stage(stage: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Stage {
            stage: stage.into(),
            message: message.into(),
        }
    }
}
