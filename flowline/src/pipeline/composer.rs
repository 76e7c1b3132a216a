//! Pipeline run orchestration.

use super::merge_errors;
use crate::cancellation::{CancelGuard, CancellationToken};
use crate::core::PipelineStatus;
use crate::errors::PipelineError;
use crate::stages::ErrorStream;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Orchestrates one pipeline run.
///
/// The composer owns the run's cancellation token, collects every stage's
/// error-report stream as the caller wires the topology, and waits for the
/// merged stream to drain or to deliver the first failure. It holds no
/// business logic.
///
/// Dropping the composer - on any exit path, including a panic while
/// wiring - cancels the token, so no stage outlives the run.
pub struct Composer {
    name: String,
    run_id: Uuid,
    token: Arc<CancellationToken>,
    _guard: CancelGuard,
    errors: Vec<ErrorStream>,
    status: PipelineStatus,
}

impl Composer {
    /// Creates a composer for a named pipeline run.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let run_id = Uuid::new_v4();
        let token = CancellationToken::new();
        let guard = CancelGuard::new(token.clone(), "pipeline run finished");

        let composer = Self {
            name,
            run_id,
            token,
            _guard: guard,
            errors: Vec::new(),
            status: PipelineStatus::Building,
        };
        debug!(
            pipeline = %composer.name,
            run_id = %composer.run_id,
            status = %composer.status,
            "pipeline run created"
        );
        composer
    }

    /// Returns the token every stage of this run must observe.
    #[must_use]
    pub fn token(&self) -> Arc<CancellationToken> {
        self.token.clone()
    }

    /// Returns this run's correlation id.
    #[must_use]
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Returns the run's current status.
    #[must_use]
    pub fn status(&self) -> PipelineStatus {
        self.status
    }

    /// Registers a stage's error-report stream.
    pub fn register(&mut self, errors: ErrorStream) {
        self.errors.push(errors);
    }

    /// Waits for the run to finish.
    ///
    /// Merges the registered error-report streams and drains the merged
    /// stream. The first error short-circuits: the token is cancelled so
    /// every still-running stage unwinds, and the error is returned
    /// verbatim. A clean drain means every stage closed its error stream
    /// without reporting - the run finished.
    pub async fn wait(mut self) -> Result<(), PipelineError> {
        self.status = PipelineStatus::Running;
        debug!(
            pipeline = %self.name,
            run_id = %self.run_id,
            status = %self.status,
            stages = self.errors.len(),
            "pipeline run started"
        );

        let mut merged = merge_errors(std::mem::take(&mut self.errors));
        let outcome = match merged.recv().await {
            Some(err) => {
                self.token.cancel(err.to_string());
                Err(err)
            }
            None => Ok(()),
        };

        self.status = match &outcome {
            Ok(()) if self.token.is_cancelled() => PipelineStatus::Cancelled,
            Ok(()) => PipelineStatus::Succeeded,
            Err(_) => PipelineStatus::Failed,
        };
        debug!(
            pipeline = %self.name,
            run_id = %self.run_id,
            status = %self.status,
            "pipeline run finished"
        );

        outcome
    }
}

impl std::fmt::Debug for Composer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Composer")
            .field("name", &self.name)
            .field("run_id", &self.run_id)
            .field("status", &self.status)
            .field("stages", &self.errors.len())
            .finish()
    }
}
