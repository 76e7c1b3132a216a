//! The error aggregator.

use crate::errors::PipelineError;
use crate::stages::ErrorStream;
use tokio::sync::mpsc;

/// Merges per-stage error-report streams into a single stream.
///
/// The merged stream closes only once every source stream has closed;
/// since a stage closes its error stream exactly when its task exits,
/// closure of the merged stream signals that the entire pipeline has
/// finished executing.
///
/// The merged channel's capacity equals the number of input streams. Each
/// stage reports at most one error, so a forwarder's send never blocks
/// even if the consumer stops reading after the first error - every
/// forwarder can always finish and release its stream. Consumers may read
/// until closed or return early on the first error; the capacity is what
/// makes the early return safe.
#[must_use]
pub fn merge_errors(streams: Vec<ErrorStream>) -> ErrorStream {
    let (tx, rx) = mpsc::channel(streams.len().max(1));

    for mut stream in streams {
        let tx = tx.clone();
        tokio::spawn(async move {
            while let Some(err) = stream.recv().await {
                if tx.send(err).await.is_err() {
                    break; // consumer gone
                }
            }
        });
    }
    // The merged stream closes when the last forwarder drops its clone.
    drop(tx);

    rx
}
