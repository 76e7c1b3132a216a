//! The counting source stage.

use super::{data_channel, error_channel, ErrorStream, UnitStream};
use crate::cancellation::CancellationToken;
use crate::core::Unit;
use crate::observability::LogBuffer;
use std::sync::Arc;
use tracing::debug;

/// Spawns a source producing [`Unit::seed`] values for `0..size` in
/// ascending order.
///
/// Returns the output and error-report streams before the task produces
/// anything. Each send races the cancellation token; if cancellation wins,
/// the task stops without reporting an error. Both streams close on every
/// exit path.
pub fn spawn_source(
    token: Arc<CancellationToken>,
    name: impl Into<String>,
    size: i64,
) -> (UnitStream, ErrorStream) {
    let (tx, rx) = data_channel();
    let (err_tx, err_rx) = error_channel();
    let name = name.into();

    tokio::spawn(async move {
        // Held for the task's lifetime so the error stream closes when the
        // task exits, not before.
        let _err_tx = err_tx;

        debug!(stage = %name, size, "source started");
        LogBuffer::global().record_open(&name);

        for i in 0..size {
            LogBuffer::global().record_unit(&name, i);
            tokio::select! {
                biased;
                () = token.cancelled() => break,
                res = tx.send(Unit::seed(i)) => {
                    if res.is_err() {
                        break; // receiver gone
                    }
                }
            }
        }

        LogBuffer::global().record_close(&name);
        debug!(stage = %name, "source stopped");
    });

    (rx, err_rx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    #[tokio::test]
    async fn test_source_yields_seeds_in_ascending_order() {
        let token = CancellationToken::new();
        let (mut out, mut errors) = spawn_source(token, "source", 5);

        let mut received = Vec::new();
        while let Some(unit) = out.recv().await {
            received.push(unit);
        }

        assert_eq!(
            received,
            (0..5).map(Unit::seed).collect::<Vec<_>>()
        );
        assert!(errors.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_source_with_zero_size_closes_immediately() {
        let token = CancellationToken::new();
        let (mut out, mut errors) = spawn_source(token, "source", 0);

        assert!(out.recv().await.is_none());
        assert!(errors.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_source_stops_on_cancellation_without_error() {
        let token = CancellationToken::new();
        let (mut out, mut errors) = spawn_source(token.clone(), "source", i64::MAX);

        assert!(out.recv().await.is_some());
        token.cancel("test over");

        // Remaining buffered units drain, then the stream closes.
        let drained = timeout(Duration::from_secs(1), async {
            while out.recv().await.is_some() {}
        })
        .await;
        assert!(drained.is_ok(), "output should close promptly");
        assert!(errors.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_source_stops_when_receiver_dropped() {
        let token = CancellationToken::new();
        let (out, mut errors) = spawn_source(token, "source", i64::MAX);

        drop(out);

        let closed = timeout(Duration::from_secs(1), errors.recv())
            .await
            .expect("error stream should close once the task exits");
        assert!(closed.is_none());
    }
}
