//! The collecting sink stage.

use super::{error_channel, ErrorStream, ResultStream, UnitStream};
use crate::cancellation::CancellationToken;
use crate::observability::LogBuffer;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::debug;

/// Spawns a sink accumulating every unit of `input` in arrival order.
///
/// On input exhaustion the sink performs exactly one send of the collected
/// sequence on the returned result stream, racing cancellation. The result
/// channel has capacity 1, so the send cannot block on a late receiver. If
/// cancellation fires first, the result stream closes without a value.
pub fn spawn_sink(
    token: Arc<CancellationToken>,
    name: impl Into<String>,
    mut input: UnitStream,
) -> (ResultStream, ErrorStream) {
    let (tx, rx) = mpsc::channel(1);
    let (err_tx, err_rx) = error_channel();
    let name = name.into();

    tokio::spawn(async move {
        let _err_tx = err_tx;

        debug!(stage = %name, "sink started");
        LogBuffer::global().record_open(&name);

        let mut results = Vec::new();
        let mut drained = true;
        loop {
            tokio::select! {
                biased;
                () = token.cancelled() => {
                    drained = false;
                    break;
                }
                received = input.recv() => match received {
                    Some(unit) => {
                        LogBuffer::global().record_unit(&name, unit.input);
                        results.push(unit);
                    }
                    None => break,
                },
            }
        }

        if drained {
            tokio::select! {
                biased;
                () = token.cancelled() => {}
                res = tx.send(results) => {
                    let _ = res; // receiver gone; the run was abandoned
                }
            }
        }

        LogBuffer::global().record_close(&name);
        debug!(stage = %name, collected = drained, "sink stopped");
    });

    (rx, err_rx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Unit;
    use crate::stages::spawn_source;
    use std::time::Duration;
    use tokio::time::timeout;

    #[tokio::test]
    async fn test_sink_collects_in_arrival_order() {
        let token = CancellationToken::new();
        let (source, _errc) = spawn_source(token.clone(), "source", 4);
        let (mut result, mut errors) = spawn_sink(token, "sink", source);

        let collected = timeout(Duration::from_secs(1), result.recv())
            .await
            .expect("result should arrive")
            .expect("result should hold a value");
        assert_eq!(collected, (0..4).map(Unit::seed).collect::<Vec<_>>());

        assert!(result.recv().await.is_none(), "the result is delivered once");
        assert!(errors.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_sink_delivers_empty_sequence_for_empty_input() {
        let token = CancellationToken::new();
        let (source, _errc) = spawn_source(token.clone(), "source", 0);
        let (mut result, _errors) = spawn_sink(token, "sink", source);

        let collected = result.recv().await.expect("result should hold a value");
        assert!(collected.is_empty());
    }

    #[tokio::test]
    async fn test_sink_skips_result_on_cancellation() {
        let token = CancellationToken::new();
        let (source, _errc) = spawn_source(token.clone(), "source", i64::MAX);
        let (mut result, mut errors) = spawn_sink(token.clone(), "sink", source);

        tokio::time::sleep(Duration::from_millis(20)).await;
        token.cancel("test over");

        let outcome = timeout(Duration::from_secs(1), result.recv())
            .await
            .expect("result stream should close promptly");
        assert!(outcome.is_none(), "no partial result on cancellation");
        assert!(errors.recv().await.is_none());
    }
}
