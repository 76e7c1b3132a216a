//! The fan-in collector.

use super::{data_channel, error_channel, ErrorStream, UnitStream};
use crate::cancellation::CancellationToken;
use crate::observability::LogBuffer;
use futures::future::join_all;
use std::sync::Arc;
use tracing::debug;

/// Spawns a collector merging `inputs` into one stream.
///
/// One forwarding task runs per input, each holding its own clone of the
/// shared output sender and racing every send against the token. The
/// merged output closes when the last forwarder drops its clone, so it can
/// never be closed while a forwarder might still send into it. A finalizer
/// task waits for every forwarder before the error stream closes.
///
/// No fairness is guaranteed among inputs: interleaving is a race resolved
/// by whichever forwarder's send is ready first. The multiset of units
/// across all inputs is preserved.
pub fn spawn_fan_in(
    token: Arc<CancellationToken>,
    name: impl Into<String>,
    inputs: Vec<UnitStream>,
) -> (UnitStream, ErrorStream) {
    let (tx, rx) = data_channel();
    let (err_tx, err_rx) = error_channel();
    let name = name.into();

    let mut forwarders = Vec::with_capacity(inputs.len());
    for (branch, mut input) in inputs.into_iter().enumerate() {
        let tx = tx.clone();
        let token = token.clone();
        let name = name.clone();
        forwarders.push(tokio::spawn(async move {
            debug!(stage = %name, branch, "forwarder started");
            loop {
                let unit = tokio::select! {
                    biased;
                    () = token.cancelled() => break,
                    received = input.recv() => match received {
                        Some(unit) => unit,
                        None => break,
                    },
                };

                tokio::select! {
                    biased;
                    () = token.cancelled() => break,
                    res = tx.send(unit) => {
                        if res.is_err() {
                            break; // merged receiver gone
                        }
                    }
                }
            }
            debug!(stage = %name, branch, "forwarder stopped");
        }));
    }
    // The merged output closes when the last forwarder's clone drops.
    drop(tx);

    tokio::spawn(async move {
        let _err_tx = err_tx;
        LogBuffer::global().record_open(&name);
        let _ = join_all(forwarders).await;
        LogBuffer::global().record_close(&name);
    });

    (rx, err_rx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stages::spawn_source;
    use std::time::Duration;
    use tokio::time::timeout;

    #[tokio::test]
    async fn test_fan_in_preserves_the_multiset_across_inputs() {
        let token = CancellationToken::new();
        let (first, _errc) = spawn_source(token.clone(), "source-1", 4);
        let (second, _errc) = spawn_source(token.clone(), "source-2", 4);
        let (mut merged, mut errors) = spawn_fan_in(token, "fan-in", vec![first, second]);

        let mut inputs = Vec::new();
        while let Some(unit) = merged.recv().await {
            inputs.push(unit.input);
        }
        inputs.sort_unstable();

        assert_eq!(inputs, vec![0, 0, 1, 1, 2, 2, 3, 3]);
        assert!(errors.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_fan_in_with_no_inputs_closes_immediately() {
        let token = CancellationToken::new();
        let (mut merged, mut errors) = spawn_fan_in(token, "fan-in", Vec::new());

        assert!(merged.recv().await.is_none());
        assert!(errors.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_fan_in_error_stream_closes_after_all_forwarders() {
        let token = CancellationToken::new();
        let (first, _errc) = spawn_source(token.clone(), "source-1", 2);
        let (second, _errc) = spawn_source(token.clone(), "source-2", 2);
        let (mut merged, mut errors) = spawn_fan_in(token, "fan-in", vec![first, second]);

        while merged.recv().await.is_some() {}

        let closed = timeout(Duration::from_secs(1), errors.recv())
            .await
            .expect("error stream should close after the forwarders");
        assert!(closed.is_none());
    }

    #[tokio::test]
    async fn test_fan_in_unwinds_on_cancellation() {
        let token = CancellationToken::new();
        let (first, _errc) = spawn_source(token.clone(), "source-1", i64::MAX);
        let (second, _errc) = spawn_source(token.clone(), "source-2", i64::MAX);
        let (mut merged, mut errors) = spawn_fan_in(token.clone(), "fan-in", vec![first, second]);

        assert!(merged.recv().await.is_some());
        token.cancel("test over");

        let drained = timeout(Duration::from_secs(1), async {
            while merged.recv().await.is_some() {}
        })
        .await;
        assert!(drained.is_ok(), "merged output should close promptly");

        let closed = timeout(Duration::from_secs(1), errors.recv())
            .await
            .expect("error stream should close promptly");
        assert!(closed.is_none());
    }
}
