//! The round-robin fan-out distributor.

use super::{data_channel, error_channel, ErrorStream, UnitStream};
use crate::cancellation::CancellationToken;
use crate::observability::LogBuffer;
use std::sync::Arc;
use tracing::debug;

/// Spawns a distributor splitting `input` across `fan_factor` branch
/// streams by strict round-robin.
///
/// Unit `i` is routed to branch `i % fan_factor` regardless of branch
/// consumption speed, so a slow branch backpressures the whole distributor:
/// every send blocks until accepted or cancellation fires. On input
/// exhaustion all branch streams and the error stream close. The multiset
/// of units is preserved - each unit is assigned to exactly one branch.
///
/// # Panics
///
/// Panics if `fan_factor` is zero.
pub fn spawn_fan_out(
    token: Arc<CancellationToken>,
    name: impl Into<String>,
    mut input: UnitStream,
    fan_factor: usize,
) -> (Vec<UnitStream>, ErrorStream) {
    assert!(fan_factor >= 1, "fan_factor must be at least 1");

    let mut branch_txs = Vec::with_capacity(fan_factor);
    let mut branch_rxs = Vec::with_capacity(fan_factor);
    for _ in 0..fan_factor {
        let (tx, rx) = data_channel();
        branch_txs.push(tx);
        branch_rxs.push(rx);
    }
    let (err_tx, err_rx) = error_channel();
    let name = name.into();

    tokio::spawn(async move {
        let _err_tx = err_tx;

        debug!(stage = %name, fan_factor, "fan-out started");
        LogBuffer::global().record_open(&name);

        let mut i: usize = 0;
        loop {
            let unit = tokio::select! {
                biased;
                () = token.cancelled() => break,
                received = input.recv() => match received {
                    Some(unit) => unit,
                    None => break,
                },
            };

            LogBuffer::global().record_unit(&name, unit.input);

            let branch = &branch_txs[i % fan_factor];
            i = i.wrapping_add(1);
            tokio::select! {
                biased;
                () = token.cancelled() => break,
                res = branch.send(unit) => {
                    if res.is_err() {
                        break; // a branch receiver is gone
                    }
                }
            }
        }

        LogBuffer::global().record_close(&name);
        debug!(stage = %name, "fan-out stopped");
    });

    (branch_rxs, err_rx)
}
