//! The transform stage.

use super::{data_channel, error_channel, ErrorStream, UnitStream};
use crate::cancellation::CancellationToken;
use crate::core::Unit;
use crate::errors::PipelineError;
use crate::observability::LogBuffer;
use std::sync::Arc;
use tracing::debug;

/// Spawns a transform applying `op` to every unit of `input`.
///
/// The stage consumes its input until it closes or cancellation fires. An
/// `Ok` result is forwarded downstream, with the send racing the token. An
/// `Err` is the stage's single error report: it is delivered on the
/// capacity-1 error stream and the stage terminates early, still closing
/// both streams on the way out.
pub fn spawn_transform<F>(
    token: Arc<CancellationToken>,
    name: impl Into<String>,
    mut input: UnitStream,
    mut op: F,
) -> (UnitStream, ErrorStream)
where
    F: FnMut(Unit) -> Result<Unit, PipelineError> + Send + 'static,
{
    let (tx, rx) = data_channel();
    let (err_tx, err_rx) = error_channel();
    let name = name.into();

    tokio::spawn(async move {
        debug!(stage = %name, "transform started");
        LogBuffer::global().record_open(&name);

        loop {
            let unit = tokio::select! {
                biased;
                () = token.cancelled() => break,
                received = input.recv() => match received {
                    Some(unit) => unit,
                    None => break, // upstream drained
                },
            };

            LogBuffer::global().record_unit(&name, unit.input);

            let next = match op(unit) {
                Ok(next) => next,
                Err(err) => {
                    // At most one report per stage lifetime; the capacity-1
                    // channel absorbs it even if the aggregator is slow.
                    let _ = err_tx.try_send(err);
                    break;
                }
            };

            tokio::select! {
                biased;
                () = token.cancelled() => break,
                res = tx.send(next) => {
                    if res.is_err() {
                        break; // receiver gone
                    }
                }
            }
        }

        LogBuffer::global().record_close(&name);
        debug!(stage = %name, "transform stopped");
    });

    (rx, err_rx)
}
