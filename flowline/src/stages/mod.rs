//! Stage runners: the tasks a pipeline is composed of.
//!
//! Every stage runs as an independently scheduled task. Spawning a stage
//! returns its output stream and its error-report stream immediately; the
//! work happens in the background. A stage terminates when its input is
//! exhausted or the run's cancellation token fires, and both of its streams
//! close on every exit path - stream closure is the completion signal
//! downstream consumers rely on.
//!
//! Every blocking send and receive is a biased race with the token:
//! when data-readiness and cancellation are ready simultaneously,
//! cancellation wins and no further data is delivered.

mod fan_in;
mod fan_out;
mod sink;
mod source;
mod transform;

pub use fan_in::spawn_fan_in;
pub use fan_out::spawn_fan_out;
pub use sink::spawn_sink;
pub use source::spawn_source;
pub use transform::spawn_transform;

use crate::core::Unit;
use crate::errors::PipelineError;
use tokio::sync::mpsc;

/// Capacity of every unit data channel.
///
/// The closest bounded analogue of a rendezvous hand-off: a producer gets
/// at most one unit ahead of its consumer, so backpressure propagates
/// tightly through the whole chain.
pub const DATA_CAPACITY: usize = 1;

/// A stage's output stream of [`Unit`]s.
///
/// Closed if and only if the owning stage task has permanently stopped
/// producing.
pub type UnitStream = mpsc::Receiver<Unit>;

/// A stage's error-report stream.
///
/// Carries at most one error per stage lifetime and always eventually
/// closes, even on cancellation.
pub type ErrorStream = mpsc::Receiver<PipelineError>;

/// The sink's result stream, delivering the collected units at most once.
pub type ResultStream = mpsc::Receiver<Vec<Unit>>;

/// Creates a unit data channel with the standard capacity.
pub(crate) fn data_channel() -> (mpsc::Sender<Unit>, UnitStream) {
    mpsc::channel(DATA_CAPACITY)
}

/// Creates the capacity-1 error-report channel every stage owns. The single
/// allowed report fits the buffer, so reporting never blocks the stage.
pub(crate) fn error_channel() -> (mpsc::Sender<PipelineError>, ErrorStream) {
    mpsc::channel(1)
}
