//! Cooperative cancellation for pipeline runs.

mod token;

pub use token::{CancelGuard, CancellationToken};
