//! Diagnostics for pipeline runs.

mod logbuf;

pub use logbuf::{LogBuffer, LogEntry};
