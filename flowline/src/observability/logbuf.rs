//! Timestamped diagnostic log buffer.
//!
//! A process-wide, lock-guarded event buffer recording what each stage saw,
//! drained on demand in timestamp order. Purely diagnostic: recording is
//! disabled by default, stages never await on it, and enabling or disabling
//! it must not change pipeline semantics. The only ordering guarantee is
//! timestamp order after the flush-time sort.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

/// A single timestamped diagnostic entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    /// When the entry was recorded.
    pub at: DateTime<Utc>,
    /// The formatted `"<stage>: <event>"` line.
    pub message: String,
}

/// A thread-safe timestamped event buffer.
///
/// All appends and the drain share one lock, so flushing concurrently with
/// ongoing pipeline runs is safe.
pub struct LogBuffer {
    enabled: AtomicBool,
    entries: Mutex<Vec<LogEntry>>,
}

static GLOBAL: LogBuffer = LogBuffer::new();

impl LogBuffer {
    /// Creates an empty, disabled buffer.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            enabled: AtomicBool::new(false),
            entries: Mutex::new(Vec::new()),
        }
    }

    /// Returns the process-wide buffer the stages record into.
    #[must_use]
    pub fn global() -> &'static Self {
        &GLOBAL
    }

    /// Enables or disables recording.
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }

    /// Returns whether recording is enabled.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    /// Records a message with the current timestamp, if enabled.
    pub fn record(&self, message: impl Into<String>) {
        if !self.is_enabled() {
            return;
        }
        let entry = LogEntry {
            at: Utc::now(),
            message: message.into(),
        };
        self.entries.lock().push(entry);
    }

    /// Records a stage opening its streams.
    pub fn record_open(&self, name: &str) {
        self.record(format!("{name}: OPEN"));
    }

    /// Records a stage closing its streams.
    pub fn record_close(&self, name: &str) {
        self.record(format!("{name}: CLOSE"));
    }

    /// Records one unit passing through a stage, keyed by its input.
    pub fn record_unit(&self, name: &str, input: i64) {
        self.record(format!("{name}: {input}"));
    }

    /// Takes every entry, stable-sorted by timestamp ascending, leaving the
    /// buffer empty.
    #[must_use]
    pub fn drain_sorted(&self) -> Vec<LogEntry> {
        let mut entries = std::mem::take(&mut *self.entries.lock());
        entries.sort_by_key(|entry| entry.at);
        entries
    }

    /// Drains the buffer and prints each entry in timestamp order.
    ///
    /// A flush of an empty buffer prints nothing and does not error.
    pub fn flush(&self) {
        for entry in self.drain_sorted() {
            println!("{}", entry.message);
        }
    }
}

impl Default for LogBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for LogBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogBuffer")
            .field("enabled", &self.is_enabled())
            .field("buffered", &self.entries.lock().len())
            .finish()
    }
}
