//! The value type flowing through every stage.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An input/output pair, immutable once sent downstream.
///
/// `input` is the traceability key: a transforming stage constructs a new
/// `Unit` preserving `input` with a recomputed `output`. Ownership moves to
/// the receiver on a successful send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Unit {
    /// The traceability key, preserved across transforms.
    pub input: i64,
    /// The most recent stage's computed value.
    pub output: i64,
}

impl Unit {
    /// Creates a unit from an input/output pair.
    #[must_use]
    pub fn new(input: i64, output: i64) -> Self {
        Self { input, output }
    }

    /// Creates the unit a source emits: both fields carry the seed value.
    #[must_use]
    pub fn seed(value: i64) -> Self {
        Self {
            input: value,
            output: value,
        }
    }

    /// Returns a new unit with a recomputed output and the same input key.
    #[must_use]
    pub fn with_output(self, output: i64) -> Self {
        Self {
            input: self.input,
            output,
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.input, self.output)
    }
}
