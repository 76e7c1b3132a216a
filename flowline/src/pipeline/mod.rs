//! Pipeline composition: error aggregation and run orchestration.
//!
//! The composer wires stages together in a topology fixed by the caller,
//! collects every stage's error-report stream, and blocks on the merged
//! stream: the first error cancels the run, a clean drain means every
//! stage finished.

mod composer;
#[cfg(test)]
mod integration_tests;
mod merge;
mod squares;

pub use composer::Composer;
pub use merge::merge_errors;
pub use squares::{run_fanned_square_pipeline, run_square_pipeline};
