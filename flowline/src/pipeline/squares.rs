//! The square-numbers pipelines: the toy topologies exercising the
//! framework.
//!
//! The domain logic is deliberately trivial - every transform squares the
//! unit's current output - so these entry points are mostly wiring: they
//! fix the stage topology, hand every error-report stream to the composer,
//! and read the sink's buffered result once the run drains clean.

use super::Composer;
use crate::core::Unit;
use crate::errors::PipelineError;
use crate::stages::{spawn_fan_in, spawn_fan_out, spawn_sink, spawn_source, spawn_transform};

/// Squares the unit's current output, preserving its input key.
fn square(unit: Unit) -> Result<Unit, PipelineError> {
    Ok(unit.with_output(unit.output * unit.output))
}

/// Runs `source -> square -> square -> sink` over `max` seed units.
///
/// Returns the collected units in source order, each with
/// `output == input^4`, or the first stage error.
pub async fn run_square_pipeline(max: i64) -> Result<Vec<Unit>, PipelineError> {
    let mut composer = Composer::new("squares");
    let token = composer.token();

    let (source, errc) = spawn_source(token.clone(), "source", max);
    composer.register(errc);

    let (squared, errc) = spawn_transform(token.clone(), "square-1", source, square);
    composer.register(errc);

    let (squared, errc) = spawn_transform(token.clone(), "square-2", squared, square);
    composer.register(errc);

    let (mut result, errc) = spawn_sink(token, "sink", squared);
    composer.register(errc);

    composer.wait().await?;

    result.recv().await.ok_or(PipelineError::MissingResult)
}

/// Runs `source -> square -> [fan-out -> fan_factor squares -> fan-in] -> sink`.
///
/// The result multiset matches [`run_square_pipeline`]; element order
/// reflects the fan-in interleaving race.
pub async fn run_fanned_square_pipeline(
    max: i64,
    fan_factor: usize,
) -> Result<Vec<Unit>, PipelineError> {
    let mut composer = Composer::new("squares-fanned");
    let token = composer.token();

    let (source, errc) = spawn_source(token.clone(), "source", max);
    composer.register(errc);

    let (squared, errc) = spawn_transform(token.clone(), "square-1", source, square);
    composer.register(errc);

    let (branches, errc) = spawn_fan_out(token.clone(), "fan-out", squared, fan_factor);
    composer.register(errc);

    let mut fanned = Vec::with_capacity(fan_factor);
    for (i, branch) in branches.into_iter().enumerate() {
        let (out, errc) = spawn_transform(token.clone(), format!("square-2.{i}"), branch, square);
        composer.register(errc);
        fanned.push(out);
    }

    let (merged, errc) = spawn_fan_in(token.clone(), "fan-in", fanned);
    composer.register(errc);

    let (mut result, errc) = spawn_sink(token, "sink", merged);
    composer.register(errc);

    composer.wait().await?;

    result.recv().await.ok_or(PipelineError::MissingResult)
}
