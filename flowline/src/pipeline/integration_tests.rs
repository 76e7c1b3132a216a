//! End-to-end pipeline properties.

use super::{run_fanned_square_pipeline, run_square_pipeline, Composer};
use crate::core::Unit;
use crate::errors::PipelineError;
use crate::stages::{spawn_sink, spawn_source, spawn_transform};
use pretty_assertions::assert_eq;
use std::time::Duration;
use tokio::time::timeout;

fn sorted(mut units: Vec<Unit>) -> Vec<Unit> {
    units.sort_unstable_by_key(|unit| (unit.input, unit.output));
    units
}

#[tokio::test]
async fn test_plain_pipeline_squares_twice_in_source_order() {
    let results = run_square_pipeline(3).await.expect("run should succeed");
    assert_eq!(
        results,
        vec![Unit::new(0, 0), Unit::new(1, 1), Unit::new(2, 16)]
    );
}

#[tokio::test]
async fn test_plain_pipeline_output_is_fourth_power_of_input() {
    let results = run_square_pipeline(20).await.expect("run should succeed");
    assert_eq!(results.len(), 20);
    for (i, unit) in results.iter().enumerate() {
        assert_eq!(unit.input, i as i64);
        assert_eq!(unit.output, unit.input.pow(4));
    }
}

#[tokio::test]
async fn test_empty_pipeline_yields_empty_result() {
    let results = run_square_pipeline(0).await.expect("run should succeed");
    assert!(results.is_empty());
}

#[tokio::test]
async fn test_repeated_runs_are_deterministic() {
    let first = run_square_pipeline(10).await.expect("run should succeed");
    let second = run_square_pipeline(10).await.expect("run should succeed");
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_fanned_pipeline_matches_plain_as_a_multiset() {
    let plain = run_square_pipeline(25).await.expect("run should succeed");
    let fanned = run_fanned_square_pipeline(25, 4)
        .await
        .expect("run should succeed");

    assert_eq!(sorted(fanned), sorted(plain));
}

#[tokio::test]
async fn test_fan_factor_one_matches_plain_modulo_ordering() {
    let plain = run_square_pipeline(12).await.expect("run should succeed");
    let fanned = run_fanned_square_pipeline(12, 1)
        .await
        .expect("run should succeed");

    assert_eq!(sorted(fanned), sorted(plain));
}

#[tokio::test]
async fn test_fanned_empty_pipeline_yields_empty_result() {
    let results = run_fanned_square_pipeline(0, 3)
        .await
        .expect("run should succeed");
    assert!(results.is_empty());
}

#[tokio::test]
async fn test_stage_error_surfaces_and_cancels_peers() {
    let mut composer = Composer::new("failing-run");
    let token = composer.token();

    let (source, errc) = spawn_source(token.clone(), "source", 1_000_000);
    composer.register(errc);

    let (squared, errc) = spawn_transform(token.clone(), "square", source, |unit: Unit| {
        if unit.input == 3 {
            Err(PipelineError::stage("square", "malformed input"))
        } else {
            Ok(unit.with_output(unit.output * unit.output))
        }
    });
    composer.register(errc);

    let (result, errc) = spawn_sink(token.clone(), "sink", squared);
    composer.register(errc);

    let err = timeout(Duration::from_secs(5), composer.wait())
        .await
        .expect("the run should finish promptly")
        .expect_err("the stage error must surface");
    assert_eq!(err, PipelineError::stage("square", "malformed input"));
    assert!(token.is_cancelled(), "peers must be cancelled");

    // Failure discards partial results: the sink's value is never read.
    drop(result);
}

#[tokio::test]
async fn test_external_cancellation_unwinds_every_stage() {
    let mut composer = Composer::new("cancelled-run");
    let token = composer.token();

    let (source, errc) = spawn_source(token.clone(), "source", i64::MAX);
    composer.register(errc);

    let (squared, errc) = spawn_transform(token.clone(), "square", source, |unit: Unit| {
        Ok(unit.with_output(unit.output * unit.output))
    });
    composer.register(errc);

    let (mut result, errc) = spawn_sink(token.clone(), "sink", squared);
    composer.register(errc);

    tokio::time::sleep(Duration::from_millis(20)).await;
    token.cancel("caller gave up");

    // Cancellation is not an error: every stage winds down, every error
    // stream closes empty, and the wait returns within bounded time.
    timeout(Duration::from_secs(5), composer.wait())
        .await
        .expect("no stage may outlive the cancellation")
        .expect("cancellation must not surface as a stage error");

    assert!(
        result.recv().await.is_none(),
        "the sink result is not produced on a cancelled run"
    );
}
