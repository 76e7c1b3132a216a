//! Demo harness: runs the plain and fanned square pipelines and prints
//! their results.

use anyhow::Result;
use flowline::observability::LogBuffer;
use flowline::pipeline::{run_fanned_square_pipeline, run_square_pipeline};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    match run_square_pipeline(100).await {
        Ok(results) => {
            for unit in &results {
                println!("{unit}");
            }
        }
        Err(err) => {
            println!("An error occurred during processing: {err}");
            return Ok(());
        }
    }

    match run_fanned_square_pipeline(100, 4).await {
        Ok(results) => {
            for unit in &results {
                println!("{unit}");
            }
        }
        Err(err) => println!("An error occurred during processing: {err}"),
    }

    LogBuffer::global().flush();

    Ok(())
}
