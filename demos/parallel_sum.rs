//! Minimal batch-runner example: square 100 numbers across 8 workers.

use std::error::Error;
use std::time::Duration;

use fanout::batch::{BatchRunner, WorkerCount};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let runner = BatchRunner::new().with_workers(WorkerCount::Fixed(8));

    let (squares, summary) = runner
        .run_detailed((1u64..=100).collect(), |n| async move {
            // Stand-in for real per-task work.
            tokio::time::sleep(Duration::from_millis(5)).await;
            Ok(n * n)
        })
        .await?;

    let total: u64 = squares.iter().sum();
    println!(
        "batch {} squared {} numbers with {} workers in {:?}",
        summary.batch_id, summary.task_count, summary.worker_count, summary.duration
    );
    println!("sum of squares 1..=100 = {total}");

    Ok(())
}
