use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use fanout::batch::{BatchRunner, WorkerCount};
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use tokio::sync::Barrier;

/// Concrete scenario: [1,2,3,4,5], identity worker, 2 workers.
#[tokio::test]
async fn test_identity_batch_with_two_workers() {
    let runner = BatchRunner::new().with_workers(WorkerCount::Fixed(2));

    let mut results = runner
        .run(vec![1u32, 2, 3, 4, 5], |n| async move { Ok(n) })
        .await
        .expect("batch should succeed");

    // Arrival order is unspecified; compare as a set.
    results.sort();
    assert_eq!(results, vec![1, 2, 3, 4, 5]);
}

#[tokio::test]
async fn test_result_count_matches_task_count() {
    let runner = BatchRunner::new().with_workers(WorkerCount::Fixed(4));

    let results = runner
        .run((0..50u64).collect(), |n| async move { Ok(n * n) })
        .await
        .unwrap();

    assert_eq!(results.len(), 50);
    let mut sorted = results.clone();
    sorted.sort();
    assert_eq!(sorted, (0..50u64).map(|n| n * n).collect::<Vec<_>>());
}

/// Concrete scenario: empty batch with the auto sentinel returns [] without
/// validation or any worker invocation.
#[tokio::test]
async fn test_empty_batch_returns_immediately() {
    let invocations = Arc::new(AtomicUsize::new(0));

    for workers in [WorkerCount::Auto, WorkerCount::Fixed(0), WorkerCount::Fixed(8)] {
        let runner = BatchRunner::new().with_workers(workers);
        let counter = Arc::clone(&invocations);

        let results: Vec<u32> = runner
            .run(Vec::<u32>::new(), move |n| {
                counter.fetch_add(1, Ordering::SeqCst);
                async move { Ok(n) }
            })
            .await
            .expect("empty batch never fails, even with invalid worker counts");

        assert!(results.is_empty());
    }

    assert_eq!(invocations.load(Ordering::SeqCst), 0);
}

/// Auto worker count resolves to one executor per task: with K tasks that all
/// rendezvous on a K-party barrier, the batch can only complete if K worker
/// invocations run concurrently.
#[tokio::test]
async fn test_auto_spawns_one_worker_per_task() {
    const K: usize = 6;
    let runner = BatchRunner::new().with_workers(WorkerCount::Auto);
    let barrier = Arc::new(Barrier::new(K));

    let results = tokio::time::timeout(
        Duration::from_secs(5),
        runner.run((0..K).collect(), move |n| {
            let barrier = Arc::clone(&barrier);
            async move {
                barrier.wait().await;
                Ok(n)
            }
        }),
    )
    .await
    .expect("all K invocations must be able to run concurrently")
    .unwrap();

    assert_eq!(results.len(), K);
}

/// Every task is dispatched to the worker function exactly once.
#[tokio::test]
async fn test_exactly_once_dispatch() {
    let counts: Arc<Mutex<HashMap<u32, usize>>> = Arc::new(Mutex::new(HashMap::new()));
    let runner = BatchRunner::new().with_workers(WorkerCount::Fixed(3));

    let tasks: Vec<u32> = (0..200).collect();
    let counts_ref = Arc::clone(&counts);

    runner
        .run(tasks.clone(), move |n| {
            *counts_ref.lock().entry(n).or_insert(0) += 1;
            async move { Ok(()) }
        })
        .await
        .unwrap();

    let counts = counts.lock();
    assert_eq!(counts.len(), tasks.len());
    for (task, count) in counts.iter() {
        assert_eq!(*count, 1, "task {} dispatched {} times", task, count);
    }
}

/// More workers than tasks is fine; the excess executors exit on the empty
/// queue.
#[tokio::test]
async fn test_more_workers_than_tasks() {
    let runner = BatchRunner::new().with_workers(WorkerCount::Fixed(32));

    let mut results = runner.run(vec![1u8, 2], |n| async move { Ok(n) }).await.unwrap();
    results.sort();
    assert_eq!(results, vec![1, 2]);
}

/// A runner is reusable across successive batches.
#[tokio::test]
async fn test_runner_reuse_across_batches() {
    let runner = BatchRunner::new().with_workers(WorkerCount::Fixed(2));

    let first = runner.run(vec![1u32, 2], |n| async move { Ok(n) }).await.unwrap();
    let second = runner.run(vec![3u32, 4, 5], |n| async move { Ok(n) }).await.unwrap();

    assert_eq!(first.len(), 2);
    assert_eq!(second.len(), 3);
}

#[tokio::test]
async fn test_run_detailed_reports_the_batch_shape() {
    let runner = BatchRunner::new().with_workers(WorkerCount::Fixed(3));

    let (results, summary) = runner
        .run_detailed((0..10u32).collect(), |n| async move { Ok(n) })
        .await
        .unwrap();

    assert_eq!(results.len(), 10);
    assert_eq!(summary.task_count, 10);
    assert_eq!(summary.worker_count, 3);
    assert_eq!(summary.results_collected, 10);
}
