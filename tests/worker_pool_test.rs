use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use scribed::application::services::WorkerPool;

async fn run_tracked(pool: Arc<WorkerPool>, active: Arc<AtomicUsize>, max: Arc<AtomicUsize>) {
    pool.run(async {
        let now = active.fetch_add(1, Ordering::SeqCst) + 1;
        max.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(50)).await;
        active.fetch_sub(1, Ordering::SeqCst);
    })
    .await;
}

#[tokio::test(flavor = "multi_thread")]
async fn given_capacity_one_when_two_tasks_run_then_they_are_serialized() {
    let pool = Arc::new(WorkerPool::new(1));
    let active = Arc::new(AtomicUsize::new(0));
    let max = Arc::new(AtomicUsize::new(0));

    let first = tokio::spawn(run_tracked(
        Arc::clone(&pool),
        Arc::clone(&active),
        Arc::clone(&max),
    ));
    let second = tokio::spawn(run_tracked(
        Arc::clone(&pool),
        Arc::clone(&active),
        Arc::clone(&max),
    ));

    first.await.unwrap();
    second.await.unwrap();

    assert_eq!(max.load(Ordering::SeqCst), 1);
    assert_eq!(pool.active(), 0);
    assert_eq!(pool.queued(), 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn given_capacity_two_when_two_tasks_run_then_they_overlap() {
    let pool = Arc::new(WorkerPool::new(2));
    let active = Arc::new(AtomicUsize::new(0));
    let max = Arc::new(AtomicUsize::new(0));

    let first = tokio::spawn(run_tracked(
        Arc::clone(&pool),
        Arc::clone(&active),
        Arc::clone(&max),
    ));
    let second = tokio::spawn(run_tracked(
        Arc::clone(&pool),
        Arc::clone(&active),
        Arc::clone(&max),
    ));

    first.await.unwrap();
    second.await.unwrap();

    assert_eq!(max.load(Ordering::SeqCst), 2);
}

#[tokio::test(flavor = "multi_thread")]
async fn given_full_pool_when_more_work_arrives_then_queue_depth_is_visible() {
    let pool = Arc::new(WorkerPool::new(1));

    let holder = {
        let pool = Arc::clone(&pool);
        tokio::spawn(async move {
            pool.run(tokio::time::sleep(Duration::from_millis(200))).await;
        })
    };
    // Let the first task claim the only slot.
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(pool.active(), 1);

    let waiter = {
        let pool = Arc::clone(&pool);
        tokio::spawn(async move {
            pool.run(async {}).await;
        })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(pool.queued(), 1);

    holder.await.unwrap();
    waiter.await.unwrap();
    assert_eq!(pool.queued(), 0);
    assert_eq!(pool.active(), 0);
}

#[tokio::test]
async fn given_failing_work_when_run_then_error_is_returned_as_a_value() {
    let pool = WorkerPool::new(1);

    let result: Result<(), String> = pool.run(async { Err("boom".to_string()) }).await;

    assert_eq!(result.unwrap_err(), "boom");
    assert_eq!(pool.active(), 0);
}
