//! Integration tests for the core-async runtime facade.
//!
//! The audio core leans on three guarantees checked here: cancellation tokens
//! propagate to children, `select!` observes cancellation before a sleep
//! elapses, and `Instant` follows Tokio's paused clock.

use core_async::sync::CancellationToken;
use core_async::{runtime, sync, task, time};
use std::sync::Arc;

#[tokio::test]
async fn test_task_spawn() {
    let handle = task::spawn(async { 42 });
    let result = handle.await.unwrap();
    assert_eq!(result, 42);
}

#[tokio::test]
async fn test_task_spawn_blocking() {
    let handle = task::spawn_blocking(|| {
        std::thread::sleep(std::time::Duration::from_millis(10));
        100
    });
    let result = handle.await.unwrap();
    assert_eq!(result, 100);
}

#[tokio::test(start_paused = true)]
async fn test_instant_follows_paused_clock() {
    let start = time::Instant::now();
    time::sleep(time::Duration::from_secs(10)).await;
    assert_eq!(start.elapsed(), time::Duration::from_secs(10));
}

#[tokio::test]
async fn test_timeout_failure() {
    let result = time::timeout(time::Duration::from_millis(10), async {
        time::sleep(time::Duration::from_millis(100)).await;
        42
    })
    .await;

    assert!(result.is_err());
}

#[tokio::test]
async fn test_rwlock_readers_share() {
    let rwlock = Arc::new(sync::RwLock::new(vec![1, 2, 3]));

    let first = rwlock.read().await;
    let second = rwlock.read().await;
    assert_eq!(first.len(), second.len());
    drop((first, second));

    let mut guard = rwlock.write().await;
    guard.push(4);
    assert_eq!(guard.len(), 4);
}

#[tokio::test]
async fn test_child_token_cancelled_with_parent() {
    let parent = CancellationToken::new();
    let child = parent.child_token();
    let grandchild = child.child_token();

    assert!(!grandchild.is_cancelled());
    parent.cancel();

    assert!(child.is_cancelled());
    assert!(grandchild.is_cancelled());
}

#[tokio::test]
async fn test_cancelling_child_leaves_parent_alive() {
    let parent = CancellationToken::new();
    let child = parent.child_token();

    child.cancel();

    assert!(child.is_cancelled());
    assert!(!parent.is_cancelled());
}

#[tokio::test(start_paused = true)]
async fn test_select_prefers_cancellation_over_sleep() {
    let token = CancellationToken::new();
    let task_token = token.clone();

    let handle = task::spawn(async move {
        core_async::select! {
            _ = task_token.cancelled() => "cancelled",
            _ = time::sleep(time::Duration::from_secs(5)) => "elapsed",
        }
    });

    time::sleep(time::Duration::from_secs(1)).await;
    token.cancel();

    assert_eq!(handle.await.unwrap(), "cancelled");
}

#[tokio::test]
async fn test_current_handle_inside_runtime() {
    let handle = runtime::current_handle().expect("inside a runtime");
    let joined = handle.spawn(async { "spawned" }).await.unwrap();
    assert_eq!(joined, "spawned");
}

#[test]
fn test_current_handle_outside_runtime() {
    assert!(runtime::current_handle().is_none());
}

#[test]
fn test_block_on() {
    let value = runtime::block_on(async {
        time::sleep(time::Duration::from_millis(1)).await;
        7
    })
    .unwrap();
    assert_eq!(value, 7);
}

#[tokio::test]
async fn test_broadcast_channel() {
    let (tx, mut rx1) = sync::broadcast::channel(10);
    let mut rx2 = tx.subscribe();

    task::spawn(async move {
        for i in 0..5 {
            tx.send(i).unwrap();
        }
    });

    let mut values1 = vec![];
    let mut values2 = vec![];

    for _ in 0..5 {
        values1.push(rx1.recv().await.unwrap());
        values2.push(rx2.recv().await.unwrap());
    }

    assert_eq!(values1, vec![0, 1, 2, 3, 4]);
    assert_eq!(values2, vec![0, 1, 2, 3, 4]);
}
