//! Tests for tokio spawner utilities

use prometheus_work_queue::core::Spawn;
use prometheus_work_queue::runtime::tokio_spawner::TokioSpawner;

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_tokio_spawner_spawn() {
    let spawner = TokioSpawner::new(tokio::runtime::Handle::current());

    let (tx, rx) = tokio::sync::oneshot::channel();
    spawner.spawn(async move {
        tx.send(123).unwrap();
    });

    let result = rx.await.expect("oneshot result");
    assert_eq!(result, 123);
}

#[test]
fn test_try_current_outside_runtime() {
    assert!(TokioSpawner::try_current().is_err());
}

#[test]
fn test_owned_runtime_spawner() {
    let spawner = TokioSpawner::with_worker_threads(1).unwrap();

    let (tx, rx) = std::sync::mpsc::channel();
    spawner.spawn(async move {
        tx.send("done").unwrap();
    });

    assert_eq!(rx.recv().unwrap(), "done");
}
