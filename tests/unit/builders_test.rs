//! Tests for builder modules

use prometheus_work_queue::builders::SchedulerBuilder;
use prometheus_work_queue::config::SchedulerConfig;
use prometheus_work_queue::core::{InMemoryAuditSink, Scheduler, SchedulerError};
use prometheus_work_queue::runtime::TokioSpawner;

type UnitScheduler = Scheduler<(), (), TokioSpawner>;

#[test]
fn test_scheduler_builder_defaults() {
    let config = SchedulerConfig {
        name: "pool1".to_string(),
        max_concurrency: 4,
        log_drain: true,
    };

    let builder = SchedulerBuilder::new(config).name("renamed");
    assert_eq!(builder.config().name, "renamed");
    assert_eq!(builder.config().max_concurrency, 4);
}

#[tokio::test]
async fn test_scheduler_builder_builds() {
    let scheduler: UnitScheduler = SchedulerBuilder::with_limit(3)
        .name("built")
        .with_audit(InMemoryAuditSink::new(8))
        .build(TokioSpawner::current())
        .unwrap();

    assert_eq!(scheduler.name(), "built");
    assert_eq!(scheduler.limit(), 3);
    assert!(scheduler.is_idle());
    assert_eq!(scheduler.stats().limit, 3);
}

#[tokio::test]
async fn test_scheduler_builder_rejects_zero_limit() {
    let err = SchedulerBuilder::with_limit(0)
        .build::<(), (), _>(TokioSpawner::current())
        .unwrap_err();
    assert!(matches!(err, SchedulerError::InvalidLimit(0)));
}

#[tokio::test]
async fn test_scheduler_builder_rejects_bad_config() {
    let err = SchedulerBuilder::with_limit(2)
        .name("")
        .build::<(), (), _>(TokioSpawner::current())
        .unwrap_err();
    assert!(matches!(err, SchedulerError::InvalidConfig(_)));
}

#[tokio::test]
async fn test_schedulers_have_distinct_ids() {
    let a: UnitScheduler = SchedulerBuilder::with_limit(1)
        .build(TokioSpawner::current())
        .unwrap();
    let b: UnitScheduler = SchedulerBuilder::with_limit(1)
        .build(TokioSpawner::current())
        .unwrap();
    assert_ne!(a.id(), b.id());
    assert_eq!(a.clone().id(), a.id());
}
