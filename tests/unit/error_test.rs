//! Tests for error types

use prometheus_work_queue::core::{SchedulerError, TaskError};

#[test]
fn test_invalid_limit_error() {
    let err = SchedulerError::InvalidLimit(0);
    assert_eq!(
        format!("{}", err),
        "invalid concurrency limit: 0 (must be at least 1)"
    );
}

#[test]
fn test_invalid_config_error() {
    let err = SchedulerError::InvalidConfig("name must not be empty".to_string());
    assert_eq!(format!("{}", err), "invalid configuration: name must not be empty");
}

#[test]
fn test_runtime_error() {
    let err = SchedulerError::Runtime("no reactor running".to_string());
    assert_eq!(format!("{}", err), "runtime error: no reactor running");
}

#[test]
fn test_task_error_display() {
    let err: TaskError<String> = TaskError::Failed("timeout".to_string());
    assert_eq!(format!("{}", err), "work unit failed: timeout");

    let err: TaskError<String> = TaskError::Panicked("index out of bounds".to_string());
    assert_eq!(format!("{}", err), "work unit panicked: index out of bounds");

    let err: TaskError<String> = TaskError::Abandoned;
    assert_eq!(format!("{}", err), "work unit abandoned before settlement");
}

#[test]
fn test_task_error_into_failure() {
    assert_eq!(TaskError::Failed(7).into_failure(), Some(7));
    assert_eq!(TaskError::<i32>::Abandoned.into_failure(), None);
    assert!(TaskError::<i32>::Panicked("x".into()).is_panic());
    assert!(!TaskError::Failed(1).is_panic());
}
