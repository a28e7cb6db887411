//! Core scheduling abstractions and admission accounting.

pub mod audit;
pub mod error;
pub mod handle;
pub mod observer;
pub mod scheduler;
pub mod work_unit;

pub use audit::{
    build_audit_event, AuditAction, AuditEvent, AuditSink, InMemoryAuditSink, TracingAuditSink,
};
pub use error::{AppResult, SchedulerError, TaskError};
pub use handle::ResultHandle;
pub use observer::{DrainObserver, LogDrainObserver, NoopDrainObserver};
pub use scheduler::{ConcurrencyLimit, Scheduler, SchedulerStats, Spawn};
pub use work_unit::{BoxWorkUnit, WorkUnit};
