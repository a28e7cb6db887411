//! Configuration models for schedulers.

pub mod scheduler;

pub use scheduler::{SchedulerConfig, ENV_LOG_DRAIN, ENV_MAX_CONCURRENCY, ENV_NAME};
