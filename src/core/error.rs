//! Error types for scheduler operations.

use thiserror::Error;

/// Errors produced while constructing or configuring a scheduler.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// Concurrency limit must admit at least one unit.
    #[error("invalid concurrency limit: {0} (must be at least 1)")]
    InvalidLimit(usize),
    /// Configuration failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// Runtime adapter could not be created.
    #[error("runtime error: {0}")]
    Runtime(String),
}

/// Outcome of a single submission that did not produce a value.
///
/// `E` is the work unit's own error type and is carried through verbatim.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TaskError<E> {
    /// The work unit ran and returned an error.
    #[error("work unit failed: {0}")]
    Failed(E),
    /// The work unit panicked while running.
    #[error("work unit panicked: {0}")]
    Panicked(String),
    /// The work unit was dropped before it settled (runtime shut down).
    #[error("work unit abandoned before settlement")]
    Abandoned,
}

impl<E> TaskError<E> {
    /// Returns the unit's own error if it failed normally.
    pub fn into_failure(self) -> Option<E> {
        match self {
            Self::Failed(e) => Some(e),
            Self::Panicked(_) | Self::Abandoned => None,
        }
    }

    /// True if the unit panicked.
    pub const fn is_panic(&self) -> bool {
        matches!(self, Self::Panicked(_))
    }
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
