//! Final action performed on aggregated results.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::core::AppResult;

/// Receives the aggregated results of a successful driver run.
#[async_trait]
pub trait ResultSink<T>: Send + Sync
where
    T: Send + Sync,
{
    /// Persist or otherwise consume the results, in submission order.
    ///
    /// # Errors
    ///
    /// Returns an error if the results could not be persisted.
    async fn persist(&self, results: &[T]) -> AppResult<()>;
}

/// Sink that keeps every persisted batch in memory.
#[derive(Clone)]
pub struct MemorySink<T> {
    batches: Arc<Mutex<Vec<Vec<T>>>>,
}

impl<T> Default for MemorySink<T> {
    fn default() -> Self {
        Self {
            batches: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl<T: Clone> MemorySink<T> {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Batches persisted so far.
    pub fn batches(&self) -> Vec<Vec<T>> {
        self.batches.lock().clone()
    }

    /// Number of batches persisted so far.
    pub fn len(&self) -> usize {
        self.batches.lock().len()
    }

    /// True if nothing has been persisted.
    pub fn is_empty(&self) -> bool {
        self.batches.lock().is_empty()
    }
}

#[async_trait]
impl<T> ResultSink<T> for MemorySink<T>
where
    T: Clone + Send + Sync,
{
    async fn persist(&self, results: &[T]) -> AppResult<()> {
        self.batches.lock().push(results.to_vec());
        Ok(())
    }
}
