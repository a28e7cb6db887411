//! Submit-all / aggregate / persist driver.

use std::marker::PhantomData;

use anyhow::{anyhow, Context};
use futures::future::{join_all, try_join_all};
use tracing::{info, warn};

use crate::core::{AppResult, ResultHandle, Scheduler, Spawn, TaskError};
use crate::driver::{ResultSink, UnitExecutor};

/// Drives a batch of items through a [`Scheduler`].
///
/// Every item becomes one work unit running `executor.execute(item)`. The
/// scheduler bounds how many run at once; the driver only aggregates.
pub struct Driver<I, T, X, K, S> {
    scheduler: Scheduler<T, anyhow::Error, S>,
    executor: X,
    sink: K,
    _item: PhantomData<fn(I)>,
}

impl<I, T, X, K, S> Driver<I, T, X, K, S>
where
    I: Send + 'static,
    T: Send + Sync + 'static,
    X: UnitExecutor<I, T>,
    K: ResultSink<T>,
    S: Spawn + Send + Sync + 'static,
{
    /// Create a driver over an existing scheduler.
    pub const fn new(scheduler: Scheduler<T, anyhow::Error, S>, executor: X, sink: K) -> Self {
        Self {
            scheduler,
            executor,
            sink,
            _item: PhantomData,
        }
    }

    /// The scheduler work is submitted to.
    pub const fn scheduler(&self) -> &Scheduler<T, anyhow::Error, S> {
        &self.scheduler
    }

    /// The sink results are persisted to.
    pub const fn sink(&self) -> &K {
        &self.sink
    }

    /// Submit one work unit per item, in iteration order.
    pub fn submit_all(
        &self,
        items: impl IntoIterator<Item = I>,
    ) -> Vec<ResultHandle<T, anyhow::Error>> {
        items
            .into_iter()
            .map(|item| {
                let executor = self.executor.clone();
                self.scheduler
                    .submit(move || async move { executor.execute(item).await })
            })
            .collect()
    }

    /// Run every item, then persist the results in submission order.
    ///
    /// Fails fast: the first failed item fails the run and the sink is not
    /// called. Units already submitted keep running to completion; there is
    /// no cancellation.
    ///
    /// # Errors
    ///
    /// Returns the first item failure (with the item's index as context) or
    /// the sink's error.
    pub async fn run(&self, items: impl IntoIterator<Item = I>) -> AppResult<Vec<T>> {
        let handles = self.submit_all(items);
        let total = handles.len();
        info!(scheduler = %self.scheduler.name(), total, "driver submitted batch");

        let results = try_join_all(handles.into_iter().enumerate().map(|(index, handle)| async move {
            handle
                .await
                .map_err(into_anyhow)
                .with_context(|| format!("item {index} failed"))
        }))
        .await
        .inspect_err(|e| warn!(error = %format!("{e:#}"), "one or more work units failed"))?;

        self.sink
            .persist(&results)
            .await
            .context("persisting aggregated results")?;
        info!(scheduler = %self.scheduler.name(), total, "driver persisted batch");
        Ok(results)
    }

    /// Run every item and return each outcome in submission order, without
    /// failing fast and without calling the sink.
    pub async fn run_settled(
        &self,
        items: impl IntoIterator<Item = I>,
    ) -> Vec<Result<T, TaskError<anyhow::Error>>> {
        join_all(self.submit_all(items)).await
    }
}

/// Flatten per-item record lists into one list, keeping order.
pub fn flatten<T>(batches: Vec<Vec<T>>) -> Vec<T> {
    batches.into_iter().flatten().collect()
}

fn into_anyhow(err: TaskError<anyhow::Error>) -> anyhow::Error {
    match err {
        TaskError::Failed(e) => e,
        TaskError::Panicked(msg) => anyhow!("work unit panicked: {msg}"),
        TaskError::Abandoned => anyhow!("work unit abandoned before settlement"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flatten_keeps_order() {
        let flat = flatten(vec![vec![1, 2], vec![], vec![3]]);
        assert_eq!(flat, vec![1, 2, 3]);
    }

    #[test]
    fn test_into_anyhow_passes_failure_through() {
        let err = into_anyhow(TaskError::Failed(anyhow!("timeout on page 3")));
        assert_eq!(err.to_string(), "timeout on page 3");
        let err = into_anyhow(TaskError::Panicked("boom".into()));
        assert_eq!(err.to_string(), "work unit panicked: boom");
        let err = into_anyhow(TaskError::Abandoned);
        assert!(err.to_string().contains("abandoned"));
    }
}
