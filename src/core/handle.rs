//! Per-submission result handle.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::sync::oneshot;

use super::TaskError;

/// Settlement value carried from the scheduler to the submitter.
pub type Settlement<T, E> = Result<T, TaskError<E>>;

/// Eventual outcome of one submitted work unit.
///
/// Returned by [`Scheduler::submit`](crate::core::Scheduler::submit) before the
/// unit has been admitted. It resolves exactly once: with the unit's value, with
/// [`TaskError::Failed`] carrying the unit's own error, or with
/// [`TaskError::Panicked`] / [`TaskError::Abandoned`].
///
/// Dropping the handle does not cancel the unit; it still runs and its outcome
/// is discarded.
#[must_use = "dropping a ResultHandle discards the work unit's outcome"]
pub struct ResultHandle<T, E> {
    seq: u64,
    rx: oneshot::Receiver<Settlement<T, E>>,
}

impl<T, E> ResultHandle<T, E> {
    pub(crate) fn channel(seq: u64) -> (Settler<T, E>, Self) {
        let (tx, rx) = oneshot::channel();
        (Settler { tx }, Self { seq, rx })
    }

    /// Submission sequence number (0-based, per scheduler).
    pub const fn seq(&self) -> u64 {
        self.seq
    }

    /// Block the current thread until the unit settles.
    ///
    /// Must not be called from within an async runtime worker thread.
    pub fn blocking_wait(self) -> Settlement<T, E> {
        self.rx
            .blocking_recv()
            .unwrap_or(Err(TaskError::Abandoned))
    }
}

impl<T, E> Future for ResultHandle<T, E> {
    type Output = Settlement<T, E>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|res| res.unwrap_or(Err(TaskError::Abandoned)))
    }
}

impl<T, E> fmt::Debug for ResultHandle<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResultHandle").field("seq", &self.seq).finish()
    }
}

/// Sending half of a [`ResultHandle`]. Consumed on settlement, so a handle can
/// only ever be settled once.
pub(crate) struct Settler<T, E> {
    tx: oneshot::Sender<Settlement<T, E>>,
}

impl<T, E> Settler<T, E> {
    /// Deliver the outcome. Returns false if the submitter dropped its handle.
    pub(crate) fn settle(self, outcome: Settlement<T, E>) -> bool {
        self.tx.send(outcome).is_ok()
    }
}
