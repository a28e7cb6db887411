//! Work unit abstraction.
//!
//! A work unit is a zero-argument, run-once asynchronous operation. The scheduler
//! treats it as opaque: it is invoked exactly once if and only if it is admitted,
//! and its `Result` is handed back to the submitter untouched.

use std::future::Future;

use futures::future::BoxFuture;
use futures::FutureExt;

/// A run-once asynchronous operation producing `Result<T, E>`.
///
/// Implemented for every `FnOnce() -> impl Future<Output = Result<T, E>>` closure,
/// so most callers never name this trait:
///
/// ```rust,ignore
/// let handle = scheduler.submit(move || async move { fetch(i).await });
/// ```
pub trait WorkUnit<T, E>: Send + 'static {
    /// Invoke the unit, producing the future that drives it to completion.
    fn invoke(self: Box<Self>) -> BoxFuture<'static, Result<T, E>>;
}

impl<F, Fut, T, E> WorkUnit<T, E> for F
where
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
{
    fn invoke(self: Box<Self>) -> BoxFuture<'static, Result<T, E>> {
        (*self)().boxed()
    }
}

/// Type-erased work unit as stored in the pending list.
pub type BoxWorkUnit<T, E> = Box<dyn WorkUnit<T, E>>;
