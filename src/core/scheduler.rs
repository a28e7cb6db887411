//! Bounded-concurrency scheduler with FIFO admission and drain notification.
//!
//! The scheduler keeps a pending list and an active count behind one
//! `parking_lot::Mutex`. Every state transition happens inside that lock:
//!
//! - **submit**: push the entry to the tail of the pending list, then pump.
//! - **pump** (admission): while `active < limit` and something is pending, pop
//!   the head and increment `active` in the same critical section, then invoke
//!   the unit and hand its future to the spawner outside the lock.
//! - **complete**: decrement `active`, settle the submitter's handle, fire the
//!   drain observer if nothing is pending or active, then pump again.
//!
//! Pumping is iterative and single-flight: a pump requested while another is in
//! progress is folded into the running loop, so rapid completions never recurse
//! and units are invoked in the order they were admitted. A drain decided while a
//! pump loop is running is handed to that loop and delivered after it releases
//! admission, so a slow observer never holds up other submitters.
//!
//! Panics from user code (work units, the spawner, audit sinks, observers) are
//! caught and logged. None of them can leave a slot occupied or admission stuck.

use std::any::Any;
use std::collections::VecDeque;
use std::fmt;
use std::future::Future;
use std::num::NonZeroUsize;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use futures::FutureExt;
use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::core::handle::{Settlement, Settler};
use crate::core::{
    build_audit_event, AuditAction, AuditSink, BoxWorkUnit, DrainObserver, LogDrainObserver,
    ResultHandle, SchedulerError, TaskError, WorkUnit,
};

/// Abstraction for spawning task execution on a runtime.
pub trait Spawn {
    /// Spawn an async task that returns a future.
    fn spawn<F>(&self, fut: F)
    where
        F: Future<Output = ()> + Send + 'static;
}

/// Maximum number of work units allowed in flight at once. Always at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConcurrencyLimit(NonZeroUsize);

impl ConcurrencyLimit {
    /// Validate a raw limit.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::InvalidLimit`] for 0, which would block admission forever.
    pub fn new(limit: usize) -> Result<Self, SchedulerError> {
        NonZeroUsize::new(limit)
            .map(Self)
            .ok_or(SchedulerError::InvalidLimit(limit))
    }

    /// Raw limit value.
    pub const fn get(self) -> usize {
        self.0.get()
    }
}

impl TryFrom<usize> for ConcurrencyLimit {
    type Error = SchedulerError;

    fn try_from(limit: usize) -> Result<Self, Self::Error> {
        Self::new(limit)
    }
}

impl fmt::Display for ConcurrencyLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Point-in-time view of scheduler bookkeeping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchedulerStats {
    /// Configured concurrency limit.
    pub limit: usize,
    /// Units submitted but not yet admitted.
    pub pending: usize,
    /// Units admitted and not yet settled.
    pub active: usize,
    /// Total submissions.
    pub submitted: u64,
    /// Total admissions.
    pub admitted: u64,
    /// Units that settled with a value.
    pub succeeded: u64,
    /// Units that settled with a failure, panic, or abandonment.
    pub failed: u64,
    /// Drain events fired so far.
    pub drains: u64,
}

impl SchedulerStats {
    /// Units that have settled either way.
    pub const fn settled(&self) -> u64 {
        self.succeeded + self.failed
    }
}

/// A submitted unit waiting for capacity.
struct PendingEntry<T, E> {
    seq: u64,
    unit: BoxWorkUnit<T, E>,
    settler: Settler<T, E>,
}

/// Mutable scheduler state. Only touched while holding `Inner::state`.
struct QueueState<T, E> {
    pending: VecDeque<PendingEntry<T, E>>,
    active: usize,
    /// A pump loop is running; other callers leave admission to it.
    pumping: bool,
    /// Drain notifications decided but not yet delivered to the observer.
    notifying: usize,
    /// Drains decided while a pump loop was running. The pumping thread
    /// delivers them once it has released admission.
    deferred_drains: usize,
    next_seq: u64,
    submitted: u64,
    admitted: u64,
    succeeded: u64,
    failed: u64,
    drains: u64,
}

impl<T, E> QueueState<T, E> {
    const fn new() -> Self {
        Self {
            pending: VecDeque::new(),
            active: 0,
            pumping: false,
            notifying: 0,
            deferred_drains: 0,
            next_seq: 0,
            submitted: 0,
            admitted: 0,
            succeeded: 0,
            failed: 0,
            drains: 0,
        }
    }

    fn is_idle(&self) -> bool {
        self.pending.is_empty() && self.active == 0 && self.notifying == 0
    }
}

struct Inner<T, E, S> {
    id: Uuid,
    name: String,
    limit: ConcurrencyLimit,
    state: Mutex<QueueState<T, E>>,
    observer: Arc<dyn DrainObserver>,
    audit: Option<Mutex<Box<dyn AuditSink>>>,
    /// Incremented on every drain event; wakes `wait_idle` callers.
    drain_tx: watch::Sender<u64>,
    spawner: S,
}

/// Bounded-concurrency scheduler for asynchronous work units.
///
/// At most `limit` units run at once. Units are admitted strictly in submission
/// order; they may finish in any order. Each submission settles exactly once
/// through the [`ResultHandle`] returned by [`submit`](Self::submit), and the
/// installed [`DrainObserver`] fires each time the last pending or active unit
/// settles.
///
/// `Scheduler` is a cheap handle: clones share the same queue, so work units can
/// capture a clone and submit follow-up work.
///
/// ```rust,ignore
/// use prometheus_work_queue::core::Scheduler;
/// use prometheus_work_queue::runtime::TokioSpawner;
///
/// let scheduler = Scheduler::new(5, TokioSpawner::current())?;
/// let handles: Vec<_> = (0..100)
///     .map(|i| scheduler.submit(move || async move { fetch_page(i).await }))
///     .collect();
/// let pages = futures::future::try_join_all(handles).await?;
/// ```
pub struct Scheduler<T, E, S> {
    inner: Arc<Inner<T, E, S>>,
}

impl<T, E, S> Clone for Scheduler<T, E, S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T, E, S> fmt::Debug for Scheduler<T, E, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("Scheduler")
            .field("id", &self.inner.id)
            .field("name", &self.inner.name)
            .field("limit", &self.inner.limit)
            .field("pending", &state.pending.len())
            .field("active", &state.active)
            .finish_non_exhaustive()
    }
}

impl<T, E, S> Scheduler<T, E, S>
where
    T: Send + 'static,
    E: Send + 'static,
    S: Spawn + Send + Sync + 'static,
{
    /// Create a scheduler with the default logging drain observer and no audit sink.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::InvalidLimit`] if `limit` is 0.
    pub fn new(limit: usize, spawner: S) -> Result<Self, SchedulerError> {
        let limit = ConcurrencyLimit::new(limit)?;
        let name = "work-queue".to_string();
        let observer = Arc::new(LogDrainObserver::new(name.clone()));
        Ok(Self::from_parts(name, limit, spawner, observer, None))
    }

    pub(crate) fn from_parts(
        name: String,
        limit: ConcurrencyLimit,
        spawner: S,
        observer: Arc<dyn DrainObserver>,
        audit: Option<Box<dyn AuditSink>>,
    ) -> Self {
        let id = Uuid::new_v4();
        let (drain_tx, _) = watch::channel(0);
        info!(scheduler = %name, %id, limit = limit.get(), "scheduler initialized");
        Self {
            inner: Arc::new(Inner {
                id,
                name,
                limit,
                state: Mutex::new(QueueState::new()),
                observer,
                audit: audit.map(Mutex::new),
                drain_tx,
                spawner,
            }),
        }
    }

    /// Submit a work unit.
    ///
    /// The unit is appended to the pending list and admitted immediately if
    /// capacity allows, otherwise once earlier submissions make room. Never
    /// blocks and never fails; the unit's outcome arrives through the handle.
    pub fn submit<W>(&self, unit: W) -> ResultHandle<T, E>
    where
        W: WorkUnit<T, E>,
    {
        self.submit_boxed(Box::new(unit))
    }

    /// Submit an already boxed work unit.
    pub fn submit_boxed(&self, unit: BoxWorkUnit<T, E>) -> ResultHandle<T, E> {
        let handle = {
            let mut state = self.inner.state.lock();
            let seq = state.next_seq;
            state.next_seq += 1;
            state.submitted += 1;
            let (settler, handle) = ResultHandle::channel(seq);
            state.pending.push_back(PendingEntry { seq, unit, settler });
            self.inner.record(Some(seq), AuditAction::Submitted);
            debug!(
                scheduler = %self.inner.name,
                seq,
                pending = state.pending.len(),
                active = state.active,
                "work unit submitted"
            );
            handle
        };
        self.inner.pump();
        handle
    }

    /// Wait until the scheduler is idle (see [`is_idle`](Self::is_idle)).
    ///
    /// Resolves immediately if the scheduler is already idle, otherwise after
    /// the next drain notification that leaves it idle.
    pub async fn wait_idle(&self) {
        let mut rx = self.inner.drain_tx.subscribe();
        loop {
            if self.is_idle() {
                return;
            }
            if rx.changed().await.is_err() {
                return;
            }
        }
    }
}

impl<T, E, S> Scheduler<T, E, S> {
    /// Unique identifier of this scheduler instance.
    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    /// Scheduler name used in logs and audit events.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Configured concurrency limit.
    pub fn limit(&self) -> usize {
        self.inner.limit.get()
    }

    /// Number of units waiting for admission.
    pub fn pending(&self) -> usize {
        self.inner.state.lock().pending.len()
    }

    /// Number of units admitted and not yet settled.
    pub fn active(&self) -> usize {
        self.inner.state.lock().active
    }

    /// True when nothing is pending or active and every drain observer call
    /// has returned.
    pub fn is_idle(&self) -> bool {
        self.inner.state.lock().is_idle()
    }

    /// Snapshot current bookkeeping.
    pub fn stats(&self) -> SchedulerStats {
        let state = self.inner.state.lock();
        SchedulerStats {
            limit: self.inner.limit.get(),
            pending: state.pending.len(),
            active: state.active,
            submitted: state.submitted,
            admitted: state.admitted,
            succeeded: state.succeeded,
            failed: state.failed,
            drains: state.drains,
        }
    }
}

impl<T, E, S> Inner<T, E, S> {
    /// Record an audit event. Callers hold the state lock so audit order matches
    /// the order of state transitions. A panicking sink loses the event.
    fn record(&self, seq: Option<u64>, action: AuditAction) {
        if let Some(audit) = &self.audit {
            let event = build_audit_event(seq, self.name.as_str(), action);
            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| audit.lock().record(event))) {
                warn!(
                    scheduler = %self.name,
                    ?seq,
                    panic = %panic_message(payload.as_ref()),
                    "audit sink panicked"
                );
            }
        }
    }

    fn notify_drained(&self) {
        debug!(scheduler = %self.name, "scheduler drained");
        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| self.observer.on_drain())) {
            warn!(
                scheduler = %self.name,
                panic = %panic_message(payload.as_ref()),
                "drain observer panicked"
            );
        }
        self.state.lock().notifying -= 1;
        self.drain_tx.send_modify(|drains| *drains += 1);
    }
}

/// Marks the running pump loop. Dropping it releases admission and delivers
/// drains deferred to the loop; the normal exit disarms it after doing both.
struct PumpGuard<'a, T, E, S> {
    inner: &'a Inner<T, E, S>,
    armed: bool,
}

impl<T, E, S> Drop for PumpGuard<'_, T, E, S> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let deferred = {
            let mut state = self.inner.state.lock();
            state.pumping = false;
            std::mem::take(&mut state.deferred_drains)
        };
        for _ in 0..deferred {
            self.inner.notify_drained();
        }
    }
}

impl<T, E, S> Inner<T, E, S>
where
    T: Send + 'static,
    E: Send + 'static,
    S: Spawn + Send + Sync + 'static,
{
    /// Admit pending units while capacity remains.
    fn pump(self: &Arc<Self>) {
        {
            let mut state = self.state.lock();
            if state.pumping {
                return;
            }
            state.pumping = true;
        }
        let mut guard = PumpGuard {
            inner: self.as_ref(),
            armed: true,
        };

        let deferred = loop {
            let (unit, completion, active, pending) = {
                let mut state = self.state.lock();
                let entry = if state.active < self.limit.get() {
                    state.pending.pop_front()
                } else {
                    None
                };
                let Some(PendingEntry { seq, unit, settler }) = entry else {
                    // Cleared in the same critical section that found no work,
                    // so a concurrent submit either sees the flag or its entry.
                    state.pumping = false;
                    guard.armed = false;
                    break std::mem::take(&mut state.deferred_drains);
                };
                state.active += 1;
                state.admitted += 1;
                // From here on any unwind settles the unit and frees the slot.
                let completion = Completion {
                    inner: Arc::clone(self),
                    seq,
                    settler: Some(settler),
                };
                self.record(
                    Some(seq),
                    AuditAction::Admitted {
                        active: state.active,
                    },
                );
                (unit, completion, state.active, state.pending.len())
            };
            debug!(
                scheduler = %self.name,
                seq = completion.seq,
                active,
                pending,
                "work unit admitted"
            );
            self.dispatch(unit, completion);
        };

        for _ in 0..deferred {
            self.notify_drained();
        }
    }

    /// Invoke an admitted unit and hand its future to the spawner.
    fn dispatch(&self, unit: BoxWorkUnit<T, E>, completion: Completion<T, E, S>) {
        let seq = completion.seq;
        let fut = match panic::catch_unwind(AssertUnwindSafe(|| unit.invoke())) {
            Ok(fut) => fut,
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                warn!(scheduler = %self.name, seq, panic = %message, "work unit panicked on invoke");
                completion.finish(Err(TaskError::Panicked(message)));
                return;
            }
        };

        let task = async move {
            let outcome = match AssertUnwindSafe(fut).catch_unwind().await {
                Ok(Ok(value)) => Ok(value),
                Ok(Err(e)) => Err(TaskError::Failed(e)),
                Err(payload) => {
                    let message = panic_message(payload.as_ref());
                    warn!(seq, panic = %message, "work unit panicked");
                    Err(TaskError::Panicked(message))
                }
            };
            completion.finish(outcome);
        };
        // A spawner that panics drops the task, which settles it as abandoned.
        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| self.spawner.spawn(task))) {
            warn!(
                scheduler = %self.name,
                seq,
                panic = %panic_message(payload.as_ref()),
                "spawner panicked"
            );
        }
    }

    /// Release the unit's slot, settle its handle, and keep the queue moving.
    fn complete(self: &Arc<Self>, seq: u64, settler: Settler<T, E>, outcome: Settlement<T, E>) {
        let ok = outcome.is_ok();
        let notify_now = {
            let mut state = self.state.lock();
            debug_assert!(state.active > 0, "completion without an active unit");
            state.active -= 1;
            if ok {
                state.succeeded += 1;
            } else {
                state.failed += 1;
            }
            self.record(Some(seq), AuditAction::Settled { ok });
            let drained = state.pending.is_empty() && state.active == 0;
            let mut notify_now = false;
            if drained {
                state.drains += 1;
                state.notifying += 1;
                self.record(None, AuditAction::Drained);
                if state.pumping {
                    state.deferred_drains += 1;
                } else {
                    notify_now = true;
                }
            }
            debug!(
                scheduler = %self.name,
                seq,
                ok,
                active = state.active,
                pending = state.pending.len(),
                "work unit settled"
            );
            notify_now
        };

        if !settler.settle(outcome) {
            debug!(scheduler = %self.name, seq, "result handle dropped before settlement");
        }

        if notify_now {
            self.notify_drained();
        }

        self.pump();
    }
}

/// Settles an admitted unit exactly once. If the unit's future is dropped
/// before it finishes, the unit settles as [`TaskError::Abandoned`] so its slot
/// is still released.
struct Completion<T, E, S>
where
    T: Send + 'static,
    E: Send + 'static,
    S: Spawn + Send + Sync + 'static,
{
    inner: Arc<Inner<T, E, S>>,
    seq: u64,
    settler: Option<Settler<T, E>>,
}

impl<T, E, S> Completion<T, E, S>
where
    T: Send + 'static,
    E: Send + 'static,
    S: Spawn + Send + Sync + 'static,
{
    fn finish(mut self, outcome: Settlement<T, E>) {
        if let Some(settler) = self.settler.take() {
            self.inner.complete(self.seq, settler, outcome);
        }
    }
}

impl<T, E, S> Drop for Completion<T, E, S>
where
    T: Send + 'static,
    E: Send + 'static,
    S: Spawn + Send + Sync + 'static,
{
    fn drop(&mut self) {
        if let Some(settler) = self.settler.take() {
            warn!(scheduler = %self.inner.name, seq = self.seq, "work unit dropped before settling");
            self.inner
                .complete(self.seq, settler, Err(TaskError::Abandoned));
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
