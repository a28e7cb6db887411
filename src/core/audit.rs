//! Audit sink implementations.
//!
//! Records the lifecycle of every submission (submit, admit, settle) and every
//! drain event, in the order the scheduler's critical sections observed them.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::util::clock::now_ms;

/// Lifecycle step recorded by the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditAction {
    /// Unit appended to the pending list.
    Submitted,
    /// Unit admitted; `active` is the active count after the increment.
    Admitted {
        /// Active count right after admission.
        active: usize,
    },
    /// Unit settled; `ok` is false for failures and panics.
    Settled {
        /// Whether the unit produced a value.
        ok: bool,
    },
    /// Pending list and active count both reached zero.
    Drained,
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Submitted => write!(f, "submit"),
            Self::Admitted { active } => write!(f, "admit(active={active})"),
            Self::Settled { ok: true } => write!(f, "settle(ok)"),
            Self::Settled { ok: false } => write!(f, "settle(err)"),
            Self::Drained => write!(f, "drain"),
        }
    }
}

/// Audit event structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEvent {
    /// Submission sequence number; `None` for scheduler-wide events.
    pub seq: Option<u64>,
    /// Scheduler name.
    pub scheduler: String,
    /// Action taken.
    pub action: AuditAction,
    /// Timestamp milliseconds.
    pub created_at_ms: u128,
}

/// Audit sink abstraction.
///
/// `record` is called while the scheduler holds its state lock, which keeps
/// events in transition order. It must not call back into the scheduler
/// (`submit`, `stats`, `is_idle`, ...): the lock is not reentrant and the call
/// deadlocks. Keep it short; forward to a channel if persisting is slow. A
/// panicking sink loses that one event and the scheduler carries on.
pub trait AuditSink: Send {
    /// Record an audit event.
    fn record(&mut self, event: AuditEvent);
}

/// In-memory audit sink for testing and dev.
///
/// Clones share one bounded buffer, so a test can keep a clone and inspect
/// what the scheduler recorded after handing the sink over.
#[derive(Clone)]
pub struct InMemoryAuditSink {
    events: Arc<Mutex<VecDeque<AuditEvent>>>,
    max_events: usize,
}

impl InMemoryAuditSink {
    /// Create a new in-memory sink with a bounded buffer.
    pub fn new(max_events: usize) -> Self {
        Self {
            events: Arc::new(Mutex::new(VecDeque::with_capacity(max_events.min(4096)))),
            max_events,
        }
    }

    /// Retrieve a snapshot of stored events.
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.lock().iter().cloned().collect()
    }

    /// Sequence numbers in the order they were admitted.
    pub fn admission_order(&self) -> Vec<u64> {
        self.events
            .lock()
            .iter()
            .filter(|e| matches!(e.action, AuditAction::Admitted { .. }))
            .filter_map(|e| e.seq)
            .collect()
    }

    /// Highest active count observed at admission time.
    pub fn peak_active(&self) -> usize {
        self.events
            .lock()
            .iter()
            .filter_map(|e| match e.action {
                AuditAction::Admitted { active } => Some(active),
                _ => None,
            })
            .max()
            .unwrap_or(0)
    }

    /// Number of recorded events matching `pred`.
    pub fn count(&self, pred: impl Fn(&AuditAction) -> bool) -> usize {
        self.events.lock().iter().filter(|e| pred(&e.action)).count()
    }
}

impl AuditSink for InMemoryAuditSink {
    fn record(&mut self, event: AuditEvent) {
        if self.max_events == 0 {
            return;
        }
        let mut events = self.events.lock();
        if events.len() >= self.max_events {
            events.pop_front();
        }
        events.push_back(event);
    }
}

/// Sink that forwards events to `tracing` at trace level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&mut self, event: AuditEvent) {
        tracing::trace!(
            scheduler = %event.scheduler,
            seq = ?event.seq,
            action = %event.action,
            at_ms = %event.created_at_ms,
            "audit"
        );
    }
}

/// Helper to build an audit event from context.
pub fn build_audit_event(
    seq: Option<u64>,
    scheduler: impl Into<String>,
    action: AuditAction,
) -> AuditEvent {
    AuditEvent {
        seq,
        scheduler: scheduler.into(),
        action,
        created_at_ms: now_ms(),
    }
}
