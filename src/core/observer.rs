//! Drain notification observers.

/// Observer invoked when a scheduler drains: nothing pending, nothing active.
///
/// Called outside the scheduler's state lock, from the completion path of the
/// unit whose settlement emptied the scheduler. If that settlement happened while
/// admission was in progress, the call is made by the admitting thread after it
/// has released admission. Either way a slow observer never stops other
/// submissions from being admitted.
///
/// It fires once per drain event and never for a scheduler that has not
/// completed any work. It may submit more work. Panics are caught and logged.
pub trait DrainObserver: Send + Sync + 'static {
    /// React to the scheduler draining.
    fn on_drain(&self);
}

impl<F> DrainObserver for F
where
    F: Fn() + Send + Sync + 'static,
{
    fn on_drain(&self) {
        self();
    }
}

/// Default observer: logs the drain and does nothing else.
#[derive(Debug, Clone, Default)]
pub struct LogDrainObserver {
    name: String,
}

impl LogDrainObserver {
    /// Create a logging observer tagged with the scheduler name.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl DrainObserver for LogDrainObserver {
    fn on_drain(&self) {
        tracing::info!(scheduler = %self.name, "all submitted work has drained");
    }
}

/// Observer that ignores drain events.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopDrainObserver;

impl DrainObserver for NoopDrainObserver {
    fn on_drain(&self) {}
}
