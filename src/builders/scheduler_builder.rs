//! Builder for [`Scheduler`] instances.

use std::sync::Arc;

use crate::config::SchedulerConfig;
use crate::core::{
    AuditSink, ConcurrencyLimit, DrainObserver, LogDrainObserver, NoopDrainObserver, Scheduler,
    SchedulerError, Spawn,
};

/// Builds a [`Scheduler`] from a [`SchedulerConfig`] plus optional observer and audit sink.
///
/// ```rust,ignore
/// let scheduler = SchedulerBuilder::new(SchedulerConfig::with_max_concurrency(5))
///     .with_drain_observer(|| tracing::info!("crawl finished"))
///     .build(TokioSpawner::current())?;
/// ```
pub struct SchedulerBuilder {
    config: SchedulerConfig,
    observer: Option<Arc<dyn DrainObserver>>,
    audit: Option<Box<dyn AuditSink>>,
}

impl SchedulerBuilder {
    /// Start from a configuration.
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            config,
            observer: None,
            audit: None,
        }
    }

    /// Start from defaults with the given concurrency limit.
    pub fn with_limit(limit: usize) -> Self {
        Self::new(SchedulerConfig::with_max_concurrency(limit))
    }

    /// Override the scheduler name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config.name = name.into();
        self
    }

    /// Install a drain observer, replacing the config-selected default.
    #[must_use]
    pub fn with_drain_observer(mut self, observer: impl DrainObserver) -> Self {
        self.observer = Some(Arc::new(observer));
        self
    }

    /// Attach an audit sink.
    #[must_use]
    pub fn with_audit(mut self, audit: impl AuditSink + 'static) -> Self {
        self.audit = Some(Box::new(audit));
        self
    }

    /// Configuration the scheduler will be built from.
    pub const fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Validate the configuration and build the scheduler.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::InvalidLimit`] for a zero limit and
    /// [`SchedulerError::InvalidConfig`] for any other invalid field.
    pub fn build<T, E, S>(self, spawner: S) -> Result<Scheduler<T, E, S>, SchedulerError>
    where
        T: Send + 'static,
        E: Send + 'static,
        S: Spawn + Send + Sync + 'static,
    {
        let limit = ConcurrencyLimit::new(self.config.max_concurrency)?;
        self.config.validate().map_err(SchedulerError::InvalidConfig)?;

        let observer: Arc<dyn DrainObserver> = match self.observer {
            Some(observer) => observer,
            None if self.config.log_drain => {
                Arc::new(LogDrainObserver::new(self.config.name.clone()))
            }
            None => Arc::new(NoopDrainObserver),
        };

        Ok(Scheduler::from_parts(
            self.config.name,
            limit,
            spawner,
            observer,
            self.audit,
        ))
    }
}
