//! Scheduler configuration structures.

use std::env;

use serde::{Deserialize, Serialize};

/// Environment variable naming the scheduler.
pub const ENV_NAME: &str = "WORK_QUEUE_NAME";
/// Environment variable holding the concurrency limit.
pub const ENV_MAX_CONCURRENCY: &str = "WORK_QUEUE_MAX_CONCURRENCY";
/// Environment variable toggling the logging drain observer.
pub const ENV_LOG_DRAIN: &str = "WORK_QUEUE_LOG_DRAIN";

/// Scheduler configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Name used in logs and audit events.
    pub name: String,
    /// Maximum number of work units in flight at once.
    pub max_concurrency: usize,
    /// Install the logging drain observer when no other observer is given.
    pub log_drain: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            name: "work-queue".into(),
            max_concurrency: num_cpus::get(),
            log_drain: true,
        }
    }
}

impl SchedulerConfig {
    /// Config with the given concurrency limit and defaults elsewhere.
    pub fn with_max_concurrency(max_concurrency: usize) -> Self {
        Self {
            max_concurrency,
            ..Self::default()
        }
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid field.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_concurrency == 0 {
            return Err("max_concurrency must be greater than 0".into());
        }
        if self.name.trim().is_empty() {
            return Err("name must not be empty".into());
        }
        Ok(())
    }

    /// Parse scheduler configuration from a JSON string and validate.
    ///
    /// # Errors
    ///
    /// Returns a description of the parse or validation failure.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Build configuration from the process environment, loading a `.env`
    /// file first if one exists. Unset variables keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns a description of the first unparsable or invalid value.
    pub fn from_env() -> Result<Self, String> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns a description of the first unparsable or invalid value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        if let Some(name) = lookup(ENV_NAME) {
            cfg.name = name;
        }
        if let Some(raw) = lookup(ENV_MAX_CONCURRENCY) {
            cfg.max_concurrency = raw
                .trim()
                .parse()
                .map_err(|e| format!("{ENV_MAX_CONCURRENCY}={raw:?}: {e}"))?;
        }
        if let Some(raw) = lookup(ENV_LOG_DRAIN) {
            cfg.log_drain = parse_bool(&raw)
                .ok_or_else(|| format!("{ENV_LOG_DRAIN}={raw:?}: expected a boolean"))?;
        }
        cfg.validate()?;
        Ok(cfg)
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
