//! # Controller Configuration
//!
//! Controller-level settings loaded from environment variables.

use std::time::Duration;

/// Controller-level configuration
///
/// All settings have defaults and can be overridden via environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerConfig {
    /// Deadline for one reconcile run (seconds)
    pub reconcile_timeout_secs: u64,
    /// Per-request timeout of b3scale API calls (seconds)
    pub api_timeout_secs: u64,
    /// First delay of the Fibonacci backoff after a retryable error (seconds)
    pub backoff_min_secs: u64,
    /// Upper bound of the Fibonacci backoff (seconds)
    pub backoff_max_secs: u64,
    /// Requeue after errors that need operator intervention (seconds)
    pub invalid_requeue_secs: u64,
    /// Requeue after a successful run, to pick up drift in b3scale (seconds)
    pub resync_interval_secs: u64,
    /// Port of the metrics and health server
    pub metrics_port: u16,
    /// Log format (json, text)
    pub log_format: String,
    /// URL scheme used to reach b3scale (https outside of tests)
    pub b3scale_scheme: String,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        use crate::constants::*;
        Self {
            reconcile_timeout_secs: DEFAULT_RECONCILE_TIMEOUT_SECS,
            api_timeout_secs: DEFAULT_API_TIMEOUT_SECS,
            backoff_min_secs: DEFAULT_BACKOFF_MIN_SECS,
            backoff_max_secs: DEFAULT_BACKOFF_MAX_SECS,
            invalid_requeue_secs: DEFAULT_INVALID_REQUEUE_SECS,
            resync_interval_secs: DEFAULT_RESYNC_INTERVAL_SECS,
            metrics_port: DEFAULT_METRICS_PORT,
            log_format: "json".to_string(),
            b3scale_scheme: "https".to_string(),
        }
    }
}

impl ControllerConfig {
    /// Load configuration from environment variables with defaults
    #[must_use]
    pub fn from_env() -> Self {
        use crate::constants::*;
        let config = Self {
            reconcile_timeout_secs: env_var_or_default(
                "RECONCILE_TIMEOUT_SECS",
                DEFAULT_RECONCILE_TIMEOUT_SECS,
            ),
            api_timeout_secs: env_var_or_default("API_TIMEOUT_SECS", DEFAULT_API_TIMEOUT_SECS),
            backoff_min_secs: env_var_or_default("BACKOFF_MIN_SECS", DEFAULT_BACKOFF_MIN_SECS),
            backoff_max_secs: env_var_or_default("BACKOFF_MAX_SECS", DEFAULT_BACKOFF_MAX_SECS),
            invalid_requeue_secs: env_var_or_default(
                "INVALID_REQUEUE_SECS",
                DEFAULT_INVALID_REQUEUE_SECS,
            ),
            resync_interval_secs: env_var_or_default(
                "RESYNC_INTERVAL_SECS",
                DEFAULT_RESYNC_INTERVAL_SECS,
            ),
            metrics_port: env_var_or_default("METRICS_PORT", DEFAULT_METRICS_PORT),
            log_format: env_var_or_default_str("LOG_FORMAT", "json"),
            b3scale_scheme: env_var_or_default_str("B3SCALE_SCHEME", "https"),
        };
        config.normalized()
    }

    /// Clamp values that would make the runtime misbehave
    fn normalized(mut self) -> Self {
        self.reconcile_timeout_secs = self.reconcile_timeout_secs.max(1);
        self.api_timeout_secs = self.api_timeout_secs.max(1);
        self.backoff_min_secs = self.backoff_min_secs.max(1);
        self.backoff_max_secs = self.backoff_max_secs.max(self.backoff_min_secs);
        self.resync_interval_secs = self.resync_interval_secs.max(1);
        self
    }

    pub fn reconcile_timeout(&self) -> Duration {
        Duration::from_secs(self.reconcile_timeout_secs)
    }

    pub fn api_timeout(&self) -> Duration {
        Duration::from_secs(self.api_timeout_secs)
    }

    pub fn invalid_requeue(&self) -> Duration {
        Duration::from_secs(self.invalid_requeue_secs)
    }

    pub fn resync_interval(&self) -> Duration {
        Duration::from_secs(self.resync_interval_secs)
    }
}

/// Read environment variable or return default value
fn env_var_or_default<T: std::str::FromStr>(key: &str, default: T) -> T
where
    <T as std::str::FromStr>::Err: std::fmt::Debug,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Read environment variable as string or return default
fn env_var_or_default_str(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}
