//! Brute-force lockout policy configuration.

use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Progressive lockout policy.
///
/// A key locks once `max_failed_attempts` failures fall inside the trailing
/// `window_minutes`. The lock lasts `lockout_duration_minutes` and is not
/// escalated on repeat offenses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockoutConfig {
    /// Failures within the window that trigger a lock.
    #[serde(default = "default_max_failed")]
    pub max_failed_attempts: u32,
    /// Trailing window for counting failures, in minutes.
    #[serde(default = "default_window")]
    pub window_minutes: i64,
    /// Lock duration in minutes.
    #[serde(default = "default_lockout")]
    pub lockout_duration_minutes: i64,
    /// Failure timestamps older than this are pruned on every write.
    #[serde(default = "default_retention")]
    pub retention_hours: i64,
    /// Maximum compare-and-swap retries before giving up on a contended key.
    #[serde(default = "default_cas_retries")]
    pub cas_max_retries: u32,
}

impl LockoutConfig {
    /// The trailing failure window.
    pub fn window(&self) -> Duration {
        Duration::minutes(self.window_minutes)
    }

    /// How long a lock lasts.
    pub fn lockout_duration(&self) -> Duration {
        Duration::minutes(self.lockout_duration_minutes)
    }

    /// How long failure timestamps are retained.
    pub fn retention(&self) -> Duration {
        Duration::hours(self.retention_hours)
    }
}

impl Default for LockoutConfig {
    fn default() -> Self {
        Self {
            max_failed_attempts: default_max_failed(),
            window_minutes: default_window(),
            lockout_duration_minutes: default_lockout(),
            retention_hours: default_retention(),
            cas_max_retries: default_cas_retries(),
        }
    }
}

fn default_max_failed() -> u32 {
    3
}

fn default_window() -> i64 {
    60
}

fn default_lockout() -> i64 {
    15
}

fn default_retention() -> i64 {
    24
}

fn default_cas_retries() -> u32 {
    8
}
