//! Session management configuration.

use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Session timeout and persistence configuration.
///
/// Timeouts are inactivity timeouts: a session expires once its last
/// activity is older than the timeout for its role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Inactivity timeout for admins, in minutes.
    #[serde(default = "default_admin_timeout")]
    pub admin_timeout_minutes: i64,
    /// Inactivity timeout for teachers, in minutes.
    #[serde(default = "default_teacher_timeout")]
    pub teacher_timeout_minutes: i64,
    /// Inactivity timeout for students, in minutes.
    #[serde(default = "default_student_timeout")]
    pub student_timeout_minutes: i64,
    /// Interval of the optional background expiry check, in seconds.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_seconds: u64,
    /// Number of random bytes in a session token.
    #[serde(default = "default_token_bytes")]
    pub token_bytes: usize,
    /// Store key that holds the persisted current session.
    #[serde(default = "default_persistence_key")]
    pub persistence_key: String,
}

impl SessionConfig {
    /// Admin inactivity timeout.
    pub fn admin_timeout(&self) -> Duration {
        Duration::minutes(self.admin_timeout_minutes)
    }

    /// Teacher inactivity timeout.
    pub fn teacher_timeout(&self) -> Duration {
        Duration::minutes(self.teacher_timeout_minutes)
    }

    /// Student inactivity timeout.
    pub fn student_timeout(&self) -> Duration {
        Duration::minutes(self.student_timeout_minutes)
    }

    /// Poll interval for the expiry watcher.
    pub fn poll_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.poll_interval_seconds)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            admin_timeout_minutes: default_admin_timeout(),
            teacher_timeout_minutes: default_teacher_timeout(),
            student_timeout_minutes: default_student_timeout(),
            poll_interval_seconds: default_poll_interval(),
            token_bytes: default_token_bytes(),
            persistence_key: default_persistence_key(),
        }
    }
}

fn default_admin_timeout() -> i64 {
    15
}

fn default_teacher_timeout() -> i64 {
    30
}

fn default_student_timeout() -> i64 {
    120
}

fn default_poll_interval() -> u64 {
    60
}

fn default_token_bytes() -> usize {
    32
}

fn default_persistence_key() -> String {
    "current_session".to_string()
}
