//! Lockout record model.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Failure history and lock state for one identity key.
///
/// The key is the normalized email. Failure timestamps are kept in
/// ascending order. `locked_at` is set when the failure count inside the
/// trailing window reaches the threshold and is cleared only by expiry
/// or a successful authentication, together with the failure history.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockoutRecord {
    /// Normalized email.
    pub identity_key: String,
    /// Failed attempt timestamps, oldest first.
    #[serde(default)]
    pub failure_timestamps: Vec<DateTime<Utc>>,
    /// When the key was locked.
    #[serde(default)]
    pub locked_at: Option<DateTime<Utc>>,
}

impl LockoutRecord {
    /// Create an empty record.
    pub fn new(identity_key: impl Into<String>) -> Self {
        Self {
            identity_key: identity_key.into(),
            failure_timestamps: Vec::new(),
            locked_at: None,
        }
    }

    /// Drop failures older than `retention` before `now`.
    pub fn prune(&mut self, now: DateTime<Utc>, retention: Duration) {
        let cutoff = now - retention;
        self.failure_timestamps.retain(|ts| *ts > cutoff);
    }

    /// Number of failures inside the trailing `window` ending at `now`.
    pub fn failures_within(&self, now: DateTime<Utc>, window: Duration) -> usize {
        let cutoff = now - window;
        self.failure_timestamps
            .iter()
            .filter(|ts| **ts > cutoff && **ts <= now)
            .count()
    }

    /// Append a failure, keeping timestamps ordered.
    pub fn push_failure(&mut self, at: DateTime<Utc>) {
        let pos = self.failure_timestamps.partition_point(|ts| *ts <= at);
        self.failure_timestamps.insert(pos, at);
    }

    /// Whether the lock is still in force at `now`.
    pub fn is_locked_at(&self, now: DateTime<Utc>, duration: Duration) -> bool {
        match self.locked_at {
            Some(locked_at) => now - locked_at < duration,
            None => false,
        }
    }

    /// Whether a lock was set and has since run its course.
    pub fn lock_expired_at(&self, now: DateTime<Utc>, duration: Duration) -> bool {
        match self.locked_at {
            Some(locked_at) => now - locked_at >= duration,
            None => false,
        }
    }

    /// Time left on the lock at `now` (zero when unlocked).
    pub fn remaining_at(&self, now: DateTime<Utc>, duration: Duration) -> Duration {
        match self.locked_at {
            Some(locked_at) => (locked_at + duration - now).max(Duration::zero()),
            None => Duration::zero(),
        }
    }

    /// Whether the record carries no state worth persisting.
    pub fn is_empty(&self) -> bool {
        self.failure_timestamps.is_empty() && self.locked_at.is_none()
    }
}
