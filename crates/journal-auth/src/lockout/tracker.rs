//! Lockout tracker backed by a [`KeyValueStore`].
//!
//! Records are stored as JSON under `journal:lockout:{identity_key}` and
//! updated through compare-and-swap so that several processes sharing a
//! Redis backend cannot both slip past the threshold. Inside one process
//! a per-key async mutex serializes the whole check-then-record sequence
//! of a login attempt.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use serde_json::json;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, info, warn};

use journal_cache::keys;
use journal_core::config::LockoutConfig;
use journal_core::error::AppError;
use journal_core::events::SecurityEventKind;
use journal_core::result::AppResult;
use journal_core::traits::{Clock, KeyValueStore};
use journal_entity::lockout::LockoutRecord;
use journal_entity::user::normalize_email;

use crate::audit::AuditLog;

/// Snapshot of one identity key's lockout state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockoutStatus {
    /// Normalized email.
    pub identity_key: String,
    /// Whether attempts are currently refused.
    pub locked: bool,
    /// Failures inside the trailing window.
    pub failures_in_window: usize,
    /// Time until the lock clears (zero when unlocked).
    pub remaining: Duration,
    /// Whether this observation is the one that set the lock.
    pub newly_locked: bool,
}

impl LockoutStatus {
    /// Remaining lock time in whole seconds, rounded up.
    pub fn remaining_seconds(&self) -> u64 {
        let millis = self.remaining.num_milliseconds().max(0) as u64;
        millis.div_ceil(1000)
    }
}

/// Tracks failed attempts and lock windows per identity key.
pub struct LockoutTracker {
    /// Backing store for lockout records.
    store: Arc<dyn KeyValueStore>,
    /// Time source.
    clock: Arc<dyn Clock>,
    /// Audit trail for lock transitions.
    audit: Arc<AuditLog>,
    /// Threshold and window settings.
    config: LockoutConfig,
    /// In-process per-key mutexes.
    key_locks: DashMap<String, Arc<Mutex<()>>>,
}

impl std::fmt::Debug for LockoutTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LockoutTracker")
            .field("config", &self.config)
            .field("active_keys", &self.key_locks.len())
            .finish()
    }
}

impl LockoutTracker {
    /// Creates a new lockout tracker.
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        audit: Arc<AuditLog>,
        config: LockoutConfig,
    ) -> Self {
        Self {
            store,
            clock,
            audit,
            config,
            key_locks: DashMap::new(),
        }
    }

    /// Returns the lockout configuration.
    pub fn config(&self) -> &LockoutConfig {
        &self.config
    }

    /// Take exclusive ownership of an identity key for one attempt.
    ///
    /// Every read and write made through the returned guard is serialized
    /// against other attempts for the same key in this process.
    pub async fn begin(&self, identity_key: &str) -> AttemptGuard<'_> {
        let key = normalize_email(identity_key);
        let mutex = self
            .key_locks
            .entry(key.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let guard = mutex.clone().lock_owned().await;

        AttemptGuard {
            tracker: self,
            key,
            mutex,
            guard: Some(guard),
        }
    }

    /// Record the outcome of an attempt.
    pub async fn record_attempt(&self, identity_key: &str, success: bool) -> AppResult<LockoutStatus> {
        let attempt = self.begin(identity_key).await;
        if success {
            attempt.record_success().await
        } else {
            attempt.record_failure().await
        }
    }

    /// Whether the key is locked now. An expired lock is cleared together
    /// with the failure history as a side effect.
    pub async fn is_locked(&self, identity_key: &str) -> AppResult<bool> {
        let attempt = self.begin(identity_key).await;
        Ok(attempt.status().await?.locked)
    }

    /// Time until the lock on the key clears (zero when unlocked).
    pub async fn remaining_lockout(&self, identity_key: &str) -> AppResult<Duration> {
        let attempt = self.begin(identity_key).await;
        Ok(attempt.status().await?.remaining)
    }

    /// Full lockout snapshot for the key.
    pub async fn status(&self, identity_key: &str) -> AppResult<LockoutStatus> {
        let attempt = self.begin(identity_key).await;
        attempt.status().await
    }

    fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    fn snapshot(&self, record: &LockoutRecord, now: DateTime<Utc>, newly_locked: bool) -> LockoutStatus {
        let duration = self.config.lockout_duration();
        LockoutStatus {
            identity_key: record.identity_key.clone(),
            locked: record.is_locked_at(now, duration),
            failures_in_window: record.failures_within(now, self.config.window()),
            remaining: record.remaining_at(now, duration),
            newly_locked,
        }
    }

    /// Read the raw and parsed record. Unparsable data counts as empty.
    async fn load(&self, key: &str) -> AppResult<(Option<String>, LockoutRecord)> {
        let raw = self.store.get(&keys::lockout_record(key)).await?;
        let record = match raw.as_deref() {
            Some(json) => match serde_json::from_str::<LockoutRecord>(json) {
                Ok(record) => record,
                Err(e) => {
                    warn!(
                        identity_key = %key,
                        error = %e,
                        "Discarding unreadable lockout record"
                    );
                    LockoutRecord::new(key)
                }
            },
            None => LockoutRecord::new(key),
        };
        Ok((raw, record))
    }

    /// Apply `mutate` to the stored record with compare-and-swap retries.
    async fn update<T>(
        &self,
        key: &str,
        mut mutate: impl FnMut(&mut LockoutRecord, DateTime<Utc>) -> T,
    ) -> AppResult<(LockoutRecord, T)> {
        let store_key = keys::lockout_record(key);
        let ttl = self.config.retention().to_std().ok();

        for attempt in 0..=self.config.cas_max_retries {
            let (raw, mut record) = self.load(key).await?;
            let now = self.now();
            let output = mutate(&mut record, now);

            let new_value = if record.is_empty() {
                None
            } else {
                Some(serde_json::to_string(&record)?)
            };

            let swapped = self
                .store
                .compare_and_swap(&store_key, raw.as_deref(), new_value.as_deref(), ttl)
                .await?;

            if swapped {
                return Ok((record, output));
            }

            debug!(identity_key = %key, attempt, "Lockout record changed concurrently, retrying");
        }

        Err(AppError::conflict(format!(
            "Lockout record for '{key}' kept changing; gave up after {} retries",
            self.config.cas_max_retries
        )))
    }
}

/// Exclusive handle on one identity key for the duration of a login attempt.
///
/// Dropping the guard releases the key.
pub struct AttemptGuard<'a> {
    tracker: &'a LockoutTracker,
    key: String,
    mutex: Arc<Mutex<()>>,
    guard: Option<OwnedMutexGuard<()>>,
}

impl std::fmt::Debug for AttemptGuard<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttemptGuard")
            .field("identity_key", &self.key)
            .finish()
    }
}

impl AttemptGuard<'_> {
    /// The normalized identity key.
    pub fn identity_key(&self) -> &str {
        &self.key
    }

    /// Current lockout state, clearing an expired lock.
    pub async fn status(&self) -> AppResult<LockoutStatus> {
        let tracker = self.tracker;
        let duration = tracker.config.lockout_duration();
        let (_, record) = tracker.load(&self.key).await?;
        let now = tracker.now();

        if !record.lock_expired_at(now, duration) {
            return Ok(tracker.snapshot(&record, now, false));
        }

        let (record, locked_at) = tracker
            .update(&self.key, |record, now| {
                if record.lock_expired_at(now, duration) {
                    let locked_at = record.locked_at;
                    *record = LockoutRecord::new(record.identity_key.clone());
                    locked_at
                } else {
                    None
                }
            })
            .await?;

        if let Some(locked_at) = locked_at {
            info!(identity_key = %self.key, "Lockout expired, failure history cleared");
            tracker
                .audit
                .record(
                    SecurityEventKind::LockoutExpired,
                    None,
                    json!({
                        "identity_key": self.key,
                        "locked_at": locked_at.to_rfc3339(),
                    }),
                )
                .await;
        }

        Ok(tracker.snapshot(&record, tracker.now(), false))
    }

    /// Whether the key is locked now.
    pub async fn is_locked(&self) -> AppResult<bool> {
        Ok(self.status().await?.locked)
    }

    /// Record a failed attempt, locking the key when the threshold is
    /// reached. Failures while already locked do not move the lock.
    pub async fn record_failure(&self) -> AppResult<LockoutStatus> {
        let tracker = self.tracker;
        let config = &tracker.config;
        let threshold = config.max_failed_attempts as usize;
        let window = config.window();
        let duration = config.lockout_duration();
        let retention = config.retention();

        let (record, (newly_locked, now)) = tracker
            .update(&self.key, |record, now| {
                if record.lock_expired_at(now, duration) {
                    *record = LockoutRecord::new(record.identity_key.clone());
                }
                record.prune(now, retention);
                record.push_failure(now);

                let newly_locked = !record.is_locked_at(now, duration)
                    && record.failures_within(now, window) >= threshold;
                if newly_locked {
                    record.locked_at = Some(now);
                }
                (newly_locked, now)
            })
            .await?;

        let status = tracker.snapshot(&record, now, newly_locked);

        if newly_locked {
            warn!(
                identity_key = %self.key,
                failures = status.failures_in_window,
                lockout_seconds = duration.num_seconds(),
                "Identity key locked after repeated failures"
            );
            tracker
                .audit
                .record(
                    SecurityEventKind::AccountLocked,
                    None,
                    json!({
                        "identity_key": self.key,
                        "failures_in_window": status.failures_in_window,
                        "lockout_seconds": duration.num_seconds(),
                    }),
                )
                .await;
        } else {
            debug!(
                identity_key = %self.key,
                failures = status.failures_in_window,
                locked = status.locked,
                "Failed attempt recorded"
            );
        }

        Ok(status)
    }

    /// Record a successful attempt, clearing failures and lock together.
    pub async fn record_success(&self) -> AppResult<LockoutStatus> {
        let tracker = self.tracker;
        tracker.store.delete(&keys::lockout_record(&self.key)).await?;
        let record = LockoutRecord::new(self.key.clone());
        Ok(tracker.snapshot(&record, tracker.now(), false))
    }
}

impl Drop for AttemptGuard<'_> {
    fn drop(&mut self) {
        self.guard.take();
        // Only the map and this guard hold the mutex: nobody is waiting.
        self.tracker
            .key_locks
            .remove_if(&self.key, |_, mutex| Arc::ptr_eq(mutex, &self.mutex) && Arc::strong_count(mutex) == 2);
    }
}
