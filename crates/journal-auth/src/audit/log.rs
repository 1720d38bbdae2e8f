//! The audit log shared by every security component.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{error, warn};

use journal_core::config::AuditConfig;
use journal_core::events::SecurityEventKind;
use journal_core::traits::Clock;
use journal_core::types::IdentityId;
use journal_entity::audit::AuditEvent;

use super::sink::AuditSink;

/// Appends security events, stamps them with monotonically
/// non-decreasing timestamps, and forwards them to an [`AuditSink`].
///
/// Sink writes happen one at a time in timestamp order. A bounded ring of
/// the most recent events is kept in memory for inspection. Recording
/// never fails the caller: a sink error or a
/// write that exceeds the configured timeout is logged and dropped
/// from the sink, while the in-memory copy is retained.
pub struct AuditLog {
    /// Where events are written.
    sink: Arc<dyn AuditSink>,
    /// Time source.
    clock: Arc<dyn Clock>,
    /// Upper bound for one sink write.
    write_timeout: Duration,
    /// Maximum number of events retained in memory.
    capacity: usize,
    /// Held from timestamping until the sink write finishes.
    writer: Mutex<()>,
    /// Ring buffer and last issued timestamp.
    state: Mutex<AuditState>,
}

#[derive(Debug, Default)]
struct AuditState {
    events: VecDeque<AuditEvent>,
    last_timestamp: Option<DateTime<Utc>>,
}

impl std::fmt::Debug for AuditLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditLog")
            .field("sink", &self.sink)
            .field("write_timeout", &self.write_timeout)
            .field("capacity", &self.capacity)
            .finish()
    }
}

impl AuditLog {
    /// Creates a new audit log.
    pub fn new(sink: Arc<dyn AuditSink>, clock: Arc<dyn Clock>, config: &AuditConfig) -> Self {
        Self {
            sink,
            clock,
            write_timeout: Duration::from_millis(config.write_timeout_ms),
            capacity: config.retain_in_memory.max(1),
            writer: Mutex::new(()),
            state: Mutex::new(AuditState::default()),
        }
    }

    /// Record an event.
    ///
    /// `details` is expected to be a JSON object; any other value is
    /// stored under a single `value` key.
    pub async fn record(
        &self,
        kind: SecurityEventKind,
        identity_id: Option<IdentityId>,
        details: Value,
    ) -> AuditEvent {
        let _writer = self.writer.lock().await;
        let event = {
            let mut state = self.state.lock().await;

            let now = self.clock.now();
            let timestamp = match state.last_timestamp {
                Some(last) if last > now => last,
                _ => now,
            };
            state.last_timestamp = Some(timestamp);

            let mut event = AuditEvent::new(timestamp, kind, identity_id);
            match details {
                Value::Object(map) => event.details = map,
                Value::Null => {}
                other => {
                    event.details.insert("value".to_string(), other);
                }
            }

            if state.events.len() == self.capacity {
                state.events.pop_front();
            }
            state.events.push_back(event.clone());
            event
        };

        match tokio::time::timeout(self.write_timeout, self.sink.write(&event)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                error!(
                    event_id = %event.id,
                    event_kind = %event.event_kind,
                    error = %e,
                    "Failed to write audit event"
                );
            }
            Err(_) => {
                warn!(
                    event_id = %event.id,
                    event_kind = %event.event_kind,
                    timeout_ms = self.write_timeout.as_millis() as u64,
                    "Audit write timed out"
                );
            }
        }

        event
    }

    /// Retained events for one identity, oldest first.
    pub async fn events_for(&self, identity_id: IdentityId) -> Vec<AuditEvent> {
        let state = self.state.lock().await;
        state
            .events
            .iter()
            .filter(|e| e.identity_id == Some(identity_id))
            .cloned()
            .collect()
    }

    /// The `limit` most recent events, oldest first.
    pub async fn recent(&self, limit: usize) -> Vec<AuditEvent> {
        let state = self.state.lock().await;
        let skip = state.events.len().saturating_sub(limit);
        state.events.iter().skip(skip).cloned().collect()
    }

    /// Retained events of one kind, oldest first.
    pub async fn events_of_kind(&self, kind: SecurityEventKind) -> Vec<AuditEvent> {
        let state = self.state.lock().await;
        state
            .events
            .iter()
            .filter(|e| e.event_kind == kind)
            .cloned()
            .collect()
    }
}
