//! Destinations for audit events.

use async_trait::async_trait;
use tracing::info;

use journal_core::result::AppResult;
use journal_entity::audit::AuditEvent;

/// Receives every audit event the log appends.
///
/// Implementations route events to durable storage, a queue, or a
/// telemetry pipeline. A failed write is reported back to the
/// [`AuditLog`](super::AuditLog), which logs it and carries on.
#[async_trait]
pub trait AuditSink: Send + Sync + std::fmt::Debug + 'static {
    /// Persist one event.
    async fn write(&self, event: &AuditEvent) -> AppResult<()>;
}

/// Emits audit events as structured `tracing` events on the
/// `journal::audit` target.
#[derive(Debug, Clone, Default)]
pub struct TracingAuditSink;

impl TracingAuditSink {
    /// Creates a new tracing sink.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AuditSink for TracingAuditSink {
    async fn write(&self, event: &AuditEvent) -> AppResult<()> {
        let details = serde_json::Value::Object(event.details.clone());
        match event.identity_id {
            Some(identity_id) => info!(
                target: "journal::audit",
                event_id = %event.id,
                event_kind = %event.event_kind,
                timestamp = %event.timestamp.to_rfc3339(),
                identity_id = %identity_id,
                details = %details,
                "Security event"
            ),
            None => info!(
                target: "journal::audit",
                event_id = %event.id,
                event_kind = %event.event_kind,
                timestamp = %event.timestamp.to_rfc3339(),
                details = %details,
                "Security event"
            ),
        }
        Ok(())
    }
}
