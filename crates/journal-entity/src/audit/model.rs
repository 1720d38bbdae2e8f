//! Audit event entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use journal_core::events::SecurityEventKind;
use journal_core::types::{AuditEventId, IdentityId};

/// An immutable record of a security-relevant action.
///
/// Events are write-once: the audit log appends them and never mutates
/// or deletes them. Retention is the sink's responsibility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEvent {
    /// Unique event identifier.
    pub id: AuditEventId,
    /// When the event occurred.
    pub timestamp: DateTime<Utc>,
    /// What happened.
    pub event_kind: SecurityEventKind,
    /// The identity involved, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity_id: Option<IdentityId>,
    /// Structured details (never secrets).
    #[serde(default)]
    pub details: Map<String, Value>,
}

impl AuditEvent {
    /// Create an event with empty details.
    pub fn new(
        timestamp: DateTime<Utc>,
        event_kind: SecurityEventKind,
        identity_id: Option<IdentityId>,
    ) -> Self {
        Self {
            id: AuditEventId::new(),
            timestamp,
            event_kind,
            identity_id,
            details: Map::new(),
        }
    }

    /// Attach a detail field.
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }

    /// Read a detail field as a string.
    pub fn detail_str(&self, key: &str) -> Option<&str> {
        self.details.get(key).and_then(Value::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_and_wire_shape() {
        let event = AuditEvent::new(Utc::now(), SecurityEventKind::AccessDenied, None)
            .with_detail("required_roles", serde_json::json!(["teacher"]))
            .with_detail("actual_role", "student");

        assert_eq!(event.detail_str("actual_role"), Some("student"));

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["eventKind"], "access_denied");
        assert!(json.get("identityId").is_none());
        assert_eq!(json["details"]["required_roles"][0], "teacher");
    }
}
