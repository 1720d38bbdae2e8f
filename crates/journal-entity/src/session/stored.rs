//! Persisted form of the current session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use journal_core::types::{IdentityId, SessionId};

use super::model::Session;
use super::token::SessionToken;
use crate::user::{Identity, Role};

/// The single record a host keeps for the currently held session.
///
/// Layout: `{id, name, email, role, joinedAt, lastActivity, sessionToken}`
/// with ISO-8601 dates. Session-specific fields are optional so that a
/// partially written or legacy record still parses and is then rejected
/// by validation rather than by the parser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredSession {
    /// Identity ID.
    pub id: IdentityId,
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Role.
    pub role: Role,
    /// When the identity joined.
    pub joined_at: DateTime<Utc>,
    /// Last authorized activity.
    #[serde(default)]
    pub last_activity: Option<DateTime<Utc>>,
    /// Bearer token.
    #[serde(default)]
    pub session_token: Option<SessionToken>,
    /// Session ID.
    #[serde(default)]
    pub session_id: Option<SessionId>,
    /// When the session was issued.
    #[serde(default)]
    pub issued_at: Option<DateTime<Utc>>,
}

impl StoredSession {
    /// Rebuild the session, or `None` if a required field is missing.
    pub fn into_session(self) -> Option<Session> {
        let last_activity = self.last_activity?;
        let token = self.session_token.filter(|t| !t.is_empty())?;
        Some(Session {
            id: self.session_id.unwrap_or_default(),
            identity: Identity {
                id: self.id,
                name: self.name,
                email: self.email,
                role: self.role,
                joined_at: self.joined_at,
            },
            token,
            issued_at: self.issued_at.unwrap_or(last_activity),
            last_activity,
        })
    }
}

impl From<&Session> for StoredSession {
    fn from(session: &Session) -> Self {
        Self {
            id: session.identity.id,
            name: session.identity.name.clone(),
            email: session.identity.email.clone(),
            role: session.identity.role,
            joined_at: session.identity.joined_at,
            last_activity: Some(session.last_activity),
            session_token: Some(session.token.clone()),
            session_id: Some(session.id),
            issued_at: Some(session.issued_at),
        }
    }
}
