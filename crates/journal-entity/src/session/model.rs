//! Session entity model.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use journal_core::types::SessionId;

use super::token::SessionToken;
use crate::user::Identity;

/// A time-bounded authorization context.
///
/// Sessions are issued on login and discarded on logout, supersession by
/// a newer login, or inactivity expiry. `last_activity` advances on every
/// authorized access.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Unique session identifier.
    pub id: SessionId,
    /// The identity holding this session.
    pub identity: Identity,
    /// Bearer token handed to the client.
    pub token: SessionToken,
    /// When the session was issued.
    pub issued_at: DateTime<Utc>,
    /// Last authorized activity.
    pub last_activity: DateTime<Utc>,
}

impl Session {
    /// How long the session has been inactive at `now` (never negative).
    pub fn idle_for(&self, now: DateTime<Utc>) -> Duration {
        (now - self.last_activity).max(Duration::zero())
    }

    /// Whether the session has been idle longer than `timeout` at `now`.
    pub fn is_idle_beyond(&self, now: DateTime<Utc>, timeout: Duration) -> bool {
        self.idle_for(now) > timeout
    }

    /// When the session will expire if no further activity happens.
    pub fn expires_at(&self, timeout: Duration) -> DateTime<Utc> {
        self.last_activity + timeout
    }
}
