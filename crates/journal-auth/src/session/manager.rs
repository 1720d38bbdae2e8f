//! Session lifecycle manager: issue, validate, refresh, revoke, restore.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde_json::json;
use tracing::{debug, info, warn};

use journal_core::config::SessionConfig;
use journal_core::events::SecurityEventKind;
use journal_core::traits::Clock;
use journal_core::types::{IdentityId, SessionId};
use journal_entity::session::{Session, SessionToken};
use journal_entity::user::{Identity, Role};

use crate::audit::AuditLog;
use crate::error::AuthError;

use super::persistence::SessionPersistence;
use super::store::SessionStore;
use super::token::{generate_token, tokens_match};

/// Validity report for an identity's current session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStatus {
    /// Whether a fresh session is held.
    pub valid: bool,
    /// When the session expires without further activity.
    pub expires_at: Option<DateTime<Utc>>,
    /// Time left before expiry (zero when invalid).
    pub remaining: Duration,
}

impl SessionStatus {
    fn invalid() -> Self {
        Self {
            valid: false,
            expires_at: None,
            remaining: Duration::zero(),
        }
    }

    /// Remaining time in whole seconds, rounded down.
    pub fn remaining_seconds(&self) -> u64 {
        self.remaining.num_seconds().max(0) as u64
    }
}

/// Outcome of checking a presented session against the store.
enum Check {
    Valid(Session),
    Expired(Session),
    Unknown,
}

/// Manages the complete session lifecycle.
///
/// Exactly one session is active per identity: issuing a new one
/// supersedes the previous session. Staleness is always computed from the
/// stored `last_activity`, so expiry holds even if no background check
/// ever runs.
#[derive(Clone)]
pub struct SessionManager {
    /// Active sessions.
    store: Arc<SessionStore>,
    /// Time source.
    clock: Arc<dyn Clock>,
    /// Audit trail.
    audit: Arc<AuditLog>,
    /// Timeouts and token size.
    config: SessionConfig,
    /// Optional persisted copy of the current session.
    persistence: Option<SessionPersistence>,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("active_sessions", &self.store.len())
            .field("config", &self.config)
            .field("persistence", &self.persistence)
            .finish()
    }
}

impl SessionManager {
    /// Creates a new session manager.
    pub fn new(
        store: Arc<SessionStore>,
        clock: Arc<dyn Clock>,
        audit: Arc<AuditLog>,
        config: SessionConfig,
    ) -> Self {
        Self {
            store,
            clock,
            audit,
            config,
            persistence: None,
        }
    }

    /// Mirror the current session into `persistence`.
    pub fn with_persistence(mut self, persistence: SessionPersistence) -> Self {
        self.persistence = Some(persistence);
        self
    }

    /// Returns the session configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Inactivity timeout for a role.
    pub fn timeout_for(&self, role: Role) -> Duration {
        match role {
            Role::Admin => self.config.admin_timeout(),
            Role::Teacher => self.config.teacher_timeout(),
            Role::Student => self.config.student_timeout(),
        }
    }

    /// Issue a new session with a fresh token, superseding any prior
    /// session of the identity.
    pub async fn issue(&self, identity: Identity) -> Session {
        let now = self.clock.now();
        let session = Session {
            id: SessionId::new(),
            identity,
            token: generate_token(self.config.token_bytes),
            issued_at: now,
            last_activity: now,
        };
        let identity_id = session.identity.id;
        let role = session.identity.role;

        if let Some(previous) = self.store.insert(session.clone()) {
            info!(
                identity_id = %identity_id,
                previous_session_id = %previous.id,
                "Previous session superseded by new login"
            );
            self.audit
                .record(
                    SecurityEventKind::SessionSuperseded,
                    Some(identity_id),
                    json!({
                        "session_id": previous.id.to_string(),
                        "superseded_by": session.id.to_string(),
                    }),
                )
                .await;
        }

        info!(
            identity_id = %identity_id,
            session_id = %session.id,
            token = %session.token,
            role = %role,
            "Session issued"
        );
        self.audit
            .record(
                SecurityEventKind::SessionIssued,
                Some(identity_id),
                json!({
                    "session_id": session.id.to_string(),
                    "role": role.as_str(),
                    "timeout_seconds": self.timeout_for(role).num_seconds(),
                }),
            )
            .await;

        self.persist(&session).await;
        session
    }

    /// Whether a session's own timestamps are within its role's timeout.
    pub fn is_fresh(&self, session: &Session) -> bool {
        !session.token.is_empty()
            && !session.is_idle_beyond(self.clock.now(), self.timeout_for(session.identity.role))
    }

    /// Whether `session` is the identity's current session and has not
    /// been idle beyond its timeout. No side effects.
    pub fn validate(&self, session: &Session) -> bool {
        matches!(self.check(session), Check::Valid(_))
    }

    /// Validate and return the stored session, discarding it when it has
    /// gone stale.
    pub async fn ensure_valid(&self, session: &Session) -> Result<Session, AuthError> {
        match self.check(session) {
            Check::Valid(current) => Ok(current),
            Check::Expired(current) => {
                self.expire(&current).await;
                Err(AuthError::SessionExpired)
            }
            Check::Unknown => Err(AuthError::SessionExpired),
        }
    }

    /// Advance `last_activity` to now after re-validating.
    ///
    /// An invalid session is an error; the caller must treat it as a
    /// forced logout.
    pub async fn refresh(&self, session: &Session) -> Result<Session, AuthError> {
        let current = self.ensure_valid(session).await?;
        let now = self.clock.now();

        let refreshed = self
            .store
            .update_if_current(current.identity.id, &current.token, |s| {
                if now > s.last_activity {
                    s.last_activity = now;
                }
            })
            .ok_or(AuthError::SessionExpired)?;

        debug!(
            identity_id = %refreshed.identity.id,
            session_id = %refreshed.id,
            "Session activity refreshed"
        );
        self.persist(&refreshed).await;
        Ok(refreshed)
    }

    /// End the identity's session (logout).
    pub async fn revoke(&self, identity_id: IdentityId) -> Option<Session> {
        let session = self.store.remove(identity_id)?;
        self.unpersist(identity_id).await;

        info!(identity_id = %identity_id, session_id = %session.id, "Session revoked");
        self.audit
            .record(
                SecurityEventKind::Logout,
                Some(identity_id),
                json!({ "session_id": session.id.to_string() }),
            )
            .await;
        Some(session)
    }

    /// The identity's current session, without validation.
    pub fn current(&self, identity_id: IdentityId) -> Option<Session> {
        self.store.get(identity_id)
    }

    /// Resolve a bearer token to its session, without validation.
    pub fn lookup_token(&self, token: &SessionToken) -> Option<Session> {
        self.store.find_by_token(token)
    }

    /// Validity report for the identity's current session.
    pub fn status(&self, identity_id: IdentityId) -> SessionStatus {
        let Some(session) = self.store.get(identity_id) else {
            return SessionStatus::invalid();
        };
        if !self.is_fresh(&session) {
            return SessionStatus::invalid();
        }
        let timeout = self.timeout_for(session.identity.role);
        let expires_at = session.expires_at(timeout);
        SessionStatus {
            valid: true,
            expires_at: Some(expires_at),
            remaining: (expires_at - self.clock.now()).max(Duration::zero()),
        }
    }

    /// Discard every stale session. Returns the discarded sessions.
    pub async fn sweep_expired(&self) -> Vec<Session> {
        let mut expired = Vec::new();
        for session in self.store.all() {
            if !self.is_fresh(&session) && self.expire(&session).await {
                expired.push(session);
            }
        }
        expired
    }

    /// Reinstate the persisted session if it is still fresh.
    ///
    /// A stale, superseded, or unreadable record is discarded and the key
    /// cleared.
    pub async fn restore(&self) -> Option<Session> {
        let persistence = self.persistence.as_ref()?;
        let session = match persistence.load().await {
            Ok(session) => session?,
            Err(e) => {
                warn!(error = %e, "Failed to load persisted session");
                return None;
            }
        };

        if self.is_fresh(&session) {
            match self.store.get(session.identity.id) {
                None => {
                    self.store.insert(session.clone());
                    info!(
                        identity_id = %session.identity.id,
                        session_id = %session.id,
                        "Persisted session restored"
                    );
                    return Some(session);
                }
                Some(current) if tokens_match(&current.token, &session.token) => {
                    return Some(current);
                }
                Some(_) => {}
            }
        }

        if let Err(e) = persistence.clear().await {
            warn!(error = %e, "Failed to clear rejected persisted session");
        }
        info!(
            identity_id = %session.identity.id,
            session_id = %session.id,
            "Persisted session rejected"
        );
        self.audit
            .record(
                SecurityEventKind::SessionRestoreRejected,
                Some(session.identity.id),
                json!({ "session_id": session.id.to_string() }),
            )
            .await;
        None
    }

    fn check(&self, session: &Session) -> Check {
        if session.token.is_empty() {
            return Check::Unknown;
        }
        let Some(current) = self.store.get(session.identity.id) else {
            return Check::Unknown;
        };
        if !tokens_match(&current.token, &session.token) {
            return Check::Unknown;
        }
        if self.is_fresh(&current) {
            Check::Valid(current)
        } else {
            Check::Expired(current)
        }
    }

    /// Remove a stale session; returns whether this call removed it.
    async fn expire(&self, session: &Session) -> bool {
        let identity_id = session.identity.id;
        if self
            .store
            .remove_if_current(identity_id, &session.token)
            .is_none()
        {
            return false;
        }
        self.unpersist(identity_id).await;

        let now = self.clock.now();
        let timeout = self.timeout_for(session.identity.role);
        info!(
            identity_id = %identity_id,
            session_id = %session.id,
            idle_seconds = session.idle_for(now).num_seconds(),
            "Session expired after inactivity"
        );
        self.audit
            .record(
                SecurityEventKind::SessionExpired,
                Some(identity_id),
                json!({
                    "session_id": session.id.to_string(),
                    "role": session.identity.role.as_str(),
                    "idle_seconds": session.idle_for(now).num_seconds(),
                    "timeout_seconds": timeout.num_seconds(),
                }),
            )
            .await;
        true
    }

    async fn persist(&self, session: &Session) {
        if let Some(persistence) = &self.persistence {
            if let Err(e) = persistence.save(session).await {
                warn!(session_id = %session.id, error = %e, "Failed to persist session");
            }
        }
    }

    async fn unpersist(&self, identity_id: IdentityId) {
        if let Some(persistence) = &self.persistence {
            if let Err(e) = persistence.clear_for(identity_id).await {
                warn!(identity_id = %identity_id, error = %e, "Failed to clear persisted session");
            }
        }
    }
}
