//! The access guard: identity, session validity, then role.

use std::sync::Arc;

use serde_json::json;
use tracing::{debug, warn};

use journal_core::events::SecurityEventKind;
use journal_entity::session::{Session, SessionToken};
use journal_entity::user::Identity;

use crate::audit::AuditLog;
use crate::session::SessionManager;

use super::decision::{Decision, DenyReason, RequiredRoles};

/// Admits or refuses requests by session validity and role.
///
/// Checks run in order and stop at the first failure:
/// 1. an identity is present,
/// 2. its session is valid,
/// 3. its role is among the required roles (when any are given).
///
/// Every decision is audited. A granted decision refreshes the session.
#[derive(Clone)]
pub struct AccessGuard {
    sessions: Arc<SessionManager>,
    audit: Arc<AuditLog>,
}

impl std::fmt::Debug for AccessGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessGuard").finish()
    }
}

impl AccessGuard {
    /// Creates a new access guard.
    pub fn new(sessions: Arc<SessionManager>, audit: Arc<AuditLog>) -> Self {
        Self { sessions, audit }
    }

    /// Decide access for an identity using its current session.
    pub async fn authorize(
        &self,
        identity: Option<&Identity>,
        required: impl Into<RequiredRoles>,
    ) -> Decision {
        let required = required.into();
        let Some(identity) = identity else {
            return self.deny_missing(&required).await;
        };

        let Some(session) = self.sessions.current(identity.id) else {
            return self.expired(identity, &required).await;
        };
        self.decide(&session, &required).await
    }

    /// Decide access for a presented session.
    pub async fn authorize_session(
        &self,
        session: Option<&Session>,
        required: impl Into<RequiredRoles>,
    ) -> Decision {
        let required = required.into();
        match session {
            Some(session) => self.decide(session, &required).await,
            None => self.deny_missing(&required).await,
        }
    }

    /// Decide access for a bearer token.
    pub async fn authorize_token(
        &self,
        token: &SessionToken,
        required: impl Into<RequiredRoles>,
    ) -> Decision {
        let required = required.into();
        match self.sessions.lookup_token(token) {
            Some(session) => self.decide(&session, &required).await,
            None => {
                debug!(token = %token, "Unknown bearer token");
                self.deny_missing(&required).await
            }
        }
    }

    async fn decide(&self, session: &Session, required: &RequiredRoles) -> Decision {
        let current = match self.sessions.ensure_valid(session).await {
            Ok(current) => current,
            Err(_) => return self.expired(&session.identity, required).await,
        };
        // The role comes from the stored session, never from the caller's copy.
        let identity = &current.identity;

        if !required.admits(identity.role) {
            let reason = DenyReason::InsufficientRole {
                required: required.clone(),
                actual: identity.role,
            };
            warn!(
                identity_id = %identity.id,
                role = %identity.role,
                required = %required,
                "Access denied"
            );
            self.record(Some(identity), required, &Decision::Denied(reason.clone()))
                .await;
            return Decision::Denied(reason);
        }

        if self.sessions.refresh(&current).await.is_err() {
            return self.expired(identity, required).await;
        }

        debug!(
            identity_id = %identity.id,
            role = %identity.role,
            required = %required,
            "Access granted"
        );
        self.record(Some(identity), required, &Decision::Granted).await;
        Decision::Granted
    }

    async fn deny_missing(&self, required: &RequiredRoles) -> Decision {
        let decision = Decision::Denied(DenyReason::MissingIdentity);
        warn!(required = %required, "Access denied without identity");
        self.record(None, required, &decision).await;
        decision
    }

    async fn expired(&self, identity: &Identity, required: &RequiredRoles) -> Decision {
        debug!(identity_id = %identity.id, "Access refused, session expired");
        self.record(Some(identity), required, &Decision::SessionExpired)
            .await;
        Decision::SessionExpired
    }

    async fn record(&self, identity: Option<&Identity>, required: &RequiredRoles, decision: &Decision) {
        let kind = if decision.is_granted() {
            SecurityEventKind::AccessGranted
        } else {
            SecurityEventKind::AccessDenied
        };
        let reason = match decision {
            Decision::Denied(reason) => Some(reason.code()),
            _ => None,
        };
        self.audit
            .record(
                kind,
                identity.map(|i| i.id),
                json!({
                    "decision": decision.code(),
                    "reason": reason,
                    "required_roles": required.names(),
                    "actual_role": identity.map(|i| i.role.as_str()),
                }),
            )
            .await;
    }
}
