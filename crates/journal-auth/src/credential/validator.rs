//! The login decision: input shape, lockout, secret policy, trust store.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tracing::{error, info, warn};

use journal_core::config::AuthConfig;
use journal_core::events::SecurityEventKind;
use journal_entity::user::{CredentialRecord, Identity, normalize_email};

use crate::audit::AuditLog;
use crate::error::AuthError;
use crate::lockout::{AttemptGuard, LockoutTracker};
use crate::password::{PasswordHasher, SecretPolicy};

use super::request::{IdentityCodeRule, LoginRequest};
use super::store::CredentialStore;

/// Authenticates login requests against a [`CredentialStore`].
///
/// Check order for one attempt:
///
/// 1. Input shape. Failures are rejected without touching the lockout
///    tracker or the store.
/// 2. Lockout. A locked key is refused and the attempt is counted, but
///    the store is never consulted.
/// 3. Secret policy. A weak secret is counted as a failed attempt.
/// 4. Store lookup, bounded by `auth.store_timeout_ms`. A timeout or store
///    error is reported as unavailable and is not counted.
/// 5. Record match and Argon2id verification. Unknown email, wrong code,
///    inactive record, and wrong secret all yield the same error.
///
/// Steps 2 to 5 run while holding the identity key, so concurrent
/// attempts for one key cannot interleave.
#[derive(Clone)]
pub struct CredentialValidator {
    /// Trust store.
    store: Arc<dyn CredentialStore>,
    /// Failure tracking.
    lockout: Arc<LockoutTracker>,
    /// Audit trail.
    audit: Arc<AuditLog>,
    /// Argon2id verification.
    hasher: Arc<PasswordHasher>,
    /// Secret strength rules.
    policy: SecretPolicy,
    /// Identity code shape.
    code_rule: IdentityCodeRule,
    /// Upper bound for one store lookup.
    store_timeout: Duration,
}

impl std::fmt::Debug for CredentialValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialValidator")
            .field("store", &self.store)
            .field("policy", &self.policy)
            .field("code_rule", &self.code_rule)
            .field("store_timeout", &self.store_timeout)
            .finish()
    }
}

impl CredentialValidator {
    /// Creates a new credential validator.
    pub fn new(
        store: Arc<dyn CredentialStore>,
        lockout: Arc<LockoutTracker>,
        audit: Arc<AuditLog>,
        hasher: Arc<PasswordHasher>,
        config: &AuthConfig,
    ) -> Self {
        Self {
            store,
            lockout,
            audit,
            hasher,
            policy: SecretPolicy::new(config),
            code_rule: IdentityCodeRule::new(config),
            store_timeout: Duration::from_millis(config.store_timeout_ms),
        }
    }

    /// The identity code rule in force.
    pub fn code_rule(&self) -> &IdentityCodeRule {
        &self.code_rule
    }

    /// Authenticate a login request.
    ///
    /// On success the identity's failure history is cleared and a fresh
    /// [`Identity`] is returned; issuing a session is left to the caller.
    pub async fn authenticate(&self, request: &LoginRequest) -> Result<Identity, AuthError> {
        if let Err(err) = request.check_shape(&self.code_rule) {
            self.audit
                .record(
                    SecurityEventKind::LoginRejected,
                    None,
                    json!({ "reason": err.to_string() }),
                )
                .await;
            return Err(err);
        }

        let identity_key = normalize_email(&request.email);
        let attempt = self.lockout.begin(&identity_key).await;

        let status = attempt
            .status()
            .await
            .map_err(|e| self.unavailable(&identity_key, "lockout_read", e))?;
        if status.locked {
            let status = attempt
                .record_failure()
                .await
                .map_err(|e| self.unavailable(&identity_key, "lockout_write", e))?;
            let remaining_seconds = status.remaining_seconds();

            warn!(
                identity_key = %identity_key,
                remaining_seconds,
                "Login refused for locked identity key"
            );
            self.audit
                .record(
                    SecurityEventKind::LoginBlocked,
                    None,
                    json!({
                        "identity_key": identity_key,
                        "remaining_seconds": remaining_seconds,
                    }),
                )
                .await;
            return Err(AuthError::Locked { remaining_seconds });
        }

        if self.policy.validate(&request.secret).is_err() {
            return Err(self
                .fail(&attempt, None, AuthError::WeakSecret, "weak_secret")
                .await);
        }

        let lookup = tokio::time::timeout(
            self.store_timeout,
            self.store.find_by_email(&request.email),
        )
        .await;

        let record = match lookup {
            Ok(Ok(record)) => record,
            Ok(Err(e)) => {
                let err = self.unavailable(&identity_key, "credential_store", e);
                self.audit_unavailable(&identity_key, "credential_store").await;
                return Err(err);
            }
            Err(elapsed) => {
                let err = self.unavailable(&identity_key, "credential_store_timeout", elapsed);
                self.audit_unavailable(&identity_key, "credential_store_timeout")
                    .await;
                return Err(err);
            }
        };

        match self.verify(record.as_ref(), request) {
            Ok(Some(record)) => {
                attempt
                    .record_success()
                    .await
                    .map_err(|e| self.unavailable(&identity_key, "lockout_write", e))?;

                let identity = record.to_identity();
                info!(
                    identity_id = %identity.id,
                    role = %identity.role,
                    "Authentication succeeded"
                );
                self.audit
                    .record(
                        SecurityEventKind::LoginSucceeded,
                        Some(identity.id),
                        json!({ "role": identity.role.as_str() }),
                    )
                    .await;
                Ok(identity)
            }
            Ok(None) => {
                let identity_id = record.as_ref().map(|r| r.identity_id);
                Err(self
                    .fail(
                        &attempt,
                        identity_id,
                        AuthError::InvalidCredentials,
                        "invalid_credentials",
                    )
                    .await)
            }
            Err(e) => {
                let err = self.unavailable(&identity_key, "password_verify", e);
                self.audit_unavailable(&identity_key, "password_verify").await;
                Err(err)
            }
        }
    }

    /// Returns the matching active record, or `None` for any mismatch.
    fn verify<'r>(
        &self,
        record: Option<&'r CredentialRecord>,
        request: &LoginRequest,
    ) -> Result<Option<&'r CredentialRecord>, journal_core::AppError> {
        match record {
            Some(record)
                if record.is_active && record.matches(&request.email, &request.identity_code) =>
            {
                if self
                    .hasher
                    .verify_password(&request.secret, &record.secret_hash)?
                {
                    Ok(Some(record))
                } else {
                    Ok(None)
                }
            }
            _ => {
                self.hasher.verify_dummy(&request.secret)?;
                Ok(None)
            }
        }
    }

    /// Count a failed attempt and audit it; returns `err` unless the
    /// lockout write itself failed.
    async fn fail(
        &self,
        attempt: &AttemptGuard<'_>,
        identity_id: Option<journal_core::types::IdentityId>,
        err: AuthError,
        reason: &str,
    ) -> AuthError {
        let identity_key = attempt.identity_key().to_string();
        let status = match attempt.record_failure().await {
            Ok(status) => status,
            Err(e) => return self.unavailable(&identity_key, "lockout_write", e),
        };

        warn!(
            identity_key = %identity_key,
            reason,
            failures_in_window = status.failures_in_window,
            locked = status.locked,
            "Authentication failed"
        );
        self.audit
            .record(
                SecurityEventKind::LoginFailed,
                identity_id,
                json!({
                    "identity_key": identity_key,
                    "reason": reason,
                    "failures_in_window": status.failures_in_window,
                    "locked": status.locked,
                }),
            )
            .await;
        err
    }

    fn unavailable(
        &self,
        identity_key: &str,
        component: &str,
        cause: impl std::fmt::Display,
    ) -> AuthError {
        error!(
            identity_key = %identity_key,
            component,
            error = %cause,
            "Authentication dependency failed"
        );
        AuthError::ServiceUnavailable
    }

    async fn audit_unavailable(&self, identity_key: &str, component: &str) {
        self.audit
            .record(
                SecurityEventKind::ServiceUnavailable,
                None,
                json!({
                    "identity_key": identity_key,
                    "component": component,
                }),
            )
            .await;
    }
}
