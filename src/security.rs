//! The assembled security core.

use std::sync::Arc;

use tracing::info;

use journal_auth::audit::{AuditLog, AuditSink, TracingAuditSink};
use journal_auth::credential::{
    CredentialStore, CredentialValidator, KvCredentialStore, LoginRequest, Registrar,
    RegistrationRequest,
};
use journal_auth::error::AuthError;
use journal_auth::guard::{AccessGuard, Decision, RequiredRoles};
use journal_auth::lockout::{LockoutStatus, LockoutTracker};
use journal_auth::password::PasswordHasher;
use journal_auth::session::{
    SessionManager, SessionPersistence, SessionStatus, SessionStore, SessionWatcher, WatcherHandle,
};
use journal_cache::StoreManager;
use journal_core::config::AppConfig;
use journal_core::error::AppError;
use journal_core::traits::{Clock, KeyValueStore, SystemClock};
use journal_core::types::IdentityId;
use journal_entity::session::{Session, SessionToken};
use journal_entity::user::Identity;

use crate::response::LoginResponse;

/// All security components wired together around shared state.
///
/// Hosts consume three capabilities: attempt a login, check access for a
/// required role set, and report current session validity. Everything is
/// constructed once per process and shared by handle.
#[derive(Clone)]
pub struct SecurityCore {
    config: AppConfig,
    audit: Arc<AuditLog>,
    lockout: Arc<LockoutTracker>,
    validator: CredentialValidator,
    registrar: Registrar,
    sessions: Arc<SessionManager>,
    guard: AccessGuard,
}

impl std::fmt::Debug for SecurityCore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecurityCore")
            .field("validator", &self.validator)
            .field("sessions", &self.sessions)
            .finish()
    }
}

impl SecurityCore {
    /// Build a core from configuration with default collaborators.
    pub async fn from_config(config: AppConfig) -> Result<Self, AppError> {
        Self::builder(config).build().await
    }

    /// Start a builder for overriding collaborators.
    pub fn builder(config: AppConfig) -> SecurityCoreBuilder {
        SecurityCoreBuilder {
            config,
            clock: None,
            kv_store: None,
            credential_store: None,
            audit_sink: None,
            hasher: None,
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Returns the audit log.
    pub fn audit(&self) -> &Arc<AuditLog> {
        &self.audit
    }

    /// Returns the lockout tracker.
    pub fn lockout(&self) -> &Arc<LockoutTracker> {
        &self.lockout
    }

    /// Returns the session manager.
    pub fn sessions(&self) -> &Arc<SessionManager> {
        &self.sessions
    }

    /// Returns the access guard.
    pub fn guard(&self) -> &AccessGuard {
        &self.guard
    }

    /// Authenticate and issue a session.
    pub async fn login(&self, request: &LoginRequest) -> Result<Session, AuthError> {
        let identity = self.validator.authenticate(request).await?;
        Ok(self.sessions.issue(identity).await)
    }

    /// Authenticate and issue a session, shaped as a host response.
    pub async fn attempt_login(&self, request: &LoginRequest) -> LoginResponse {
        LoginResponse::from(self.login(request).await)
    }

    /// Register a new identity.
    pub async fn register(&self, request: &RegistrationRequest) -> Result<Identity, AuthError> {
        self.registrar.register(request).await
    }

    /// Decide access for an identity.
    pub async fn check_access(
        &self,
        identity: Option<&Identity>,
        required: impl Into<RequiredRoles>,
    ) -> Decision {
        self.guard.authorize(identity, required).await
    }

    /// Decide access for a bearer token.
    pub async fn check_token_access(
        &self,
        token: &SessionToken,
        required: impl Into<RequiredRoles>,
    ) -> Decision {
        self.guard.authorize_token(token, required).await
    }

    /// Report whether the identity holds a fresh session.
    pub fn session_validity(&self, identity_id: IdentityId) -> SessionStatus {
        self.sessions.status(identity_id)
    }

    /// Whether a presented session is current and fresh.
    pub fn validate_session(&self, session: &Session) -> bool {
        self.sessions.validate(session)
    }

    /// Lockout state for an email.
    pub async fn lockout_status(&self, email: &str) -> Result<LockoutStatus, AuthError> {
        self.lockout
            .status(email)
            .await
            .map_err(|_| AuthError::ServiceUnavailable)
    }

    /// End the identity's session. Returns whether one was active.
    pub async fn logout(&self, identity_id: IdentityId) -> bool {
        self.sessions.revoke(identity_id).await.is_some()
    }

    /// Reinstate the persisted session, if still fresh.
    pub async fn restore_session(&self) -> Option<Session> {
        self.sessions.restore().await
    }

    /// Start the background expiry watcher.
    pub fn spawn_watcher(&self) -> WatcherHandle {
        SessionWatcher::new(self.sessions.clone()).spawn()
    }

    /// Registered identities in registration order.
    pub async fn registered_identities(&self) -> Result<Vec<Identity>, AppError> {
        self.registrar.registered_identities().await
    }
}

/// Builder for [`SecurityCore`].
#[derive(Debug)]
pub struct SecurityCoreBuilder {
    config: AppConfig,
    clock: Option<Arc<dyn Clock>>,
    kv_store: Option<Arc<dyn KeyValueStore>>,
    credential_store: Option<Arc<dyn CredentialStore>>,
    audit_sink: Option<Arc<dyn AuditSink>>,
    hasher: Option<Arc<PasswordHasher>>,
}

impl SecurityCoreBuilder {
    /// Use a specific time source.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Use a specific key-value backend instead of `store.provider`.
    pub fn kv_store(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.kv_store = Some(store);
        self
    }

    /// Use a specific credential trust store.
    pub fn credential_store(mut self, store: Arc<dyn CredentialStore>) -> Self {
        self.credential_store = Some(store);
        self
    }

    /// Route audit events to a specific sink.
    pub fn audit_sink(mut self, sink: Arc<dyn AuditSink>) -> Self {
        self.audit_sink = Some(sink);
        self
    }

    /// Use a specific password hasher.
    pub fn hasher(mut self, hasher: Arc<PasswordHasher>) -> Self {
        self.hasher = Some(hasher);
        self
    }

    /// Validate configuration and wire every component.
    pub async fn build(self) -> Result<SecurityCore, AppError> {
        let config = self.config;
        config.validate()?;

        let clock = self
            .clock
            .unwrap_or_else(|| Arc::new(SystemClock) as Arc<dyn Clock>);
        let kv: Arc<dyn KeyValueStore> = match self.kv_store {
            Some(store) => store,
            None => Arc::new(StoreManager::new(&config.store).await?),
        };
        let credentials = self
            .credential_store
            .unwrap_or_else(|| {
                Arc::new(KvCredentialStore::new(kv.clone())) as Arc<dyn CredentialStore>
            });
        let sink = self
            .audit_sink
            .unwrap_or_else(|| Arc::new(TracingAuditSink::new()) as Arc<dyn AuditSink>);
        let hasher = match self.hasher {
            Some(hasher) => hasher,
            None => Arc::new(PasswordHasher::from_config(&config.auth)?),
        };

        let audit = Arc::new(AuditLog::new(sink, clock.clone(), &config.audit));
        let lockout = Arc::new(LockoutTracker::new(
            kv.clone(),
            clock.clone(),
            audit.clone(),
            config.lockout.clone(),
        ));
        let validator = CredentialValidator::new(
            credentials.clone(),
            lockout.clone(),
            audit.clone(),
            hasher.clone(),
            &config.auth,
        );
        let registrar = Registrar::new(
            credentials,
            kv.clone(),
            hasher,
            audit.clone(),
            clock.clone(),
            &config.auth,
        );
        let sessions = Arc::new(
            SessionManager::new(
                Arc::new(SessionStore::new()),
                clock,
                audit.clone(),
                config.session.clone(),
            )
            .with_persistence(SessionPersistence::new(kv, &config.session.persistence_key)),
        );
        let guard = AccessGuard::new(sessions.clone(), audit.clone());

        info!(
            store_provider = %config.store.provider,
            max_failed_attempts = config.lockout.max_failed_attempts,
            lockout_minutes = config.lockout.lockout_duration_minutes,
            "Security core initialized"
        );

        Ok(SecurityCore {
            config,
            audit,
            lockout,
            validator,
            registrar,
            sessions,
            guard,
        })
    }
}
