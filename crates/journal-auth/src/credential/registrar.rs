//! Registration of new identities.

use std::sync::Arc;

use serde_json::json;
use tracing::{debug, error, info};

use journal_cache::keys;
use journal_core::config::AuthConfig;
use journal_core::error::{AppError, ErrorKind};
use journal_core::events::SecurityEventKind;
use journal_core::result::AppResult;
use journal_core::traits::{Clock, KeyValueStore};
use journal_core::types::IdentityId;
use journal_entity::user::{CredentialRecord, Identity};

use crate::audit::AuditLog;
use crate::error::AuthError;
use crate::password::{PasswordHasher, SecretPolicy};

use super::request::{IdentityCodeRule, RegistrationRequest};
use super::store::CredentialStore;

/// Compare-and-swap attempts when appending to the registry list.
const REGISTRY_MAX_RETRIES: u32 = 8;

/// Creates credential records and keeps the ordered registry of
/// registered identities.
#[derive(Clone)]
pub struct Registrar {
    store: Arc<dyn CredentialStore>,
    kv: Arc<dyn KeyValueStore>,
    hasher: Arc<PasswordHasher>,
    audit: Arc<AuditLog>,
    clock: Arc<dyn Clock>,
    policy: SecretPolicy,
    code_rule: IdentityCodeRule,
}

impl std::fmt::Debug for Registrar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registrar")
            .field("store", &self.store)
            .field("policy", &self.policy)
            .finish()
    }
}

impl Registrar {
    /// Creates a new registrar.
    pub fn new(
        store: Arc<dyn CredentialStore>,
        kv: Arc<dyn KeyValueStore>,
        hasher: Arc<PasswordHasher>,
        audit: Arc<AuditLog>,
        clock: Arc<dyn Clock>,
        config: &AuthConfig,
    ) -> Self {
        Self {
            store,
            kv,
            hasher,
            audit,
            clock,
            policy: SecretPolicy::new(config),
            code_rule: IdentityCodeRule::new(config),
        }
    }

    /// Register a new active identity.
    ///
    /// Registration is not a login attempt: policy violations are reported
    /// with their specific message and nothing is counted by the lockout
    /// tracker.
    pub async fn register(&self, request: &RegistrationRequest) -> Result<Identity, AuthError> {
        request.check_shape(&self.code_rule)?;
        self.policy
            .validate(&request.secret)
            .map_err(|v| AuthError::Validation(v.to_string()))?;

        let existing = self
            .store
            .find_by_email(&request.email)
            .await
            .map_err(|e| unavailable("credential_store", e))?;
        if existing.is_some() {
            return Err(duplicate());
        }

        let secret_hash = self
            .hasher
            .hash_password(&request.secret)
            .map_err(|e| unavailable("password_hash", e))?;

        let record = CredentialRecord {
            identity_id: IdentityId::new(),
            name: request.name.trim().to_string(),
            email: request.email.trim().to_string(),
            secret_hash,
            identity_code: request.identity_code.clone(),
            role: request.role,
            is_active: true,
            permissions: Default::default(),
            joined_at: self.clock.now(),
        };
        let identity = record.to_identity();

        match self.store.insert(record).await {
            Ok(()) => {}
            Err(e) if e.kind == ErrorKind::Conflict => return Err(duplicate()),
            Err(e) => return Err(unavailable("credential_store", e)),
        }

        if let Err(e) = self.append_to_registry(&identity).await {
            error!(
                identity_id = %identity.id,
                error = %e,
                "Failed to append identity to registry list"
            );
        }

        info!(identity_id = %identity.id, role = %identity.role, "Identity registered");
        self.audit
            .record(
                SecurityEventKind::IdentityRegistered,
                Some(identity.id),
                json!({ "role": identity.role.as_str() }),
            )
            .await;

        Ok(identity)
    }

    /// Registered identities in registration order.
    pub async fn registered_identities(&self) -> AppResult<Vec<Identity>> {
        match self.kv.get(&keys::registered_identities()).await? {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(Vec::new()),
        }
    }

    async fn append_to_registry(&self, identity: &Identity) -> AppResult<()> {
        let key = keys::registered_identities();

        for attempt in 0..REGISTRY_MAX_RETRIES {
            let raw = self.kv.get(&key).await?;
            let mut list: Vec<Identity> = match raw.as_deref() {
                Some(json) => serde_json::from_str(json)?,
                None => Vec::new(),
            };
            list.push(identity.clone());
            let new = serde_json::to_string(&list)?;

            if self
                .kv
                .compare_and_swap(&key, raw.as_deref(), Some(&new), None)
                .await?
            {
                return Ok(());
            }
            debug!(attempt, "Registry list changed concurrently, retrying");
        }

        Err(AppError::conflict("Registry list kept changing"))
    }
}

fn duplicate() -> AuthError {
    AuthError::Validation("Email is already registered".to_string())
}

fn unavailable(component: &str, cause: AppError) -> AuthError {
    error!(component, error = %cause, "Registration dependency failed");
    AuthError::ServiceUnavailable
}
