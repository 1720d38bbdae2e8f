//! Credential record held by the trust store.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use journal_core::types::IdentityId;

use super::model::{Identity, normalize_email};
use super::role::Role;

/// A credential record in the trust store.
///
/// Read-only from the security core's perspective. An inactive record is
/// treated exactly like a missing one.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialRecord {
    /// The identity this credential belongs to.
    pub identity_id: IdentityId,
    /// Display name of the identity.
    pub name: String,
    /// Login email.
    pub email: String,
    /// Argon2id PHC hash of the secret.
    pub secret_hash: String,
    /// Identity code issued with the account (e.g. `T001`).
    pub identity_code: String,
    /// Assigned role.
    pub role: Role,
    /// Whether the account may authenticate.
    pub is_active: bool,
    /// Free-form permission grants.
    #[serde(default)]
    pub permissions: BTreeSet<String>,
    /// When the identity joined.
    pub joined_at: DateTime<Utc>,
}

impl CredentialRecord {
    /// The normalized email used for lookups and lockout tracking.
    pub fn identity_key(&self) -> String {
        normalize_email(&self.email)
    }

    /// Whether this record matches the presented email and identity code.
    ///
    /// Email comparison is case-insensitive; the identity code must match
    /// exactly.
    pub fn matches(&self, email: &str, identity_code: &str) -> bool {
        self.identity_key() == normalize_email(email) && self.identity_code == identity_code
    }

    /// Build the identity issued on successful authentication.
    pub fn to_identity(&self) -> Identity {
        Identity {
            id: self.identity_id,
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role,
            joined_at: self.joined_at,
        }
    }
}

impl fmt::Debug for CredentialRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialRecord")
            .field("identity_id", &self.identity_id)
            .field("email", &self.email)
            .field("identity_code", &self.identity_code)
            .field("role", &self.role)
            .field("is_active", &self.is_active)
            .field("permissions", &self.permissions)
            .finish_non_exhaustive()
    }
}
