//! Identity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use journal_core::types::IdentityId;

use super::role::Role;

/// An authenticated principal.
///
/// Constructed by the credential validator on successful authentication;
/// the role is copied from the credential record and never changes for
/// the lifetime of the identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    /// Stable identifier from the credential store.
    pub id: IdentityId,
    /// Display name.
    pub name: String,
    /// Email address as stored.
    pub email: String,
    /// Role assigned by the credential store.
    pub role: Role,
    /// When the identity joined.
    pub joined_at: DateTime<Utc>,
}

impl Identity {
    /// The lockout key for this identity (normalized email).
    pub fn identity_key(&self) -> String {
        normalize_email(&self.email)
    }
}

/// Normalize an email address into the case-insensitive identity key.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
