//! Key builders for every entry the security core persists.
//!
//! Centralising key construction prevents typos and makes it easy
//! to find every key the core uses.

/// Prefix applied to all journal keys.
const PREFIX: &str = "journal";

// ── Lockout keys ───────────────────────────────────────────

/// Key for the lockout record of a normalized email.
pub fn lockout_record(identity_key: &str) -> String {
    format!("{PREFIX}:lockout:{}", identity_key.to_lowercase())
}

// ── Credential keys ────────────────────────────────────────

/// Key for a credential record by normalized email.
pub fn credential_by_email(email: &str) -> String {
    format!("{PREFIX}:credential:{}", email.trim().to_lowercase())
}

/// Key for the ordered list of registered identities.
pub fn registered_identities() -> String {
    format!("{PREFIX}:registered_identities")
}

// ── Session keys ───────────────────────────────────────────

/// Key for the persisted current-session record.
pub fn persisted_session(name: &str) -> String {
    format!("{PREFIX}:{name}")
}
