//! Opaque bearer token value.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An opaque, high-entropy session token.
///
/// Consumers never parse its contents; it is a bearer credential safe for
/// storage and for transmission in a request header. `Debug` and
/// `Display` only show a short fingerprint.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(String);

impl SessionToken {
    /// Wrap an already-encoded token string.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The raw token string, for handing to the client.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Whether the token carries no value.
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// A short prefix safe for logs.
    pub fn fingerprint(&self) -> String {
        let prefix: String = self.0.chars().take(8).collect();
        format!("{prefix}…")
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionToken({})", self.fingerprint())
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.fingerprint())
    }
}
