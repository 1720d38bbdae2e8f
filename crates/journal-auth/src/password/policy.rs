//! Secret strength policy.

use thiserror::Error;

use journal_core::config::AuthConfig;

/// The first rule a secret failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SecretViolation {
    /// Too short.
    #[error("Password must be at least {0} characters long")]
    TooShort(usize),
    /// No uppercase letter.
    #[error("Password must contain at least one uppercase letter")]
    MissingUppercase,
    /// No lowercase letter.
    #[error("Password must contain at least one lowercase letter")]
    MissingLowercase,
    /// No digit.
    #[error("Password must contain at least one digit")]
    MissingDigit,
    /// No character from the symbol set.
    #[error("Password must contain at least one special character")]
    MissingSymbol,
}

/// Validates secret strength against configured rules.
#[derive(Debug, Clone)]
pub struct SecretPolicy {
    /// Minimum length in characters.
    min_length: usize,
    /// Characters accepted as symbols.
    symbols: Vec<char>,
}

impl SecretPolicy {
    /// Creates a new policy from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            min_length: config.password_min_length,
            symbols: config.password_symbols.chars().collect(),
        }
    }

    /// Checks a secret against every rule.
    ///
    /// Returns the first violation found.
    pub fn validate(&self, secret: &str) -> Result<(), SecretViolation> {
        if secret.chars().count() < self.min_length {
            return Err(SecretViolation::TooShort(self.min_length));
        }
        if !secret.chars().any(|c| c.is_uppercase()) {
            return Err(SecretViolation::MissingUppercase);
        }
        if !secret.chars().any(|c| c.is_lowercase()) {
            return Err(SecretViolation::MissingLowercase);
        }
        if !secret.chars().any(|c| c.is_ascii_digit()) {
            return Err(SecretViolation::MissingDigit);
        }
        if !secret.chars().any(|c| self.symbols.contains(&c)) {
            return Err(SecretViolation::MissingSymbol);
        }
        Ok(())
    }

    /// Whether the secret satisfies every rule.
    pub fn is_strong(&self, secret: &str) -> bool {
        self.validate(secret).is_ok()
    }
}

impl Default for SecretPolicy {
    fn default() -> Self {
        Self::new(&AuthConfig::default())
    }
}
