//! Login and registration inputs with shape validation.

use std::fmt;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

use journal_core::config::AuthConfig;
use journal_entity::user::Role;

use crate::error::AuthError;

/// Login request body: `{email, secret, identityCode}`.
#[derive(Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    /// Login email.
    #[validate(
        length(min = 1, message = "Email is required"),
        email(message = "Please enter a valid email address")
    )]
    pub email: String,
    /// Plaintext secret.
    #[validate(length(min = 1, message = "Password is required"))]
    pub secret: String,
    /// Identity code issued with the account.
    #[validate(length(min = 1, message = "Identity code is required"))]
    pub identity_code: String,
}

impl LoginRequest {
    /// Creates a login request.
    pub fn new(
        email: impl Into<String>,
        secret: impl Into<String>,
        identity_code: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            secret: secret.into(),
            identity_code: identity_code.into(),
        }
    }

    /// Reject malformed input before any identity is looked up.
    pub fn check_shape(&self, code_rule: &IdentityCodeRule) -> Result<(), AuthError> {
        self.validate()
            .map_err(|e| AuthError::Validation(first_message(&e, &["email", "secret", "identity_code"])))?;
        code_rule.check(&self.identity_code)
    }
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("identity_code", &self.identity_code)
            .finish_non_exhaustive()
    }
}

/// Registration request for a new identity.
#[derive(Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationRequest {
    /// Display name.
    #[validate(length(min = 1, max = 100, message = "Name is required"))]
    pub name: String,
    /// Login email.
    #[validate(
        length(min = 1, message = "Email is required"),
        email(message = "Please enter a valid email address")
    )]
    pub email: String,
    /// Plaintext secret.
    #[validate(length(min = 1, message = "Password is required"))]
    pub secret: String,
    /// Identity code issued with the account.
    #[validate(length(min = 1, message = "Identity code is required"))]
    pub identity_code: String,
    /// Role granted by the registering authority.
    pub role: Role,
}

impl RegistrationRequest {
    /// Reject malformed input.
    pub fn check_shape(&self, code_rule: &IdentityCodeRule) -> Result<(), AuthError> {
        self.validate().map_err(|e| {
            AuthError::Validation(first_message(
                &e,
                &["name", "email", "secret", "identity_code"],
            ))
        })?;
        code_rule.check(&self.identity_code)
    }
}

impl fmt::Debug for RegistrationRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistrationRequest")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("identity_code", &self.identity_code)
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}

/// Shape of an identity code: one role-class letter followed by a fixed
/// number of digits (e.g. `T001`).
///
/// The letter is a format check only; the role always comes from the
/// credential record.
#[derive(Debug, Clone)]
pub struct IdentityCodeRule {
    /// Accepted leading letters.
    prefixes: Vec<char>,
    /// Digits after the letter.
    digits: usize,
}

impl IdentityCodeRule {
    /// Creates the rule from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            prefixes: config.identity_code_prefixes.chars().collect(),
            digits: config.identity_code_digits,
        }
    }

    /// Whether the code has the expected shape.
    pub fn matches(&self, code: &str) -> bool {
        let mut chars = code.chars();
        match chars.next() {
            Some(first) if self.prefixes.contains(&first) => {
                let rest = chars.as_str();
                rest.len() == self.digits && rest.bytes().all(|b| b.is_ascii_digit())
            }
            _ => false,
        }
    }

    fn check(&self, code: &str) -> Result<(), AuthError> {
        if self.matches(code) {
            Ok(())
        } else {
            Err(AuthError::Validation(
                "Please enter a valid identity code".to_string(),
            ))
        }
    }
}

impl Default for IdentityCodeRule {
    fn default() -> Self {
        Self::new(&AuthConfig::default())
    }
}

/// Pick a deterministic message: missing fields first, in field order.
fn first_message(errors: &ValidationErrors, fields: &[&str]) -> String {
    let field_errors = errors.field_errors();

    for name in fields {
        if let Some(errs) = field_errors.get(*name) {
            if let Some(err) = errs.iter().find(|e| e.code == "length") {
                if let Some(message) = &err.message {
                    return message.to_string();
                }
            }
        }
    }

    for name in fields {
        if let Some(errs) = field_errors.get(*name) {
            if let Some(message) = errs.iter().find_map(|e| e.message.as_ref()) {
                return message.to_string();
            }
        }
    }

    "Invalid input".to_string()
}
