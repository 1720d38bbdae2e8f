//! Typed failures returned by the security components.
//!
//! The variants mirror what a caller has to do differently: fix the input,
//! wait out a lock, re-authenticate, retry later, or accept a denial.
//! Messages are safe to show to end users and never reveal which
//! credential field was wrong.

use thiserror::Error;

use journal_core::error::{AppError, ErrorKind};

/// Authentication and authorization failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Malformed input; never attributed to an account.
    #[error("{0}")]
    Validation(String),

    /// The secret does not satisfy the policy; counted as a failed attempt.
    #[error("Password does not meet the security requirements")]
    WeakSecret,

    /// The identity key is locked; counted as a failed attempt.
    #[error("Too many failed attempts. Try again in {}", format_countdown(*remaining_seconds))]
    Locked {
        /// Seconds until the lock clears.
        remaining_seconds: u64,
    },

    /// Unknown identity or wrong secret, deliberately indistinguishable.
    #[error("Invalid email, password, or identity code")]
    InvalidCredentials,

    /// A backing service failed or timed out; never attributed.
    #[error("Authentication service is temporarily unavailable")]
    ServiceUnavailable,

    /// The session exceeded its inactivity timeout or was never issued.
    #[error("Your session has expired. Please sign in again")]
    SessionExpired,

    /// The identity's role is not among the required roles.
    #[error("You do not have access to this resource")]
    InsufficientRole,
}

impl AuthError {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::WeakSecret => "WEAK_SECRET",
            Self::Locked { .. } => "ACCOUNT_LOCKED",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::ServiceUnavailable => "SERVICE_UNAVAILABLE",
            Self::SessionExpired => "SESSION_EXPIRED",
            Self::InsufficientRole => "INSUFFICIENT_ROLE",
        }
    }

    /// Whether the failure counts toward the lockout threshold.
    pub fn is_attributed(&self) -> bool {
        matches!(
            self,
            Self::WeakSecret | Self::Locked { .. } | Self::InvalidCredentials
        )
    }

    /// Seconds until a lock clears, for countdown displays.
    pub fn remaining_seconds(&self) -> Option<u64> {
        match self {
            Self::Locked { remaining_seconds } => Some(*remaining_seconds),
            _ => None,
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        let kind = match &err {
            AuthError::Validation(_) | AuthError::WeakSecret => ErrorKind::Validation,
            AuthError::Locked { .. } => ErrorKind::RateLimit,
            AuthError::InvalidCredentials => ErrorKind::Authentication,
            AuthError::ServiceUnavailable => ErrorKind::ServiceUnavailable,
            AuthError::SessionExpired => ErrorKind::Session,
            AuthError::InsufficientRole => ErrorKind::Authorization,
        };
        AppError::new(kind, err.to_string())
    }
}

/// Render seconds as `m:ss`.
fn format_countdown(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}
