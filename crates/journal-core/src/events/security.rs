//! Security event classification.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of a security event.
///
/// Serialized as the snake_case string that audit sinks receive in the
/// `eventKind` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecurityEventKind {
    /// Credentials were accepted.
    LoginSucceeded,
    /// Credentials were rejected (unknown identity, wrong or weak secret).
    LoginFailed,
    /// A login was attempted while the identity key was locked.
    LoginBlocked,
    /// A login request was rejected for malformed input.
    LoginRejected,
    /// The failure threshold was reached and the key was locked.
    AccountLocked,
    /// A lock expired and the failure history was discarded.
    LockoutExpired,
    /// A session token was issued.
    SessionIssued,
    /// A newer login replaced the identity's previous session.
    SessionSuperseded,
    /// A session was discarded because it exceeded its inactivity timeout.
    SessionExpired,
    /// The identity logged out.
    Logout,
    /// A persisted session could not be restored.
    SessionRestoreRejected,
    /// An access check admitted the request.
    AccessGranted,
    /// An access check refused the request.
    AccessDenied,
    /// A new identity was registered.
    IdentityRegistered,
    /// A backing service (credential store, key-value store) failed.
    ServiceUnavailable,
}

impl SecurityEventKind {
    /// Return the kind as its wire string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LoginSucceeded => "login_succeeded",
            Self::LoginFailed => "login_failed",
            Self::LoginBlocked => "login_blocked",
            Self::LoginRejected => "login_rejected",
            Self::AccountLocked => "account_locked",
            Self::LockoutExpired => "lockout_expired",
            Self::SessionIssued => "session_issued",
            Self::SessionSuperseded => "session_superseded",
            Self::SessionExpired => "session_expired",
            Self::Logout => "logout",
            Self::SessionRestoreRejected => "session_restore_rejected",
            Self::AccessGranted => "access_granted",
            Self::AccessDenied => "access_denied",
            Self::IdentityRegistered => "identity_registered",
            Self::ServiceUnavailable => "service_unavailable",
        }
    }

    /// Whether this kind records a refused or failed operation.
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Self::LoginFailed
                | Self::LoginBlocked
                | Self::LoginRejected
                | Self::AccountLocked
                | Self::SessionExpired
                | Self::SessionRestoreRejected
                | Self::AccessDenied
                | Self::ServiceUnavailable
        )
    }
}

impl fmt::Display for SecurityEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
