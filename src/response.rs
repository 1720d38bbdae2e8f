//! Host-facing login response.

use serde::{Deserialize, Serialize};

use journal_auth::AuthError;
use journal_entity::session::Session;
use journal_entity::user::Identity;

/// Outcome of a login attempt, shaped for a UI or HTTP host.
///
/// `error` is the user-facing message; `error_code` is stable for
/// programmatic handling and `remaining_seconds` drives a lockout
/// countdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// Whether the attempt succeeded.
    pub success: bool,
    /// The authenticated identity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity: Option<Identity>,
    /// User-facing error message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Machine-readable error code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    /// Seconds until a lock clears.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remaining_seconds: Option<u64>,
    /// Bearer token of the issued session.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_token: Option<String>,
}

impl From<Result<Session, AuthError>> for LoginResponse {
    fn from(result: Result<Session, AuthError>) -> Self {
        match result {
            Ok(session) => Self {
                success: true,
                session_token: Some(session.token.expose().to_string()),
                identity: Some(session.identity),
                error: None,
                error_code: None,
                remaining_seconds: None,
            },
            Err(err) => Self {
                success: false,
                identity: None,
                error: Some(err.to_string()),
                error_code: Some(err.code().to_string()),
                remaining_seconds: err.remaining_seconds(),
                session_token: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locked_response_shape() {
        let response = LoginResponse::from(Err(AuthError::Locked {
            remaining_seconds: 900,
        }));
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["success"], false);
        assert_eq!(json["errorCode"], "ACCOUNT_LOCKED");
        assert_eq!(json["remainingSeconds"], 900);
        assert!(json.get("identity").is_none());
        assert!(json.get("sessionToken").is_none());
    }
}
