//! Access decisions and required-role sets.

use std::collections::BTreeSet;
use std::fmt;

use journal_entity::user::Role;

use crate::error::AuthError;

/// Roles admitted by an access check. Empty admits any authenticated
/// identity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequiredRoles(BTreeSet<Role>);

impl RequiredRoles {
    /// Admit any authenticated identity.
    pub fn any() -> Self {
        Self::default()
    }

    /// Whether no role restriction applies.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether `role` is admitted.
    pub fn admits(&self, role: Role) -> bool {
        self.0.is_empty() || self.0.contains(&role)
    }

    /// Role names, for audit details.
    pub fn names(&self) -> Vec<&'static str> {
        self.0.iter().map(Role::as_str).collect()
    }
}

impl From<Role> for RequiredRoles {
    fn from(role: Role) -> Self {
        Self(BTreeSet::from([role]))
    }
}

impl<const N: usize> From<[Role; N]> for RequiredRoles {
    fn from(roles: [Role; N]) -> Self {
        Self(BTreeSet::from(roles))
    }
}

impl From<BTreeSet<Role>> for RequiredRoles {
    fn from(roles: BTreeSet<Role>) -> Self {
        Self(roles)
    }
}

impl FromIterator<Role> for RequiredRoles {
    fn from_iter<I: IntoIterator<Item = Role>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for RequiredRoles {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("any");
        }
        f.write_str(&self.names().join("|"))
    }
}

/// Why access was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DenyReason {
    /// No identity was presented.
    MissingIdentity,
    /// The identity's role is not among the required roles.
    InsufficientRole {
        /// Roles that would have been admitted.
        required: RequiredRoles,
        /// The identity's role.
        actual: Role,
    },
}

impl DenyReason {
    /// Stable reason code for audit details.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingIdentity => "missing_identity",
            Self::InsufficientRole { .. } => "insufficient_role",
        }
    }
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingIdentity => f.write_str("no authenticated identity"),
            Self::InsufficientRole { required, actual } => {
                write!(f, "role '{actual}' is not in required roles '{required}'")
            }
        }
    }
}

/// Result of an access check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Access admitted; the session was refreshed.
    Granted,
    /// Access refused permanently for this identity.
    Denied(DenyReason),
    /// The session is gone or stale; the caller must re-authenticate.
    SessionExpired,
}

impl Decision {
    /// Whether access was granted.
    pub fn is_granted(&self) -> bool {
        matches!(self, Self::Granted)
    }

    /// Stable decision code for audit details.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Granted => "granted",
            Self::Denied(_) => "denied",
            Self::SessionExpired => "session_expired",
        }
    }

    /// Convert into the error taxonomy. A missing identity maps to
    /// `SessionExpired` since the remedy is signing in.
    pub fn into_result(self) -> Result<(), AuthError> {
        match self {
            Self::Granted => Ok(()),
            Self::Denied(DenyReason::InsufficientRole { .. }) => Err(AuthError::InsufficientRole),
            Self::Denied(DenyReason::MissingIdentity) | Self::SessionExpired => {
                Err(AuthError::SessionExpired)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_roles_conversions() {
        let single: RequiredRoles = Role::Teacher.into();
        assert!(single.admits(Role::Teacher));
        assert!(!single.admits(Role::Student));

        let pair: RequiredRoles = [Role::Teacher, Role::Admin].into();
        assert!(pair.admits(Role::Admin));
        assert_eq!(pair.to_string(), "teacher|admin");

        let any = RequiredRoles::any();
        assert!(Role::ALL.iter().all(|r| any.admits(*r)));
        assert_eq!(any.to_string(), "any");

        let collected: RequiredRoles = Role::ALL.into_iter().filter(|r| r.is_privileged()).collect();
        assert_eq!(collected, pair);
    }

    #[test]
    fn test_decision_into_result() {
        assert!(Decision::Granted.into_result().is_ok());
        assert_eq!(
            Decision::SessionExpired.into_result(),
            Err(AuthError::SessionExpired)
        );
        assert_eq!(
            Decision::Denied(DenyReason::InsufficientRole {
                required: Role::Admin.into(),
                actual: Role::Student,
            })
            .into_result(),
            Err(AuthError::InsufficientRole)
        );
    }
}
