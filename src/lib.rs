//! # journal-security
//!
//! Authentication and session-security core for the journal application.
//!
//! [`SecurityCore`] wires the audit log, lockout tracker, credential
//! validator, session manager, and access guard from `journal-auth`
//! around a shared key-value store and time source.

pub mod logging;
pub mod response;
pub mod security;

pub use crate::security::{SecurityCore, SecurityCoreBuilder};
pub use crate::logging::init_tracing;
pub use crate::response::LoginResponse;

pub use journal_auth::{AuthError, Decision, DenyReason, LoginRequest, RequiredRoles};
pub use journal_core::config::AppConfig;
