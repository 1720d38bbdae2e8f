//! # journal-auth
//!
//! Authentication and session security for the journal application.
//!
//! ## Modules
//!
//! - `audit`: Append-only audit log and sinks
//! - `lockout`: Per-identity failure tracking and lock windows
//! - `password`: Argon2id hashing and secret strength policy
//! - `credential`: Login validation, trust stores, and registration
//! - `session`: Session issue, validation, refresh, persistence, and expiry
//! - `guard`: Role-gated access decisions
//! - `error`: Typed authentication failures

pub mod audit;
pub mod credential;
pub mod error;
pub mod guard;
pub mod lockout;
pub mod password;
pub mod session;

pub use audit::{AuditLog, AuditSink, TracingAuditSink};
pub use credential::{
    CredentialStore, CredentialValidator, KvCredentialStore, LoginRequest, MemoryCredentialStore,
    RegistrationRequest, Registrar,
};
pub use error::AuthError;
pub use guard::{AccessGuard, Decision, DenyReason, RequiredRoles};
pub use lockout::{LockoutStatus, LockoutTracker};
pub use password::{PasswordHasher, SecretPolicy};
pub use session::{SessionManager, SessionPersistence, SessionStatus, SessionStore, SessionWatcher};
