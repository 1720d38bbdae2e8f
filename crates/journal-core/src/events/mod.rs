//! Security event kinds recorded by the audit log.
//!
//! Every security-relevant action (login attempts, lockouts, session
//! lifecycle, access decisions) is classified by a [`SecurityEventKind`].
//! The payload details live with the event entity in `journal-entity`.

pub mod security;

pub use security::SecurityEventKind;
