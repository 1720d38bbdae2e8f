//! # journal-entity
//!
//! Domain value objects for the journal security core. Every struct in
//! this crate is a plain data record: identities, credential records,
//! sessions, lockout records, and audit events. All derive `Debug`,
//! `Clone`, `Serialize`, and `Deserialize`; the ones holding secrets
//! redact them from `Debug`.

pub mod audit;
pub mod lockout;
pub mod session;
pub mod user;
