//! # journal-core
//!
//! Core crate for the journal security core. Contains the trait seams
//! (key-value persistence and the time source),
//! configuration schemas, typed identifiers, security event kinds,
//! and the unified error system.
//!
//! This crate has **no** internal dependencies on other journal crates.

pub mod config;
pub mod error;
pub mod events;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
