//! # journal-cache
//!
//! Key-value store implementations for the journal security core.
//! Supports two modes:
//!
//! - **memory**: In-process store using [moka](https://crates.io/crates/moka)
//! - **redis**: Redis-backed store using the [redis](https://crates.io/crates/redis) crate
//!
//! The provider is selected at runtime based on configuration. Both
//! implement an atomic per-key compare-and-swap, which the lockout
//! tracker depends on.

pub mod keys;
#[cfg(feature = "memory")]
pub mod memory;
pub mod provider;
#[cfg(feature = "redis-backend")]
pub mod redis;

pub use provider::StoreManager;
