//! Brute-force protection through per-identity lockout.

pub mod tracker;

pub use tracker::{AttemptGuard, LockoutStatus, LockoutTracker};
