//! Role-gated access decisions.

pub mod access;
pub mod decision;

pub use access::AccessGuard;
pub use decision::{Decision, DenyReason, RequiredRoles};
