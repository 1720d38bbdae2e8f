//! Append-only security audit trail.

pub mod log;
pub mod sink;

pub use log::AuditLog;
pub use sink::{AuditSink, TracingAuditSink};
