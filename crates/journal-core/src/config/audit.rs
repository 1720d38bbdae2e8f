//! Audit log configuration.

use serde::{Deserialize, Serialize};

/// Audit log configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Upper bound for a single sink write in milliseconds.
    #[serde(default = "default_write_timeout")]
    pub write_timeout_ms: u64,
    /// Number of recent events kept in memory for inspection.
    #[serde(default = "default_retain")]
    pub retain_in_memory: usize,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            write_timeout_ms: default_write_timeout(),
            retain_in_memory: default_retain(),
        }
    }
}

fn default_write_timeout() -> u64 {
    1000
}

fn default_retain() -> usize {
    10_000
}
