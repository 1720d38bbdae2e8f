//! Credential validation configuration.

use serde::{Deserialize, Serialize};

/// Input-shape and secret-policy configuration for login attempts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Minimum secret length.
    #[serde(default = "default_password_min")]
    pub password_min_length: usize,
    /// Punctuation characters that satisfy the "symbol" requirement.
    #[serde(default = "default_password_symbols")]
    pub password_symbols: String,
    /// Letters accepted as the leading role-class character of an identity code.
    #[serde(default = "default_identity_code_prefixes")]
    pub identity_code_prefixes: String,
    /// Number of digits following the role-class letter.
    #[serde(default = "default_identity_code_digits")]
    pub identity_code_digits: usize,
    /// Upper bound for a single credential-store lookup in milliseconds.
    #[serde(default = "default_store_timeout")]
    pub store_timeout_ms: u64,
    /// Argon2id memory cost in KiB.
    #[serde(default = "default_hash_memory")]
    pub hash_memory_kib: u32,
    /// Argon2id iteration count.
    #[serde(default = "default_hash_iterations")]
    pub hash_iterations: u32,
    /// Argon2id lane count.
    #[serde(default = "default_hash_parallelism")]
    pub hash_parallelism: u32,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            password_min_length: default_password_min(),
            password_symbols: default_password_symbols(),
            identity_code_prefixes: default_identity_code_prefixes(),
            identity_code_digits: default_identity_code_digits(),
            store_timeout_ms: default_store_timeout(),
            hash_memory_kib: default_hash_memory(),
            hash_iterations: default_hash_iterations(),
            hash_parallelism: default_hash_parallelism(),
        }
    }
}

fn default_password_min() -> usize {
    8
}

fn default_password_symbols() -> String {
    "!@#$%^&*(),.?\":{}|<>".to_string()
}

fn default_identity_code_prefixes() -> String {
    "TAS".to_string()
}

fn default_identity_code_digits() -> usize {
    3
}

fn default_store_timeout() -> u64 {
    2000
}

fn default_hash_memory() -> u32 {
    19_456
}

fn default_hash_iterations() -> u32 {
    2
}

fn default_hash_parallelism() -> u32 {
    1
}
