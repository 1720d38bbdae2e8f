//! Configuration schemas for the security core.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section. Every field has a default, so an empty configuration yields
//! the reference policy (3 failures / 60 min window / 15 min lockout,
//! 15/30/120 minute role timeouts).

pub mod audit;
pub mod auth;
pub mod cache;
pub mod lockout;
pub mod logging;
pub mod session;

use serde::{Deserialize, Serialize};

pub use self::audit::AuditConfig;
pub use self::auth::AuthConfig;
pub use self::cache::{MemoryStoreConfig, RedisStoreConfig, StoreConfig};
pub use self::lockout::LockoutConfig;
pub use self::logging::LoggingConfig;
pub use self::session::SessionConfig;

use crate::error::AppError;

/// Minimum number of random bytes accepted for a session token.
pub const MIN_TOKEN_BYTES: usize = 32;

/// Root configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Credential validation settings.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Brute-force lockout policy.
    #[serde(default)]
    pub lockout: LockoutConfig,
    /// Session timeout and persistence settings.
    #[serde(default)]
    pub session: SessionConfig,
    /// Audit log settings.
    #[serde(default)]
    pub audit: AuditConfig,
    /// Key-value store settings.
    #[serde(default)]
    pub store: StoreConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges the default configuration with an environment-specific overlay
    /// and environment variables prefixed with `JOURNAL__`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("JOURNAL")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let parsed: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;

        parsed.validate()?;
        Ok(parsed)
    }

    /// Load configuration from a single TOML string (used by hosts that
    /// embed their configuration and by tests).
    pub fn from_toml_str(source: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::from_str(source, config::FileFormat::Toml))
            .build()?;

        let parsed: Self = config.try_deserialize()?;
        parsed.validate()?;
        Ok(parsed)
    }

    /// Reject values that would disable the security policy.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.lockout.max_failed_attempts == 0 {
            return Err(AppError::configuration(
                "lockout.max_failed_attempts must be at least 1",
            ));
        }
        if self.lockout.window_minutes == 0 || self.lockout.lockout_duration_minutes == 0 {
            return Err(AppError::configuration(
                "lockout window and duration must be non-zero",
            ));
        }
        if self.lockout.retention_hours * 60 < self.lockout.window_minutes {
            return Err(AppError::configuration(
                "lockout.retention_hours must cover the failure window",
            ));
        }
        if self.session.admin_timeout_minutes == 0
            || self.session.teacher_timeout_minutes == 0
            || self.session.student_timeout_minutes == 0
        {
            return Err(AppError::configuration("session timeouts must be non-zero"));
        }
        if self.session.token_bytes < MIN_TOKEN_BYTES {
            return Err(AppError::configuration(format!(
                "session.token_bytes must be at least {MIN_TOKEN_BYTES}"
            )));
        }
        if self.auth.password_min_length == 0 {
            return Err(AppError::configuration(
                "auth.password_min_length must be non-zero",
            ));
        }
        Ok(())
    }
}
