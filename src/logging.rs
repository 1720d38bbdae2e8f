//! Tracing subscriber setup.

use tracing_subscriber::{EnvFilter, fmt};

use journal_core::config::LoggingConfig;
use journal_core::error::AppError;

/// Install the global tracing subscriber.
///
/// `RUST_LOG` overrides the configured level. Audit events are emitted on
/// the `journal::audit` target and can be filtered separately, e.g.
/// `RUST_LOG=info,journal::audit=off`.
pub fn init_tracing(config: &LoggingConfig) -> Result<(), AppError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let result = match config.format.as_str() {
        "json" => fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .with_thread_ids(true)
            .try_init(),
        "pretty" => fmt()
            .pretty()
            .with_env_filter(filter)
            .with_target(true)
            .try_init(),
        other => {
            return Err(AppError::configuration(format!(
                "Unknown logging format '{other}' (expected 'json' or 'pretty')"
            )));
        }
    };

    result.map_err(|e| AppError::internal(format!("Failed to install tracing subscriber: {e}")))
}
