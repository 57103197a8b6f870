//! Logging setup.
//!
//! Installs a global `tracing` subscriber driven by [`LoggingConfig`]:
//! an [`EnvFilter`] built from the configured level and either JSON or
//! pretty output.

use planner_config::{LogFormat, LoggingConfig};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::error::ServerError;

/// Builds the filter for a level directive such as `info` or
/// `planner_server=debug,warn`.
pub fn env_filter(level: &str) -> Result<EnvFilter, ServerError> {
    EnvFilter::try_new(level)
        .map_err(|e| ServerError::Telemetry(format!("invalid log level '{level}': {e}")))
}

/// Installs the global subscriber.
///
/// # Errors
///
/// Returns `ServerError::Telemetry` if the level does not parse or a
/// subscriber is already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<(), ServerError> {
    let filter = env_filter(&config.level)?;

    match config.format {
        LogFormat::Json => {
            let layer = tracing_subscriber::fmt::layer()
                .json()
                .with_target(true)
                .with_filter(filter);

            tracing_subscriber::registry()
                .with(layer)
                .try_init()
                .map_err(|e| ServerError::Telemetry(e.to_string()))
        }
        LogFormat::Pretty => {
            let layer = tracing_subscriber::fmt::layer()
                .pretty()
                .with_target(true)
                .with_filter(filter);

            tracing_subscriber::registry()
                .with(layer)
                .try_init()
                .map_err(|e| ServerError::Telemetry(e.to_string()))
        }
    }
}
