//! Console subscriber installation.

use tracing_subscriber::EnvFilter;

use crate::{TelemetryConfig, TelemetryError};

/// Install the fmt subscriber described by `config`.
///
/// The filter is validated even when `console_output` is off, so a broken
/// `SHELL_LOG_LEVEL` fails loudly instead of silently logging nothing.
pub(crate) fn init_logging(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let filter =
        EnvFilter::try_new(&config.log_level).map_err(|e| TelemetryError::InvalidFilter {
            filter: config.log_level.clone(),
            reason: e.to_string(),
        })?;

    if !config.console_output {
        return Ok(());
    }

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    let result = if config.json_logs {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    result.map_err(|e| TelemetryError::SubscriberInit(e.to_string()))
}
