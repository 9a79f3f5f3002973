//! # Shell Telemetry
//!
//! Structured logging setup shared by the Mosaic shell and its plugins.
//!
//! The bus crates only emit through the `tracing` facade; this crate is the
//! single place a subscriber is installed. Plugins never install their own.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use shell_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() {
//!     let config = TelemetryConfig::from_env();
//!     let _guard = init_telemetry(&config).expect("telemetry init");
//!     // Shell runs here; dropping the guard flushes on exit.
//! }
//! ```

mod config;
mod logging;

pub use config::TelemetryConfig;

use thiserror::Error;

/// Telemetry initialization errors.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The configured log filter did not parse.
    #[error("Invalid log filter '{filter}': {reason}")]
    InvalidFilter {
        /// The rejected filter string.
        filter: String,
        /// Parser diagnostic.
        reason: String,
    },

    /// A global subscriber was already installed.
    #[error("Failed to install subscriber: {0}")]
    SubscriberInit(String),
}

/// Install the logging subscriber described by `config`.
///
/// Returns a guard that should be held for the lifetime of the shell.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    logging::init_logging(config)?;
    tracing::info!(
        service = %config.service_name,
        log_level = %config.log_level,
        json_logs = config.json_logs,
        "Telemetry initialized"
    );
    Ok(TelemetryGuard { _private: () })
}

/// Guard that keeps telemetry active. Drop to flush on shutdown.
#[derive(Debug)]
pub struct TelemetryGuard {
    _private: (),
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!("Shutting down telemetry");
    }
}
