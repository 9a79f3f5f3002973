//! Telemetry configuration from environment variables.

use std::env;

/// Configuration for shell logging.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Service name stamped on the initialization log line.
    pub service_name: String,

    /// Log level filter (an `EnvFilter` directive string).
    pub log_level: String,

    /// Whether to emit JSON formatted logs (for log shippers).
    pub json_logs: bool,

    /// Whether to install a console subscriber at all. Embedders that bring
    /// their own subscriber set this to false.
    pub console_output: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "mosaic-shell".to_string(),
            log_level: "info".to_string(),
            json_logs: false,
            console_output: true,
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `SHELL_SERVICE_NAME`: service name (default: mosaic-shell)
    /// - `SHELL_LOG_LEVEL` or `RUST_LOG`: log filter (default: info)
    /// - `SHELL_JSON_LOGS`: enable JSON logs (default: false)
    /// - `SHELL_CONSOLE_OUTPUT`: install a console subscriber (default: true)
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            service_name: env::var("SHELL_SERVICE_NAME")
                .unwrap_or_else(|_| "mosaic-shell".to_string()),

            log_level: env::var("SHELL_LOG_LEVEL")
                .or_else(|_| env::var("RUST_LOG"))
                .unwrap_or_else(|_| "info".to_string()),

            json_logs: env::var("SHELL_JSON_LOGS")
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(false),

            console_output: env::var("SHELL_CONSOLE_OUTPUT")
                .map(|v| v.to_lowercase() != "false" && v != "0")
                .unwrap_or(true),
        }
    }
}
