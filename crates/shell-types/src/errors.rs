//! # Error Types
//!
//! The error taxonomy shared between the bus and its collaborators.
//!
//! Only [`RequestError`] is ever surfaced to a caller; listener failures are
//! logged and swallowed by the publisher, and [`HandlerFailure`] reaches the
//! requester wrapped in [`RequestError::Handler`].

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Failure returned by a request handler.
///
/// Handlers describe their own failures; the bus wraps them unchanged so the
/// requester can inspect the original cause. Handler failures are assumed
/// deterministic and are never retried.
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct HandlerFailure {
    /// Human-readable failure description.
    pub message: String,
    /// Optional structured diagnostics supplied by the handler.
    pub data: Option<Value>,
}

impl HandlerFailure {
    /// Create a failure with a message only.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            data: None,
        }
    }

    /// Attach structured diagnostics.
    #[must_use]
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }
}

/// Failure returned by an event listener.
///
/// The publisher isolates these per listener: the failure is logged and
/// counted, delivery continues to the remaining listeners, and the emitter
/// never sees it.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ListenerError {
    /// Human-readable failure description.
    pub message: String,
}

impl ListenerError {
    /// Create a listener failure.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Errors a `request` call can reject with.
///
/// Collaborators are expected to treat [`RequestError::NoHandler`] as
/// "feature not currently loaded" (the answering plugin is absent) rather
/// than a hard failure.
#[derive(Debug, Error)]
pub enum RequestError {
    /// No handler registered at either the tenant-scoped or the unscoped
    /// routing key. Structural, not transient; never retried.
    #[error("no handler registered for topic '{topic}'")]
    NoHandler {
        /// The requested topic.
        topic: String,
    },

    /// The handler did not settle within the configured timeout across all
    /// permitted attempts.
    #[error("request on '{topic}' timed out after {timeout_ms}ms ({attempts} attempts)")]
    Timeout {
        /// The requested topic.
        topic: String,
        /// The configured per-attempt timeout.
        timeout_ms: u64,
        /// Total attempts made, including the first.
        attempts: u32,
    },

    /// The resolved handler itself failed. Wraps the handler's own error;
    /// never retried.
    #[error("handler for '{topic}' failed")]
    Handler {
        /// The requested topic.
        topic: String,
        /// The handler's own failure.
        #[source]
        source: HandlerFailure,
    },
}

impl RequestError {
    /// True if the rejection means "no plugin is answering this topic".
    #[must_use]
    pub fn is_no_handler(&self) -> bool {
        matches!(self, Self::NoHandler { .. })
    }
}
