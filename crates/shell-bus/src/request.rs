//! # Request/Response Engine
//!
//! Issues a request against the single handler registered for a topic,
//! awaits its result under a timeout, and retries with a fixed backoff on
//! timeout up to the configured bound.
//!
//! The retry sequence is an explicit loop, not timer recursion: each attempt
//! re-resolves the handler (it may have been replaced by a hot-reloaded
//! plugin since the previous attempt) and races it against a fresh timer.
//! Exactly one resolution occurs per call. Concurrent in-flight requests on
//! the same topic share no state.

use std::sync::atomic::Ordering;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, warn};

use shell_types::RequestError;

use crate::handler::HandlerRegistry;
use crate::scope::RoutingKey;
use crate::stats::BusStats;
use crate::{DEFAULT_RETRY_DELAY_MS, DEFAULT_TIMEOUT_MS};

/// Per-request tuning knobs.
///
/// Defaults: 5 s timeout per attempt, no retries, 1 s pause between
/// attempts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestOptions {
    /// How long one attempt may run before it counts as timed out.
    pub timeout: Duration,
    /// Additional attempts after the first one times out.
    pub retries: u32,
    /// Pause between a timed-out attempt and the next one.
    pub retry_delay: Duration,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            retries: 0,
            retry_delay: Duration::from_millis(DEFAULT_RETRY_DELAY_MS),
        }
    }
}

impl RequestOptions {
    /// Override the per-attempt timeout.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override the retry bound.
    #[must_use]
    pub fn retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    /// Override the pause between attempts.
    #[must_use]
    pub fn retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }
}

/// Run one request to completion.
pub(crate) async fn dispatch(
    handlers: &HandlerRegistry,
    stats: &BusStats,
    topic: &str,
    scoped: RoutingKey,
    bare: RoutingKey,
    payload: Value,
    options: RequestOptions,
) -> Result<Value, RequestError> {
    stats.requests_started.fetch_add(1, Ordering::Relaxed);
    let timeout_ms = options.timeout.as_millis() as u64;
    let mut attempts: u32 = 0;

    loop {
        attempts += 1;

        // Re-resolve every attempt; never cache the handler across retries.
        let Some(handler) = handlers.resolve(&scoped, &bare) else {
            // Structural absence: fail immediately, no timer started.
            stats.requests_failed.fetch_add(1, Ordering::Relaxed);
            debug!(topic, "Request with no registered handler");
            return Err(RequestError::NoHandler {
                topic: topic.to_string(),
            });
        };

        match tokio::time::timeout(options.timeout, handler(payload.clone())).await {
            Ok(Ok(value)) => {
                stats.requests_completed.fetch_add(1, Ordering::Relaxed);
                debug!(topic, attempts, "Request resolved");
                return Ok(value);
            }
            Ok(Err(failure)) => {
                // Handler failures are deterministic; never retried.
                stats.requests_failed.fetch_add(1, Ordering::Relaxed);
                warn!(topic, error = %failure, "Request handler failed");
                return Err(RequestError::Handler {
                    topic: topic.to_string(),
                    source: failure,
                });
            }
            Err(_elapsed) => {
                if attempts > options.retries {
                    stats.requests_timed_out.fetch_add(1, Ordering::Relaxed);
                    warn!(topic, timeout_ms, attempts, "Request timed out");
                    return Err(RequestError::Timeout {
                        topic: topic.to_string(),
                        timeout_ms,
                        attempts,
                    });
                }
                debug!(topic, attempt = attempts, "Attempt timed out; retrying");
                tokio::time::sleep(options.retry_delay).await;
            }
        }
    }
}
