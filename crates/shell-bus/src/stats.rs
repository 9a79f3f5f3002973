//! Delivery and request statistics exposed by the bus.

use std::sync::atomic::AtomicU64;

/// Counters tracking bus activity since construction.
///
/// All counters are monotonic and updated with relaxed ordering; they are
/// diagnostics, not synchronization points.
#[derive(Debug, Default)]
pub struct BusStats {
    /// Total `emit` calls.
    pub events_emitted: AtomicU64,
    /// Total listener invocations across all deliveries.
    pub deliveries: AtomicU64,
    /// Listener invocations that returned a failure (logged, not propagated).
    pub listener_failures: AtomicU64,
    /// Total `request` calls started.
    pub requests_started: AtomicU64,
    /// Requests that resolved with the handler's value.
    pub requests_completed: AtomicU64,
    /// Requests rejected with a timeout after all permitted attempts.
    pub requests_timed_out: AtomicU64,
    /// Requests rejected because of a missing or failing handler.
    pub requests_failed: AtomicU64,
    /// Handler registrations that overwrote an existing handler.
    pub handlers_replaced: AtomicU64,
}
