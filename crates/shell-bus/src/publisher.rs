//! # Publisher
//!
//! Synchronous fire-and-forget delivery. One `emit` call delivers, in order:
//!
//! 1. repeating listeners under the tenant-scoped key, then a drain of the
//!    once-listeners under that key (only when the scoped key differs from
//!    the bare topic);
//! 2. repeating listeners under the bare topic — the compatibility path,
//!    and the only path for global topics and untenanted emission;
//! 3. wildcard (`*`) listeners, with the full envelope, then a drain of the
//!    once-wildcard listeners;
//! 4. a drain of the once-listeners under the bare topic.
//!
//! A failing listener is logged and counted; it never aborts delivery to the
//! listeners after it and never reaches the emitter.

use std::sync::atomic::Ordering;

use tracing::{debug, warn};

use shell_types::EventEnvelope;

use crate::registry::{ListenerRegistry, RegisteredListener};
use crate::scope::RoutingKey;
use crate::stats::BusStats;
use crate::WILDCARD_TOPIC;

/// Deliver one event to every matching listener.
///
/// Returns the number of listeners invoked; zero listeners is a valid,
/// silent outcome.
pub(crate) fn deliver(
    registry: &ListenerRegistry,
    stats: &BusStats,
    scoped: &RoutingKey,
    bare: &RoutingKey,
    envelope: &EventEnvelope,
) -> usize {
    stats.events_emitted.fetch_add(1, Ordering::Relaxed);
    let wildcard = RoutingKey::bare(WILDCARD_TOPIC);
    let mut invoked = 0;

    if scoped != bare {
        invoked += invoke_all(registry.snapshot_repeating(scoped), envelope, stats);
        invoked += invoke_all(registry.drain_once(scoped), envelope, stats);
    }

    invoked += invoke_all(registry.snapshot_repeating(bare), envelope, stats);

    if *bare != wildcard {
        invoked += invoke_all(registry.snapshot_repeating(&wildcard), envelope, stats);
        invoked += invoke_all(registry.drain_once(&wildcard), envelope, stats);
    }

    invoked += invoke_all(registry.drain_once(bare), envelope, stats);

    if invoked == 0 {
        debug!(topic = %envelope.topic, "No listeners registered; event dropped");
    }
    invoked
}

/// Invoke a snapshot of listeners sequentially, isolating each failure.
fn invoke_all(
    listeners: Vec<RegisteredListener>,
    envelope: &EventEnvelope,
    stats: &BusStats,
) -> usize {
    let invoked = listeners.len();
    for listener in listeners {
        stats.deliveries.fetch_add(1, Ordering::Relaxed);
        if let Err(error) = (listener.callback)(envelope) {
            stats.listener_failures.fetch_add(1, Ordering::Relaxed);
            warn!(
                topic = %envelope.topic,
                token = %listener.token,
                error = %error,
                "Listener failed during delivery"
            );
        }
    }
    invoked
}
