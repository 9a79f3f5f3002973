//! # Listener Registry
//!
//! Holds repeating and one-shot subscriptions keyed by routing key.
//! Wildcard (`*`) listeners are ordinary entries stored under the wildcard
//! routing key.
//!
//! The routing key is computed at subscription time, from the tenant active
//! at that moment. A listener registered while tenant A is active keeps
//! receiving only tenant-A-scoped events after a tenant switch; if it wants
//! to follow the switch it must re-subscribe on the shell's tenant-change
//! notifications. That is documented behavior, owned by the shell, not a
//! registry concern.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, Weak};

use tracing::debug;
use uuid::Uuid;

use shell_types::{EventEnvelope, ListenerError};

use crate::scope::RoutingKey;

/// Callback invoked on delivery.
///
/// A returned error is logged and counted by the publisher; it never stops
/// delivery to the remaining listeners and never reaches the emitter.
pub type ListenerFn = dyn Fn(&EventEnvelope) -> Result<(), ListenerError> + Send + Sync;

/// Whether a subscription repeats or fires once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerKind {
    /// Fires on every matching delivery until unsubscribed.
    Repeating,
    /// Fires on the first matching delivery, then is removed.
    Once,
}

/// One registered listener.
#[derive(Clone)]
pub(crate) struct RegisteredListener {
    pub(crate) token: Uuid,
    pub(crate) callback: Arc<ListenerFn>,
}

#[derive(Default)]
pub(crate) struct ListenerTable {
    repeating: HashMap<RoutingKey, Vec<RegisteredListener>>,
    once: HashMap<RoutingKey, Vec<RegisteredListener>>,
}

impl ListenerTable {
    fn bucket_mut(&mut self, kind: ListenerKind) -> &mut HashMap<RoutingKey, Vec<RegisteredListener>> {
        match kind {
            ListenerKind::Repeating => &mut self.repeating,
            ListenerKind::Once => &mut self.once,
        }
    }

    /// Remove one listener by token. Idempotent: a missing token is a no-op.
    fn remove(&mut self, kind: ListenerKind, key: &RoutingKey, token: Uuid) {
        let bucket = self.bucket_mut(kind);
        if let Some(listeners) = bucket.get_mut(key) {
            listeners.retain(|listener| listener.token != token);
            if listeners.is_empty() {
                bucket.remove(key);
            }
        }
    }
}

/// Registry of all live subscriptions.
///
/// Delivery snapshots the listener vector under the read lock and releases
/// it before invoking callbacks, so subscribing or unsubscribing from inside
/// a callback is safe.
pub(crate) struct ListenerRegistry {
    table: Arc<RwLock<ListenerTable>>,
}

impl ListenerRegistry {
    pub(crate) fn new() -> Self {
        Self {
            table: Arc::new(RwLock::new(ListenerTable::default())),
        }
    }

    pub(crate) fn insert(
        &self,
        key: RoutingKey,
        kind: ListenerKind,
        callback: Arc<ListenerFn>,
    ) -> Subscription {
        let token = Uuid::new_v4();
        if let Ok(mut table) = self.table.write() {
            table
                .bucket_mut(kind)
                .entry(key.clone())
                .or_default()
                .push(RegisteredListener { token, callback });
        }
        debug!(routing_key = %key, token = %token, kind = ?kind, "Listener registered");
        Subscription {
            token,
            key,
            kind,
            table: Arc::downgrade(&self.table),
        }
    }

    /// Snapshot the repeating listeners under a key.
    pub(crate) fn snapshot_repeating(&self, key: &RoutingKey) -> Vec<RegisteredListener> {
        self.table
            .read()
            .map(|table| table.repeating.get(key).cloned().unwrap_or_default())
            .unwrap_or_default()
    }

    /// Remove and return every once-listener under a key.
    pub(crate) fn drain_once(&self, key: &RoutingKey) -> Vec<RegisteredListener> {
        self.table
            .write()
            .map(|mut table| table.once.remove(key).unwrap_or_default())
            .unwrap_or_default()
    }
}

/// Handle to one subscription.
///
/// Unsubscribing through the handle removes exactly the listener it was
/// created for; it is idempotent and remains a silent no-op after the bus
/// has been dropped. Dropping the handle does not unsubscribe — listener
/// lifetime is explicit.
pub struct Subscription {
    token: Uuid,
    key: RoutingKey,
    kind: ListenerKind,
    table: Weak<RwLock<ListenerTable>>,
}

impl Subscription {
    /// Remove this listener from the registry.
    ///
    /// Safe to call any number of times, from inside a delivery in progress,
    /// and after the bus itself is gone.
    pub fn unsubscribe(&self) {
        let Some(table) = self.table.upgrade() else {
            return;
        };
        let Ok(mut table) = table.write() else {
            return;
        };
        table.remove(self.kind, &self.key, self.token);
    }

    /// The routing key this subscription was stored under.
    #[must_use]
    pub fn routing_key(&self) -> &str {
        self.key.as_str()
    }

    /// Unique token identifying this subscription.
    #[must_use]
    pub fn token(&self) -> Uuid {
        self.token
    }
}
