//! # Handler Registry
//!
//! At most one request handler per routing key. Registering a second handler
//! for the same key replaces the first and logs a warning — hot-reloading
//! plugins re-register their handlers routinely, so this is last-write-wins
//! by design, not an error.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::Ordering;
use std::sync::{Arc, RwLock, Weak};

use serde_json::Value;
use tracing::{debug, warn};
use uuid::Uuid;

use shell_types::HandlerFailure;

use crate::scope::RoutingKey;
use crate::stats::BusStats;

/// Future returned by a request handler.
pub type HandlerFuture = Pin<Box<dyn Future<Output = Result<Value, HandlerFailure>> + Send>>;

/// A registered request handler.
///
/// Receives the request payload and settles with a value or a
/// [`HandlerFailure`]. Synchronous handlers simply return a ready future.
pub type HandlerFn = dyn Fn(Value) -> HandlerFuture + Send + Sync;

#[derive(Clone)]
struct RegisteredHandler {
    token: Uuid,
    handler: Arc<HandlerFn>,
}

type HandlerTable = HashMap<RoutingKey, RegisteredHandler>;

/// Registry of request handlers, one per routing key.
pub(crate) struct HandlerRegistry {
    table: Arc<RwLock<HandlerTable>>,
}

impl HandlerRegistry {
    pub(crate) fn new() -> Self {
        Self {
            table: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub(crate) fn register(
        &self,
        key: RoutingKey,
        handler: Arc<HandlerFn>,
        stats: &BusStats,
    ) -> HandlerRegistration {
        let token = Uuid::new_v4();
        if let Ok(mut table) = self.table.write() {
            if let Some(previous) = table.insert(key.clone(), RegisteredHandler { token, handler }) {
                stats.handlers_replaced.fetch_add(1, Ordering::Relaxed);
                warn!(
                    routing_key = %key,
                    replaced = %previous.token,
                    "Handler overwritten; last registration wins"
                );
            } else {
                debug!(routing_key = %key, token = %token, "Handler registered");
            }
        }
        HandlerRegistration {
            token,
            key,
            table: Arc::downgrade(&self.table),
        }
    }

    /// Resolve the handler for a request attempt: the tenant-scoped key
    /// first, falling back to the bare topic key.
    pub(crate) fn resolve(&self, scoped: &RoutingKey, bare: &RoutingKey) -> Option<Arc<HandlerFn>> {
        let table = self.table.read().ok()?;
        table
            .get(scoped)
            .or_else(|| table.get(bare))
            .map(|registered| registered.handler.clone())
    }
}

/// Handle to one handler registration.
///
/// Unregistering removes exactly the handler this handle closed over. If a
/// newer handler has since overwritten it, unregistration is a no-op — it
/// never removes the newer handler.
pub struct HandlerRegistration {
    token: Uuid,
    key: RoutingKey,
    table: Weak<RwLock<HandlerTable>>,
}

impl HandlerRegistration {
    /// Remove this handler if it is still the active one for its key.
    ///
    /// Idempotent; silent no-op after the bus has been dropped.
    pub fn unregister(&self) {
        let Some(table) = self.table.upgrade() else {
            return;
        };
        let Ok(mut table) = table.write() else {
            return;
        };
        if table.get(&self.key).map(|h| h.token) == Some(self.token) {
            table.remove(&self.key);
            debug!(routing_key = %self.key, token = %self.token, "Handler unregistered");
        }
    }

    /// The routing key this handler was stored under.
    #[must_use]
    pub fn routing_key(&self) -> &str {
        self.key.as_str()
    }
}
