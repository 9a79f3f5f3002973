//! # Bus Facade
//!
//! [`TenantBus`] ties the scoper, the registries, the publisher, and the
//! request engine together behind the five operations plugins see:
//! `emit`, `on`, `once`, `off`, `request` (plus `handle_request` on the
//! answering side).
//!
//! The active tenant is read through the injected [`TenantContextReader`]
//! on every call — the bus never caches it and never mutates it.

use std::env;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::mpsc;

use shell_types::{
    EventEnvelope, HandlerFailure, ListenerError, RequestError, TenantContextReader, TenantId,
};

use crate::handler::{HandlerFn, HandlerFuture, HandlerRegistration, HandlerRegistry};
use crate::publisher;
use crate::registry::{ListenerFn, ListenerKind, ListenerRegistry, Subscription};
use crate::request::{self, RequestOptions};
use crate::scope::{is_global, scope_topic, RoutingKey};
use crate::stats::BusStats;
use crate::stream::EventStream;
use crate::{DEFAULT_RETRY_DELAY_MS, DEFAULT_TIMEOUT_MS};

/// Bus-wide request defaults, overridable through the environment.
#[derive(Debug, Clone)]
pub struct BusConfig {
    /// Default per-attempt timeout for `request`.
    pub default_timeout: Duration,
    /// Default retry bound for `request`.
    pub default_retries: u32,
    /// Default pause between request attempts.
    pub default_retry_delay: Duration,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            default_timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            default_retries: 0,
            default_retry_delay: Duration::from_millis(DEFAULT_RETRY_DELAY_MS),
        }
    }
}

impl BusConfig {
    /// Read configuration from the environment.
    ///
    /// # Environment Variables
    ///
    /// - `SHELL_BUS_TIMEOUT_MS`: per-attempt request timeout (default: 5000)
    /// - `SHELL_BUS_RETRIES`: request retry bound (default: 0)
    /// - `SHELL_BUS_RETRY_DELAY_MS`: pause between attempts (default: 1000)
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            default_timeout: Duration::from_millis(env_u64(
                "SHELL_BUS_TIMEOUT_MS",
                DEFAULT_TIMEOUT_MS,
            )),
            default_retries: env_u64("SHELL_BUS_RETRIES", 0) as u32,
            default_retry_delay: Duration::from_millis(env_u64(
                "SHELL_BUS_RETRY_DELAY_MS",
                DEFAULT_RETRY_DELAY_MS,
            )),
        }
    }

    /// Request options seeded from these defaults.
    #[must_use]
    pub fn request_options(&self) -> RequestOptions {
        RequestOptions::default()
            .timeout(self.default_timeout)
            .retries(self.default_retries)
            .retry_delay(self.default_retry_delay)
    }
}

fn env_u64(name: &str, default: u64) -> u64 {
    env::var(name)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}

/// Fire-and-forget side of the bus.
///
/// Collaborators that only emit or listen depend on this trait rather than
/// on [`TenantBus`] directly.
pub trait EventEmitter: Send + Sync {
    /// Deliver a payload to every matching listener. Never fails, never
    /// suspends; with no listeners registered the payload is dropped.
    fn emit(&self, topic: &str, payload: Value);

    /// Register a repeating listener under the routing key computed from
    /// the tenant active right now.
    fn subscribe(&self, topic: &str, callback: Arc<ListenerFn>) -> Subscription;

    /// Register a listener that is removed after its first invocation.
    fn subscribe_once(&self, topic: &str, callback: Arc<ListenerFn>) -> Subscription;

    /// Remove a subscription. Idempotent.
    fn off(&self, subscription: &Subscription);
}

/// Request/response side of the bus.
#[async_trait]
pub trait Requester: Send + Sync {
    /// Issue a request and await the handler's response.
    async fn request(
        &self,
        topic: &str,
        payload: Value,
        options: RequestOptions,
    ) -> Result<Value, RequestError>;

    /// Register the single handler for a topic. A second registration for
    /// the same routing key replaces the first (logged as a warning).
    fn handle_request(&self, topic: &str, handler: Arc<HandlerFn>) -> HandlerRegistration;
}

/// The tenant-scoped event and request bus.
pub struct TenantBus {
    listeners: ListenerRegistry,
    handlers: HandlerRegistry,
    tenant: Arc<dyn TenantContextReader>,
    config: BusConfig,
    stats: BusStats,
}

impl TenantBus {
    /// Create a bus reading the active tenant through `tenant`.
    #[must_use]
    pub fn new(tenant: Arc<dyn TenantContextReader>) -> Self {
        Self::with_config(tenant, BusConfig::default())
    }

    /// Create a bus with explicit request defaults.
    #[must_use]
    pub fn with_config(tenant: Arc<dyn TenantContextReader>, config: BusConfig) -> Self {
        Self {
            listeners: ListenerRegistry::new(),
            handlers: HandlerRegistry::new(),
            tenant,
            config,
            stats: BusStats::default(),
        }
    }

    /// Activity counters.
    #[must_use]
    pub fn stats(&self) -> &BusStats {
        &self.stats
    }

    /// The configured request defaults.
    #[must_use]
    pub fn config(&self) -> &BusConfig {
        &self.config
    }

    /// Request options seeded from this bus's defaults.
    #[must_use]
    pub fn options(&self) -> RequestOptions {
        self.config.request_options()
    }

    fn keys_for(&self, topic: &str) -> (RoutingKey, RoutingKey, Option<TenantId>) {
        let tenant = self.tenant.current_tenant();
        let scoped = scope_topic(topic, tenant.as_ref());
        (scoped, RoutingKey::bare(topic), tenant)
    }

    /// Deliver `payload` to every listener matching `topic` under the
    /// tenant active right now. Synchronous; see the publisher module for
    /// the exact delivery order.
    pub fn emit(&self, topic: &str, payload: Value) {
        let (scoped, bare, tenant) = self.keys_for(topic);
        let tenant = if is_global(topic) { None } else { tenant };
        let envelope = EventEnvelope::new(topic, payload, tenant);
        publisher::deliver(&self.listeners, &self.stats, &scoped, &bare, &envelope);
    }

    /// Register a repeating listener. The routing key is computed from the
    /// tenant active at this moment; a later tenant switch does not move
    /// the subscription.
    pub fn on<F>(&self, topic: &str, callback: F) -> Subscription
    where
        F: Fn(&EventEnvelope) -> Result<(), ListenerError> + Send + Sync + 'static,
    {
        let (scoped, _, _) = self.keys_for(topic);
        self.listeners
            .insert(scoped, ListenerKind::Repeating, Arc::new(callback))
    }

    /// Register a listener that fires exactly once, then is removed.
    pub fn once<F>(&self, topic: &str, callback: F) -> Subscription
    where
        F: Fn(&EventEnvelope) -> Result<(), ListenerError> + Send + Sync + 'static,
    {
        let (scoped, _, _) = self.keys_for(topic);
        self.listeners
            .insert(scoped, ListenerKind::Once, Arc::new(callback))
    }

    /// Remove a subscription. Equivalent to `subscription.unsubscribe()`.
    pub fn off(&self, subscription: &Subscription) {
        subscription.unsubscribe();
    }

    /// Subscribe as a stream instead of a callback. Dropping the stream
    /// unsubscribes it.
    #[must_use]
    pub fn stream(&self, topic: &str) -> EventStream {
        let (sender, receiver) = mpsc::unbounded_channel();
        let subscription = self.on(topic, move |envelope: &EventEnvelope| {
            // A dropped receiver just means the stream is gone; the listener
            // is removed by the stream's Drop.
            let _ = sender.send(envelope.clone());
            Ok(())
        });
        EventStream::new(receiver, subscription)
    }

    /// Register the single request handler for `topic`.
    ///
    /// The handler receives the request payload and settles with a value or
    /// a [`HandlerFailure`]. Registering over an existing handler replaces
    /// it (last write wins, logged at warning level).
    pub fn handle_request<F, Fut>(&self, topic: &str, handler: F) -> HandlerRegistration
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, HandlerFailure>> + Send + 'static,
    {
        let (scoped, _, _) = self.keys_for(topic);
        let wrapped: Arc<HandlerFn> =
            Arc::new(move |payload: Value| -> HandlerFuture { Box::pin(handler(payload)) });
        self.handlers.register(scoped, wrapped, &self.stats)
    }

    /// Issue a request and await the response.
    ///
    /// Resolution tries the tenant-scoped routing key first and falls back
    /// to the bare topic key; with neither present the call fails
    /// immediately with [`RequestError::NoHandler`]. On timeout the attempt
    /// is retried up to `options.retries` times, re-resolving the handler
    /// each time.
    pub async fn request(
        &self,
        topic: &str,
        payload: Value,
        options: RequestOptions,
    ) -> Result<Value, RequestError> {
        let (scoped, bare, _) = self.keys_for(topic);
        request::dispatch(
            &self.handlers,
            &self.stats,
            topic,
            scoped,
            bare,
            payload,
            options,
        )
        .await
    }
}

impl EventEmitter for TenantBus {
    fn emit(&self, topic: &str, payload: Value) {
        TenantBus::emit(self, topic, payload);
    }

    fn subscribe(&self, topic: &str, callback: Arc<ListenerFn>) -> Subscription {
        let (scoped, _, _) = self.keys_for(topic);
        self.listeners
            .insert(scoped, ListenerKind::Repeating, callback)
    }

    fn subscribe_once(&self, topic: &str, callback: Arc<ListenerFn>) -> Subscription {
        let (scoped, _, _) = self.keys_for(topic);
        self.listeners.insert(scoped, ListenerKind::Once, callback)
    }

    fn off(&self, subscription: &Subscription) {
        TenantBus::off(self, subscription);
    }
}

#[async_trait]
impl Requester for TenantBus {
    async fn request(
        &self,
        topic: &str,
        payload: Value,
        options: RequestOptions,
    ) -> Result<Value, RequestError> {
        TenantBus::request(self, topic, payload, options).await
    }

    fn handle_request(&self, topic: &str, handler: Arc<HandlerFn>) -> HandlerRegistration {
        let (scoped, _, _) = self.keys_for(topic);
        self.handlers.register(scoped, handler, &self.stats)
    }
}
