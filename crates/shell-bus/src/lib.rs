//! # Shell Bus - Tenant-Scoped Event & Request Bus
//!
//! In-process message broker the Mosaic shell's plugins communicate
//! through without holding references to one another.
//!
//! ```text
//! ┌──────────────┐                        ┌──────────────┐
//! │   Plugin A   │                        │   Plugin B   │
//! │              │   emit() / request()   │              │
//! │              │ ───────┐               │              │
//! └──────────────┘        │               └──────────────┘
//!                         ▼                      ↑
//!                  ┌──────────────┐              │
//!                  │  TenantBus   │ ─────────────┘
//!                  │ (scoper +    │   on() / handle_request()
//!                  │  registries) │
//!                  └──────┬───────┘
//!                         │ reads, never writes
//!                         ▼
//!                  ┌──────────────┐
//!                  │  TenantCell  │  ← owned by the shell
//!                  └──────────────┘
//! ```
//!
//! ## Scoping
//!
//! Every call maps its logical topic to a physical routing key using the
//! tenant active at that instant. A fixed set of shell-owned prefixes
//! (`shell:`, `auth:`, `theme:`, …) and the literal wildcard `*` are global
//! and never tenant-qualified; everything else routes under
//! `tenant:<id>:<topic>` while a tenant is active.
//!
//! ## Delivery & Requests
//!
//! - `emit` is synchronous fire-and-forget; listener failures are isolated
//!   per listener and never reach the emitter.
//! - `request` is the only suspending operation: it races the single
//!   registered handler against a timeout and retries with a fixed backoff,
//!   re-resolving the handler on every attempt.

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod bus;
pub mod handler;
pub mod publisher;
pub mod registry;
pub mod request;
pub mod scope;
pub mod stats;
pub mod stream;

// Re-export main types
pub use bus::{BusConfig, EventEmitter, Requester, TenantBus};
pub use handler::{HandlerFn, HandlerFuture, HandlerRegistration};
pub use registry::{ListenerFn, ListenerKind, Subscription};
pub use request::RequestOptions;
pub use scope::{is_global, scope_topic, RoutingKey, GLOBAL_PREFIXES};
pub use stats::BusStats;
pub use stream::EventStream;

/// Default per-attempt timeout for `request`, in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 5_000;

/// Default pause between request attempts, in milliseconds.
pub const DEFAULT_RETRY_DELAY_MS: u64 = 1_000;

/// The literal wildcard topic. Listeners registered under it receive every
/// delivery on the bus, with the full envelope.
pub const WILDCARD_TOPIC: &str = "*";
