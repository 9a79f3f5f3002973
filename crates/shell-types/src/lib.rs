//! # Shell Types Crate
//!
//! Domain types shared between the shell, the event/request bus, and the
//! plugins it hosts.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: all cross-plugin types are defined here.
//! - **No Ambient Globals**: the active tenant is read through an injected
//!   [`TenantContextReader`], never through hidden statics.
//! - **Opaque Payloads**: plugin payloads travel as `serde_json::Value`
//!   inside an [`EventEnvelope`]; the bus never inspects them.

pub mod envelope;
pub mod errors;
pub mod tenant;

pub use envelope::EventEnvelope;
pub use errors::{HandlerFailure, ListenerError, RequestError};
pub use tenant::{TenantCell, TenantContextReader, TenantId};
