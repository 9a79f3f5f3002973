//! # Event Envelope
//!
//! The wrapper every listener receives on delivery. Ordinary listeners read
//! the payload out of it; wildcard listeners additionally use the topic and
//! tenant fields to tell deliveries apart.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::tenant::TenantId;

/// A delivered event.
///
/// The `tenant` field carries the tenant the event was scoped to at emission
/// time. It is `None` for global topics and for emissions made while no
/// tenant was active.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// The logical topic the producer emitted on.
    pub topic: String,

    /// Opaque plugin payload. The bus never inspects it.
    pub payload: Value,

    /// Tenant the emission was scoped to, if any.
    pub tenant: Option<TenantId>,
}

impl EventEnvelope {
    /// Wrap a payload for delivery.
    #[must_use]
    pub fn new(topic: impl Into<String>, payload: Value, tenant: Option<TenantId>) -> Self {
        Self {
            topic: topic.into(),
            payload,
            tenant,
        }
    }
}
