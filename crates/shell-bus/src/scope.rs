//! # Topic Scoper
//!
//! Maps a logical topic name plus the active tenant to the physical routing
//! key listeners and handlers are stored under.
//!
//! A fixed allow-list of prefixes (and the literal wildcard topic) is
//! global: those topics are never tenant-qualified. Everything else is
//! tenant-scoped by default.

use std::fmt;

use shell_types::TenantId;

use crate::WILDCARD_TOPIC;

/// Topic prefixes that are exempt from tenant scoping.
///
/// These belong to the shell itself (navigation, theming, auth, tenant
/// switching) and must reach their listeners no matter which tenant is
/// active.
pub const GLOBAL_PREFIXES: [&str; 7] = [
    "shell:",
    "auth:",
    "theme:",
    "notification:",
    "navigation:",
    "tenant:",
    "team:",
];

/// Physical key listeners and handlers are indexed by.
///
/// Deterministic function of (topic, active tenant); recomputed per call,
/// never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RoutingKey(String);

impl RoutingKey {
    /// The topic itself, unqualified.
    #[must_use]
    pub fn bare(topic: &str) -> Self {
        Self(topic.to_string())
    }

    /// The raw key string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoutingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// True if the topic is exempt from tenant scoping.
#[must_use]
pub fn is_global(topic: &str) -> bool {
    topic == WILDCARD_TOPIC || GLOBAL_PREFIXES.iter().any(|prefix| topic.starts_with(prefix))
}

/// Compute the routing key for a topic under the given tenant.
///
/// Global topics and any emission made with no active tenant route under the
/// bare topic. A non-global topic with an active tenant routes under
/// `tenant:<id>:<topic>`. Pure: no error conditions, no side effects.
#[must_use]
pub fn scope_topic(topic: &str, tenant: Option<&TenantId>) -> RoutingKey {
    match tenant {
        Some(id) if !is_global(topic) => RoutingKey(format!("tenant:{}:{}", id.as_str(), topic)),
        _ => RoutingKey::bare(topic),
    }
}
