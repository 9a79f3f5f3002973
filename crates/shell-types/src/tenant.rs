//! # Tenant Context
//!
//! The single mutable tenant cell owned by the hosting shell, and the
//! read-only accessor the bus uses to resolve the active tenant.
//!
//! The bus re-reads the cell on every `emit`/`on`/`once`/`request`/
//! `handle_request` call; it never caches the value and never mutates it.
//! Serializing updates to the cell is the shell's responsibility.

use std::fmt;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

/// Identifier of a tenant context.
///
/// Always non-empty; an empty string is not a tenant, it is the absence of
/// one, which the shell expresses as `None`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TenantId(String);

impl TenantId {
    /// Create a tenant id. Returns `None` for an empty string, which is
    /// legal input meaning "no tenant".
    #[must_use]
    pub fn new(id: impl Into<String>) -> Option<Self> {
        let id = id.into();
        if id.is_empty() {
            None
        } else {
            Some(Self(id))
        }
    }

    /// The raw identifier string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Read-only view of the currently active tenant.
///
/// The bus holds this as an injected accessor (no ambient global state),
/// which keeps the scoping logic deterministic and testable.
pub trait TenantContextReader: Send + Sync {
    /// The tenant active at this instant, if any.
    fn current_tenant(&self) -> Option<TenantId>;
}

/// Single-value tenant store owned by the hosting shell.
///
/// The shell calls [`TenantCell::set`] / [`TenantCell::clear`] on its own
/// tenant switches; everything else only reads through
/// [`TenantContextReader`].
#[derive(Debug, Default)]
pub struct TenantCell {
    current: RwLock<Option<TenantId>>,
}

impl TenantCell {
    /// Create a cell with no active tenant (the "personal" scope).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Activate a tenant, replacing any previously active one.
    pub fn set(&self, tenant: TenantId) {
        if let Ok(mut current) = self.current.write() {
            *current = Some(tenant);
        }
    }

    /// Deactivate the current tenant, returning to the personal scope.
    pub fn clear(&self) {
        if let Ok(mut current) = self.current.write() {
            *current = None;
        }
    }
}

impl TenantContextReader for TenantCell {
    fn current_tenant(&self) -> Option<TenantId> {
        self.current
            .read()
            .map(|guard| (*guard).clone())
            .unwrap_or(None)
    }
}
