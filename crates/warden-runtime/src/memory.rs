//! In-memory grant source.
//!
//! [`InMemoryGrantSource`] is the plain-store implementation of
//! [`GrantSource`]: a thread-safe map from principal context to its
//! effective grant list. Production deployments put a persistence
//! adapter here; tests and embedded setups use this directly,
//! usually behind a [`CachedGrantSource`](crate::CachedGrantSource).

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use warden_auth::{Grant, GrantSource, GrantSourceError};
use warden_types::{OrganizationId, TenantId, UserId};

type PrincipalKey = (UserId, OrganizationId, TenantId);

/// Thread-safe, in-memory effective-grant store.
///
/// Grants are kept per (user, organization, tenant) context in
/// insertion order; [`effective_grants`](GrantSource::effective_grants)
/// returns them in that same order, which the evaluator preserves
/// through its pipeline.
///
/// Cloning the source clones a handle to the same underlying store,
/// so a test can keep mutating grants after handing the source to an
/// evaluator.
///
/// # Example
///
/// ```
/// use warden_auth::{Grant, GrantSource};
/// use warden_runtime::InMemoryGrantSource;
/// use warden_types::{OrganizationId, Scope, TenantId, UserId};
///
/// let store = InMemoryGrantSource::new();
/// let (user, org, tenant) = (UserId::new(1), OrganizationId::new(2), TenantId::new(3));
///
/// store.insert(user, org, tenant, Grant::new("VIEWER", "file.view", Scope::Self_)?);
/// assert_eq!(store.effective_grants(user, org, tenant)?.len(), 1);
///
/// // Unknown principals have no grants, not an error
/// assert!(store
///     .effective_grants(UserId::new(9), org, tenant)?
///     .is_empty());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryGrantSource {
    grants: Arc<RwLock<HashMap<PrincipalKey, Vec<Grant>>>>,
}

impl InMemoryGrantSource {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a grant to the principal's effective set.
    ///
    /// Order of insertion is the order the evaluator will walk.
    pub fn insert(
        &self,
        user: UserId,
        organization: OrganizationId,
        tenant: TenantId,
        grant: Grant,
    ) {
        self.grants
            .write()
            .entry((user, organization, tenant))
            .or_default()
            .push(grant);
    }

    /// Removes every grant held by the principal in this context.
    pub fn remove_principal(&self, user: UserId, organization: OrganizationId, tenant: TenantId) {
        self.grants.write().remove(&(user, organization, tenant));
    }

    /// Removes all grants for all principals.
    pub fn clear(&self) {
        self.grants.write().clear();
    }

    /// Total number of grants across all principals.
    #[must_use]
    pub fn grant_count(&self) -> usize {
        self.grants.read().values().map(Vec::len).sum()
    }
}

impl GrantSource for InMemoryGrantSource {
    fn effective_grants(
        &self,
        user: UserId,
        organization: OrganizationId,
        tenant: TenantId,
    ) -> Result<Vec<Grant>, GrantSourceError> {
        Ok(self
            .grants
            .read()
            .get(&(user, organization, tenant))
            .cloned()
            .unwrap_or_default())
    }
}
