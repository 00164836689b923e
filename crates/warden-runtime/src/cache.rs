//! Look-aside grant cache.
//!
//! [`CachedGrantSource`] wraps any [`GrantSource`] with a TTL'd
//! look-aside cache keyed by the principal's
//! [`cache_key`](warden_auth::EvaluationContext::cache_key) string:
//!
//! ```text
//! grants:user:{userId}:tenant:{tenantId}:org:{orgId}
//! ```
//!
//! Empty grant sets are cached like any other result; "this
//! principal has nothing" is just as expensive to recompute.
//! Invalidation is per principal (role change) or global
//! (role→permission mapping change).

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use warden_auth::{Grant, GrantSource, GrantSourceError};
use warden_types::{OrganizationId, TenantId, UserId};

/// Tuning for [`CachedGrantSource`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    /// How long a cached grant set stays fresh.
    pub ttl: Duration,
}

impl Default for CacheConfig {
    /// Five minutes, balancing staleness against store load for the
    /// typical grant-change frequency.
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(300),
        }
    }
}

#[derive(Debug)]
struct CacheEntry {
    grants: Vec<Grant>,
    stored_at: Instant,
}

/// TTL'd look-aside cache over an inner grant source.
///
/// Reads consult the cache first; a miss (or an expired entry)
/// delegates to the inner source and stores the result. Inner-source
/// errors propagate untouched and leave the cache unmodified.
///
/// Cloning produces a handle to the same cache, so an admin-facing
/// component can hold a handle purely for invalidation.
///
/// # Example
///
/// ```
/// use warden_auth::{Grant, GrantSource};
/// use warden_runtime::{CachedGrantSource, InMemoryGrantSource};
/// use warden_types::{OrganizationId, Scope, TenantId, UserId};
///
/// let store = InMemoryGrantSource::new();
/// let (user, org, tenant) = (UserId::new(1), OrganizationId::new(2), TenantId::new(3));
/// store.insert(user, org, tenant, Grant::new("VIEWER", "file.view", Scope::Self_)?);
///
/// let cached = CachedGrantSource::new(store.clone());
/// assert_eq!(cached.effective_grants(user, org, tenant)?.len(), 1);
///
/// // The store can change, but the cached set is served until
/// // invalidated or expired
/// store.clear();
/// assert_eq!(cached.effective_grants(user, org, tenant)?.len(), 1);
///
/// cached.invalidate_principal(user, org, tenant);
/// assert!(cached.effective_grants(user, org, tenant)?.is_empty());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone)]
pub struct CachedGrantSource<S> {
    inner: S,
    config: CacheConfig,
    entries: Arc<RwLock<HashMap<String, CacheEntry>>>,
}

impl<S: GrantSource> CachedGrantSource<S> {
    /// Wraps `inner` with the default five-minute TTL.
    #[must_use]
    pub fn new(inner: S) -> Self {
        Self::with_config(inner, CacheConfig::default())
    }

    /// Wraps `inner` with explicit cache tuning.
    #[must_use]
    pub fn with_config(inner: S, config: CacheConfig) -> Self {
        Self {
            inner,
            config,
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Drops the cached grant set for one principal.
    ///
    /// Call on role assignment changes for that user.
    pub fn invalidate_principal(
        &self,
        user: UserId,
        organization: OrganizationId,
        tenant: TenantId,
    ) {
        let key = cache_key(user, organization, tenant);
        if self.entries.write().remove(&key).is_some() {
            tracing::debug!(key = %key, "grant cache: invalidated principal");
        }
    }

    /// Drops every cached grant set.
    ///
    /// Call on role→permission mapping changes, which can affect any
    /// principal.
    pub fn invalidate_all(&self) {
        let mut entries = self.entries.write();
        let dropped = entries.len();
        entries.clear();
        tracing::debug!(dropped, "grant cache: invalidated all entries");
    }

    /// Number of live (possibly expired) cache entries.
    #[must_use]
    pub fn cached_entries(&self) -> usize {
        self.entries.read().len()
    }
}

fn cache_key(user: UserId, organization: OrganizationId, tenant: TenantId) -> String {
    format!(
        "grants:user:{}:tenant:{}:org:{}",
        user.value(),
        tenant.value(),
        organization.value()
    )
}

impl<S: GrantSource> GrantSource for CachedGrantSource<S> {
    fn effective_grants(
        &self,
        user: UserId,
        organization: OrganizationId,
        tenant: TenantId,
    ) -> Result<Vec<Grant>, GrantSourceError> {
        let key = cache_key(user, organization, tenant);

        {
            let entries = self.entries.read();
            if let Some(entry) = entries.get(&key) {
                if entry.stored_at.elapsed() < self.config.ttl {
                    tracing::debug!(key = %key, grants = entry.grants.len(), "grant cache: hit");
                    return Ok(entry.grants.clone());
                }
            }
        }

        tracing::debug!(key = %key, "grant cache: miss");
        let grants = self.inner.effective_grants(user, organization, tenant)?;
        self.entries.write().insert(
            key,
            CacheEntry {
                grants: grants.clone(),
                stored_at: Instant::now(),
            },
        );
        Ok(grants)
    }
}
