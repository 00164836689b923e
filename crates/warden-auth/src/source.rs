//! Grant source port.
//!
//! [`GrantSource`] abstracts wherever effective grants live: a
//! relational store, a cache in front of it, or plain memory in
//! tests. The engine only ever asks one question of it.
//!
//! # Architecture
//!
//! ```text
//! GrantSource trait (warden-auth)        ← trait definition (THIS MODULE)
//!          │
//!          ├── InMemoryGrantSource (warden-runtime)
//!          └── CachedGrantSource (warden-runtime, look-aside TTL cache)
//! ```

use crate::Grant;
use std::sync::Arc;
use thiserror::Error;
use warden_types::{OrganizationId, TenantId, UserId};

/// Infrastructure error from a grant source.
///
/// These are never converted into denials: an unreachable store is an
/// operational fault the caller must see, not a business "no".
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrantSourceError {
    /// The backing store could not be reached.
    #[error("grant store unavailable: {reason}")]
    Unavailable {
        /// What failed, for operators; never exposed in a decision.
        reason: String,
    },
}

/// Resolves the effective grant set for a principal.
///
/// *Effective* means fully resolved: the union over every role the
/// principal holds in the given organization/tenant context, with
/// role→grant expansion already performed by the provisioning
/// subsystem. A principal with no grants yields `Ok(vec![])`, never
/// an error.
///
/// Implementations must be `Send + Sync`; the evaluator is invoked
/// concurrently from any number of threads.
pub trait GrantSource: Send + Sync {
    /// Returns all effective grants for the principal, in store order.
    ///
    /// The engine preserves this order through every pipeline stage,
    /// so sources that care about precedence should return grants
    /// accordingly.
    ///
    /// # Errors
    ///
    /// Returns [`GrantSourceError`] only for infrastructure faults
    /// (store unreachable, backing cache corrupt). "No grants" is the
    /// empty vec.
    fn effective_grants(
        &self,
        user: UserId,
        organization: OrganizationId,
        tenant: TenantId,
    ) -> Result<Vec<Grant>, GrantSourceError>;
}

impl<S: GrantSource + ?Sized> GrantSource for Arc<S> {
    fn effective_grants(
        &self,
        user: UserId,
        organization: OrganizationId,
        tenant: TenantId,
    ) -> Result<Vec<Grant>, GrantSourceError> {
        (**self).effective_grants(user, organization, tenant)
    }
}
