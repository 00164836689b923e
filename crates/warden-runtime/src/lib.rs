//! Concrete collaborators for the Warden permission engine.
//!
//! `warden-auth` defines the two ports the
//! [`PermissionEvaluator`](warden_auth::PermissionEvaluator) consumes;
//! this crate provides the standard implementations:
//!
//! ```text
//! GrantSource trait (warden-auth)
//!          │
//!          ├── InMemoryGrantSource   ← plain store (tests, embedding)
//!          └── CachedGrantSource<S>  ← look-aside TTL cache over any S
//!
//! ConditionEvaluator trait (warden-auth)
//!          │
//!          └── ExprConditionEvaluator  ← CEL-flavoured boolean expressions
//! ```
//!
//! # Latency
//!
//! The engine's design target is P95 < 50ms per evaluation under
//! representative grant sets (0–5 grants, 0–1 conditional). Both
//! collaborator-side levers live here: [`CachedGrantSource`] keeps
//! grant lookups off the backing store, and
//! [`ExprConditionEvaluator`] caches parsed expressions so repeated
//! conditions skip compilation.
//!
//! # Example
//!
//! ```
//! use warden_auth::{EvaluationContext, EvaluationRequest, Grant, PermissionEvaluator};
//! use warden_runtime::{CachedGrantSource, ExprConditionEvaluator, InMemoryGrantSource};
//! use warden_types::{OrganizationId, ResourceAttributes, Scope, TenantId, UserId};
//!
//! let store = InMemoryGrantSource::new();
//! store.insert(
//!     UserId::new(1),
//!     OrganizationId::new(2),
//!     TenantId::new(3),
//!     Grant::conditional("UPLOADER", "file.upload", Scope::Organization, "res.size_mb <= 20")?,
//! );
//!
//! let evaluator = PermissionEvaluator::new(
//!     CachedGrantSource::new(store.clone()),
//!     ExprConditionEvaluator::new(),
//! );
//!
//! let request = EvaluationRequest::new(
//!     EvaluationContext::new(UserId::new(1), OrganizationId::new(2), TenantId::new(3), "UPLOADER"),
//!     "file.upload",
//!     Scope::Organization,
//!     ResourceAttributes::builder().attr("size_mb", 15.5).build(),
//! );
//!
//! assert!(evaluator.evaluate(&request)?.is_allowed());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod cache;
mod expr;
mod memory;

pub use cache::{CacheConfig, CachedGrantSource};
pub use expr::ExprConditionEvaluator;
pub use memory::InMemoryGrantSource;
