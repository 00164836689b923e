//! Permission model and evaluation engine for Warden.
//!
//! This crate decides ALLOW/DENY for a principal requesting a
//! permission at a scope, optionally constrained by attribute-based
//! (ABAC) conditions.
//!
//! # Evaluation Model
//!
//! ```text
//! Decision = Grants(WHO has WHAT)
//!          ∩ Scope coverage(HOW BROAD)
//!          ∩ Condition(UNDER WHICH FACTS)
//! ```
//!
//! | Stage | Input | Denial on exhaustion |
//! |-------|-------|----------------------|
//! | 1. Grant lookup | effective grants for the principal | `NO_GRANT` |
//! | 2. Permission filter | exact permission-code match | `NO_GRANT` |
//! | 3. Scope matching | grant scope covers requested scope | `SCOPE_MISMATCH` |
//! | 4. ABAC walk | condition evaluation per surviving grant | `CONDITION_NOT_MET` |
//!
//! A condition that cannot be evaluated at all denies immediately with
//! `CONDITION_EVALUATION_FAILED` (fail-closed).
//!
//! # Crate Architecture
//!
//! ```text
//! GrantSource trait (warden-auth)          ← port definitions (THIS CRATE)
//! ConditionEvaluator trait (warden-auth)
//!          │
//!          ├── InMemoryGrantSource / CachedGrantSource (warden-runtime)
//!          └── ExprConditionEvaluator (warden-runtime)
//! ```
//!
//! Trait definitions live here, implementations in consumers; the
//! evaluator takes both ports in its constructor, so any store or
//! expression language can be plugged in without touching the
//! pipeline.
//!
//! # Example
//!
//! ```
//! use warden_auth::{
//!     ConditionError, ConditionEvaluator, Decision, EvaluationContext, EvaluationRequest,
//!     Grant, GrantSource, GrantSourceError, PermissionEvaluator,
//! };
//! use warden_types::{OrganizationId, ResourceAttributes, Scope, TenantId, UserId};
//!
//! struct OneGrant;
//!
//! impl GrantSource for OneGrant {
//!     fn effective_grants(
//!         &self,
//!         _user: UserId,
//!         _org: OrganizationId,
//!         _tenant: TenantId,
//!     ) -> Result<Vec<Grant>, GrantSourceError> {
//!         Ok(vec![
//!             Grant::new("ADMIN", "file.upload", Scope::Tenant).expect("valid grant")
//!         ])
//!     }
//! }
//!
//! struct NoConditions;
//!
//! impl ConditionEvaluator for NoConditions {
//!     fn evaluate_condition(
//!         &self,
//!         _expression: &str,
//!         _attributes: &ResourceAttributes,
//!     ) -> Result<bool, ConditionError> {
//!         unreachable!("unconditional grants never reach the evaluator")
//!     }
//! }
//!
//! let evaluator = PermissionEvaluator::new(OneGrant, NoConditions);
//! let request = EvaluationRequest::new(
//!     EvaluationContext::new(UserId::new(1), OrganizationId::new(2), TenantId::new(3), "ADMIN"),
//!     "file.upload",
//!     Scope::Organization,
//!     ResourceAttributes::empty(),
//! );
//!
//! let decision = evaluator.evaluate(&request)?;
//! assert!(decision.is_allowed());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod condition;
mod decision;
mod evaluator;
mod grant;
mod request;
mod source;

pub use condition::{ConditionError, ConditionEvaluator};
pub use decision::{Decision, DenialReason};
pub use evaluator::{EvaluateError, PermissionEvaluator};
pub use grant::{Grant, InvalidGrant};
pub use request::{EvaluationContext, EvaluationRequest};
pub use source::{GrantSource, GrantSourceError};

// Re-export the value vocabulary for convenience
pub use warden_types::{AttrValue, OrganizationId, ResourceAttributes, Scope, TenantId, UserId};
