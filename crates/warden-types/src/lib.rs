//! Core value types for Warden.
//!
//! This crate provides the foundational vocabulary of the Warden
//! permission engine: identifier newtypes, the scope hierarchy, and
//! the resource-attribute map used for ABAC conditions.
//!
//! # Crate Architecture
//!
//! ```text
//! warden-types    : ids, Scope, ResourceAttributes  ◄── HERE
//!      ↑
//! warden-auth     : Grant, ports, PermissionEvaluator
//!      ↑
//! warden-runtime  : InMemoryGrantSource, CachedGrantSource,
//!                   ExprConditionEvaluator
//! ```
//!
//! # Design Principles
//!
//! - **Immutable values**: nothing in this crate has identity or a
//!   mutable lifecycle; every type is a plain value.
//! - **Integer-backed identifiers**: principals live in an external
//!   store keyed by 64-bit ids, so the newtypes wrap `i64` rather than
//!   generating their own identity.
//! - **Explicit ordering**: scope breadth is a named rank table, not
//!   an accident of declaration order.
//!
//! # Example
//!
//! ```
//! use warden_types::{ResourceAttributes, Scope, UserId};
//!
//! let user = UserId::new(42);
//! assert_eq!(user.value(), 42);
//!
//! // TENANT covers ORGANIZATION, never the reverse
//! assert!(Scope::Tenant.covers(Scope::Organization));
//! assert!(!Scope::Organization.covers(Scope::Tenant));
//!
//! let attrs = ResourceAttributes::builder()
//!     .attr("size_mb", 15.5)
//!     .build();
//! assert_eq!(attrs.len(), 1);
//! ```

mod attrs;
mod id;
mod scope;

pub use attrs::{AttrValue, ResourceAttributes, ResourceAttributesBuilder};
pub use id::{OrganizationId, TenantId, UserId};
pub use scope::{ParseScopeError, Scope};
