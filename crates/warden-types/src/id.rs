//! Identifier types for Warden.
//!
//! All identifiers are integer-backed: principals, organizations and
//! tenants are provisioned by an external store that hands out 64-bit
//! ids, so the newtypes here exist purely to keep the three id spaces
//! from being mixed up at compile time.

use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($(#[$doc:meta])* $name:ident, $prefix:literal) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wraps a raw id from the external store.
            #[must_use]
            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            /// Returns the raw id.
            #[must_use]
            pub const fn value(self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, concat!($prefix, ":{}"), self.0)
            }
        }
    };
}

define_id!(
    /// Identifier for a principal (the user requesting access).
    ///
    /// # Example
    ///
    /// ```
    /// use warden_types::UserId;
    ///
    /// let id = UserId::new(123);
    /// assert_eq!(id.value(), 123);
    /// assert_eq!(format!("{id}"), "user:123");
    /// ```
    UserId,
    "user"
);

define_id!(
    /// Identifier for an organization within a tenant.
    OrganizationId,
    "org"
);

define_id!(
    /// Identifier for a tenant (the top-level isolation boundary).
    TenantId,
    "tenant"
);
