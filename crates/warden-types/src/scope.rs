//! Scope hierarchy for permission grants.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The breadth of resources a grant applies to.
///
/// Scopes form a fixed total order by breadth:
///
/// ```text
/// SELF(0) < ORGANIZATION(1) < TENANT(2) < GLOBAL(3)
/// ```
///
/// A grant held at level L *covers* any requested scope at level ≤ L:
/// a tenant administrator can act on organization-scoped resources,
/// but an organization grant never reaches tenant-wide resources.
///
/// The `Self_` variant carries a trailing underscore because `Self` is
/// reserved in Rust; its wire tag and display form are `SELF`.
///
/// # Ordering
///
/// The order is defined by the explicit [`rank`](Self::rank) table,
/// not by declaration order. `Ord` delegates to `rank`, so comparison
/// operators agree with coverage: `a.covers(b) == (a >= b)`.
///
/// # Example
///
/// ```
/// use warden_types::Scope;
///
/// assert!(Scope::Tenant.covers(Scope::Organization));
/// assert!(Scope::Tenant.covers(Scope::Tenant));
/// assert!(!Scope::Self_.covers(Scope::Organization));
/// assert!(Scope::Global.covers(Scope::Self_));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Scope {
    /// Resources owned by the requesting user only.
    #[serde(rename = "SELF")]
    Self_,
    /// Resources belonging to one organization.
    Organization,
    /// Resources anywhere within one tenant.
    Tenant,
    /// Resources across all tenants.
    Global,
}

impl Scope {
    /// All scopes, narrowest first.
    pub const ALL: [Scope; 4] = [
        Scope::Self_,
        Scope::Organization,
        Scope::Tenant,
        Scope::Global,
    ];

    /// Returns the breadth rank of this scope.
    ///
    /// The rank table is the single source of truth for the ordering;
    /// both [`covers`](Self::covers) and `Ord` are defined in terms of
    /// it.
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Scope::Self_ => 0,
            Scope::Organization => 1,
            Scope::Tenant => 2,
            Scope::Global => 3,
        }
    }

    /// Returns `true` if a grant at this scope satisfies a request at
    /// `requested` scope.
    ///
    /// Coverage is reflexive and monotonic in rank: a broader grant
    /// always covers a narrower request, never the reverse.
    ///
    /// # Example
    ///
    /// ```
    /// use warden_types::Scope;
    ///
    /// // TENANT grant, ORGANIZATION request: allowed
    /// assert!(Scope::Tenant.covers(Scope::Organization));
    ///
    /// // SELF grant, ORGANIZATION request: scope mismatch
    /// assert!(!Scope::Self_.covers(Scope::Organization));
    /// ```
    #[must_use]
    pub const fn covers(self, requested: Scope) -> bool {
        self.rank() >= requested.rank()
    }

    /// Returns the fixed wire tag for this scope.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Scope::Self_ => "SELF",
            Scope::Organization => "ORGANIZATION",
            Scope::Tenant => "TENANT",
            Scope::Global => "GLOBAL",
        }
    }
}

impl PartialOrd for Scope {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Scope {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown scope tag.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown scope tag: '{0}' (expected SELF, ORGANIZATION, TENANT or GLOBAL)")]
pub struct ParseScopeError(pub String);

impl std::str::FromStr for Scope {
    type Err = ParseScopeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SELF" => Ok(Scope::Self_),
            "ORGANIZATION" => Ok(Scope::Organization),
            "TENANT" => Ok(Scope::Tenant),
            "GLOBAL" => Ok(Scope::Global),
            other => Err(ParseScopeError(other.to_string())),
        }
    }
}
