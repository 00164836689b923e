//! Permission grants.
//!
//! A [`Grant`] assigns one permission, at one scope, to one role,
//! optionally guarded by a condition expression. Grants are produced
//! by the external provisioning subsystem (role expansion already
//! performed) and are evaluated read-only here.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use warden_types::Scope;

/// Error returned when constructing a structurally invalid grant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidGrant {
    /// The role code was empty or whitespace-only.
    #[error("grant role code must not be blank")]
    BlankRoleCode,
    /// The permission code was empty or whitespace-only.
    #[error("grant permission code must not be blank")]
    BlankPermissionCode,
    /// A conditional grant was given a blank condition expression.
    #[error("conditional grant requires a non-blank condition expression")]
    BlankCondition,
}

/// An immutable (role, permission, scope, condition) tuple.
///
/// The condition, when present, is an expression in the pluggable
/// condition language; its text is opaque to this crate and is only
/// interpreted by a [`ConditionEvaluator`](crate::ConditionEvaluator).
/// Absence of a condition means the grant is unconditional.
///
/// Codes are trimmed on construction and must be non-empty.
///
/// # Example
///
/// ```
/// use warden_auth::Grant;
/// use warden_types::Scope;
///
/// let unconditional = Grant::new("UPLOADER", "file.upload", Scope::Organization)?;
/// assert!(!unconditional.has_condition());
///
/// let conditional = Grant::conditional(
///     "UPLOADER",
///     "file.upload",
///     Scope::Organization,
///     "res.size_mb <= 20",
/// )?;
/// assert_eq!(conditional.condition(), Some("res.size_mb <= 20"));
/// # Ok::<(), warden_auth::InvalidGrant>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Grant {
    role_code: String,
    permission_code: String,
    scope: Scope,
    condition: Option<String>,
}

impl Grant {
    /// Creates an unconditional grant.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidGrant`] if either code is blank after
    /// trimming.
    pub fn new(
        role_code: impl Into<String>,
        permission_code: impl Into<String>,
        scope: Scope,
    ) -> Result<Self, InvalidGrant> {
        Self::build(role_code.into(), permission_code.into(), scope, None)
    }

    /// Creates a grant guarded by a condition expression.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidGrant`] if either code or the condition is
    /// blank after trimming.
    pub fn conditional(
        role_code: impl Into<String>,
        permission_code: impl Into<String>,
        scope: Scope,
        condition: impl Into<String>,
    ) -> Result<Self, InvalidGrant> {
        let condition = condition.into();
        if condition.trim().is_empty() {
            return Err(InvalidGrant::BlankCondition);
        }
        Self::build(
            role_code.into(),
            permission_code.into(),
            scope,
            Some(condition),
        )
    }

    fn build(
        role_code: String,
        permission_code: String,
        scope: Scope,
        condition: Option<String>,
    ) -> Result<Self, InvalidGrant> {
        let role_code = role_code.trim().to_string();
        if role_code.is_empty() {
            return Err(InvalidGrant::BlankRoleCode);
        }
        let permission_code = permission_code.trim().to_string();
        if permission_code.is_empty() {
            return Err(InvalidGrant::BlankPermissionCode);
        }
        let condition = condition.map(|c| c.trim().to_string());

        Ok(Self {
            role_code,
            permission_code,
            scope,
            condition,
        })
    }

    /// The role this grant was expanded from.
    #[must_use]
    pub fn role_code(&self) -> &str {
        &self.role_code
    }

    /// The permission this grant confers.
    #[must_use]
    pub fn permission_code(&self) -> &str {
        &self.permission_code
    }

    /// The breadth at which the permission applies.
    #[must_use]
    pub fn scope(&self) -> Scope {
        self.scope
    }

    /// The guarding condition expression, if any.
    #[must_use]
    pub fn condition(&self) -> Option<&str> {
        self.condition.as_deref()
    }

    /// Returns `true` if this grant is guarded by a condition.
    #[must_use]
    pub fn has_condition(&self) -> bool {
        self.condition.is_some()
    }

    /// Exact, case-sensitive permission-code match. No wildcards.
    #[must_use]
    pub fn is_for_permission(&self, permission_code: &str) -> bool {
        self.permission_code == permission_code
    }

    /// Exact role-code match.
    #[must_use]
    pub fn is_from_role(&self, role_code: &str) -> bool {
        self.role_code == role_code
    }

    /// Returns `true` if this grant's scope covers the requested one.
    #[must_use]
    pub fn applies_to_scope(&self, requested: Scope) -> bool {
        self.scope.covers(requested)
    }
}

impl std::fmt::Display for Grant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.condition {
            Some(cond) => write!(
                f,
                "{}:{}@{} if {}",
                self.role_code, self.permission_code, self.scope, cond
            ),
            None => write!(
                f,
                "{}:{}@{}",
                self.role_code, self.permission_code, self.scope
            ),
        }
    }
}
