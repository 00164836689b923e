//! Evaluation request value objects.
//!
//! One [`EvaluationRequest`] goes in, one
//! [`Decision`](crate::Decision) comes out; both are discarded after
//! use. Neither type has identity or a mutable lifecycle.

use serde::{Deserialize, Serialize};
use warden_types::{OrganizationId, ResourceAttributes, Scope, TenantId, UserId};

/// The principal-side context of an evaluation.
///
/// The pipeline passes this opaquely to the
/// [`GrantSource`](crate::GrantSource) to resolve effective grants;
/// it never inspects the fields itself.
///
/// # Example
///
/// ```
/// use warden_auth::EvaluationContext;
/// use warden_types::{OrganizationId, TenantId, UserId};
///
/// let ctx = EvaluationContext::new(
///     UserId::new(123),
///     OrganizationId::new(789),
///     TenantId::new(456),
///     "UPLOADER",
/// );
/// assert_eq!(ctx.cache_key(), "grants:user:123:tenant:456:org:789");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EvaluationContext {
    user_id: UserId,
    organization_id: OrganizationId,
    tenant_id: TenantId,
    role_code: String,
}

impl EvaluationContext {
    /// Creates a context for the principal acting under `role_code`.
    #[must_use]
    pub fn new(
        user_id: UserId,
        organization_id: OrganizationId,
        tenant_id: TenantId,
        role_code: impl Into<String>,
    ) -> Self {
        Self {
            user_id,
            organization_id,
            tenant_id,
            role_code: role_code.into(),
        }
    }

    /// The requesting user.
    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// The organization the request is made within.
    #[must_use]
    pub fn organization_id(&self) -> OrganizationId {
        self.organization_id
    }

    /// The tenant the request is made within.
    #[must_use]
    pub fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }

    /// The role the principal currently acts under.
    #[must_use]
    pub fn role_code(&self) -> &str {
        &self.role_code
    }

    /// Cache key identifying this principal's effective grant set.
    ///
    /// Format: `grants:user:{userId}:tenant:{tenantId}:org:{orgId}`.
    /// Grant caches key their entries by this string so that a
    /// role change can invalidate exactly one principal.
    #[must_use]
    pub fn cache_key(&self) -> String {
        format!(
            "grants:user:{}:tenant:{}:org:{}",
            self.user_id.value(),
            self.tenant_id.value(),
            self.organization_id.value()
        )
    }
}

impl std::fmt::Display for EvaluationContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}@{}/{} as {}",
            self.user_id, self.tenant_id, self.organization_id, self.role_code
        )
    }
}

/// A single permission-evaluation request.
///
/// Constructed once per call and immutable afterwards. The resource
/// attributes are forwarded verbatim to condition evaluation.
///
/// # Example
///
/// ```
/// use warden_auth::{EvaluationContext, EvaluationRequest};
/// use warden_types::{OrganizationId, ResourceAttributes, Scope, TenantId, UserId};
///
/// let request = EvaluationRequest::new(
///     EvaluationContext::new(UserId::new(1), OrganizationId::new(2), TenantId::new(3), "UPLOADER"),
///     "file.upload",
///     Scope::Organization,
///     ResourceAttributes::builder().attr("size_mb", 15.5).build(),
/// );
/// assert_eq!(request.permission_code(), "file.upload");
/// assert_eq!(request.scope(), Scope::Organization);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRequest {
    context: EvaluationContext,
    permission_code: String,
    scope: Scope,
    resource_attributes: ResourceAttributes,
}

impl EvaluationRequest {
    /// Creates a request for `permission_code` at `scope`.
    #[must_use]
    pub fn new(
        context: EvaluationContext,
        permission_code: impl Into<String>,
        scope: Scope,
        resource_attributes: ResourceAttributes,
    ) -> Self {
        Self {
            context,
            permission_code: permission_code.into(),
            scope,
            resource_attributes,
        }
    }

    /// The principal-side context.
    #[must_use]
    pub fn context(&self) -> &EvaluationContext {
        &self.context
    }

    /// The permission being requested.
    #[must_use]
    pub fn permission_code(&self) -> &str {
        &self.permission_code
    }

    /// The scope being requested.
    #[must_use]
    pub fn scope(&self) -> Scope {
        self.scope
    }

    /// Facts about the resource under access.
    #[must_use]
    pub fn resource_attributes(&self) -> &ResourceAttributes {
        &self.resource_attributes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> EvaluationContext {
        EvaluationContext::new(
            UserId::new(123),
            OrganizationId::new(789),
            TenantId::new(456),
            "UPLOADER",
        )
    }

    #[test]
    fn context_accessors() {
        let ctx = context();
        assert_eq!(ctx.user_id(), UserId::new(123));
        assert_eq!(ctx.organization_id(), OrganizationId::new(789));
        assert_eq!(ctx.tenant_id(), TenantId::new(456));
        assert_eq!(ctx.role_code(), "UPLOADER");
    }

    #[test]
    fn cache_key_format() {
        // user, then tenant, then org: the store-side key layout
        assert_eq!(context().cache_key(), "grants:user:123:tenant:456:org:789");
    }

    #[test]
    fn context_display() {
        assert_eq!(
            context().to_string(),
            "user:123@tenant:456/org:789 as UPLOADER"
        );
    }

    #[test]
    fn request_accessors() {
        let attrs = ResourceAttributes::builder().attr("size_mb", 15.5).build();
        let request =
            EvaluationRequest::new(context(), "file.upload", Scope::Organization, attrs.clone());

        assert_eq!(request.context(), &context());
        assert_eq!(request.permission_code(), "file.upload");
        assert_eq!(request.scope(), Scope::Organization);
        assert_eq!(request.resource_attributes(), &attrs);
    }

    #[test]
    fn serde_roundtrip() {
        let request = EvaluationRequest::new(
            context(),
            "file.upload",
            Scope::Organization,
            ResourceAttributes::empty(),
        );
        let json = serde_json::to_string(&request).expect("serialize");
        let parsed: EvaluationRequest = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed, request);
    }
}
