//! The permission evaluation pipeline.
//!
//! [`PermissionEvaluator`] composes the two collaborator ports into a
//! four-stage, early-exit funnel:
//!
//! ```text
//! effective grants ──▶ permission filter ──▶ scope filter ──▶ ABAC walk
//!        │ empty              │ empty             │ empty          │ all false
//!        ▼                    ▼                   ▼               ▼
//!    NO_GRANT             NO_GRANT          SCOPE_MISMATCH   CONDITION_NOT_MET
//! ```
//!
//! Each stage answers "why would *every* grant be rejected" with the
//! most specific reason available once all candidates are exhausted.
//! Within the ABAC walk, a condition that cannot be evaluated is a
//! system fault serious enough to abort the whole pipeline
//! (`CONDITION_EVALUATION_FAILED`, fail-closed), while a condition
//! that evaluated to `false` is an ordinary business "no" that later
//! grants may still override.
//!
//! The evaluator holds no mutable state and is safe to share across
//! threads; each call is independent and synchronous.

use crate::{
    ConditionEvaluator, Decision, DenialReason, EvaluationRequest, GrantSource, GrantSourceError,
};
use thiserror::Error;

/// Error from [`PermissionEvaluator::evaluate`].
///
/// Business denials are **not** errors; they come back as
/// [`Decision`]s. This type carries only the two cases the caller
/// must handle out-of-band: a request that violates the input
/// contract, and an infrastructure fault from the grant source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvaluateError {
    /// The request violates the input contract; no collaborator was
    /// invoked.
    #[error("invalid evaluation request: {reason}")]
    InvalidRequest {
        /// Which part of the contract was violated.
        reason: String,
    },

    /// The grant source failed. Deliberately not masked as a denial:
    /// an outage must look like an outage, and the caller may want to
    /// retry or fail the surrounding request differently.
    #[error(transparent)]
    GrantSource(#[from] GrantSourceError),
}

/// Stateless orchestrator of the four-stage decision pipeline.
///
/// Both collaborators are injected at construction; see the
/// crate-level docs for a complete wiring example.
///
/// # Concurrency
///
/// `evaluate` takes `&self` and touches no shared mutable state, so
/// one evaluator can serve any number of threads without locking.
/// Cancellation and timeouts are the collaborators' concern, not the
/// pipeline's.
#[derive(Debug, Clone)]
pub struct PermissionEvaluator<G, C> {
    grant_source: G,
    condition_evaluator: C,
}

impl<G: GrantSource, C: ConditionEvaluator> PermissionEvaluator<G, C> {
    /// Creates an evaluator over the given collaborators.
    #[must_use]
    pub fn new(grant_source: G, condition_evaluator: C) -> Self {
        Self {
            grant_source,
            condition_evaluator,
        }
    }

    /// Evaluates one request to a [`Decision`].
    ///
    /// Grants are processed in the order the source returned them; no
    /// stage re-sorts. An unconditional surviving grant allows
    /// immediately without consulting the condition evaluator.
    ///
    /// # Errors
    ///
    /// - [`EvaluateError::InvalidRequest`] if the request has a blank
    ///   permission code, raised before any collaborator call;
    /// - [`EvaluateError::GrantSource`] if the grant lookup fails.
    ///
    /// Condition-evaluation failures do **not** surface here; they
    /// deny fail-closed with
    /// [`DenialReason::ConditionEvaluationFailed`].
    pub fn evaluate(&self, request: &EvaluationRequest) -> Result<Decision, EvaluateError> {
        if request.permission_code().trim().is_empty() {
            return Err(EvaluateError::InvalidRequest {
                reason: "permission code must not be blank".to_string(),
            });
        }

        let ctx = request.context();

        // Stage 1: grant lookup. Source errors propagate untouched.
        let grants = self.grant_source.effective_grants(
            ctx.user_id(),
            ctx.organization_id(),
            ctx.tenant_id(),
        )?;
        tracing::debug!(
            principal = %ctx,
            grants = grants.len(),
            "stage 1: effective grants resolved"
        );

        if grants.is_empty() {
            return Ok(self.deny(request, DenialReason::NoGrant));
        }

        // Stage 2: exact permission-code match.
        let for_permission: Vec<_> = grants
            .iter()
            .filter(|g| g.is_for_permission(request.permission_code()))
            .collect();
        tracing::debug!(
            candidates = for_permission.len(),
            permission = request.permission_code(),
            "stage 2: permission filter"
        );

        if for_permission.is_empty() {
            return Ok(self.deny(request, DenialReason::NoGrant));
        }

        // Stage 3: scope coverage.
        let covering: Vec<_> = for_permission
            .into_iter()
            .filter(|g| g.applies_to_scope(request.scope()))
            .collect();
        tracing::debug!(
            candidates = covering.len(),
            requested_scope = %request.scope(),
            "stage 3: scope filter"
        );

        if covering.is_empty() {
            return Ok(self.deny(request, DenialReason::ScopeMismatch));
        }

        // Stage 4: ABAC walk over survivors, in source order.
        for grant in covering {
            let Some(expression) = grant.condition() else {
                tracing::debug!(grant = %grant, "stage 4: unconditional grant, allowing");
                return Ok(self.allow(request));
            };

            match self
                .condition_evaluator
                .evaluate_condition(expression, request.resource_attributes())
            {
                Ok(true) => {
                    tracing::debug!(grant = %grant, "stage 4: condition met, allowing");
                    return Ok(self.allow(request));
                }
                Ok(false) => {
                    tracing::debug!(grant = %grant, "stage 4: condition not met, continuing");
                }
                Err(error) => {
                    // Fail-closed: an unevaluable expression is a hard
                    // stop, not something later grants may paper over.
                    tracing::warn!(
                        grant = %grant,
                        %error,
                        "stage 4: condition evaluation failed, denying"
                    );
                    return Ok(self.deny(request, DenialReason::ConditionEvaluationFailed));
                }
            }
        }

        Ok(self.deny(request, DenialReason::ConditionNotMet))
    }

    fn allow(&self, request: &EvaluationRequest) -> Decision {
        tracing::debug!(
            principal = %request.context(),
            permission = request.permission_code(),
            "permission allowed"
        );
        Decision::allow()
    }

    fn deny(&self, request: &EvaluationRequest, reason: DenialReason) -> Decision {
        tracing::warn!(
            principal = %request.context(),
            permission = request.permission_code(),
            scope = %request.scope(),
            %reason,
            "permission denied"
        );
        Decision::deny(reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ConditionError, EvaluationContext, Grant};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use warden_types::{OrganizationId, ResourceAttributes, Scope, TenantId, UserId};

    /// Grant source that records how often it was consulted.
    #[derive(Clone)]
    struct RecordingSource {
        grants: Vec<Grant>,
        fail: bool,
        calls: Arc<AtomicUsize>,
    }

    impl RecordingSource {
        fn with(grants: Vec<Grant>) -> Self {
            Self {
                grants,
                fail: false,
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn failing() -> Self {
            Self {
                grants: Vec::new(),
                fail: true,
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl GrantSource for RecordingSource {
        fn effective_grants(
            &self,
            _user: UserId,
            _organization: OrganizationId,
            _tenant: TenantId,
        ) -> Result<Vec<Grant>, GrantSourceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(GrantSourceError::Unavailable {
                    reason: "store down".to_string(),
                });
            }
            Ok(self.grants.clone())
        }
    }

    /// Scripted condition evaluator recording every invocation.
    #[derive(Clone)]
    struct ScriptedConditions {
        // expression → scripted outcome; unknown expressions error
        script: Vec<(&'static str, Result<bool, ConditionError>)>,
        seen: Arc<Mutex<Vec<(String, ResourceAttributes)>>>,
    }

    impl ScriptedConditions {
        fn new(script: Vec<(&'static str, Result<bool, ConditionError>)>) -> Self {
            Self {
                script,
                seen: Arc::new(Mutex::new(Vec::new())),
            }
        }

        fn unused() -> Self {
            Self::new(Vec::new())
        }

        fn calls(&self) -> usize {
            self.seen.lock().expect("mock lock").len()
        }

        fn seen(&self) -> Vec<(String, ResourceAttributes)> {
            self.seen.lock().expect("mock lock").clone()
        }
    }

    impl ConditionEvaluator for ScriptedConditions {
        fn evaluate_condition(
            &self,
            expression: &str,
            attributes: &ResourceAttributes,
        ) -> Result<bool, ConditionError> {
            self.seen
                .lock()
                .expect("mock lock")
                .push((expression.to_string(), attributes.clone()));
            self.script
                .iter()
                .find(|(expr, _)| *expr == expression)
                .map(|(_, outcome)| outcome.clone())
                .unwrap_or_else(|| {
                    Err(ConditionError::Parse {
                        expression: expression.to_string(),
                        message: "unscripted expression".to_string(),
                    })
                })
        }
    }

    fn request(permission: &str, scope: Scope, attrs: ResourceAttributes) -> EvaluationRequest {
        EvaluationRequest::new(
            EvaluationContext::new(
                UserId::new(1),
                OrganizationId::new(2),
                TenantId::new(3),
                "UPLOADER",
            ),
            permission,
            scope,
            attrs,
        )
    }

    fn grant(role: &str, permission: &str, scope: Scope) -> Grant {
        Grant::new(role, permission, scope).expect("valid grant")
    }

    fn conditional(role: &str, permission: &str, scope: Scope, expr: &str) -> Grant {
        Grant::conditional(role, permission, scope, expr).expect("valid grant")
    }

    // --- Stage 1 ---

    #[test]
    fn empty_grant_set_denies_no_grant() {
        let source = RecordingSource::with(vec![]);
        let conditions = ScriptedConditions::unused();
        let evaluator = PermissionEvaluator::new(source, conditions.clone());

        let decision = evaluator
            .evaluate(&request(
                "file.upload",
                Scope::Organization,
                ResourceAttributes::empty(),
            ))
            .expect("evaluate");

        assert_eq!(decision, Decision::deny(DenialReason::NoGrant));
        assert_eq!(conditions.calls(), 0);
    }

    #[test]
    fn grant_source_error_propagates_unmasked() {
        let source = RecordingSource::failing();
        let evaluator = PermissionEvaluator::new(source, ScriptedConditions::unused());

        let err = evaluator
            .evaluate(&request(
                "file.upload",
                Scope::Organization,
                ResourceAttributes::empty(),
            ))
            .unwrap_err();

        assert_eq!(
            err,
            EvaluateError::GrantSource(GrantSourceError::Unavailable {
                reason: "store down".to_string()
            })
        );
    }

    // --- Input contract ---

    #[test]
    fn blank_permission_code_rejected_before_lookup() {
        let source = RecordingSource::with(vec![]);
        let evaluator = PermissionEvaluator::new(source.clone(), ScriptedConditions::unused());

        let err = evaluator
            .evaluate(&request("   ", Scope::Self_, ResourceAttributes::empty()))
            .unwrap_err();

        assert!(matches!(err, EvaluateError::InvalidRequest { .. }));
        assert_eq!(source.calls(), 0, "grant source must not be consulted");
    }

    // --- Stage 2 ---

    #[test]
    fn wrong_permission_denies_no_grant() {
        let source = RecordingSource::with(vec![grant(
            "UPLOADER",
            "file.delete",
            Scope::Organization,
        )]);
        let evaluator = PermissionEvaluator::new(source, ScriptedConditions::unused());

        let decision = evaluator
            .evaluate(&request(
                "file.upload",
                Scope::Organization,
                ResourceAttributes::empty(),
            ))
            .expect("evaluate");

        assert_eq!(decision.denial_reason(), Some(DenialReason::NoGrant));
    }

    #[test]
    fn other_permissions_do_not_soften_no_grant() {
        // Scope and condition facts on unrelated permissions must not
        // change the reason: the permission filter empties first.
        let source = RecordingSource::with(vec![
            conditional("A", "other.permission", Scope::Global, "res.x == 1"),
            grant("B", "another.permission", Scope::Self_),
        ]);
        let conditions = ScriptedConditions::unused();
        let evaluator = PermissionEvaluator::new(source, conditions.clone());

        let decision = evaluator
            .evaluate(&request(
                "file.upload",
                Scope::Tenant,
                ResourceAttributes::empty(),
            ))
            .expect("evaluate");

        assert_eq!(decision.denial_reason(), Some(DenialReason::NoGrant));
        assert_eq!(conditions.calls(), 0);
    }

    // --- Stage 3 ---

    #[test]
    fn narrow_scope_denies_scope_mismatch() {
        let source = RecordingSource::with(vec![grant("UPLOADER", "file.upload", Scope::Self_)]);
        let evaluator = PermissionEvaluator::new(source, ScriptedConditions::unused());

        let decision = evaluator
            .evaluate(&request(
                "file.upload",
                Scope::Organization,
                ResourceAttributes::empty(),
            ))
            .expect("evaluate");

        assert_eq!(decision.denial_reason(), Some(DenialReason::ScopeMismatch));
    }

    #[test]
    fn broader_scope_covers_request() {
        let source = RecordingSource::with(vec![grant("ADMIN", "file.upload", Scope::Tenant)]);
        let evaluator = PermissionEvaluator::new(source, ScriptedConditions::unused());

        let decision = evaluator
            .evaluate(&request(
                "file.upload",
                Scope::Organization,
                ResourceAttributes::empty(),
            ))
            .expect("evaluate");

        assert!(decision.is_allowed());
    }

    // --- Stage 4 ---

    #[test]
    fn unconditional_grant_allows_without_condition_calls() {
        let source = RecordingSource::with(vec![grant(
            "UPLOADER",
            "file.upload",
            Scope::Organization,
        )]);
        let conditions = ScriptedConditions::unused();
        let evaluator = PermissionEvaluator::new(source, conditions.clone());

        let decision = evaluator
            .evaluate(&request(
                "file.upload",
                Scope::Organization,
                ResourceAttributes::builder().attr("size_mb", 15.5).build(),
            ))
            .expect("evaluate");

        assert!(decision.is_allowed());
        assert_eq!(
            conditions.calls(),
            0,
            "unconditional grants must never invoke the condition evaluator"
        );
    }

    #[test]
    fn condition_met_allows_and_passes_exact_inputs() {
        let source = RecordingSource::with(vec![conditional(
            "UPLOADER",
            "file.upload",
            Scope::Organization,
            "res.size_mb <= 20",
        )]);
        let conditions = ScriptedConditions::new(vec![("res.size_mb <= 20", Ok(true))]);
        let evaluator = PermissionEvaluator::new(source, conditions.clone());

        let attrs = ResourceAttributes::builder().attr("size_mb", 15.5).build();
        let decision = evaluator
            .evaluate(&request("file.upload", Scope::Organization, attrs.clone()))
            .expect("evaluate");

        assert!(decision.is_allowed());
        assert_eq!(
            conditions.seen(),
            vec![("res.size_mb <= 20".to_string(), attrs)],
            "evaluator must receive the exact expression and attribute map"
        );
    }

    #[test]
    fn condition_false_denies_condition_not_met() {
        let source = RecordingSource::with(vec![conditional(
            "UPLOADER",
            "file.upload",
            Scope::Organization,
            "res.size_mb <= 20",
        )]);
        let conditions = ScriptedConditions::new(vec![("res.size_mb <= 20", Ok(false))]);
        let evaluator = PermissionEvaluator::new(source, conditions.clone());

        let decision = evaluator
            .evaluate(&request(
                "file.upload",
                Scope::Organization,
                ResourceAttributes::builder().attr("size_mb", 25.0).build(),
            ))
            .expect("evaluate");

        assert_eq!(decision.denial_reason(), Some(DenialReason::ConditionNotMet));
        assert_eq!(conditions.calls(), 1);
    }

    #[test]
    fn condition_error_denies_evaluation_failed() {
        let source = RecordingSource::with(vec![conditional(
            "UPLOADER",
            "file.upload",
            Scope::Organization,
            "res.size_mb <=",
        )]);
        let conditions = ScriptedConditions::new(vec![(
            "res.size_mb <=",
            Err(ConditionError::Parse {
                expression: "res.size_mb <=".to_string(),
                message: "unexpected end of input".to_string(),
            }),
        )]);
        let evaluator = PermissionEvaluator::new(source, conditions);

        let decision = evaluator
            .evaluate(&request(
                "file.upload",
                Scope::Organization,
                ResourceAttributes::empty(),
            ))
            .expect("evaluate");

        assert_eq!(
            decision.denial_reason(),
            Some(DenialReason::ConditionEvaluationFailed)
        );
    }

    #[test]
    fn condition_error_short_circuits_remaining_candidates() {
        // Second grant would allow, but the first grant's broken
        // condition must stop the walk fail-closed.
        let source = RecordingSource::with(vec![
            conditional("A", "file.upload", Scope::Organization, "broken("),
            grant("B", "file.upload", Scope::Organization),
        ]);
        let conditions = ScriptedConditions::new(vec![(
            "broken(",
            Err(ConditionError::Parse {
                expression: "broken(".to_string(),
                message: "unbalanced parenthesis".to_string(),
            }),
        )]);
        let evaluator = PermissionEvaluator::new(source, conditions.clone());

        let decision = evaluator
            .evaluate(&request(
                "file.upload",
                Scope::Organization,
                ResourceAttributes::empty(),
            ))
            .expect("evaluate");

        assert_eq!(
            decision.denial_reason(),
            Some(DenialReason::ConditionEvaluationFailed)
        );
        assert_eq!(conditions.calls(), 1, "no further candidates after error");
    }

    #[test]
    fn false_condition_falls_through_to_next_grant() {
        let source = RecordingSource::with(vec![
            conditional("A", "file.upload", Scope::Organization, "res.a == 1"),
            conditional("B", "file.upload", Scope::Organization, "res.b == 2"),
        ]);
        let conditions =
            ScriptedConditions::new(vec![("res.a == 1", Ok(false)), ("res.b == 2", Ok(true))]);
        let evaluator = PermissionEvaluator::new(source, conditions.clone());

        let decision = evaluator
            .evaluate(&request(
                "file.upload",
                Scope::Organization,
                ResourceAttributes::empty(),
            ))
            .expect("evaluate");

        assert!(decision.is_allowed());
        assert_eq!(conditions.calls(), 2, "exactly once per survivor considered");
    }

    #[test]
    fn mixed_grant_set_allows_on_matching_grant() {
        let source = RecordingSource::with(vec![
            grant("VIEWER", "file.view", Scope::Self_),
            grant("UPLOADER", "file.upload", Scope::Organization),
        ]);
        let evaluator = PermissionEvaluator::new(source, ScriptedConditions::unused());

        let decision = evaluator
            .evaluate(&request(
                "file.upload",
                Scope::Organization,
                ResourceAttributes::empty(),
            ))
            .expect("evaluate");

        assert!(decision.is_allowed());
    }

    #[test]
    fn survivors_walk_in_source_order() {
        // First survivor is unconditional, so the second must never be
        // consulted even though its condition would error.
        let source = RecordingSource::with(vec![
            grant("A", "file.upload", Scope::Global),
            conditional("B", "file.upload", Scope::Global, "broken("),
        ]);
        let conditions = ScriptedConditions::unused();
        let evaluator = PermissionEvaluator::new(source, conditions.clone());

        let decision = evaluator
            .evaluate(&request(
                "file.upload",
                Scope::Tenant,
                ResourceAttributes::empty(),
            ))
            .expect("evaluate");

        assert!(decision.is_allowed());
        assert_eq!(conditions.calls(), 0);
    }

    #[test]
    fn scope_mismatch_and_condition_failures_resolve_by_stage_order() {
        // One grant falls out at stage 3, another fails its condition
        // at stage 4. The reason reflects the latest stage at which
        // all remaining candidates were eliminated.
        let source = RecordingSource::with(vec![
            grant("NARROW", "file.upload", Scope::Self_),
            conditional("COND", "file.upload", Scope::Organization, "res.a == 1"),
        ]);
        let conditions = ScriptedConditions::new(vec![("res.a == 1", Ok(false))]);
        let evaluator = PermissionEvaluator::new(source, conditions);

        let decision = evaluator
            .evaluate(&request(
                "file.upload",
                Scope::Organization,
                ResourceAttributes::empty(),
            ))
            .expect("evaluate");

        assert_eq!(decision.denial_reason(), Some(DenialReason::ConditionNotMet));
    }

    #[test]
    fn evaluator_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PermissionEvaluator<RecordingSource, ScriptedConditions>>();
    }
}
