//! Evaluation outcomes.
//!
//! Denial is a value, not an error: every business outcome of the
//! pipeline, all four denial reasons included, is an ordinary
//! [`Decision`]. Only infrastructure faults travel on the error
//! channel (see [`EvaluateError`](crate::EvaluateError)).

use serde::{Deserialize, Serialize};

/// Why a request was denied.
///
/// This is the complete, closed set of reasons the enclosing service
/// may expose; internal error details never leak past these tags.
///
/// Wire tags are SCREAMING_SNAKE_CASE: `NO_GRANT`, `SCOPE_MISMATCH`,
/// `CONDITION_NOT_MET`, `CONDITION_EVALUATION_FAILED`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DenialReason {
    /// The principal holds no grant for the requested permission.
    NoGrant,
    /// Grants exist for the permission, but none is broad enough for
    /// the requested scope.
    ScopeMismatch,
    /// Every applicable grant's condition evaluated to false.
    ConditionNotMet,
    /// A condition could not be evaluated at all; access is denied
    /// fail-closed.
    ConditionEvaluationFailed,
}

impl DenialReason {
    /// Returns the fixed wire tag for this reason.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NoGrant => "NO_GRANT",
            Self::ScopeMismatch => "SCOPE_MISMATCH",
            Self::ConditionNotMet => "CONDITION_NOT_MET",
            Self::ConditionEvaluationFailed => "CONDITION_EVALUATION_FAILED",
        }
    }
}

impl std::fmt::Display for DenialReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The outcome of one permission evaluation.
///
/// Invariant: a denial reason is present iff the decision is a
/// denial. The constructors are the only way to build a `Decision`,
/// so the invariant holds everywhere.
///
/// # Example
///
/// ```
/// use warden_auth::{Decision, DenialReason};
///
/// let allowed = Decision::allow();
/// assert!(allowed.is_allowed());
/// assert!(allowed.denial_reason().is_none());
///
/// let denied = Decision::deny(DenialReason::NoGrant);
/// assert!(!denied.is_allowed());
/// assert_eq!(denied.denial_reason(), Some(DenialReason::NoGrant));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Decision {
    allowed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    denial_reason: Option<DenialReason>,
}

// Hand-written so the wire cannot smuggle in an allowed decision with
// a denial reason (or a denial without one); deserialization goes
// through the same constructors as everything else.
impl<'de> Deserialize<'de> for Decision {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Raw {
            allowed: bool,
            #[serde(default)]
            denial_reason: Option<DenialReason>,
        }

        let raw = Raw::deserialize(deserializer)?;
        match (raw.allowed, raw.denial_reason) {
            (true, None) => Ok(Decision::allow()),
            (false, Some(reason)) => Ok(Decision::deny(reason)),
            (true, Some(_)) => Err(serde::de::Error::custom(
                "allowed decision must not carry a denial reason",
            )),
            (false, None) => Err(serde::de::Error::custom(
                "denied decision must carry a denial reason",
            )),
        }
    }
}

impl Decision {
    /// The allowing decision.
    #[must_use]
    pub const fn allow() -> Self {
        Self {
            allowed: true,
            denial_reason: None,
        }
    }

    /// A denial with the given reason.
    #[must_use]
    pub const fn deny(reason: DenialReason) -> Self {
        Self {
            allowed: false,
            denial_reason: Some(reason),
        }
    }

    /// Returns `true` if access was granted.
    #[must_use]
    pub const fn is_allowed(&self) -> bool {
        self.allowed
    }

    /// Returns the denial reason, present iff the decision denies.
    #[must_use]
    pub const fn denial_reason(&self) -> Option<DenialReason> {
        self.denial_reason
    }
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.denial_reason {
            None => f.write_str("ALLOW"),
            Some(reason) => write!(f, "DENY[{reason}]"),
        }
    }
}
