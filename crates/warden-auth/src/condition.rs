//! Condition evaluator port.
//!
//! [`ConditionEvaluator`] abstracts the ABAC expression language. The
//! engine treats condition text as opaque; whichever language the
//! deployment plugs in only has to answer "does this expression hold
//! under these attributes?", or fail loudly when it cannot answer.
//!
//! # Architecture
//!
//! ```text
//! ConditionEvaluator trait (warden-auth)   ← trait definition (THIS MODULE)
//!          │
//!          └── ExprConditionEvaluator (warden-runtime)
//! ```

use std::sync::Arc;
use thiserror::Error;
use warden_types::ResourceAttributes;

/// Error raised when an expression cannot be evaluated.
///
/// Implementations must use this channel (never `Ok(false)`) for
/// malformed expressions, unknown variables, or type errors. The
/// engine maps any such failure to a fail-closed
/// `CONDITION_EVALUATION_FAILED` denial.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConditionError {
    /// The expression is not syntactically valid.
    #[error("failed to parse condition '{expression}': {message}")]
    Parse {
        /// The offending expression text.
        expression: String,
        /// Parser diagnostic.
        message: String,
    },

    /// The expression references a variable absent from the
    /// attribute bindings.
    #[error("condition references undefined variable '{name}'")]
    UndefinedVariable {
        /// The unresolved variable name as written.
        name: String,
    },

    /// Operands of an operator had incompatible types.
    #[error("type mismatch in condition: {message}")]
    TypeMismatch {
        /// What was compared with what.
        message: String,
    },

    /// The expression evaluated, but not to a boolean.
    #[error("condition did not evaluate to a boolean")]
    NotBoolean,
}

/// Evaluates a boolean condition expression against resource
/// attributes.
///
/// Implementations should avoid re-compiling the same expression on
/// every call; grant sets are small and their condition strings
/// repeat, so a compiled-expression cache keeps evaluation well under
/// the engine's latency budget.
pub trait ConditionEvaluator: Send + Sync {
    /// Evaluates `expression` against `attributes`.
    ///
    /// # Errors
    ///
    /// Returns [`ConditionError`] when the expression is malformed,
    /// references undefined variables, or otherwise cannot be
    /// evaluated. An error is semantically distinct from `Ok(false)`:
    /// `false` means "the condition said no", an error means "the
    /// condition could not be asked".
    fn evaluate_condition(
        &self,
        expression: &str,
        attributes: &ResourceAttributes,
    ) -> Result<bool, ConditionError>;
}

impl<C: ConditionEvaluator + ?Sized> ConditionEvaluator for Arc<C> {
    fn evaluate_condition(
        &self,
        expression: &str,
        attributes: &ResourceAttributes,
    ) -> Result<bool, ConditionError> {
        (**self).evaluate_condition(expression, attributes)
    }
}
