//! Error types for SCM parsing, evaluation, and mutation.

use std::fmt;

/// Errors that can occur while parsing, evaluating, or editing an SCM.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in the future without breaking changes.
///
/// Every variant is fatal to the operation that raised it; recovery policy
/// (keep last-known-good text, re-display the previous model) belongs to the
/// caller, and nothing is retried automatically.
#[non_exhaustive]
#[derive(Debug)]
pub enum ScmError {
    /// Syntax error during parsing.
    ///
    /// Covers malformed statements, duplicate left-hand sides, unknown or
    /// mis-applied functions. Fatal to the whole parse.
    Parse(String),

    /// The dependency graph has a directed cycle.
    ///
    /// Raised by topological sorting; fatal to evaluation for the whole
    /// model, not a per-variable condition.
    Cycle,

    /// Failure while evaluating one variable's expression.
    ///
    /// Wraps the underlying message with the failing variable and its
    /// right-hand-side source text so UI hosts can point at the equation.
    Evaluation {
        /// The variable whose expression failed
        variable: String,
        /// The variable's right-hand-side source text
        source: String,
        /// The underlying failure description
        message: String,
    },

    /// A text-level graph edit could not be applied.
    ///
    /// Covers invalid identifiers, missing variables or edges, non-linear
    /// equations where a linear edit was required, and missing required
    /// terms. Edits are all-or-nothing; the input text is unchanged.
    Mutation(String),

    /// Internal invariant violation.
    ///
    /// Used only for programmer errors (unexpected grammar rules, malformed
    /// pair trees), never for user errors.
    Internal(String),
}

impl fmt::Display for ScmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScmError::Parse(msg) => write!(f, "parse error: {}", msg),
            ScmError::Cycle => write!(f, "SCM contains a cycle (not a DAG)"),
            ScmError::Evaluation {
                variable,
                source,
                message,
            } => write!(
                f,
                "evaluation error in '{} = {}': {}",
                variable, source, message
            ),
            ScmError::Mutation(msg) => write!(f, "mutation error: {}", msg),
            ScmError::Internal(msg) => write!(f, "internal error: {}", msg),
        }
    }
}

impl std::error::Error for ScmError {}
