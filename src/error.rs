//! Error types for the condition parser

use std::fmt;
use thiserror::Error;

use crate::condition::Connective;

/// Which side of a parenthesis pair is missing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParenIssue {
    /// A `(` that is never closed
    UnclosedOpen,
    /// A `)` with no `(` to close
    UnexpectedClose,
}

impl fmt::Display for ParenIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParenIssue::UnclosedOpen => write!(f, "unclosed '('"),
            ParenIssue::UnexpectedClose => write!(f, "unexpected ')'"),
        }
    }
}

/// Main error type for condition parsing
#[derive(Error, Debug)]
pub enum ConditionError {
    #[error("Empty condition")]
    EmptyCondition,

    #[error("'{keyword}' at token {position} must be followed by '(', found {found}")]
    MembershipSyntax {
        keyword: String,
        position: usize,
        found: String,
    },

    #[error("'{keyword}' at token {position} has no attribute on its left")]
    MissingAttribute { keyword: String, position: usize },

    #[error("Unbalanced parentheses: {kind} at token {position}")]
    UnbalancedParentheses { position: usize, kind: ParenIssue },

    #[error("Parentheses nested {depth} deep at token {position}, limit is {limit}")]
    NestingTooDeep {
        depth: usize,
        position: usize,
        limit: usize,
    },

    #[error("Empty parenthesised group (node {id})")]
    EmptyGroup { id: u32 },

    #[error("'{connective}' is missing an operand")]
    EmptyOperand { connective: Connective },

    #[error("Missing connective between '{left}' and '{right}'")]
    MissingConnective { left: String, right: String },

    #[error("Invalid atom: {0}")]
    InvalidAtom(String),

    #[error("Invalid constraint: {0}")]
    InvalidConstraint(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ConditionError {
    /// True for failures raised while reading the expression text itself
    pub fn is_syntax_error(&self) -> bool {
        !matches!(
            self,
            ConditionError::InvalidConstraint(_) | ConditionError::Json(_)
        )
    }
}

#[cfg(feature = "python")]
impl From<ConditionError> for pyo3::PyErr {
    fn from(err: ConditionError) -> pyo3::PyErr {
        use pyo3::exceptions::{PySyntaxError, PyValueError};

        if err.is_syntax_error() {
            PySyntaxError::new_err(err.to_string())
        } else {
            PyValueError::new_err(err.to_string())
        }
    }
}

/// Result type alias for condition parsing
pub type Result<T> = std::result::Result<T, ConditionError>;
