//! Declare Condition Core - data-condition parser for DECLARE process models
//!
//! This crate turns the data conditions attached to DECLARE constraints
//! (`A.grade > 8 and (A.point >= 5 or A.name in (marco, polo))`) into
//! normalized logic trees that a conformance checker can walk, with optional
//! Python bindings via PyO3 (`python` feature).

pub mod condition;
pub mod config;
pub mod error;

pub use crate::condition::{
    normalize_tokens, parse_to_logic_tree, tokenize, Atom, ConditionCache, ConditionNode,
    NodeKind, Token,
};
pub use crate::error::{ConditionError, Result};

#[cfg(feature = "python")]
mod python {
    use pyo3::prelude::*;

    use crate::condition;

    // ============================================================================
    // Python Functions
    // ============================================================================

    /// Tokenize a condition into merged atoms, connectives and parentheses
    ///
    /// # Raises
    /// SyntaxError if a membership keyword is not followed by `(`
    #[pyfunction]
    fn tokenize(condition: &str) -> PyResult<Vec<String>> {
        Ok(condition::tokenize(condition)?
            .iter()
            .map(|token| token.as_str().to_string())
            .collect())
    }

    /// Normalize spacing and comparison keywords without merging membership lists
    #[pyfunction]
    fn normalize(condition: &str) -> Vec<String> {
        condition::normalize_tokens(condition)
    }

    /// Parse a condition and return the rendered logic tree
    ///
    /// # Example (Python)
    /// ```python
    /// print(parse_to_logic_tree("A.grade > 8 or A.grade < 2"))
    /// ```
    #[pyfunction]
    fn parse_to_logic_tree(condition: &str) -> PyResult<String> {
        Ok(condition::parse_to_logic_tree(condition)?.tree_to_string())
    }

    /// Parse a condition and return the logic tree as JSON
    #[pyfunction]
    fn logic_tree_json(condition: &str) -> PyResult<String> {
        Ok(condition::parse_to_logic_tree(condition)?.to_json()?)
    }

    // ============================================================================
    // Python Module Definition
    // ============================================================================

    /// Python module definition
    #[pymodule]
    fn declare_condition_core(m: &Bound<'_, PyModule>) -> PyResult<()> {
        m.add_function(wrap_pyfunction!(tokenize, m)?)?;
        m.add_function(wrap_pyfunction!(normalize, m)?)?;
        m.add_function(wrap_pyfunction!(parse_to_logic_tree, m)?)?;
        m.add_function(wrap_pyfunction!(logic_tree_json, m)?)?;
        Ok(())
    }
}
