//! Condition parsing and normalization module
//!
//! This module turns data conditions like `A.grade > 8 and A.name in (marco, polo)`
//! into logic trees: a disjunction of `"OR"` nodes whose members are atoms,
//! parenthesised groups or `"and"` conjunctions.

mod and_group;
mod atom;
mod builder;
pub mod cache;
mod node;
mod or_group;
pub mod tokenizer;


pub use and_group::*;
pub use atom::*;
pub use builder::*;
pub use cache::*;
pub use node::*;
pub use or_group::*;
pub use tokenizer::*;

use crate::error::Result;
use tracing::{debug, trace};

/// Parse a condition string into a normalized logic tree
///
/// Runs the tokenizer, the parenthesis builder, then the OR and AND passes.
/// Every atom must decode as `attribute operator value` or a membership test.
/// Node ids come from a counter owned by this call, so the same input always
/// renders the same tree.
pub fn parse_to_logic_tree(condition: &str) -> Result<ConditionNode> {
    let tokens = tokenize(condition)?;
    debug!(tokens = tokens.len(), "tokenized condition");

    for token in &tokens {
        if let Token::Atom(text) = token {
            Atom::parse(text)?;
        }
    }

    let mut ids = IdGenerator::default();
    let tree = build_paren_tree(&tokens, &mut ids)?;
    let tree = group_by_or(tree, &mut ids)?;
    let tree = group_by_and(tree, &mut ids)?;

    trace!(tree = %tree, "normalized condition");
    Ok(tree)
}
