//! OR-grouping pass
//!
//! Splits every children list on its top-level `or` connectives and wraps each
//! run between them in an `"OR"` node. Parenthesised groups are regrouped the
//! same way, recursively.

use crate::condition::node::{Connective, ConditionNode, IdGenerator, NodeKind};
use crate::error::{ConditionError, Result};

/// Regroup the children of `node` (and of every nested group) by `or`
///
/// A bare atom root is returned unchanged.
pub fn group_by_or(node: ConditionNode, ids: &mut IdGenerator) -> Result<ConditionNode> {
    if node.is_atom() {
        return Ok(node);
    }

    let (id, parent, kind, children) = node.into_parts();
    if children.is_empty() {
        return Err(ConditionError::EmptyGroup { id });
    }

    let children = group_children(children, id, ids)?;
    Ok(ConditionNode::with_children(id, parent, kind, children))
}

/// Partition `children` on `or` and wrap each run; results are owned by `owner`
fn group_children(
    children: Vec<ConditionNode>,
    owner: u32,
    ids: &mut IdGenerator,
) -> Result<Vec<ConditionNode>> {
    let mut groups = Vec::new();
    let mut run = Vec::new();

    for child in children {
        if child.is_connective(Connective::Or) {
            groups.extend(close_run(std::mem::take(&mut run), owner, ids)?);
        } else {
            run.push(child);
        }
    }
    groups.extend(close_run(run, owner, ids)?);

    Ok(groups)
}

/// Turn one run into its `"OR"` node(s)
///
/// A run made of a single parenthesised group drops the redundant parentheses:
/// the group's contents are grouped in place, splicing any inner `or` into the
/// enclosing disjunction.
fn close_run(
    mut run: Vec<ConditionNode>,
    owner: u32,
    ids: &mut IdGenerator,
) -> Result<Vec<ConditionNode>> {
    if run.is_empty() {
        return Err(ConditionError::EmptyOperand {
            connective: Connective::Or,
        });
    }

    if run.len() == 1 && run[0].kind() == &NodeKind::Paren {
        if let Some(group) = run.pop() {
            let (id, _, _, inner) = group.into_parts();
            if inner.is_empty() {
                return Err(ConditionError::EmptyGroup { id });
            }
            return group_children(inner, owner, ids);
        }
    }

    let or_id = ids.next_id();
    let members = run
        .into_iter()
        .map(|child| regroup_nested(child, or_id, ids))
        .collect::<Result<Vec<_>>>()?;

    Ok(vec![ConditionNode::with_children(
        or_id,
        Some(owner),
        NodeKind::Or,
        members,
    )])
}

/// Move a run member under its `"OR"` node, regrouping it first if it is a group
fn regroup_nested(node: ConditionNode, parent: u32, ids: &mut IdGenerator) -> Result<ConditionNode> {
    if node.kind() != &NodeKind::Paren {
        return Ok(node.reparent(parent));
    }

    let (id, _, kind, children) = node.into_parts();
    if children.is_empty() {
        return Err(ConditionError::EmptyGroup { id });
    }

    let children = group_children(children, id, ids)?;
    Ok(ConditionNode::with_children(id, Some(parent), kind, children))
}
