//! AND-grouping pass

use crate::condition::node::{Connective, ConditionNode, IdGenerator, NodeKind};
use crate::error::{ConditionError, Result};

/// Fold the `and`-joined members of every `"OR"` node into one `"and"` node
///
/// Expects an OR-grouped tree. An `"OR"` node without `and` keeps its single
/// member unwrapped. Nested groups are processed the same way.
pub fn group_by_and(node: ConditionNode, ids: &mut IdGenerator) -> Result<ConditionNode> {
    let (id, parent, kind, children) = node.into_parts();

    let children = if kind == NodeKind::Or {
        fold_conjunction(children, id, ids)?
    } else {
        children
            .into_iter()
            .map(|child| group_by_and(child, ids))
            .collect::<Result<Vec<_>>>()?
    };

    Ok(ConditionNode::with_children(id, parent, kind, children))
}

fn fold_conjunction(
    members: Vec<ConditionNode>,
    owner: u32,
    ids: &mut IdGenerator,
) -> Result<Vec<ConditionNode>> {
    let has_and = members.iter().any(|m| m.is_connective(Connective::And));
    let operands = split_operands(members)?;

    if !has_and {
        return operands
            .into_iter()
            .map(|operand| group_by_and(operand, ids))
            .collect();
    }

    let and_id = ids.next_id();
    let operands = operands
        .into_iter()
        .map(|operand| group_by_and(operand.reparent(and_id), ids))
        .collect::<Result<Vec<_>>>()?;

    Ok(vec![ConditionNode::with_children(
        and_id,
        Some(owner),
        NodeKind::And,
        operands,
    )])
}

/// Drop the `and` separators, checking that terms and connectives alternate
fn split_operands(members: Vec<ConditionNode>) -> Result<Vec<ConditionNode>> {
    let mut operands: Vec<ConditionNode> = Vec::with_capacity(members.len() / 2 + 1);
    let mut expect_operand = true;

    for member in members {
        if member.is_connective(Connective::And) {
            if expect_operand {
                return Err(ConditionError::EmptyOperand {
                    connective: Connective::And,
                });
            }
            expect_operand = true;
            continue;
        }

        if !expect_operand {
            let left = operands
                .last()
                .map(|prev| prev.value().to_string())
                .unwrap_or_default();
            return Err(ConditionError::MissingConnective {
                left,
                right: member.value().to_string(),
            });
        }
        operands.push(member);
        expect_operand = false;
    }

    if expect_operand {
        return Err(ConditionError::EmptyOperand {
            connective: Connective::And,
        });
    }

    Ok(operands)
}
