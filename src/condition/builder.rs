//! Parenthesis tree builder

use crate::condition::node::{Connective, ConditionNode, IdGenerator, NodeKind};
use crate::condition::tokenizer::Token;
use crate::error::{ConditionError, ParenIssue, Result};

/// Identifier of the synthetic root
pub const ROOT_ID: u32 = 0;

/// Deepest parenthesis nesting accepted by the builder and the grouping passes
pub const MAX_DEPTH: usize = 256;

/// Build a tree mirroring the parenthesis nesting of `tokens`
///
/// A lone atom becomes the root itself; anything else hangs under a synthetic
/// root with id 0. Every token except `)` becomes a node, numbered in order.
pub fn build_paren_tree(tokens: &[Token], ids: &mut IdGenerator) -> Result<ConditionNode> {
    match tokens {
        [] => Err(ConditionError::EmptyCondition),
        [Token::Atom(text)] => Ok(ConditionNode::new(
            ids.next_id(),
            None,
            NodeKind::Atom(text.clone()),
        )),
        _ => {
            check_depth(tokens)?;
            let mut pos = 0;
            let children = collect_scope(tokens, &mut pos, ROOT_ID, ids, None)?;
            Ok(ConditionNode::with_children(
                ROOT_ID,
                None,
                NodeKind::Root,
                children,
            ))
        }
    }
}

/// Reject inputs nested deeper than [`MAX_DEPTH`] before any recursive stage runs
fn check_depth(tokens: &[Token]) -> Result<()> {
    let mut depth = 0usize;
    for (position, token) in tokens.iter().enumerate() {
        match token {
            Token::Open => {
                depth += 1;
                if depth > MAX_DEPTH {
                    return Err(ConditionError::NestingTooDeep {
                        depth,
                        position,
                        limit: MAX_DEPTH,
                    });
                }
            }
            Token::Close => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    Ok(())
}

/// Collect siblings until the `)` matching `opened_at`, or the end of input at top level
fn collect_scope(
    tokens: &[Token],
    pos: &mut usize,
    parent: u32,
    ids: &mut IdGenerator,
    opened_at: Option<usize>,
) -> Result<Vec<ConditionNode>> {
    let mut children = Vec::new();

    while let Some(token) = tokens.get(*pos) {
        let at = *pos;
        *pos += 1;

        let kind = match token {
            Token::Close => {
                return match opened_at {
                    Some(_) => Ok(children),
                    None => Err(ConditionError::UnbalancedParentheses {
                        position: at,
                        kind: ParenIssue::UnexpectedClose,
                    }),
                };
            }
            Token::Open => {
                let id = ids.next_id();
                let inner = collect_scope(tokens, pos, id, ids, Some(at))?;
                children.push(ConditionNode::with_children(
                    id,
                    Some(parent),
                    NodeKind::Paren,
                    inner,
                ));
                continue;
            }
            Token::Atom(text) => NodeKind::Atom(text.clone()),
            Token::And => NodeKind::Connective(Connective::And),
            Token::Or => NodeKind::Connective(Connective::Or),
        };

        children.push(ConditionNode::new(ids.next_id(), Some(parent), kind));
    }

    match opened_at {
        Some(position) => Err(ConditionError::UnbalancedParentheses {
            position,
            kind: ParenIssue::UnclosedOpen,
        }),
        None => Ok(children),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::tokenizer::tokenize;

    fn build(condition: &str) -> Result<ConditionNode> {
        let tokens = tokenize(condition)?;
        build_paren_tree(&tokens, &mut IdGenerator::default())
    }

    #[test]
    fn test_single_atom_is_root() {
        let tree = build("A.attr >= 2").unwrap();
        assert_eq!(tree.id(), 1);
        assert!(tree.is_root());
        assert!(tree.is_leaf());
        assert_eq!(tree.value(), "A.attr>=2");
    }

    #[test]
    fn test_flat_expression() {
        let tree = build("A.x > 1 and A.y < 2 or A.z = 3").unwrap();
        assert_eq!(tree.id(), ROOT_ID);
        assert_eq!(tree.kind(), &NodeKind::Root);

        let values: Vec<&str> = tree.children().iter().map(|c| c.value()).collect();
        assert_eq!(values, vec!["A.x>1", "and", "A.y<2", "or", "A.z=3"]);

        let ids: Vec<u32> = tree.children().iter().map(|c| c.id()).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
        assert!(tree.children().iter().all(|c| c.parent_id() == Some(ROOT_ID)));
    }

    #[test]
    fn test_nested_groups() {
        let tree = build("A.a = 1 and (A.b = 2 or (A.c = 3 and A.d = 4))").unwrap();
        let rendered = "\
->(ID=\"0\", parentId=\"-\", value:\"\")
-->(ID=\"1\", parentId=\"0\", value:\"A.a=1\")
-->(ID=\"2\", parentId=\"0\", value:\"and\")
-->(ID=\"3\", parentId=\"0\", value:\"(\")
--->(ID=\"4\", parentId=\"3\", value:\"A.b=2\")
--->(ID=\"5\", parentId=\"3\", value:\"or\")
--->(ID=\"6\", parentId=\"3\", value:\"(\")
---->(ID=\"7\", parentId=\"6\", value:\"A.c=3\")
---->(ID=\"8\", parentId=\"6\", value:\"and\")
---->(ID=\"9\", parentId=\"6\", value:\"A.d=4\")
";
        assert_eq!(tree.tree_to_string(), rendered);
        assert_eq!(tree.size_sub_nodes(), 9);
    }

    #[test]
    fn test_parenthesised_single_atom_keeps_wrapper() {
        let tree = build("(A.x > 1)").unwrap();
        assert_eq!(tree.kind(), &NodeKind::Root);
        assert_eq!(tree.children().len(), 1);
        assert_eq!(tree.children()[0].kind(), &NodeKind::Paren);
        assert_eq!(tree.children()[0].children()[0].value(), "A.x>1");
    }

    #[test]
    fn test_extra_close_paren() {
        let err = build("(A.x > 1))").unwrap_err();
        assert!(matches!(
            err,
            ConditionError::UnbalancedParentheses {
                position: 3,
                kind: ParenIssue::UnexpectedClose
            }
        ));
    }

    #[test]
    fn test_unclosed_open_paren() {
        let err = build("A.x > 1 and (A.y < 2").unwrap_err();
        assert!(matches!(
            err,
            ConditionError::UnbalancedParentheses {
                position: 2,
                kind: ParenIssue::UnclosedOpen
            }
        ));
    }

    #[test]
    fn test_nesting_at_limit_is_accepted() {
        let condition = format!("{}A.x > 1{}", "(".repeat(MAX_DEPTH), ")".repeat(MAX_DEPTH));
        let tree = build(&condition).unwrap();
        assert_eq!(tree.atoms().collect::<Vec<_>>(), vec!["A.x>1"]);
    }

    #[test]
    fn test_nesting_beyond_limit_fails() {
        for depth in [MAX_DEPTH + 1, 1_000, 20_000] {
            let condition = format!("{}A.x > 1{}", "(".repeat(depth), ")".repeat(depth));
            let err = build(&condition).unwrap_err();
            assert!(
                matches!(
                    err,
                    ConditionError::NestingTooDeep { depth: d, position, limit }
                        if d == MAX_DEPTH + 1 && position == MAX_DEPTH && limit == MAX_DEPTH
                ),
                "Failed for depth: {}",
                depth
            );
        }
    }

    #[test]
    fn test_empty_token_stream() {
        let err = build_paren_tree(&[], &mut IdGenerator::default()).unwrap_err();
        assert!(matches!(err, ConditionError::EmptyCondition));
    }
}
