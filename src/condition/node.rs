//! Condition tree node shared by every pipeline stage

use serde::Serialize;
use std::fmt;

use crate::error::Result;

/// Label of a synthetic disjunction member
pub const OR_LABEL: &str = "OR";
/// Label of a synthetic conjunction (same text as the `and` connective)
pub const AND_LABEL: &str = "and";
/// Label of a parenthesised group
pub const PAREN_LABEL: &str = "(";

/// Logical connective keyword
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Connective {
    And,
    Or,
}

impl Connective {
    pub fn as_str(self) -> &'static str {
        match self {
            Connective::And => "and",
            Connective::Or => "or",
        }
    }
}

impl fmt::Display for Connective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a node stands for
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum NodeKind {
    /// Synthetic root over a multi-token expression
    Root,
    /// Merged comparison or membership test
    Atom(String),
    /// Parenthesised sub-expression
    Paren,
    /// One disjunct of the enclosing group
    Or,
    /// Conjunction of its children
    And,
    /// Raw connective; only present before normalization
    Connective(Connective),
}

impl NodeKind {
    /// Legacy string label used in the rendered tree
    pub fn label(&self) -> &str {
        match self {
            NodeKind::Root => "",
            NodeKind::Atom(text) => text,
            NodeKind::Paren => PAREN_LABEL,
            NodeKind::Or => OR_LABEL,
            NodeKind::And => AND_LABEL,
            NodeKind::Connective(c) => c.as_str(),
        }
    }
}

/// Hands out node identifiers for a single parse
///
/// Each parse owns its generator, so concurrent parses never share a counter.
#[derive(Debug)]
pub struct IdGenerator {
    next: u32,
}

impl IdGenerator {
    pub fn starting_at(first: u32) -> Self {
        Self { next: first }
    }

    #[inline]
    pub fn next_id(&mut self) -> u32 {
        let id = self.next;
        self.next += 1;
        id
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::starting_at(1)
    }
}

/// Node of a condition tree
///
/// Children are owned; `parent` is only the id of the owning node and never
/// keeps it alive.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConditionNode {
    id: u32,
    parent: Option<u32>,
    kind: NodeKind,
    children: Vec<ConditionNode>,
}

impl ConditionNode {
    pub fn new(id: u32, parent: Option<u32>, kind: NodeKind) -> Self {
        Self::with_children(id, parent, kind, Vec::new())
    }

    pub fn with_children(
        id: u32,
        parent: Option<u32>,
        kind: NodeKind,
        children: Vec<ConditionNode>,
    ) -> Self {
        Self {
            id,
            parent,
            kind,
            children,
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn parent_id(&self) -> Option<u32> {
        self.parent
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// String label of the node: atom text, `"OR"`, `"and"`, `"("` or `""` for the root
    pub fn value(&self) -> &str {
        self.kind.label()
    }

    pub fn children(&self) -> &[ConditionNode] {
        &self.children
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn is_atom(&self) -> bool {
        matches!(self.kind, NodeKind::Atom(_))
    }

    pub fn is_connective(&self, connective: Connective) -> bool {
        self.kind == NodeKind::Connective(connective)
    }

    /// Number of nodes below this one
    pub fn size_sub_nodes(&self) -> usize {
        self.children.iter().map(|c| 1 + c.size_sub_nodes()).sum()
    }

    /// Number of edges on the longest downward path
    pub fn height(&self) -> usize {
        self.children
            .iter()
            .map(|c| 1 + c.height())
            .max()
            .unwrap_or(0)
    }

    /// Depth-first, left-to-right walk yielding `(depth, node)` pairs
    pub fn iter(&self) -> PreOrder<'_> {
        PreOrder {
            stack: vec![(0, self)],
        }
    }

    /// Atom texts of every leaf, left to right
    pub fn atoms(&self) -> impl Iterator<Item = &str> + '_ {
        self.iter().filter_map(|(_, node)| match &node.kind {
            NodeKind::Atom(text) => Some(text.as_str()),
            _ => None,
        })
    }

    /// Canonical one-line-per-node rendering
    pub fn tree_to_string(&self) -> String {
        self.to_string()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub(crate) fn into_parts(self) -> (u32, Option<u32>, NodeKind, Vec<ConditionNode>) {
        (self.id, self.parent, self.kind, self.children)
    }

    pub(crate) fn reparent(mut self, parent: u32) -> Self {
        self.parent = Some(parent);
        self
    }
}

impl fmt::Display for ConditionNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (depth, node) in self.iter() {
            for _ in 0..=depth {
                f.write_str("-")?;
            }
            match node.parent {
                Some(parent) => writeln!(
                    f,
                    ">(ID=\"{}\", parentId=\"{}\", value:\"{}\")",
                    node.id,
                    parent,
                    node.value()
                )?,
                None => writeln!(
                    f,
                    ">(ID=\"{}\", parentId=\"-\", value:\"{}\")",
                    node.id,
                    node.value()
                )?,
            }
        }
        Ok(())
    }
}

/// Pre-order iterator over a condition tree
pub struct PreOrder<'a> {
    stack: Vec<(usize, &'a ConditionNode)>,
}

impl<'a> Iterator for PreOrder<'a> {
    type Item = (usize, &'a ConditionNode);

    fn next(&mut self) -> Option<Self::Item> {
        let (depth, node) = self.stack.pop()?;
        self.stack
            .extend(node.children.iter().rev().map(|child| (depth + 1, child)));
        Some((depth, node))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ConditionNode {
        // root -> [OR -> [a], OR -> [b]]
        let a = ConditionNode::new(1, Some(3), NodeKind::Atom("A.x>1".to_string()));
        let b = ConditionNode::new(2, Some(4), NodeKind::Atom("A.y<2".to_string()));
        let or_a = ConditionNode::with_children(3, Some(0), NodeKind::Or, vec![a]);
        let or_b = ConditionNode::with_children(4, Some(0), NodeKind::Or, vec![b]);
        ConditionNode::with_children(0, None, NodeKind::Root, vec![or_a, or_b])
    }

    #[test]
    fn test_size_and_height() {
        let tree = sample();
        assert_eq!(tree.size_sub_nodes(), 4);
        assert_eq!(tree.children()[0].size_sub_nodes(), 1);
        assert_eq!(tree.height(), 2);
        assert_eq!(tree.iter().count(), tree.size_sub_nodes() + 1);
    }

    #[test]
    fn test_root_and_leaf_flags() {
        let tree = sample();
        assert!(tree.is_root());
        assert!(!tree.is_leaf());
        let leaf = &tree.children()[1].children()[0];
        assert!(!leaf.is_root());
        assert!(leaf.is_leaf());
        assert!(leaf.is_atom());
        assert_eq!(leaf.parent_id(), Some(4));
    }

    #[test]
    fn test_labels() {
        assert_eq!(NodeKind::Root.label(), "");
        assert_eq!(NodeKind::Paren.label(), "(");
        assert_eq!(NodeKind::Or.label(), "OR");
        assert_eq!(NodeKind::And.label(), "and");
        assert_eq!(NodeKind::Connective(Connective::Or).label(), "or");
        assert_eq!(NodeKind::Atom("A.x=1".to_string()).label(), "A.x=1");
    }

    #[test]
    fn test_tree_to_string() {
        let expected = "\
->(ID=\"0\", parentId=\"-\", value:\"\")
-->(ID=\"3\", parentId=\"0\", value:\"OR\")
--->(ID=\"1\", parentId=\"3\", value:\"A.x>1\")
-->(ID=\"4\", parentId=\"0\", value:\"OR\")
--->(ID=\"2\", parentId=\"4\", value:\"A.y<2\")
";
        assert_eq!(sample().tree_to_string(), expected);
    }

    #[test]
    fn test_atoms_in_order() {
        let tree = sample();
        let atoms: Vec<&str> = tree.atoms().collect();
        assert_eq!(atoms, vec!["A.x>1", "A.y<2"]);
    }

    #[test]
    fn test_id_generator() {
        let mut ids = IdGenerator::default();
        assert_eq!(ids.next_id(), 1);
        assert_eq!(ids.next_id(), 2);

        let mut ids = IdGenerator::starting_at(10);
        assert_eq!(ids.next_id(), 10);
    }

    #[test]
    fn test_to_json() {
        let json = sample().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["id"], 0);
        assert_eq!(value["kind"]["kind"], "root");
        assert_eq!(value["children"][0]["kind"]["kind"], "or");
        assert_eq!(value["children"][0]["children"][0]["kind"]["text"], "A.x>1");
    }
}
