//! Expression tree
//!
//!     The tree of one cell's text is stored as an arena: nodes live in one vector and refer
//!     to their parent and children through [`NodeId`]s. Builders need "closest open ancestor
//!     of kind X" lookups and splice nodes in and out while scanning, which indices make
//!     cheap.
//!
//!     Spans are byte offsets into the text. Text not covered by any child is plain text of
//!     the enclosing node.

use crate::robot::range::{Position, Region};
use serde::Serialize;
use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct NodeId(pub usize);

/// Sigil of a variable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum VariableType {
    /// `${...}`
    Scalar,
    /// `@{...}`
    List,
    /// `&{...}`
    Dictionary,
    /// `%{...}`
    Environment,
}

impl VariableType {
    pub fn from_sigil(sigil: char) -> Option<Self> {
        match sigil {
            '$' => Some(VariableType::Scalar),
            '@' => Some(VariableType::List),
            '&' => Some(VariableType::Dictionary),
            '%' => Some(VariableType::Environment),
            _ => None,
        }
    }

    pub fn sigil(&self) -> char {
        match self {
            VariableType::Scalar => '$',
            VariableType::List => '@',
            VariableType::Dictionary => '&',
            VariableType::Environment => '%',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeKind {
    Root,
    Variable(VariableType),
    /// `[...]` following a variable
    Index,
    /// `{...}` inside a variable, used by inline python expressions
    Group,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExpressionNode {
    pub kind: NodeKind,
    pub start: usize,
    pub end: usize,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    /// Never closed, or closed implicitly by an outer terminator
    pub invalid: bool,
    /// Set on variables whose merged index is not closed
    pub unclosed_index: bool,
    /// End of the variable itself, before any merged index
    pub index_start: Option<usize>,
    /// Removed from the tree; its children were handed to its parent
    pub dissolved: bool,
}

impl ExpressionNode {
    fn new(kind: NodeKind, start: usize, parent: Option<NodeId>) -> Self {
        Self {
            kind,
            start,
            end: start,
            parent,
            children: Vec::new(),
            invalid: false,
            unclosed_index: false,
            index_start: None,
            dissolved: false,
        }
    }

    pub fn span(&self) -> Range<usize> {
        self.start..self.end
    }

    pub fn is_variable(&self) -> bool {
        matches!(self.kind, NodeKind::Variable(_))
    }
}

/// Tree over the text of one cell
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExpressionTree {
    text: String,
    origin: Position,
    modern: bool,
    nodes: Vec<ExpressionNode>,
}

impl ExpressionTree {
    pub(crate) fn new(text: &str, origin: Position, modern: bool) -> Self {
        let mut root = ExpressionNode::new(NodeKind::Root, 0, None);
        root.end = text.len();
        Self {
            text: text.to_string(),
            origin,
            modern,
            nodes: vec![root],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether the tree was built with `{...}` groups and python expressions.
    pub fn is_modern(&self) -> bool {
        self.modern
    }

    pub fn node(&self, id: NodeId) -> &ExpressionNode {
        &self.nodes[id.0]
    }

    pub fn node_text(&self, id: NodeId) -> &str {
        let node = self.node(id);
        &self.text[node.start..node.end]
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    /// Nodes still in the tree, parents before children.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut found = Vec::new();
        let mut pending: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(next) = pending.pop() {
            found.push(next);
            pending.extend(self.children(next).iter().rev().copied());
        }
        found
    }

    /// File region of a span, for trees built from a token.
    pub fn region_of(&self, span: Range<usize>) -> Region {
        let start = self.origin.advance(&self.text[..span.start]);
        let end = start.advance(&self.text[span]);
        Region::new(start, end)
    }

    /// Pieces of `id`'s span not covered by its children.
    pub fn own_text(&self, id: NodeId) -> Vec<(usize, &str)> {
        let node = self.node(id);
        let mut pieces = Vec::new();
        let mut cursor = node.start;
        for child in &node.children {
            let child = self.node(*child);
            if child.start > cursor {
                pieces.push((cursor, &self.text[cursor..child.start]));
            }
            cursor = cursor.max(child.end);
        }
        if node.end > cursor {
            pieces.push((cursor, &self.text[cursor..node.end]));
        }
        pieces
    }

    pub(crate) fn open(&mut self, kind: NodeKind, start: usize, parent: NodeId) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(ExpressionNode::new(kind, start, Some(parent)));
        self.nodes[parent.0].children.push(id);
        id
    }

    pub(crate) fn close(&mut self, id: NodeId, end: usize, invalid: bool) {
        let node = &mut self.nodes[id.0];
        node.end = end;
        node.invalid = invalid;
    }

    /// Remove `id` from the tree, handing its children to its parent in its place.
    pub(crate) fn dissolve(&mut self, id: NodeId) {
        let Some(parent) = self.nodes[id.0].parent else {
            return;
        };
        let children = std::mem::take(&mut self.nodes[id.0].children);
        for child in &children {
            self.nodes[child.0].parent = Some(parent);
        }
        let siblings = &mut self.nodes[parent.0].children;
        if let Some(at) = siblings.iter().position(|s| *s == id) {
            siblings.splice(at..=at, children);
        }
        let node = &mut self.nodes[id.0];
        node.dissolved = true;
        node.parent = None;
    }

    /// Merge indexes into the variables they directly follow and dissolve stray ones.
    pub(crate) fn attach_indexes(&mut self) {
        self.attach_indexes_under(self.root());
    }

    fn attach_indexes_under(&mut self, id: NodeId) {
        let children = self.nodes[id.0].children.clone();
        for child in &children {
            self.attach_indexes_under(*child);
        }

        let mut kept: Vec<NodeId> = Vec::new();
        for child in children {
            if self.nodes[child.0].kind != NodeKind::Index {
                kept.push(child);
                continue;
            }
            let (start, end, invalid) = {
                let node = &self.nodes[child.0];
                (node.start, node.end, node.invalid)
            };
            match kept.last().copied() {
                Some(variable)
                    if self.nodes[variable.0].is_variable()
                        && !self.nodes[variable.0].invalid
                        && self.nodes[variable.0].end == start =>
                {
                    let owner = &mut self.nodes[variable.0];
                    owner.index_start.get_or_insert(start);
                    owner.end = end;
                    owner.children.push(child);
                    if invalid {
                        owner.invalid = true;
                        owner.unclosed_index = true;
                    }
                    self.nodes[child.0].parent = Some(variable);
                }
                _ => {
                    kept.extend(self.nodes[child.0].children.iter().copied());
                    for grandchild in self.nodes[child.0].children.clone() {
                        self.nodes[grandchild.0].parent = Some(id);
                    }
                    let node = &mut self.nodes[child.0];
                    node.children.clear();
                    node.dissolved = true;
                    node.parent = None;
                }
            }
        }
        self.nodes[id.0].children = kept;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dissolve_hands_children_to_parent() {
        let mut tree = ExpressionTree::new("[${x}]", Position::default(), false);
        let root = tree.root();
        let bracket = tree.open(NodeKind::Index, 0, root);
        let variable = tree.open(NodeKind::Variable(VariableType::Scalar), 1, bracket);
        tree.close(variable, 5, false);
        tree.dissolve(bracket);

        assert_eq!(tree.children(root), &[variable]);
        assert_eq!(tree.node(variable).parent, Some(root));
        assert!(tree.node(bracket).dissolved);
    }

    #[test]
    fn test_own_text_skips_children() {
        let mut tree = ExpressionTree::new("a${b}c", Position::default(), true);
        let root = tree.root();
        let variable = tree.open(NodeKind::Variable(VariableType::Scalar), 1, root);
        tree.close(variable, 5, false);
        assert_eq!(tree.own_text(root), vec![(0, "a"), (5, "c")]);
    }

    #[test]
    fn test_region_of_uses_origin() {
        let tree = ExpressionTree::new("ab${x}", Position::new(3, 4, 40), true);
        let region = tree.region_of(2..6);
        assert_eq!(region.start, Position::new(3, 6, 42));
        assert_eq!(region.end, Position::new(3, 10, 46));
    }
}
