//! Tree builders
//!
//!     Both builders scan the text once, char by char, keeping the chain of open nodes.
//!     `\` escapes exactly the next char. A sigil (`$`, `@`, `&`, `%`) followed by `{` opens
//!     a variable.
//!
//!     Modern: `{` inside a variable opens a group and `}` closes the nearest open variable
//!     or group. `[` opens an index only right after a closed variable or index; `]` closes
//!     the nearest open index. Open nodes skipped by a terminator, and nodes still open at
//!     the end of the text, are kept and marked invalid.
//!
//!     Legacy: there are no groups and every `[` opens a bracket. `}` closes the nearest
//!     open variable and `]` the nearest open bracket. Skipped and unterminated nodes are
//!     dissolved back into plain text.
//!
//!     Afterwards indexes directly following a variable are merged into it and all other
//!     indexes become text again.

use super::ast::{ExpressionTree, NodeId, NodeKind, VariableType};
use crate::robot::range::Position;

pub(crate) fn build_modern(text: &str, origin: Position) -> ExpressionTree {
    let mut tree = ExpressionTree::new(text, origin, true);
    let mut open: Vec<NodeId> = vec![tree.root()];
    let mut last_closed: Option<NodeId> = None;
    let mut escaped = false;
    let mut chars = text.char_indices().peekable();

    while let Some((at, c)) = chars.next() {
        let closed_before = last_closed.take();
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            _ if opens_variable(c, chars.peek().map(|(_, n)| *n)) => {
                chars.next();
                let kind = NodeKind::Variable(sigil_type(c));
                let id = tree.open(kind, at, current(&open));
                open.push(id);
            }
            '{' if open.iter().any(|n| tree.node(*n).is_variable()) => {
                let id = tree.open(NodeKind::Group, at, current(&open));
                open.push(id);
            }
            '[' if closed_before.is_some_and(|n| may_take_index(&tree, n, at, current(&open))) => {
                let id = tree.open(NodeKind::Index, at, current(&open));
                open.push(id);
            }
            '}' => {
                let target = nearest(&tree, &open, |k| {
                    matches!(k, NodeKind::Variable(_) | NodeKind::Group)
                });
                if let Some(depth) = target {
                    last_closed = Some(close_modern(&mut tree, &mut open, depth, at));
                }
            }
            ']' => {
                if let Some(depth) = nearest(&tree, &open, |k| k == NodeKind::Index) {
                    last_closed = Some(close_modern(&mut tree, &mut open, depth, at));
                }
            }
            _ => {}
        }
    }

    while open.len() > 1 {
        if let Some(id) = open.pop() {
            tree.close(id, text.len(), true);
        }
    }
    tree.attach_indexes();
    tree
}

pub(crate) fn build_legacy(text: &str, origin: Position) -> ExpressionTree {
    let mut tree = ExpressionTree::new(text, origin, false);
    let mut open: Vec<NodeId> = vec![tree.root()];
    let mut escaped = false;
    let mut chars = text.char_indices().peekable();

    while let Some((at, c)) = chars.next() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            _ if opens_variable(c, chars.peek().map(|(_, n)| *n)) => {
                chars.next();
                let kind = NodeKind::Variable(sigil_type(c));
                let id = tree.open(kind, at, current(&open));
                open.push(id);
            }
            '[' => {
                let id = tree.open(NodeKind::Index, at, current(&open));
                open.push(id);
            }
            '}' => {
                if let Some(depth) = nearest(&tree, &open, |k| matches!(k, NodeKind::Variable(_))) {
                    close_legacy(&mut tree, &mut open, depth, at);
                }
            }
            ']' => {
                if let Some(depth) = nearest(&tree, &open, |k| k == NodeKind::Index) {
                    close_legacy(&mut tree, &mut open, depth, at);
                }
            }
            _ => {}
        }
    }

    while open.len() > 1 {
        if let Some(id) = open.pop() {
            tree.dissolve(id);
        }
    }
    tree.attach_indexes();
    tree
}

fn opens_variable(c: char, next: Option<char>) -> bool {
    VariableType::from_sigil(c).is_some() && next == Some('{')
}

fn sigil_type(c: char) -> VariableType {
    VariableType::from_sigil(c).unwrap_or(VariableType::Scalar)
}

fn current(open: &[NodeId]) -> NodeId {
    open.last().copied().unwrap_or(NodeId(0))
}

/// `[` at `at` continues `closed` when both sit in the same parent without a gap.
fn may_take_index(tree: &ExpressionTree, closed: NodeId, at: usize, parent: NodeId) -> bool {
    let node = tree.node(closed);
    matches!(node.kind, NodeKind::Variable(_) | NodeKind::Index)
        && node.end == at
        && node.parent == Some(parent)
}

/// Depth in `open` of the innermost node matching `accepts`, the root excluded.
fn nearest(tree: &ExpressionTree, open: &[NodeId], accepts: impl Fn(NodeKind) -> bool) -> Option<usize> {
    (1..open.len()).rev().find(|depth| accepts(tree.node(open[*depth]).kind))
}

fn close_modern(tree: &mut ExpressionTree, open: &mut Vec<NodeId>, depth: usize, at: usize) -> NodeId {
    while open.len() > depth + 1 {
        if let Some(skipped) = open.pop() {
            tree.close(skipped, at, true);
        }
    }
    let target = open.pop().unwrap_or(NodeId(0));
    tree.close(target, at + 1, false);
    target
}

fn close_legacy(tree: &mut ExpressionTree, open: &mut Vec<NodeId>, depth: usize, at: usize) {
    while open.len() > depth + 1 {
        if let Some(skipped) = open.pop() {
            tree.dissolve(skipped);
        }
    }
    if let Some(target) = open.pop() {
        tree.close(target, at + 1, false);
    }
}
