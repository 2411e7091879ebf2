//! Views over variable nodes and the queries that produce them

use super::ast::{ExpressionTree, NodeId, NodeKind, VariableType};
use crate::robot::range::Region;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::collections::HashSet;
use std::fmt;
use std::ops::Range;

static NUMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*[+-]?(\d[\d_]*(\.\d*)?([eE][+-]?\d+)?|0[xX][0-9a-fA-F]+|0[oO][0-7]+|0[bB][01]+)\s*$")
        .expect("valid regex")
});

/// One variable occurrence inside a cell
#[derive(Clone, Copy)]
pub struct VariableUse<'t> {
    tree: &'t ExpressionTree,
    id: NodeId,
}

impl<'t> VariableUse<'t> {
    pub(crate) fn new(tree: &'t ExpressionTree, id: NodeId) -> Self {
        Self { tree, id }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn tree(&self) -> &'t ExpressionTree {
        self.tree
    }

    pub fn variable_type(&self) -> VariableType {
        match self.tree.node(self.id).kind {
            NodeKind::Variable(kind) => kind,
            _ => VariableType::Scalar,
        }
    }

    /// Byte span within the cell text, index included.
    pub fn span(&self) -> Range<usize> {
        self.tree.node(self.id).span()
    }

    pub fn region(&self) -> Region {
        self.tree.region_of(self.span())
    }

    pub fn text(&self) -> &'t str {
        self.tree.node_text(self.id)
    }

    /// Text between `{` and the closing `}` (or the end of the variable when unclosed).
    pub fn body(&self) -> &'t str {
        &self.tree.text()[self.body_span()]
    }

    fn body_span(&self) -> Range<usize> {
        let node = self.tree.node(self.id);
        let own_end = node.index_start.unwrap_or(node.end);
        let closed = !node.invalid || node.unclosed_index;
        let end = if closed { own_end.saturating_sub(1) } else { own_end };
        let start = (node.start + 2).min(end);
        start..end
    }

    /// Leading identifier part of the body: letters, digits, `_` and spaces.
    pub fn base_name(&self) -> &'t str {
        let body = self.body();
        let end = body
            .char_indices()
            .find(|(_, c)| !(c.is_alphanumeric() || *c == '_' || *c == ' '))
            .map(|(at, _)| at)
            .unwrap_or(body.len());
        &body[..end]
    }

    pub fn is_invalid(&self) -> bool {
        self.tree.node(self.id).invalid
    }

    /// Whether an index accessor follows the variable.
    pub fn is_indexed(&self) -> bool {
        let node = self.tree.node(self.id);
        node.index_start.is_some_and(|start| node.end > start)
    }

    /// Whether the name contains another variable before any `[` of the body.
    pub fn is_dynamic(&self) -> bool {
        let body = self.body_span();
        let first_bracket = self
            .tree
            .own_text(self.id)
            .into_iter()
            .filter(|(at, _)| *at < body.end)
            .find_map(|(at, piece)| {
                piece
                    .find('[')
                    .map(|offset| at + offset)
                    .filter(|bracket| body.contains(bracket))
            })
            .unwrap_or(usize::MAX);
        self.tree
            .children(self.id)
            .iter()
            .map(|child| self.tree.node(*child))
            .any(|child| child.is_variable() && child.start < first_bracket)
    }

    /// A variable whose body is exactly one `{...}` group, such as `${{1+2}}`.
    pub fn is_python_expression(&self) -> bool {
        python_group(self.tree, self.id).is_some()
    }

    fn has_plain_body(&self) -> bool {
        !self.is_invalid()
            && !self.is_indexed()
            && self.tree.children(self.id).is_empty()
            && !self.body().contains('[')
    }

    /// The cell is this variable and nothing else.
    pub fn is_plain_variable(&self) -> bool {
        self.span() == (0..self.tree.text().len()) && self.has_plain_body()
    }

    /// The cell is this variable, optionally followed by `=` or ` =`.
    pub fn is_plain_variable_assign(&self) -> bool {
        let span = self.span();
        let rest = &self.tree.text()[span.end..];
        span.start == 0 && matches!(rest, "" | "=" | " =") && self.has_plain_body()
    }

    /// Whether the variable is known. Numbers and environment variables always are;
    /// other names are looked up in `definitions` under all three sigils, the names there
    /// being normalized with [`normalize_variable_name`].
    pub fn is_defined_in(&self, definitions: &HashSet<String>) -> bool {
        if self.variable_type() == VariableType::Environment {
            return true;
        }
        let base = self.base_name();
        if NUMBER.is_match(self.body()) || (!base.is_empty() && base.chars().all(|c| c.is_ascii_digit())) {
            return true;
        }
        let name = normalize_name(base);
        ['$', '@', '&']
            .iter()
            .any(|sigil| definitions.contains(&format!("{sigil}{{{name}}}")))
    }
}

impl fmt::Debug for VariableUse<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VariableUse")
            .field("span", &self.span())
            .field("text", &self.text())
            .finish()
    }
}

impl PartialEq for VariableUse<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.id == other.id
    }
}

impl Serialize for VariableUse<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("VariableUse", 8)?;
        state.serialize_field("span", &self.span())?;
        state.serialize_field("text", self.text())?;
        state.serialize_field("type", &self.variable_type())?;
        state.serialize_field("base_name", self.base_name())?;
        state.serialize_field("dynamic", &self.is_dynamic())?;
        state.serialize_field("indexed", &self.is_indexed())?;
        state.serialize_field("invalid", &self.is_invalid())?;
        state.serialize_field("plain", &self.is_plain_variable())?;
        state.end()
    }
}

/// Inline python expression such as `${{len($list) + 1}}`
#[derive(Clone, Copy)]
pub struct PythonExpression<'t> {
    tree: &'t ExpressionTree,
    id: NodeId,
    group: NodeId,
}

impl<'t> PythonExpression<'t> {
    pub fn span(&self) -> Range<usize> {
        self.tree.node(self.id).span()
    }

    pub fn region(&self) -> Region {
        self.tree.region_of(self.span())
    }

    pub fn text(&self) -> &'t str {
        self.tree.node_text(self.id)
    }

    /// Code between the inner braces.
    pub fn expression(&self) -> &'t str {
        let group = self.tree.node(self.group);
        &self.tree.text()[group.start + 1..group.end - 1]
    }

    pub fn variable_type(&self) -> VariableType {
        VariableUse::new(self.tree, self.id).variable_type()
    }
}

impl fmt::Debug for PythonExpression<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PythonExpression")
            .field("span", &self.span())
            .field("expression", &self.expression())
            .finish()
    }
}

impl Serialize for PythonExpression<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("PythonExpression", 3)?;
        state.serialize_field("span", &self.span())?;
        state.serialize_field("expression", self.expression())?;
        state.serialize_field("type", &self.variable_type())?;
        state.end()
    }
}

/// Top-level piece of a cell
#[derive(Debug, Clone, Copy)]
pub enum ExpressionPart<'t> {
    Text { span: (usize, usize), text: &'t str },
    Variable(VariableUse<'t>),
    Python(PythonExpression<'t>),
}

impl ExpressionPart<'_> {
    pub fn span(&self) -> Range<usize> {
        match self {
            ExpressionPart::Text { span, .. } => span.0..span.1,
            ExpressionPart::Variable(variable) => variable.span(),
            ExpressionPart::Python(python) => python.span(),
        }
    }
}

fn python_group(tree: &ExpressionTree, id: NodeId) -> Option<NodeId> {
    let node = tree.node(id);
    if !tree.is_modern() || !node.is_variable() || node.invalid || node.index_start.is_some() {
        return None;
    }
    match node.children.as_slice() {
        [group] => {
            let inner = tree.node(*group);
            let whole_body = inner.start == node.start + 2 && inner.end + 1 == node.end;
            (inner.kind == NodeKind::Group && !inner.invalid && whole_body).then_some(*group)
        }
        _ => None,
    }
}

impl ExpressionTree {
    /// Every variable at any depth, in text order, python expressions excluded.
    pub fn variables(&self) -> Vec<VariableUse<'_>> {
        self.descendants(self.root())
            .into_iter()
            .filter(|id| self.node(*id).is_variable() && python_group(self, *id).is_none())
            .map(|id| VariableUse::new(self, id))
            .collect()
    }

    /// Variables whose identity is known from the text alone: neither dynamic nor invalid.
    pub fn defined_uses(&self) -> Vec<VariableUse<'_>> {
        self.variables()
            .into_iter()
            .filter(|variable| !variable.is_dynamic() && !variable.is_invalid())
            .collect()
    }

    pub fn python_expressions(&self) -> Vec<PythonExpression<'_>> {
        self.descendants(self.root())
            .into_iter()
            .filter_map(|id| python_group(self, id).map(|group| PythonExpression { tree: self, id, group }))
            .collect()
    }

    /// Text, variables and python expressions at the top level, covering the whole text.
    pub fn parts(&self) -> Vec<ExpressionPart<'_>> {
        let mut parts = Vec::new();
        let mut cursor = 0;
        for child in self.children(self.root()) {
            let node = self.node(*child);
            if node.start > cursor {
                parts.push(text_part(self, cursor, node.start));
            }
            match python_group(self, *child) {
                Some(group) => parts.push(ExpressionPart::Python(PythonExpression {
                    tree: self,
                    id: *child,
                    group,
                })),
                None => parts.push(ExpressionPart::Variable(VariableUse::new(self, *child))),
            }
            cursor = node.end;
        }
        if self.text().len() > cursor {
            parts.push(text_part(self, cursor, self.text().len()));
        }
        parts
    }
}

fn text_part(tree: &ExpressionTree, start: usize, end: usize) -> ExpressionPart<'_> {
    ExpressionPart::Text {
        span: (start, end),
        text: &tree.text()[start..end],
    }
}

fn normalize_name(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Canonical form of a variable definition such as `${My Var} =`, for
/// [`VariableUse::is_defined_in`] lookups.
pub fn normalize_variable_name(definition: &str) -> String {
    let trimmed = definition.trim().trim_end_matches('=').trim_end();
    normalize_name(trimmed)
}
