//! Variable syntax checks
//!
//!     Modern syntax reports variables and indexes that were never terminated, suggesting
//!     the text with the missing terminator appended. Legacy syntax reports names that are
//!     empty or contain stray braces, suggesting the name without them.

use super::ast::NodeKind;
use super::uses::VariableUse;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VariableSyntaxError {
    #[error("variable '{text}' is missing its closing '}}'")]
    MissingClosingBrace { text: String, fix: String },

    #[error("index of variable '{text}' is missing its closing ']'")]
    MissingClosingBracket { text: String, fix: String },

    #[error("invalid variable name '{text}'")]
    InvalidName { text: String, fix: Option<String> },
}

impl VariableSyntaxError {
    pub fn text(&self) -> &str {
        match self {
            VariableSyntaxError::MissingClosingBrace { text, .. }
            | VariableSyntaxError::MissingClosingBracket { text, .. }
            | VariableSyntaxError::InvalidName { text, .. } => text,
        }
    }

    /// Suggested replacement for the offending text.
    pub fn fix(&self) -> Option<&str> {
        match self {
            VariableSyntaxError::MissingClosingBrace { fix, .. }
            | VariableSyntaxError::MissingClosingBracket { fix, .. } => Some(fix),
            VariableSyntaxError::InvalidName { fix, .. } => fix.as_deref(),
        }
    }
}

pub(crate) fn validate_modern(variable: &VariableUse<'_>) -> Result<(), VariableSyntaxError> {
    if !variable.is_invalid() {
        return Ok(());
    }
    let text = variable.text().to_string();
    let node = variable.tree().node(variable.id());
    if node.unclosed_index {
        let fix = format!("{text}]");
        return Err(VariableSyntaxError::MissingClosingBracket { text, fix });
    }
    let fix = format!("{text}}}");
    Err(VariableSyntaxError::MissingClosingBrace { text, fix })
}

pub(crate) fn validate_legacy(variable: &VariableUse<'_>) -> Result<(), VariableSyntaxError> {
    let tree = variable.tree();
    let node = tree.node(variable.id());
    let body_end = node.index_start.unwrap_or(node.end).saturating_sub(1);
    let body_start = (node.start + 2).min(body_end);

    // Braces in the name itself; nested variables keep theirs.
    let own: Vec<(usize, &str)> = tree
        .own_text(variable.id())
        .into_iter()
        .filter_map(|(at, piece)| {
            let start = at.max(body_start);
            let end = (at + piece.len()).min(body_end);
            (start < end).then(|| (start, &tree.text()[start..end]))
        })
        .collect();
    let has_nested = tree
        .children(variable.id())
        .iter()
        .any(|child| tree.node(*child).kind != NodeKind::Index);
    let own_is_empty = own.iter().all(|(_, piece)| piece.is_empty());
    let has_stray = own.iter().any(|(_, piece)| piece.contains(['{', '}']));

    if !(own_is_empty && !has_nested) && !has_stray {
        return Ok(());
    }

    let text = variable.text().to_string();
    if own_is_empty && !has_nested {
        return Err(VariableSyntaxError::InvalidName { text, fix: None });
    }
    let mut fixed = String::with_capacity(text.len());
    for (at, c) in text.char_indices() {
        let absolute = node.start + at;
        let stray = (c == '{' || c == '}')
            && own
                .iter()
                .any(|(start, piece)| (*start..*start + piece.len()).contains(&absolute));
        if !stray {
            fixed.push(c);
        }
    }
    Err(VariableSyntaxError::InvalidName {
        text,
        fix: Some(fixed),
    })
}
