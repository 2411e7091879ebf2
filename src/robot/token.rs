//! Tokens
//!
//!     A token is one cell of a line: its raw text, exactly as it appears in the file, its
//!     position, a lexical kind and the semantic tags added while mapping. Tokens are owned
//!     by the [`RobotLine`] that contains them. Model elements refer to them through
//!     [`TokenId`] handles, so that tags and text can be refined in one place while the line
//!     stays the source of truth for serialization.

pub mod line;
pub mod types;

pub use line::{EndOfLine, EolKind, LineElement, RobotLine, Separator, SeparatorKind};
pub use types::{
    LexicalKind, LocalSettingKind, SettingKind, TableKind, TokenType, UnitKind, VariableKind,
};

use crate::robot::range::{Position, Region};
use serde::Serialize;

/// Handle of a token: index of its line in the document and of the element in that line
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct TokenId {
    pub line: usize,
    pub element: usize,
}

impl TokenId {
    pub fn new(line: usize, element: usize) -> Self {
        Self { line, element }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RobotToken {
    text: String,
    lexical: LexicalKind,
    types: Vec<TokenType>,
    position: Position,
}

impl RobotToken {
    pub fn new(text: impl Into<String>, position: Position) -> Self {
        let text = text.into();
        let lexical = crate::robot::lexing::classify_cell(&text);
        Self {
            text,
            lexical,
            types: Vec::new(),
            position,
        }
    }

    /// A detached token, positioned at the start of a file. Used by callers that analyze
    /// a single cell outside of any document.
    pub fn detached(text: impl Into<String>) -> Self {
        Self::new(text, Position::default())
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn lexical(&self) -> LexicalKind {
        self.lexical
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn region(&self) -> Region {
        Region::of_text(self.position, &self.text)
    }

    pub fn types(&self) -> &[TokenType] {
        &self.types
    }

    /// The tag assigned by the claiming mapper, `Unknown` for unclaimed tokens.
    pub fn primary_type(&self) -> TokenType {
        self.types.first().copied().unwrap_or(TokenType::Unknown)
    }

    pub fn has_type(&self, token_type: TokenType) -> bool {
        self.types.contains(&token_type)
    }

    /// Replace all tags, making `primary` the first one.
    pub fn set_type(&mut self, primary: TokenType) {
        self.types.clear();
        self.types.push(primary);
    }

    pub fn add_type(&mut self, token_type: TokenType) {
        if !self.has_type(token_type) {
            self.types.push(token_type);
        }
    }

    pub fn is_empty_cell(&self) -> bool {
        self.lexical == LexicalKind::EmptyCellMarker
    }

    pub(crate) fn set_text(&mut self, text: String) {
        self.lexical = crate::robot::lexing::classify_cell(&text);
        self.text = text;
    }

    pub(crate) fn set_position(&mut self, position: Position) {
        self.position = position;
    }
}
