//! Physical lines
//!
//! A [`RobotLine`] owns everything read from one line of the file: cell tokens, the
//! separators between them and the end-of-line marker. Concatenating the text of its
//! elements and the end-of-line marker gives back the original line byte for byte.

use super::{RobotToken, TokenId};
use crate::robot::range::{Position, Region};
use serde::Serialize;

/// Cell delimiter convention
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SeparatorSyntax {
    /// two or more spaces, or a tab
    Space,
    /// `| cell | cell |`
    Pipe,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SeparatorKind {
    Whitespace,
    Pipe,
    ByteOrderMark,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Separator {
    pub kind: SeparatorKind,
    pub text: String,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "element", rename_all = "kebab-case")]
pub enum LineElement {
    Token(RobotToken),
    Separator(Separator),
}

impl LineElement {
    pub fn text(&self) -> &str {
        match self {
            LineElement::Token(token) => token.text(),
            LineElement::Separator(separator) => &separator.text,
        }
    }

    pub fn position(&self) -> Position {
        match self {
            LineElement::Token(token) => token.position(),
            LineElement::Separator(separator) => separator.position,
        }
    }

    pub fn region(&self) -> Region {
        Region::of_text(self.position(), self.text())
    }

    pub fn as_token(&self) -> Option<&RobotToken> {
        match self {
            LineElement::Token(token) => Some(token),
            LineElement::Separator(_) => None,
        }
    }

    pub(crate) fn set_position(&mut self, position: Position) {
        match self {
            LineElement::Token(token) => token.set_position(position),
            LineElement::Separator(separator) => separator.position = position,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EolKind {
    Lf,
    CrLf,
    Cr,
    /// last line without a terminator
    Eof,
}

impl EolKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EolKind::Lf => "\n",
            EolKind::CrLf => "\r\n",
            EolKind::Cr => "\r",
            EolKind::Eof => "",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EndOfLine {
    pub kind: EolKind,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RobotLine {
    /// 1-based line number
    pub number: usize,
    pub syntax: SeparatorSyntax,
    pub elements: Vec<LineElement>,
    pub end_of_line: EndOfLine,
}

impl RobotLine {
    /// Text of the line without its end-of-line marker.
    pub fn content(&self) -> String {
        self.elements.iter().map(LineElement::text).collect()
    }

    /// Text of the line including its end-of-line marker.
    pub fn text(&self) -> String {
        let mut text = self.content();
        text.push_str(self.end_of_line.kind.as_str());
        text
    }

    /// Tokens of this line with their handles; `line_index` is this line's index in the
    /// owning document.
    pub fn tokens(&self, line_index: usize) -> impl Iterator<Item = (TokenId, &RobotToken)> {
        self.elements
            .iter()
            .enumerate()
            .filter_map(move |(i, element)| {
                element
                    .as_token()
                    .map(|token| (TokenId::new(line_index, i), token))
            })
    }

    /// True when the line holds only separators (or nothing at all).
    pub fn is_blank(&self) -> bool {
        self.elements
            .iter()
            .all(|e| matches!(e, LineElement::Separator(_)))
    }

    /// Whether anything other than the byte order mark precedes element `index`.
    pub fn has_leading_separator(&self, index: usize) -> bool {
        self.elements[..index.min(self.elements.len())]
            .iter()
            .any(|e| match e {
                LineElement::Separator(sep) => sep.kind != SeparatorKind::ByteOrderMark,
                LineElement::Token(_) => true,
            })
    }
}
