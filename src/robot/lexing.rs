//! Lexer
//!
//!     This module turns source text into [`RobotLine`]s. Lexing is lossless: the text of
//!     every cell token, separator and end-of-line marker of every line, concatenated in
//!     order, is the original source, byte for byte. Nothing here can fail; content that
//!     means nothing special is simply a cell.
//!
//! The Lexing Pipeline
//!
//!     1. Physical lines are split off with their terminators. See [lines].
//!
//!     2. Each line is cut into cells and separators by the splitter matching its
//!        convention. See [separators]. In pipe syntax, lines that do not start with a pipe
//!        fall back to whitespace separators.
//!
//!     3. Each cell becomes a [`RobotToken`] with a [`LexicalKind`] computed from its text
//!        alone. Semantic tags are left empty; the mapper chain assigns them.
//!
//! Positions
//!
//!     Lines are numbered from 1, columns count chars from 0 and offsets count bytes from
//!     the start of the file. A byte order mark at the start of the file is kept as a
//!     separator element of the first line and does not shift the column of what follows.

pub mod lines;
pub mod separators;

use crate::robot::range::Position;
use crate::robot::token::line::SeparatorSyntax;
use crate::robot::token::{
    EndOfLine, LexicalKind, LineElement, RobotLine, RobotToken, Separator, SeparatorKind,
};
use once_cell::sync::Lazy;
use regex::Regex;
use separators::{CellSplitter, Piece, PipeSplitter, SpaceSplitter};

const BOM: char = '\u{feff}';

impl SeparatorSyntax {
    /// Pipe syntax when the first non-blank line is a pipe line, space syntax otherwise.
    pub fn detect(source: &str) -> Self {
        let first = lines::split_lines(source)
            .into_iter()
            .map(|line| line.text.trim_start_matches(BOM))
            .find(|text| !text.trim().is_empty());
        match first {
            Some(text) if separators::is_pipe_line(text) => SeparatorSyntax::Pipe,
            _ => SeparatorSyntax::Space,
        }
    }
}

/// Lex a whole file.
pub fn lex(source: &str, syntax: SeparatorSyntax) -> Vec<RobotLine> {
    lines::split_lines(source)
        .into_iter()
        .enumerate()
        .map(|(index, physical)| lex_line(physical, index + 1, syntax))
        .collect()
}

fn lex_line(physical: lines::PhysicalLine<'_>, number: usize, syntax: SeparatorSyntax) -> RobotLine {
    let mut elements = Vec::new();
    let mut position = Position::new(number, 0, physical.offset);
    let mut text = physical.text;

    if number == 1 && text.starts_with(BOM) {
        let bom = &text[..BOM.len_utf8()];
        elements.push(LineElement::Separator(Separator {
            kind: SeparatorKind::ByteOrderMark,
            text: bom.to_string(),
            position,
        }));
        position.offset += bom.len();
        text = &text[bom.len()..];
    }

    let line_syntax = match syntax {
        SeparatorSyntax::Pipe if separators::is_pipe_line(text) => SeparatorSyntax::Pipe,
        _ => SeparatorSyntax::Space,
    };
    let pieces = match line_syntax {
        SeparatorSyntax::Pipe => PipeSplitter.split(text),
        SeparatorSyntax::Space => SpaceSplitter.split(text),
    };

    for piece in pieces {
        let element = match piece {
            Piece::Cell(range) => LineElement::Token(RobotToken::new(&text[range], position)),
            Piece::Separator(kind, range) => LineElement::Separator(Separator {
                kind,
                text: text[range].to_string(),
                position,
            }),
        };
        position = position.advance(element.text());
        elements.push(element);
    }

    RobotLine {
        number,
        syntax: line_syntax,
        elements,
        end_of_line: EndOfLine {
            kind: physical.eol,
            position,
        },
    }
}

static VARIABLE_LITERAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[$@&%]\{[^{}]*\}$").expect("valid regex"));
static NUMBER_LITERAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?\d+(\.\d+)?$").expect("valid regex"));

/// Lexical kind of a cell, from its text alone.
pub fn classify_cell(text: &str) -> LexicalKind {
    if text.is_empty() || text == "\\" {
        LexicalKind::EmptyCellMarker
    } else if text.starts_with('#') {
        LexicalKind::CommentStart
    } else if text == "..." {
        LexicalKind::ContinuationMarker
    } else if VARIABLE_LITERAL.is_match(text) {
        LexicalKind::VariableLiteral
    } else if NUMBER_LITERAL.is_match(text) {
        LexicalKind::NumberLiteral
    } else {
        LexicalKind::Word
    }
}

/// Reassemble source text from lexed lines.
pub fn unlex(lines: &[RobotLine]) -> String {
    lines.iter().map(RobotLine::text).collect()
}
