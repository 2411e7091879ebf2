//! Cell separators
//!
//! Each line is cut into an alternating sequence of cells and separators. Two splitters
//! exist, one per delimiter convention; both only report byte ranges, so the caller can
//! build tokens that reproduce the line exactly.

use crate::robot::token::SeparatorKind;
use logos::Logos;
use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::Range;

/// A piece of a line: either a cell or a separator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Piece {
    Cell(Range<usize>),
    Separator(SeparatorKind, Range<usize>),
}

pub trait CellSplitter {
    /// Split one line (without terminator) into pieces covering it entirely and in order.
    fn split(&self, line: &str) -> Vec<Piece>;
}

/// Raw chunks recognized by logos; the splitter decides which blanks are separators.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
enum Chunk {
    #[regex(r"[ \t]+")]
    Blank,
    #[regex(r"[^ \t]+")]
    Text,
}

/// Two or more spaces, or any whitespace run containing a tab, separate cells.
pub struct SpaceSplitter;

impl CellSplitter for SpaceSplitter {
    fn split(&self, line: &str) -> Vec<Piece> {
        let mut pieces = Vec::new();
        let mut cell_start: Option<usize> = None;
        let mut lexer = Chunk::lexer(line);
        while let Some(chunk) = lexer.next() {
            let span = lexer.span();
            let is_separator = match chunk {
                Ok(Chunk::Blank) => span.len() >= 2 || lexer.slice().contains('\t'),
                _ => false,
            };
            if is_separator {
                if let Some(start) = cell_start.take() {
                    pieces.push(Piece::Cell(start..span.start));
                }
                pieces.push(Piece::Separator(SeparatorKind::Whitespace, span));
            } else if cell_start.is_none() {
                cell_start = Some(span.start);
            }
        }
        if let Some(start) = cell_start {
            pieces.push(Piece::Cell(start..line.len()));
        }
        pieces
    }
}

static PIPE_SEPARATOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]*\|[ \t]*").expect("valid regex"));

/// `| a | b |`: a pipe with whitespace (or line boundaries) on both sides.
///
/// Cells between two adjacent pipes are reported even when empty, since an empty pipe cell
/// is meaningful (for instance an unnamed first column in a test case body).
pub struct PipeSplitter;

impl CellSplitter for PipeSplitter {
    fn split(&self, line: &str) -> Vec<Piece> {
        let mut separators: Vec<Range<usize>> = Vec::new();
        for m in PIPE_SEPARATOR.find_iter(line) {
            let before_ok = m.start() == 0
                || separators.last().is_some_and(|prev| prev.end == m.start())
                || line[m.start()..].starts_with([' ', '\t']);
            let after_ok = m.end() == line.len() || line[..m.end()].ends_with([' ', '\t']);
            if before_ok && after_ok {
                separators.push(m.range());
            }
        }

        let mut pieces = Vec::new();
        let mut cursor = 0;
        for (i, sep) in separators.iter().enumerate() {
            // the text before the very first pipe is a cell only when non-empty
            if sep.start > cursor || i > 0 {
                pieces.push(Piece::Cell(cursor..sep.start));
            }
            pieces.push(Piece::Separator(SeparatorKind::Pipe, sep.clone()));
            cursor = sep.end;
        }
        if cursor < line.len() {
            pieces.push(Piece::Cell(cursor..line.len()));
        }
        pieces
    }
}

/// Whether a line uses the pipe convention: it starts with `|` followed by whitespace or
/// ends right after it.
pub fn is_pipe_line(line: &str) -> bool {
    line == "|" || line.starts_with("| ") || line.starts_with("|\t")
}
