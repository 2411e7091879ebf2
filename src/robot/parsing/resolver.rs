//! Position resolution
//!
//!     Where a cell sits decides much of what it can be: only the first column names a test
//!     case or keyword, leading empty cells only indent, and a table only takes elements
//!     placed after its most recent header. The [`Cell`] snapshot carries the positional
//!     facts the mappers ask about, so that mappers can mutate the document while looking at
//!     the cell.

use crate::robot::model::Document;
use crate::robot::range::Position;
use crate::robot::token::line::SeparatorSyntax;
use crate::robot::token::{LexicalKind, LineElement, RobotLine, SeparatorKind, TableKind, TokenId};

/// A token being mapped, with its position within the line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub id: TokenId,
    pub text: String,
    pub lexical: LexicalKind,
    pub position: Position,
    /// Index of the cell's column. A whitespace-indented line starts at column 1.
    pub column: usize,
    /// Only empty cells come before this one on the line
    pub after_empty_only: bool,
}

impl Cell {
    pub fn is_empty_marker(&self) -> bool {
        self.lexical == LexicalKind::EmptyCellMarker
    }

    /// Whether the cell is in the first column, the one naming units.
    pub fn is_really_first(&self) -> bool {
        self.column == 0
    }

    /// First cell on its line that is not an empty cell.
    pub fn is_first_meaningful(&self) -> bool {
        self.after_empty_only && !self.is_empty_marker()
    }
}

/// Snapshot the tokens of one line as cells.
pub fn cells_of(line: &RobotLine, line_index: usize) -> Vec<Cell> {
    let indented = line.syntax == SeparatorSyntax::Space
        && line
            .elements
            .iter()
            .find(|e| !matches!(e, LineElement::Separator(s) if s.kind == SeparatorKind::ByteOrderMark))
            .is_some_and(|e| matches!(e, LineElement::Separator(_)));

    let mut column = usize::from(indented);
    let mut after_empty_only = true;
    let mut cells = Vec::new();
    for (id, token) in line.tokens(line_index) {
        cells.push(Cell {
            id,
            text: token.text().to_string(),
            lexical: token.lexical(),
            position: token.position(),
            column,
            after_empty_only,
        });
        column += 1;
        after_empty_only &= token.is_empty_cell();
    }
    cells
}

/// Whether the table of `kind` takes an element at `position`.
pub fn accepts(document: &Document, kind: TableKind, position: Position) -> bool {
    document
        .table(kind)
        .is_some_and(|table| table.accepts(position))
}
