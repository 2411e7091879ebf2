//! Catch-all mappers
//!
//! These come last in the chain. Together they guarantee that every cell is claimed.

use super::{keep, tag, Mapper};
use crate::robot::model::{Document, ProblemCause};
use crate::robot::parsing::resolver::Cell;
use crate::robot::parsing::state::{ParsingStack, ParsingState};
use crate::robot::token::{TableKind, TokenType};

/// Content of comment tables and of tables with unknown names
pub struct TableContentMapper;

impl Mapper for TableContentMapper {
    fn can_map(&self, states: &ParsingStack, _document: &Document, _cell: &Cell) -> bool {
        states.in_unknown_table() || states.current_table() == Some(TableKind::Comments)
    }

    fn map(&self, states: &mut ParsingStack, document: &mut Document, cell: &Cell) -> ParsingState {
        if states.in_unknown_table() {
            tag(document, cell.id, TokenType::Unknown);
            return ParsingState::Trash;
        }
        tag(document, cell.id, TokenType::CommentTableContent);
        keep(states)
    }
}

/// Anything else. Data before the first table is reported once per line.
pub struct TrashMapper;

impl Mapper for TrashMapper {
    fn can_map(&self, _states: &ParsingStack, _document: &Document, _cell: &Cell) -> bool {
        true
    }

    fn map(&self, states: &mut ParsingStack, document: &mut Document, cell: &Cell) -> ParsingState {
        tracing::trace!(position = %cell.position, text = %cell.text, "trash");
        tag(document, cell.id, TokenType::Unknown);
        if !states.in_any_table() && states.top() != Some(ParsingState::Trash) {
            document.add_problem(cell.id, ProblemCause::DataOutsideTable);
        }
        ParsingState::Trash
    }
}
