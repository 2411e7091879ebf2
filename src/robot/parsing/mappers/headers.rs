//! Table headers and header columns

use super::{keep, mark_deprecated, tag, Mapper};
use crate::robot::model::{Document, ProblemCause, TableHeader};
use crate::robot::parsing::recognizers::{self, HeaderKind};
use crate::robot::parsing::resolver::Cell;
use crate::robot::parsing::state::{ParsingStack, ParsingState};
use crate::robot::token::TokenType;

/// `*** Settings ***` and friends, in the first column.
///
/// A header always resets the parsing context, whatever was open before.
pub struct TableHeaderMapper;

impl Mapper for TableHeaderMapper {
    fn can_map(&self, _states: &ParsingStack, document: &Document, cell: &Cell) -> bool {
        cell.is_really_first() && recognizers::table_header(&cell.text, document.version).is_some()
    }

    fn map(&self, states: &mut ParsingStack, document: &mut Document, cell: &Cell) -> ParsingState {
        states.clear();
        let Some(recognized) = recognizers::table_header(&cell.text, document.version) else {
            return ParsingState::Trash;
        };
        match recognized.kind {
            HeaderKind::Known(kind) => {
                tracing::debug!(line = cell.position.line, table = %kind, "entering table");
                tag(document, cell.id, TokenType::TableHeader(kind));
                mark_deprecated(document, cell.id, recognized.deprecated);
                if let Some(table) = document.table_mut_or_insert(kind) {
                    table
                        .headers_mut()
                        .push(TableHeader::new(cell.id, cell.position));
                }
                ParsingState::TableHeader(kind)
            }
            HeaderKind::TasksNotSupported => {
                tracing::debug!(line = cell.position.line, version = %document.version, "tasks table not supported");
                tag(document, cell.id, TokenType::UnknownTableHeader);
                document.add_problem(cell.id, ProblemCause::TasksTableNotSupported);
                ParsingState::UnknownTableHeader
            }
            HeaderKind::Unknown => {
                tracing::debug!(line = cell.position.line, header = %cell.text, "entering unknown table");
                tag(document, cell.id, TokenType::UnknownTableHeader);
                document.add_problem(cell.id, ProblemCause::UnknownTable);
                ParsingState::UnknownTableHeader
            }
        }
    }
}

/// Cells following a header on its line.
pub struct HeaderColumnMapper;

impl Mapper for HeaderColumnMapper {
    fn can_map(&self, states: &ParsingStack, _document: &Document, _cell: &Cell) -> bool {
        states.top().is_some_and(|s| s.is_header())
    }

    fn map(&self, states: &mut ParsingStack, document: &mut Document, cell: &Cell) -> ParsingState {
        tag(document, cell.id, TokenType::TableHeaderColumn);
        if let Some(ParsingState::TableHeader(kind)) = states.top() {
            if let Some(header) = document
                .table_mut_or_insert(kind)
                .and_then(|table| table.headers_mut().last_mut())
            {
                header.columns.push(cell.id);
            }
        }
        keep(states)
    }
}
