//! `#` comments
//!
//! A cell starting with `#` turns the rest of its line into comment. The comment is attached
//! to whatever element the line was filling; on a line of its own inside a test case, task or
//! keyword it becomes a row holding only a comment.

use super::{tag, Mapper};
use crate::robot::model::{Document, ExecutableRow, UnitElement};
use crate::robot::parsing::finder;
use crate::robot::parsing::resolver::Cell;
use crate::robot::parsing::state::{ParsingStack, ParsingState};
use crate::robot::token::{LexicalKind, TableKind, TokenId, TokenType};

pub struct CommentMapper;

impl Mapper for CommentMapper {
    fn can_map(&self, states: &ParsingStack, _document: &Document, cell: &Cell) -> bool {
        states.top() == Some(ParsingState::Comment) || cell.lexical == LexicalKind::CommentStart
    }

    fn map(&self, states: &mut ParsingStack, document: &mut Document, cell: &Cell) -> ParsingState {
        let continuing = states.top() == Some(ParsingState::Comment);
        let token_type = if continuing {
            TokenType::CommentContinue
        } else {
            TokenType::StartHashComment
        };
        tag(document, cell.id, token_type);
        attach(states.top_element(), document, cell, continuing);
        ParsingState::Comment
    }
}

fn attach(owner: Option<ParsingState>, document: &mut Document, cell: &Cell, continuing: bool) {
    let id = cell.id;
    match owner {
        Some(ParsingState::TableHeader(kind)) | Some(ParsingState::TableInside(kind)) => {
            header_comment(document, kind, id)
        }
        Some(ParsingState::SettingDeclaration(_))
        | Some(ParsingState::LibraryAlias)
        | Some(ParsingState::LibraryAliasValue) => {
            if let Some(setting) = finder::setting_mut(document) {
                setting.comment.push(id);
            }
        }
        Some(ParsingState::VariableDeclaration) => {
            if let Some(variable) = finder::variable_mut(document) {
                variable.comment.push(id);
            }
        }
        Some(ParsingState::UnitDeclaration(unit)) => {
            let Some(unit) = finder::unit_mut(document, unit, cell.position) else {
                return;
            };
            match unit.elements.last_mut() {
                Some(UnitElement::Row(row)) if continuing => row.comment.push(id),
                _ => unit.elements.push(UnitElement::Row(ExecutableRow {
                    comment: vec![id],
                    ..ExecutableRow::default()
                })),
            }
        }
        Some(ParsingState::LocalSetting(unit, _)) => {
            if let Some(setting) =
                finder::unit_mut(document, unit, cell.position).and_then(|u| u.last_setting_mut())
            {
                setting.comment.push(id);
            }
        }
        Some(ParsingState::Row(unit)) | Some(ParsingState::ActionArguments(unit)) => {
            if let Some(row) =
                finder::unit_mut(document, unit, cell.position).and_then(|u| u.last_row_mut())
            {
                row.comment.push(id);
            }
        }
        _ => {}
    }
}

fn header_comment(document: &mut Document, kind: TableKind, id: TokenId) {
    if let Some(header) = document
        .table_mut_or_insert(kind)
        .and_then(|table| table.headers_mut().last_mut())
    {
        header.comment.push(id);
    }
}

#[cfg(test)]
mod tests {
    use crate::robot::parsing::{parse, ParserOptions};
    use crate::robot::token::{TokenId, TokenType};

    #[test]
    fn test_comment_attaches_to_setting() {
        let doc = parse(
            "*** Settings ***\nLibrary    X    # why    more\n",
            &ParserOptions::default(),
        );
        let setting = &doc.settings.as_ref().unwrap().settings[0];
        assert_eq!(setting.comment, vec![TokenId::new(1, 4), TokenId::new(1, 6)]);
        assert_eq!(doc.token(TokenId::new(1, 4)).unwrap().primary_type(), TokenType::StartHashComment);
        assert_eq!(doc.token(TokenId::new(1, 6)).unwrap().primary_type(), TokenType::CommentContinue);
    }

    #[test]
    fn test_comment_line_in_test_becomes_row() {
        let doc = parse(
            "*** Test Cases ***\nT\n    # note    more\n    Log    x\n",
            &ParserOptions::default(),
        );
        let unit = &doc.test_cases.as_ref().unwrap().units[0];
        let rows: Vec<_> = unit.rows().collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].action, None);
        assert_eq!(rows[0].comment.len(), 2);
        assert!(rows[1].action.is_some());
    }

    #[test]
    fn test_comment_after_header_goes_to_header() {
        let doc = parse("*** Variables ***    # vars\n# alone\n", &ParserOptions::default());
        let header = &doc.variables.as_ref().unwrap().headers[0];
        assert_eq!(header.comment.len(), 2);
        assert!(doc.problems.is_empty());
    }
}
