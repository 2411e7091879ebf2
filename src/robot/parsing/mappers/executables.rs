//! Test cases, tasks and keywords
//!
//! The first column names a unit. Every other cell belongs to the open unit: a bracketed
//! local setting with its values, or a row made of optional assignments, an action and its
//! arguments. Rows and settings appearing before any name go to an unnamed unit.

use super::{add_tag, keep, mark_deprecated, tag, Mapper};
use crate::robot::model::{
    Document, ExecutableRow, ExecutableUnit, LocalSetting, ProblemCause, UnitElement,
};
use crate::robot::parsing::resolver::{self, Cell};
use crate::robot::parsing::state::{ParsingStack, ParsingState};
use crate::robot::parsing::{finder, recognizers};
use crate::robot::token::{LocalSettingKind, TableKind, TokenId, TokenType, UnitKind};

/// Unit kind when the parser sits at the start of a body line: right after the table
/// header, or inside a unit with nothing open on the line yet.
fn at_body_start(states: &ParsingStack) -> Option<UnitKind> {
    let unit = states.current_unit_kind()?;
    match states.top()? {
        ParsingState::TableInside(kind) if kind == unit.table() => Some(unit),
        ParsingState::UnitDeclaration(kind) if kind == unit => Some(unit),
        _ => None,
    }
}

/// Make sure the stack says we are inside a unit before opening something in it.
fn enter_unit(states: &mut ParsingStack, unit: UnitKind) {
    if states.top() == Some(ParsingState::TableInside(unit.table())) {
        states.push(ParsingState::UnitDeclaration(unit));
    }
}

/// `true` while the unit is inside an old-style `:FOR` body, where rows start with `\`.
fn in_loop_body(document: &Document, unit: &ExecutableUnit) -> bool {
    unit.rows().last().is_some_and(|row| {
        row.for_continue.is_some()
            || row
                .action
                .and_then(|id| document.token(id))
                .is_some_and(|t| t.has_type(TokenType::ForToken))
    })
}

pub struct UnitNameMapper;

impl Mapper for UnitNameMapper {
    fn can_map(&self, states: &ParsingStack, document: &Document, cell: &Cell) -> bool {
        cell.is_really_first()
            && !cell.is_empty_marker()
            && states
                .current_unit_kind()
                .is_some_and(|unit| resolver::accepts(document, unit.table(), cell.position))
    }

    fn map(&self, states: &mut ParsingStack, document: &mut Document, cell: &Cell) -> ParsingState {
        let Some(unit) = states.current_unit_kind() else {
            return keep(states);
        };
        states.drain_to_table();
        if let Some(table) = document.executable_table_mut(unit) {
            table
                .units
                .push(ExecutableUnit::new(unit, Some(cell.id), cell.position));
        }
        tag(document, cell.id, TokenType::UnitName(unit));
        ParsingState::UnitDeclaration(unit)
    }
}

fn open_local_setting(
    states: &mut ParsingStack,
    document: &mut Document,
    cell: &Cell,
    unit: UnitKind,
    kind: LocalSettingKind,
) -> ParsingState {
    enter_unit(states, unit);
    if let Some(owner) = finder::unit_mut(document, unit, cell.position) {
        owner
            .elements
            .push(UnitElement::Setting(LocalSetting::new(kind, cell.id)));
    }
    tag(document, cell.id, TokenType::LocalSettingDeclaration(unit, kind));
    ParsingState::LocalSetting(unit, kind)
}

/// `[Tags]`, `[Setup]`, ... allowed in the current kind of unit
pub struct LocalSettingMapper;

impl Mapper for LocalSettingMapper {
    fn can_map(&self, states: &ParsingStack, document: &Document, cell: &Cell) -> bool {
        at_body_start(states).is_some_and(|unit| {
            recognizers::local_setting(&cell.text).is_some_and(|r| r.kind.is_allowed_in(unit))
                && resolver::accepts(document, unit.table(), cell.position)
        })
    }

    fn map(&self, states: &mut ParsingStack, document: &mut Document, cell: &Cell) -> ParsingState {
        let (Some(unit), Some(recognized)) =
            (at_body_start(states), recognizers::local_setting(&cell.text))
        else {
            return keep(states);
        };
        let state = open_local_setting(states, document, cell, unit, recognized.kind);
        mark_deprecated(document, cell.id, recognized.deprecated);
        state
    }
}

/// Bracketed names that are not settings of the current kind of unit
pub struct UnknownLocalSettingMapper;

impl Mapper for UnknownLocalSettingMapper {
    fn can_map(&self, states: &ParsingStack, document: &Document, cell: &Cell) -> bool {
        at_body_start(states).is_some_and(|unit| {
            recognizers::local_setting(&cell.text).is_some()
                && resolver::accepts(document, unit.table(), cell.position)
        })
    }

    fn map(&self, states: &mut ParsingStack, document: &mut Document, cell: &Cell) -> ParsingState {
        let Some(unit) = at_body_start(states) else {
            return keep(states);
        };
        tracing::trace!(position = %cell.position, text = %cell.text, "unknown local setting");
        let state = open_local_setting(states, document, cell, unit, LocalSettingKind::Unknown);
        document.add_problem(cell.id, ProblemCause::UnknownLocalSetting);
        state
    }
}

pub struct LocalSettingArgumentMapper;

impl Mapper for LocalSettingArgumentMapper {
    fn can_map(&self, states: &ParsingStack, _document: &Document, _cell: &Cell) -> bool {
        matches!(states.top(), Some(ParsingState::LocalSetting(..)))
    }

    fn map(&self, states: &mut ParsingStack, document: &mut Document, cell: &Cell) -> ParsingState {
        let Some(ParsingState::LocalSetting(unit, kind)) = states.top() else {
            return keep(states);
        };
        let setting = finder::unit_mut(document, unit, cell.position)
            .and_then(|u| u.last_setting_mut());
        let token_type = match setting {
            Some(setting) if kind.has_primary_value() && setting.value.is_none() => {
                setting.value = Some(cell.id);
                TokenType::LocalSettingValue(unit, kind)
            }
            Some(setting) => {
                setting.arguments.push(cell.id);
                TokenType::LocalSettingArgument(unit, kind)
            }
            None => TokenType::LocalSettingArgument(unit, kind),
        };
        tag(document, cell.id, token_type);
        keep(states)
    }
}

/// Start of a row: for-loop continuation marker, assignments, then the action.
pub struct ActionMapper;

impl ActionMapper {
    fn row_unit(states: &ParsingStack) -> Option<UnitKind> {
        match states.top()? {
            ParsingState::Row(unit) => Some(unit),
            _ => at_body_start(states),
        }
    }
}

impl Mapper for ActionMapper {
    fn can_map(&self, states: &ParsingStack, document: &Document, cell: &Cell) -> bool {
        let Some(unit) = Self::row_unit(states) else {
            return false;
        };
        if cell.is_really_first() || !resolver::accepts(document, unit.table(), cell.position) {
            return false;
        }
        if !cell.is_empty_marker() {
            return true;
        }
        // only a `\` opening a line of a loop body is taken; other empty cells indent
        cell.text == "\\"
            && states.top() != Some(ParsingState::Row(unit))
            && finder::unit(document, unit).is_some_and(|u| in_loop_body(document, u))
    }

    fn map(&self, states: &mut ParsingStack, document: &mut Document, cell: &Cell) -> ParsingState {
        let Some(unit) = Self::row_unit(states) else {
            return keep(states);
        };
        let continuing_row = states.top() == Some(ParsingState::Row(unit));
        enter_unit(states, unit);
        let version = document.version;

        let Some(owner) = finder::unit_mut(document, unit, cell.position) else {
            return keep(states);
        };
        let reuse = continuing_row && owner.last_row_mut().is_some();
        if !reuse {
            owner.elements.push(UnitElement::Row(ExecutableRow::default()));
        }
        // a fresh row is still empty, so it is taken as the last element, not as content
        let row = if reuse {
            owner.last_row_mut()
        } else {
            match owner.elements.last_mut() {
                Some(UnitElement::Row(row)) => Some(row),
                _ => None,
            }
        };
        let Some(row) = row else {
            return keep(states);
        };

        if cell.is_empty_marker() {
            row.for_continue = Some(cell.id);
            tag(document, cell.id, TokenType::ForContinue);
            return ParsingState::Row(unit);
        }
        if recognizers::is_assignment(&cell.text) {
            row.assignments.push(cell.id);
            tag(document, cell.id, TokenType::Assignment);
            return ParsingState::Row(unit);
        }

        row.action = Some(cell.id);
        tag(document, cell.id, TokenType::ActionName(unit));
        if recognizers::is_for_marker(&cell.text, version) {
            add_tag(document, cell.id, TokenType::ForToken);
        } else if recognizers::is_end_marker(&cell.text, version) {
            add_tag(document, cell.id, TokenType::EndToken);
        }
        ParsingState::ActionArguments(unit)
    }
}

pub struct ActionArgumentMapper;

impl Mapper for ActionArgumentMapper {
    fn can_map(&self, states: &ParsingStack, _document: &Document, _cell: &Cell) -> bool {
        matches!(states.top(), Some(ParsingState::ActionArguments(_)))
    }

    fn map(&self, states: &mut ParsingStack, document: &mut Document, cell: &Cell) -> ParsingState {
        let Some(ParsingState::ActionArguments(unit)) = states.top() else {
            return keep(states);
        };
        let Some(row) =
            finder::unit_mut(document, unit, cell.position).and_then(|u| u.last_row_mut())
        else {
            return keep(states);
        };
        let action = row.action;
        let previous = row.arguments.clone();
        row.arguments.push(cell.id);

        tag(document, cell.id, TokenType::ActionArgument(unit));
        if is_loop_header(document, action, &previous) && recognizers::is_in_marker(&cell.text) {
            add_tag(document, cell.id, TokenType::InToken);
        }
        keep(states)
    }
}

/// Whether a row is a `FOR` header still waiting for its `IN` marker.
fn is_loop_header(document: &Document, action: Option<TokenId>, previous: &[TokenId]) -> bool {
    let has_type = |id: TokenId, token_type: TokenType| {
        document.token(id).is_some_and(|t| t.has_type(token_type))
    };
    action.is_some_and(|id| has_type(id, TokenType::ForToken))
        && !previous.iter().any(|id| has_type(*id, TokenType::InToken))
}

/// Empty cells indenting a line of a table with elements
pub struct EmptyCellMapper;

impl Mapper for EmptyCellMapper {
    fn can_map(&self, states: &ParsingStack, _document: &Document, cell: &Cell) -> bool {
        cell.is_empty_marker()
            && cell.after_empty_only
            && states
                .current_table()
                .is_some_and(|t| t != TableKind::Comments)
    }

    fn map(&self, states: &mut ParsingStack, document: &mut Document, cell: &Cell) -> ParsingState {
        tag(document, cell.id, TokenType::EmptyCell);
        keep(states)
    }
}

#[cfg(test)]
mod tests {
    use crate::robot::model::{Document, ProblemCause};
    use crate::robot::parsing::{parse, ParserOptions};
    use crate::robot::token::{LocalSettingKind, TokenId, TokenType, UnitKind};
    use crate::robot::version::RobotVersion;

    fn parse_default(source: &str) -> Document {
        parse(source, &ParserOptions::default())
    }

    #[test]
    fn test_units_settings_and_rows() {
        let doc = parse_default(
            "*** Test Cases ***\nFirst\n    [Tags]    a    b\n    ${x} =    Get    1\nSecond    Log    hi\n",
        );
        let units = &doc.test_cases.as_ref().unwrap().units;
        assert_eq!(units.len(), 2);
        assert_eq!(doc.text(units[0].name.unwrap()), "First");

        let tags: Vec<_> = units[0].settings().collect();
        assert_eq!(tags[0].kind, LocalSettingKind::Tags);
        assert_eq!(tags[0].arguments.len(), 2);

        let row = units[0].rows().next().unwrap();
        assert_eq!(doc.text(row.assignments[0]), "${x} =");
        assert_eq!(doc.text(row.action.unwrap()), "Get");
        assert_eq!(row.arguments.len(), 1);

        let row = units[1].rows().next().unwrap();
        assert_eq!(doc.text(row.action.unwrap()), "Log");
        assert!(doc.problems.is_empty());
    }

    #[test]
    fn test_action_and_arguments_share_one_row() {
        let doc = parse_default("*** Test Cases ***\nT\n    Log    x\n    Run Keyword If    ${c}    Log    y\n");
        let token = |line, element| doc.token(TokenId::new(line, element)).unwrap();
        assert_eq!(token(2, 1).primary_type(), TokenType::ActionName(UnitKind::TestCase));
        assert_eq!(token(2, 3).primary_type(), TokenType::ActionArgument(UnitKind::TestCase));
        for element in [3, 5, 7] {
            assert_eq!(token(3, element).primary_type(), TokenType::ActionArgument(UnitKind::TestCase));
        }

        let rows: Vec<_> = doc.test_cases.as_ref().unwrap().units[0].rows().collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].action, Some(TokenId::new(2, 1)));
        assert_eq!(rows[0].arguments, vec![TokenId::new(2, 3)]);
        assert_eq!(rows[1].arguments.len(), 3);
    }

    #[test]
    fn test_assignment_then_action_on_continued_line() {
        let doc = parse_default("*** Keywords ***\nK\n    ${x} =\n    ...    Get    1\n");
        let rows: Vec<_> = doc.keywords.as_ref().unwrap().units[0].rows().collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(doc.text(rows[0].assignments[0]), "${x} =");
        assert_eq!(rows[0].action.map(|id| doc.text(id)), Some("Get"));
        assert_eq!(rows[0].arguments.len(), 1);
    }

    #[test]
    fn test_rows_before_any_name_go_to_unnamed_unit() {
        let doc = parse_default("*** Keywords ***\n    Log    orphan\n");
        let units = &doc.keywords.as_ref().unwrap().units;
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].name, None);
        assert_eq!(units[0].rows().count(), 1);
    }

    #[test]
    fn test_setup_is_not_a_keyword_setting() {
        let doc = parse_default("*** Keywords ***\nK\n    [Setup]    Log\n    [Arguments]    ${a}\n");
        let settings: Vec<_> = doc.keywords.as_ref().unwrap().units[0].settings().collect();
        assert_eq!(settings[0].kind, LocalSettingKind::Unknown);
        assert_eq!(settings[0].arguments.len(), 1);
        assert_eq!(settings[1].kind, LocalSettingKind::Arguments);
        assert_eq!(doc.problems.len(), 1);
        assert_eq!(doc.problems[0].cause, ProblemCause::UnknownLocalSetting);
    }

    #[test]
    fn test_deprecated_local_setting() {
        let doc = parse_default("*** Test Cases ***\nT\n    [Precondition]    Open\n");
        let setting = doc.test_cases.as_ref().unwrap().units[0].settings().next().unwrap();
        assert_eq!(setting.kind, LocalSettingKind::Setup);
        assert_eq!(doc.text(setting.value.unwrap()), "Open");
        assert_eq!(
            doc.problems[0].cause,
            ProblemCause::DeprecatedSynonym { canonical: "[Setup]" }
        );
    }

    #[test]
    fn test_old_style_for_loop() {
        let doc = parse(
            "*** Test Cases ***\nT\n    :FOR    ${i}    IN RANGE    3\n    \\    Log    ${i}\n",
            &ParserOptions {
                version: RobotVersion::new(3, 0),
                separator: None,
            },
        );
        let token = |line, element| doc.token(TokenId::new(line, element)).unwrap();
        assert!(token(2, 1).has_type(TokenType::ForToken));
        assert_eq!(token(2, 3).primary_type(), TokenType::ActionArgument(UnitKind::TestCase));
        assert!(token(2, 5).has_type(TokenType::InToken));
        assert_eq!(token(3, 1).primary_type(), TokenType::ForContinue);
        assert_eq!(token(3, 3).primary_type(), TokenType::ActionName(UnitKind::TestCase));

        let rows: Vec<_> = doc.test_cases.as_ref().unwrap().units[0].rows().collect();
        assert_eq!(rows.len(), 2);
        assert!(rows[1].for_continue.is_some());
    }

    #[test]
    fn test_new_style_for_loop_end() {
        let doc = parse_default("*** Tasks ***\nT\n    FOR    ${x}    IN    a\n        Log    ${x}\n    END\n");
        let token = |line, element| doc.token(TokenId::new(line, element)).unwrap();
        assert!(token(2, 1).has_type(TokenType::ForToken));
        assert!(token(2, 5).has_type(TokenType::InToken));
        assert!(token(4, 1).has_type(TokenType::EndToken));
        assert_eq!(token(4, 1).primary_type(), TokenType::ActionName(UnitKind::Task));
    }

    #[test]
    fn test_pipe_rows_with_empty_first_column() {
        let doc = parse_default("| *** Test Cases *** |\n| T |\n|  | Log | hi |\n");
        let unit = &doc.test_cases.as_ref().unwrap().units[0];
        let row = unit.rows().next().unwrap();
        assert_eq!(doc.text(row.action.unwrap()), "Log");
        assert_eq!(
            doc.token(TokenId::new(2, 1)).unwrap().primary_type(),
            TokenType::EmptyCell
        );
    }
}
