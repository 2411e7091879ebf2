//! Variable table declarations

use super::{keep, tag, Mapper};
use crate::robot::model::{Document, ProblemCause, Variable};
use crate::robot::parsing::resolver::{self, Cell};
use crate::robot::parsing::state::{ParsingStack, ParsingState};
use crate::robot::parsing::{finder, recognizers};
use crate::robot::token::{TableKind, TokenType, VariableKind};

fn starts_variable(states: &ParsingStack, document: &Document, cell: &Cell) -> bool {
    states.top() == Some(ParsingState::TableInside(TableKind::Variables))
        && cell.is_first_meaningful()
        && resolver::accepts(document, TableKind::Variables, cell.position)
}

fn declare(
    states: &mut ParsingStack,
    document: &mut Document,
    cell: &Cell,
    kind: VariableKind,
) -> ParsingState {
    states.drain_to_table();
    if let Some(table) = document.variables.as_mut() {
        table.variables.push(Variable::new(kind, cell.id, cell.position));
    }
    tag(document, cell.id, TokenType::VariableDeclaration(kind));
    ParsingState::VariableDeclaration
}

fn kind_of(sigil: char) -> VariableKind {
    match sigil {
        '$' => VariableKind::Scalar,
        '@' => VariableKind::List,
        '&' => VariableKind::Dictionary,
        _ => VariableKind::Invalid,
    }
}

/// `${name}`, `@{name}` or `&{name}`, optionally followed by `=`
pub struct VariableDeclarationMapper;

impl Mapper for VariableDeclarationMapper {
    fn can_map(&self, states: &ParsingStack, document: &Document, cell: &Cell) -> bool {
        starts_variable(states, document, cell)
            && recognizers::variable_declaration(&cell.text).is_some()
    }

    fn map(&self, states: &mut ParsingStack, document: &mut Document, cell: &Cell) -> ParsingState {
        let kind = recognizers::variable_declaration(&cell.text)
            .map(kind_of)
            .unwrap_or(VariableKind::Invalid);
        declare(states, document, cell, kind)
    }
}

pub struct VariableValueMapper;

impl Mapper for VariableValueMapper {
    fn can_map(&self, states: &ParsingStack, _document: &Document, _cell: &Cell) -> bool {
        states.top() == Some(ParsingState::VariableDeclaration)
    }

    fn map(&self, states: &mut ParsingStack, document: &mut Document, cell: &Cell) -> ParsingState {
        if let Some(variable) = finder::variable_mut(document) {
            variable.values.push(cell.id);
        }
        tag(document, cell.id, TokenType::VariableValue);
        keep(states)
    }
}

/// Anything else starting a line of the variable table
pub struct InvalidVariableMapper;

impl Mapper for InvalidVariableMapper {
    fn can_map(&self, states: &ParsingStack, document: &Document, cell: &Cell) -> bool {
        starts_variable(states, document, cell)
    }

    fn map(&self, states: &mut ParsingStack, document: &mut Document, cell: &Cell) -> ParsingState {
        tracing::trace!(position = %cell.position, text = %cell.text, "invalid variable declaration");
        let state = declare(states, document, cell, VariableKind::Invalid);
        document.add_problem(cell.id, ProblemCause::InvalidVariableDeclaration);
        state
    }
}

#[cfg(test)]
mod tests {
    use crate::robot::model::ProblemCause;
    use crate::robot::parsing::{parse, ParserOptions};
    use crate::robot::token::VariableKind;

    #[test]
    fn test_declarations_and_values() {
        let doc = parse(
            "*** Variables ***\n${x}    1\n@{list} =    a    b\n&{d}=    k=v\n",
            &ParserOptions::default(),
        );
        let variables = &doc.variables.as_ref().unwrap().variables;
        let kinds: Vec<_> = variables.iter().map(|v| v.kind).collect();
        assert_eq!(
            kinds,
            vec![VariableKind::Scalar, VariableKind::List, VariableKind::Dictionary]
        );
        assert_eq!(variables[1].values.len(), 2);
        assert!(doc.problems.is_empty());
    }

    #[test]
    fn test_invalid_declaration_is_reported() {
        let doc = parse("*** Variables ***\nname    value\n", &ParserOptions::default());
        let variable = &doc.variables.as_ref().unwrap().variables[0];
        assert_eq!(variable.kind, VariableKind::Invalid);
        assert_eq!(variable.values.len(), 1);
        assert_eq!(doc.problems[0].cause, ProblemCause::InvalidVariableDeclaration);
    }
}
