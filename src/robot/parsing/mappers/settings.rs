//! Suite settings

use super::{keep, mark_deprecated, tag, Mapper};
use crate::robot::model::{Document, LibraryAlias, ProblemCause, Setting};
use crate::robot::parsing::resolver::{self, Cell};
use crate::robot::parsing::state::{ParsingStack, ParsingState};
use crate::robot::parsing::{finder, recognizers};
use crate::robot::token::{SettingKind, TableKind, TokenType};

/// Whether `cell` starts a new element in the settings table.
fn starts_setting(states: &ParsingStack, document: &Document, cell: &Cell) -> bool {
    states.top() == Some(ParsingState::TableInside(TableKind::Settings))
        && cell.is_first_meaningful()
        && resolver::accepts(document, TableKind::Settings, cell.position)
}

fn declare(
    states: &mut ParsingStack,
    document: &mut Document,
    cell: &Cell,
    kind: SettingKind,
) -> ParsingState {
    states.drain_to_table();
    if let Some(table) = document.settings.as_mut() {
        table.settings.push(Setting::new(kind, cell.id, cell.position));
    }
    tag(document, cell.id, TokenType::SettingDeclaration(kind));
    ParsingState::SettingDeclaration(kind)
}

pub struct SettingDeclarationMapper;

impl Mapper for SettingDeclarationMapper {
    fn can_map(&self, states: &ParsingStack, document: &Document, cell: &Cell) -> bool {
        starts_setting(states, document, cell)
            && recognizers::setting(&cell.text, document.version).is_some()
    }

    fn map(&self, states: &mut ParsingStack, document: &mut Document, cell: &Cell) -> ParsingState {
        let Some(recognized) = recognizers::setting(&cell.text, document.version) else {
            return UnknownSettingMapper.map(states, document, cell);
        };
        let state = declare(states, document, cell, recognized.kind);
        mark_deprecated(document, cell.id, recognized.deprecated);
        state
    }
}

/// `WITH NAME` after the name of an imported library
pub struct LibraryAliasMapper;

impl Mapper for LibraryAliasMapper {
    fn can_map(&self, states: &ParsingStack, document: &Document, cell: &Cell) -> bool {
        states.top() == Some(ParsingState::SettingDeclaration(SettingKind::Library))
            && finder::setting(document).is_some_and(|s| s.value.is_some() && s.alias.is_none())
            && recognizers::library_alias(&cell.text).is_some()
    }

    fn map(&self, _states: &mut ParsingStack, document: &mut Document, cell: &Cell) -> ParsingState {
        if let Some(setting) = finder::setting_mut(document) {
            setting.alias = Some(LibraryAlias {
                marker: cell.id,
                name: None,
            });
        }
        tag(document, cell.id, TokenType::LibraryAlias);
        let deprecated = recognizers::library_alias(&cell.text).and_then(|r| r.deprecated);
        mark_deprecated(document, cell.id, deprecated);
        ParsingState::LibraryAlias
    }
}

pub struct LibraryAliasValueMapper;

impl Mapper for LibraryAliasValueMapper {
    fn can_map(&self, states: &ParsingStack, _document: &Document, _cell: &Cell) -> bool {
        states.top() == Some(ParsingState::LibraryAlias)
    }

    fn map(&self, _states: &mut ParsingStack, document: &mut Document, cell: &Cell) -> ParsingState {
        if let Some(alias) = finder::setting_mut(document).and_then(|s| s.alias.as_mut()) {
            alias.name = Some(cell.id);
        }
        tag(document, cell.id, TokenType::LibraryAliasValue);
        ParsingState::LibraryAliasValue
    }
}

/// Values of a setting: its primary value first, then arguments.
pub struct SettingArgumentMapper;

impl Mapper for SettingArgumentMapper {
    fn can_map(&self, states: &ParsingStack, _document: &Document, _cell: &Cell) -> bool {
        matches!(
            states.top(),
            Some(ParsingState::SettingDeclaration(_)) | Some(ParsingState::LibraryAliasValue)
        )
    }

    fn map(&self, states: &mut ParsingStack, document: &mut Document, cell: &Cell) -> ParsingState {
        let after_alias = states.top() == Some(ParsingState::LibraryAliasValue);
        let Some(setting) = finder::setting_mut(document) else {
            return keep(states);
        };
        let kind = setting.kind;
        let token_type = if after_alias || (setting.value.is_some() && kind.rejects_arguments()) {
            setting.unwanted.push(cell.id);
            TokenType::SettingUnwantedArgument(kind)
        } else if kind.has_primary_value() && setting.value.is_none() {
            setting.value = Some(cell.id);
            TokenType::SettingValue(kind)
        } else {
            setting.arguments.push(cell.id);
            TokenType::SettingArgument(kind)
        };
        tag(document, cell.id, token_type);
        keep(states)
    }
}

/// A declaration in the settings table no recognizer knows
pub struct UnknownSettingMapper;

impl Mapper for UnknownSettingMapper {
    fn can_map(&self, states: &ParsingStack, document: &Document, cell: &Cell) -> bool {
        starts_setting(states, document, cell)
    }

    fn map(&self, states: &mut ParsingStack, document: &mut Document, cell: &Cell) -> ParsingState {
        tracing::trace!(position = %cell.position, text = %cell.text, "unknown setting");
        let state = declare(states, document, cell, SettingKind::Unknown);
        document.add_problem(cell.id, ProblemCause::UnknownSetting);
        state
    }
}
