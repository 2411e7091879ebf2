//! Mapper chain
//!
//!     A [`Mapper`] claims one kind of cell in one kind of context. For every cell, the chain
//!     asks its mappers in order whether they can map it; the first that can, does: it
//!     tags the token, extends the document, and returns the state the parser is in after
//!     the cell.
//!
//! Order
//!
//!     Specific mappers come first, permissive ones last:
//!
//!         1. comments, table headers and header columns
//!         2. suite settings, library aliases and their values
//!         3. variable declarations and values
//!         4. unit names, local settings, actions, action arguments, leading empty cells
//!         5. fallbacks: content of unknown and comment tables, unknown settings, invalid
//!            variable declarations, and finally trash, which takes anything
//!
//!     Unknown local settings sit right after the known ones, before actions, since any
//!     other cell in a test body is an action.

pub mod comments;
pub mod executables;
pub mod fallback;
pub mod headers;
pub mod settings;
pub mod variables;

use super::resolver::Cell;
use super::state::{ParsingStack, ParsingState};
use crate::robot::model::{Document, ProblemCause};
use crate::robot::token::{TokenId, TokenType};

pub trait Mapper {
    /// Whether this mapper claims `cell` in the current context.
    fn can_map(&self, states: &ParsingStack, document: &Document, cell: &Cell) -> bool;

    /// Claim `cell`: tag it, extend the document, and return the resulting state.
    fn map(&self, states: &mut ParsingStack, document: &mut Document, cell: &Cell)
        -> ParsingState;
}

pub struct MapperChain {
    mappers: Vec<Box<dyn Mapper + Send + Sync>>,
}

impl MapperChain {
    pub fn new(mappers: Vec<Box<dyn Mapper + Send + Sync>>) -> Self {
        Self { mappers }
    }

    pub fn map(
        &self,
        states: &mut ParsingStack,
        document: &mut Document,
        cell: &Cell,
    ) -> ParsingState {
        match self
            .mappers
            .iter()
            .find(|m| m.can_map(states, document, cell))
        {
            Some(mapper) => mapper.map(states, document, cell),
            None => fallback::TrashMapper.map(states, document, cell),
        }
    }
}

impl Default for MapperChain {
    fn default() -> Self {
        Self::new(vec![
            Box::new(comments::CommentMapper),
            Box::new(headers::TableHeaderMapper),
            Box::new(headers::HeaderColumnMapper),
            Box::new(settings::SettingDeclarationMapper),
            Box::new(settings::LibraryAliasMapper),
            Box::new(settings::LibraryAliasValueMapper),
            Box::new(settings::SettingArgumentMapper),
            Box::new(variables::VariableDeclarationMapper),
            Box::new(variables::VariableValueMapper),
            Box::new(executables::UnitNameMapper),
            Box::new(executables::LocalSettingMapper),
            Box::new(executables::UnknownLocalSettingMapper),
            Box::new(executables::LocalSettingArgumentMapper),
            Box::new(executables::ActionMapper),
            Box::new(executables::ActionArgumentMapper),
            Box::new(executables::EmptyCellMapper),
            Box::new(fallback::TableContentMapper),
            Box::new(settings::UnknownSettingMapper),
            Box::new(variables::InvalidVariableMapper),
            Box::new(fallback::TrashMapper),
        ])
    }
}

pub(crate) fn tag(document: &mut Document, id: TokenId, token_type: TokenType) {
    if let Some(token) = document.token_mut(id) {
        token.set_type(token_type);
    }
}

pub(crate) fn add_tag(document: &mut Document, id: TokenId, token_type: TokenType) {
    if let Some(token) = document.token_mut(id) {
        token.add_type(token_type);
    }
}

/// Record that a deprecated spelling was used where `canonical` is expected.
pub(crate) fn mark_deprecated(document: &mut Document, id: TokenId, canonical: Option<&'static str>) {
    if let Some(canonical) = canonical {
        add_tag(document, id, TokenType::DeprecatedSynonym);
        document.add_problem(id, ProblemCause::DeprecatedSynonym { canonical });
    }
}

/// The current state, for mappers that leave it unchanged.
pub(crate) fn keep(states: &ParsingStack) -> ParsingState {
    states.top().unwrap_or(ParsingState::Trash)
}
