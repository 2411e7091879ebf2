//! Parsing states
//!
//!     The parser tracks its context as a stack of [`ParsingState`]s. The bottom of the stack
//!     is the table the parser is in; the states above it describe the element and the part
//!     of the element the current line is filling. States above the table level only live
//!     for one line: at each new line they are popped, except for the open test case, task
//!     or keyword, which stays until the next unit or header.

use crate::robot::token::{LocalSettingKind, SettingKind, TableKind, UnitKind};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ParsingState {
    /// On the header line of a known table
    TableHeader(TableKind),
    TableInside(TableKind),
    UnknownTableHeader,
    UnknownTableInside,
    /// After a `#` cell; the rest of the line is comment
    Comment,
    /// Content that belongs nowhere
    Trash,
    SettingDeclaration(SettingKind),
    LibraryAlias,
    LibraryAliasValue,
    VariableDeclaration,
    UnitDeclaration(UnitKind),
    LocalSetting(UnitKind, LocalSettingKind),
    /// A row was opened on this line (for-loop continuation or assignments) but has no
    /// action yet
    Row(UnitKind),
    ActionArguments(UnitKind),
}

impl ParsingState {
    /// Known table this state belongs to.
    pub fn table(&self) -> Option<TableKind> {
        match self {
            ParsingState::TableHeader(kind) | ParsingState::TableInside(kind) => Some(*kind),
            ParsingState::SettingDeclaration(_)
            | ParsingState::LibraryAlias
            | ParsingState::LibraryAliasValue => Some(TableKind::Settings),
            ParsingState::VariableDeclaration => Some(TableKind::Variables),
            ParsingState::UnitDeclaration(unit)
            | ParsingState::LocalSetting(unit, _)
            | ParsingState::Row(unit)
            | ParsingState::ActionArguments(unit) => Some(unit.table()),
            ParsingState::UnknownTableHeader
            | ParsingState::UnknownTableInside
            | ParsingState::Comment
            | ParsingState::Trash => None,
        }
    }

    pub fn is_unknown_table(&self) -> bool {
        matches!(
            self,
            ParsingState::UnknownTableHeader | ParsingState::UnknownTableInside
        )
    }

    pub fn is_header(&self) -> bool {
        matches!(
            self,
            ParsingState::TableHeader(_) | ParsingState::UnknownTableHeader
        )
    }

    /// Table level: the header or the inside of a table.
    pub fn is_table_level(&self) -> bool {
        matches!(
            self,
            ParsingState::TableHeader(_)
                | ParsingState::TableInside(_)
                | ParsingState::UnknownTableHeader
                | ParsingState::UnknownTableInside
        )
    }

    /// States popped when a new line starts.
    pub fn is_line_scoped(&self) -> bool {
        !matches!(
            self,
            ParsingState::TableInside(_)
                | ParsingState::UnknownTableInside
                | ParsingState::UnitDeclaration(_)
        ) && !self.is_header()
    }

    /// State a header turns into once its line is over.
    fn after_header(&self) -> ParsingState {
        match self {
            ParsingState::TableHeader(kind) => ParsingState::TableInside(*kind),
            ParsingState::UnknownTableHeader => ParsingState::UnknownTableInside,
            other => *other,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsingStack {
    states: Vec<ParsingState>,
}

impl ParsingStack {
    pub fn top(&self) -> Option<ParsingState> {
        self.states.last().copied()
    }

    /// Top state ignoring comment states.
    pub fn top_element(&self) -> Option<ParsingState> {
        self.states
            .iter()
            .rev()
            .find(|s| **s != ParsingState::Comment)
            .copied()
    }

    pub fn states(&self) -> &[ParsingState] {
        &self.states
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Push `state` unless it already is the top.
    pub fn push(&mut self, state: ParsingState) {
        if self.top() != Some(state) {
            self.states.push(state);
        }
    }

    pub fn clear(&mut self) {
        self.states.clear();
    }

    /// The known table the parser is in, if any.
    pub fn current_table(&self) -> Option<TableKind> {
        self.states
            .iter()
            .rev()
            .find(|s| s.table().is_some() || s.is_unknown_table())
            .and_then(ParsingState::table)
    }

    pub fn in_unknown_table(&self) -> bool {
        self.states
            .iter()
            .rev()
            .find(|s| s.table().is_some() || s.is_unknown_table())
            .is_some_and(ParsingState::is_unknown_table)
    }

    pub fn in_any_table(&self) -> bool {
        self.current_table().is_some() || self.in_unknown_table()
    }

    /// Unit kind of the executable table the parser is in.
    pub fn current_unit_kind(&self) -> Option<UnitKind> {
        self.current_table().and_then(|t| t.unit_kind())
    }

    /// Pop everything above the table level.
    pub fn drain_to_table(&mut self) {
        while let Some(top) = self.top() {
            if top.is_table_level() {
                break;
            }
            self.states.pop();
        }
    }

    /// Prepare for a new line: drop line-scoped states and leave the header line.
    pub fn new_line(&mut self) {
        while let Some(top) = self.top() {
            if !top.is_line_scoped() {
                break;
            }
            self.states.pop();
        }
        if let Some(top) = self.states.last_mut() {
            *top = top.after_header();
        }
    }

    /// Copy of this stack without comment states, kept for line continuation.
    pub fn without_comments(&self) -> ParsingStack {
        ParsingStack {
            states: self
                .states
                .iter()
                .filter(|s| **s != ParsingState::Comment)
                .copied()
                .collect(),
        }
    }
}
