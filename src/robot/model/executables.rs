//! Test case, task and keyword tables
//!
//! The three executable tables share one shape: a list of named units, each holding an
//! ordered mix of local settings and execution rows. The unit kind is kept on the table and
//! on every unit so that tags and allowed local settings can be decided without looking up
//! the owning table.

use super::{Table, TableHeader};
use crate::robot::range::Position;
use crate::robot::token::{LocalSettingKind, TableKind, TokenId, UnitKind};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutableTable {
    pub kind: UnitKind,
    pub headers: Vec<TableHeader>,
    pub units: Vec<ExecutableUnit>,
}

impl ExecutableTable {
    pub fn new(kind: UnitKind) -> Self {
        Self {
            kind,
            headers: Vec::new(),
            units: Vec::new(),
        }
    }

    /// Units whose name token is present, skipping synthetic ones.
    pub fn named_units(&self) -> impl Iterator<Item = &ExecutableUnit> {
        self.units.iter().filter(|u| u.name.is_some())
    }
}

impl Table for ExecutableTable {
    fn kind(&self) -> TableKind {
        self.kind.table()
    }

    fn headers(&self) -> &[TableHeader] {
        &self.headers
    }

    fn headers_mut(&mut self) -> &mut Vec<TableHeader> {
        &mut self.headers
    }
}

/// A test case, task or user keyword
///
/// A unit without a `name` is synthetic: it was created to hold rows that appeared after a
/// table header before any name was declared. Its position is that of its first content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutableUnit {
    pub kind: UnitKind,
    pub name: Option<TokenId>,
    pub position: Position,
    pub elements: Vec<UnitElement>,
}

impl ExecutableUnit {
    pub fn new(kind: UnitKind, name: Option<TokenId>, position: Position) -> Self {
        Self {
            kind,
            name,
            position,
            elements: Vec::new(),
        }
    }

    pub fn rows(&self) -> impl Iterator<Item = &ExecutableRow> {
        self.elements.iter().filter_map(|e| match e {
            UnitElement::Row(row) => Some(row),
            UnitElement::Setting(_) => None,
        })
    }

    pub fn settings(&self) -> impl Iterator<Item = &LocalSetting> {
        self.elements.iter().filter_map(|e| match e {
            UnitElement::Setting(setting) => Some(setting),
            UnitElement::Row(_) => None,
        })
    }

    /// Last element that is more than a comment. Comment-only rows may sit between the
    /// lines of a continued row or setting.
    fn last_content_mut(&mut self) -> Option<&mut UnitElement> {
        self.elements.iter_mut().rev().find(|e| match e {
            UnitElement::Row(row) => !row.is_comment_only(),
            UnitElement::Setting(_) => true,
        })
    }

    pub fn last_row_mut(&mut self) -> Option<&mut ExecutableRow> {
        match self.last_content_mut() {
            Some(UnitElement::Row(row)) => Some(row),
            _ => None,
        }
    }

    pub fn last_setting_mut(&mut self) -> Option<&mut LocalSetting> {
        match self.last_content_mut() {
            Some(UnitElement::Setting(setting)) => Some(setting),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "element", rename_all = "kebab-case")]
pub enum UnitElement {
    Setting(LocalSetting),
    Row(ExecutableRow),
}

/// `[Setup]`, `[Tags]` and friends
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocalSetting {
    pub kind: LocalSettingKind,
    pub declaration: TokenId,
    pub value: Option<TokenId>,
    pub arguments: Vec<TokenId>,
    pub comment: Vec<TokenId>,
}

impl LocalSetting {
    pub fn new(kind: LocalSettingKind, declaration: TokenId) -> Self {
        Self {
            kind,
            declaration,
            value: None,
            arguments: Vec::new(),
            comment: Vec::new(),
        }
    }
}

/// One call: optional assignments, the action and its arguments
///
/// A row made of a comment only has no action.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExecutableRow {
    /// `\` marking the row as part of an old-style for loop body
    pub for_continue: Option<TokenId>,
    pub assignments: Vec<TokenId>,
    pub action: Option<TokenId>,
    pub arguments: Vec<TokenId>,
    pub comment: Vec<TokenId>,
}

impl ExecutableRow {
    pub fn is_comment_only(&self) -> bool {
        self.for_continue.is_none()
            && self.assignments.is_empty()
            && self.action.is_none()
            && self.arguments.is_empty()
    }
}
