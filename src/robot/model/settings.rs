//! Suite-level settings table

use super::{Table, TableHeader};
use crate::robot::range::Position;
use crate::robot::token::{SettingKind, TableKind, TokenId};
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SettingTable {
    pub headers: Vec<TableHeader>,
    pub settings: Vec<Setting>,
}

impl SettingTable {
    pub fn settings_of(&self, kind: SettingKind) -> impl Iterator<Item = &Setting> {
        self.settings.iter().filter(move |s| s.kind == kind)
    }
}

impl Table for SettingTable {
    fn kind(&self) -> TableKind {
        TableKind::Settings
    }

    fn headers(&self) -> &[TableHeader] {
        &self.headers
    }

    fn headers_mut(&mut self) -> &mut Vec<TableHeader> {
        &mut self.headers
    }
}

/// `WITH NAME` marker of a library import and the alias following it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LibraryAlias {
    pub marker: TokenId,
    pub name: Option<TokenId>,
}

/// One suite setting declaration, e.g. `Library    Collections`
///
/// `value` holds the cell with a dedicated meaning for the setting kind: the library name,
/// resource or variable file path, metadata key, keyword name of setups, teardowns and
/// templates, or the timeout value. All other cells go to `arguments`, except cells the
/// setting does not accept, which go to `unwanted`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Setting {
    pub kind: SettingKind,
    pub declaration: TokenId,
    pub position: Position,
    pub value: Option<TokenId>,
    pub arguments: Vec<TokenId>,
    pub alias: Option<LibraryAlias>,
    pub unwanted: Vec<TokenId>,
    pub comment: Vec<TokenId>,
}

impl Setting {
    pub fn new(kind: SettingKind, declaration: TokenId, position: Position) -> Self {
        Self {
            kind,
            declaration,
            position,
            value: None,
            arguments: Vec::new(),
            alias: None,
            unwanted: Vec::new(),
            comment: Vec::new(),
        }
    }
}
