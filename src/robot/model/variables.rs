//! Variables table

use super::{Table, TableHeader};
use crate::robot::range::Position;
use crate::robot::token::{TableKind, TokenId, VariableKind};
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VariableTable {
    pub headers: Vec<TableHeader>,
    pub variables: Vec<Variable>,
}

impl Table for VariableTable {
    fn kind(&self) -> TableKind {
        TableKind::Variables
    }

    fn headers(&self) -> &[TableHeader] {
        &self.headers
    }

    fn headers_mut(&mut self) -> &mut Vec<TableHeader> {
        &mut self.headers
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Variable {
    pub kind: VariableKind,
    pub declaration: TokenId,
    pub position: Position,
    pub values: Vec<TokenId>,
    pub comment: Vec<TokenId>,
}

impl Variable {
    pub fn new(kind: VariableKind, declaration: TokenId, position: Position) -> Self {
        Self {
            kind,
            declaration,
            position,
            values: Vec::new(),
            comment: Vec::new(),
        }
    }
}
