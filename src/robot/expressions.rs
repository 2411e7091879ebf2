//! Variables and inline expressions inside one cell
//!
//!     A cell like `Hello ${user}[name], you have ${{len($items)}} items` mixes plain text
//!     with variable references, indexes and python expressions. This module builds a tree
//!     over such text and answers questions about the variables in it.
//!
//! Syntax versions
//!
//!     Grammar 3.2 changed how braces nest inside variables. [`ExpressionSyntax`] picks the
//!     builder and the validator matching a version once; see the [builder] module for the
//!     differences.
//!
//! Usage
//!
//!     ```rust,ignore
//!     let syntax = ExpressionSyntax::for_version(RobotVersion::new(3, 2));
//!     let tree = syntax.build("${a}[0]");
//!     let a = tree.variables()[0];
//!     assert!(a.is_indexed());
//!     assert_eq!(a.base_name(), "a");
//!     ```

pub mod ast;
pub mod builder;
pub mod uses;
pub mod validation;

use crate::robot::range::Position;
use crate::robot::token::RobotToken;
use crate::robot::version::RobotVersion;
use serde::Serialize;

pub use ast::{ExpressionNode, ExpressionTree, NodeId, NodeKind, VariableType};
pub use uses::{normalize_variable_name, ExpressionPart, PythonExpression, VariableUse};
pub use validation::VariableSyntaxError;

/// Builder and validator pair for one grammar generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExpressionSyntax {
    /// 3.2 and later
    Modern,
    /// Before 3.2
    Legacy,
}

impl ExpressionSyntax {
    pub fn for_version(version: RobotVersion) -> Self {
        if version.uses_modern_variable_syntax() {
            ExpressionSyntax::Modern
        } else {
            ExpressionSyntax::Legacy
        }
    }

    /// Build the tree of a detached piece of text. Never fails.
    pub fn build(&self, text: &str) -> ExpressionTree {
        self.build_at(text, Position::default())
    }

    /// Build the tree of a token's text, with regions in file coordinates.
    pub fn build_token(&self, token: &RobotToken) -> ExpressionTree {
        self.build_at(token.text(), token.position())
    }

    fn build_at(&self, text: &str, origin: Position) -> ExpressionTree {
        match self {
            ExpressionSyntax::Modern => builder::build_modern(text, origin),
            ExpressionSyntax::Legacy => builder::build_legacy(text, origin),
        }
    }

    pub fn validate(&self, variable: &VariableUse<'_>) -> Result<(), VariableSyntaxError> {
        match self {
            ExpressionSyntax::Modern => validation::validate_modern(variable),
            ExpressionSyntax::Legacy => validation::validate_legacy(variable),
        }
    }
}
