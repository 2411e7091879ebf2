//! Document model
//!
//!     The [`Document`] is the root of a parsed file. It owns the lines, which own the tokens,
//!     and at most one table of each kind. Tables and their elements only hold [`TokenId`]
//!     handles into the lines, so a token has exactly one owner and any tag or text
//!     refinement is immediately visible through every element referring to it.
//!
//! Tables
//!
//!     Every table keeps the list of headers that opened it; a file may repeat a header, and
//!     a table only accepts elements positioned after its most recent one (see
//!     [`Table::accepts`]).
//!
//! Editing
//!
//!     [`Document::set_token_text`] changes one token and shifts the positions of everything
//!     after it. Other lines are not re-lexed, and [`Document::to_source`] reflects the edit.

pub mod executables;
pub mod settings;
pub mod variables;

pub use executables::{ExecutableRow, ExecutableTable, ExecutableUnit, LocalSetting, UnitElement};
pub use settings::{LibraryAlias, Setting, SettingTable};
pub use variables::{Variable, VariableTable};

use crate::robot::lexing::separators::{CellSplitter, Piece, PipeSplitter, SpaceSplitter};
use crate::robot::range::{Position, Region};
use crate::robot::token::line::SeparatorSyntax;
use crate::robot::token::{LineElement, RobotLine, RobotToken, TableKind, TokenId, UnitKind};
use crate::robot::version::RobotVersion;
use serde::Serialize;
use std::fmt;

/// A header line such as `*** Test Cases ***    Action    Argument`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableHeader {
    pub declaration: TokenId,
    pub position: Position,
    pub columns: Vec<TokenId>,
    pub comment: Vec<TokenId>,
}

impl TableHeader {
    pub fn new(declaration: TokenId, position: Position) -> Self {
        Self {
            declaration,
            position,
            columns: Vec::new(),
            comment: Vec::new(),
        }
    }
}

/// Behavior shared by all tables
pub trait Table {
    fn kind(&self) -> TableKind;

    fn headers(&self) -> &[TableHeader];

    fn headers_mut(&mut self) -> &mut Vec<TableHeader>;

    fn latest_header(&self) -> Option<&TableHeader> {
        self.headers().last()
    }

    /// An element at `position` belongs to this table only when it comes strictly after the
    /// most recent header.
    fn accepts(&self, position: Position) -> bool {
        self.latest_header()
            .is_some_and(|header| position > header.position)
    }
}

/// Why a token could not be mapped to a regular model element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "cause", rename_all = "kebab-case")]
pub enum ProblemCause {
    UnknownTable,
    TasksTableNotSupported,
    DataOutsideTable,
    UnknownSetting,
    UnknownLocalSetting,
    InvalidVariableDeclaration,
    DeprecatedSynonym { canonical: &'static str },
}

impl fmt::Display for ProblemCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProblemCause::UnknownTable => f.write_str("unknown-table"),
            ProblemCause::TasksTableNotSupported => f.write_str("tasks-table-not-supported"),
            ProblemCause::DataOutsideTable => f.write_str("data-outside-table"),
            ProblemCause::UnknownSetting => f.write_str("unknown-setting"),
            ProblemCause::UnknownLocalSetting => f.write_str("unknown-local-setting"),
            ProblemCause::InvalidVariableDeclaration => f.write_str("invalid-variable-declaration"),
            ProblemCause::DeprecatedSynonym { canonical } => {
                write!(f, "deprecated-synonym (use '{}')", canonical)
            }
        }
    }
}

/// A token the diagnostics layer should report, with the reason
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseProblem {
    pub token: TokenId,
    pub region: Region,
    pub cause: ProblemCause,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
    #[error("no token at line index {}, element {}", .0.line, .0.element)]
    NoSuchToken(TokenId),
    #[error("text {0:?} would not stay a single cell")]
    WouldSplitCell(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    pub version: RobotVersion,
    pub syntax: SeparatorSyntax,
    pub lines: Vec<RobotLine>,
    pub settings: Option<SettingTable>,
    pub variables: Option<VariableTable>,
    pub test_cases: Option<ExecutableTable>,
    pub tasks: Option<ExecutableTable>,
    pub keywords: Option<ExecutableTable>,
    pub problems: Vec<ParseProblem>,
}

impl Document {
    pub fn new(version: RobotVersion, syntax: SeparatorSyntax, lines: Vec<RobotLine>) -> Self {
        Self {
            version,
            syntax,
            lines,
            settings: None,
            variables: None,
            test_cases: None,
            tasks: None,
            keywords: None,
            problems: Vec::new(),
        }
    }

    pub fn token(&self, id: TokenId) -> Option<&RobotToken> {
        self.lines.get(id.line)?.elements.get(id.element)?.as_token()
    }

    pub fn token_mut(&mut self, id: TokenId) -> Option<&mut RobotToken> {
        match self.lines.get_mut(id.line)?.elements.get_mut(id.element)? {
            LineElement::Token(token) => Some(token),
            LineElement::Separator(_) => None,
        }
    }

    /// Text of a token, empty for a dangling handle.
    pub fn text(&self, id: TokenId) -> &str {
        self.token(id).map(RobotToken::text).unwrap_or_default()
    }

    /// All tokens of the file, in source order.
    pub fn tokens(&self) -> impl Iterator<Item = (TokenId, &RobotToken)> {
        self.lines
            .iter()
            .enumerate()
            .flat_map(|(index, line)| line.tokens(index))
    }

    pub fn to_source(&self) -> String {
        crate::robot::lexing::unlex(&self.lines)
    }

    /// One line per token: position, tags and text.
    pub fn dump_tokens(&self) -> String {
        let mut out = String::new();
        for (_, token) in self.tokens() {
            let types = if token.types().is_empty() {
                "-".to_string()
            } else {
                token
                    .types()
                    .iter()
                    .map(|t| format!("{:?}", t))
                    .collect::<Vec<_>>()
                    .join("+")
            };
            out.push_str(&format!("{} {} {:?}\n", token.position(), types, token.text()));
        }
        out
    }

    pub fn executable_table(&self, kind: UnitKind) -> Option<&ExecutableTable> {
        match kind {
            UnitKind::TestCase => self.test_cases.as_ref(),
            UnitKind::Task => self.tasks.as_ref(),
            UnitKind::Keyword => self.keywords.as_ref(),
        }
    }

    pub fn executable_table_mut(&mut self, kind: UnitKind) -> Option<&mut ExecutableTable> {
        match kind {
            UnitKind::TestCase => self.test_cases.as_mut(),
            UnitKind::Task => self.tasks.as_mut(),
            UnitKind::Keyword => self.keywords.as_mut(),
        }
    }

    /// Table of the given kind as a trait object; comment tables have no model.
    pub fn table(&self, kind: TableKind) -> Option<&dyn Table> {
        match kind {
            TableKind::Settings => self.settings.as_ref().map(|t| t as &dyn Table),
            TableKind::Variables => self.variables.as_ref().map(|t| t as &dyn Table),
            TableKind::TestCases => self.test_cases.as_ref().map(|t| t as &dyn Table),
            TableKind::Tasks => self.tasks.as_ref().map(|t| t as &dyn Table),
            TableKind::Keywords => self.keywords.as_ref().map(|t| t as &dyn Table),
            TableKind::Comments => None,
        }
    }

    /// Table of the given kind, created on first use.
    pub fn table_mut_or_insert(&mut self, kind: TableKind) -> Option<&mut dyn Table> {
        let table: &mut dyn Table = match kind {
            TableKind::Settings => self.settings.get_or_insert_with(Default::default),
            TableKind::Variables => self.variables.get_or_insert_with(Default::default),
            TableKind::TestCases => self
                .test_cases
                .get_or_insert_with(|| ExecutableTable::new(UnitKind::TestCase)),
            TableKind::Tasks => self
                .tasks
                .get_or_insert_with(|| ExecutableTable::new(UnitKind::Task)),
            TableKind::Keywords => self
                .keywords
                .get_or_insert_with(|| ExecutableTable::new(UnitKind::Keyword)),
            TableKind::Comments => return None,
        };
        Some(table)
    }

    pub fn add_problem(&mut self, token: TokenId, cause: ProblemCause) {
        if let Some(region) = self.token(token).map(RobotToken::region) {
            self.problems.push(ParseProblem {
                token,
                region,
                cause,
            });
        }
    }

    /// Replace the text of one token, shifting the positions of the elements after it.
    ///
    /// The new text must remain a single cell under the line's separator convention;
    /// otherwise re-parsing the document would not give back the same token.
    pub fn set_token_text(&mut self, id: TokenId, text: &str) -> Result<(), EditError> {
        let line = self.lines.get(id.line).ok_or(EditError::NoSuchToken(id))?;
        self.token(id).ok_or(EditError::NoSuchToken(id))?;
        if !stays_single_cell(line.syntax, text) {
            return Err(EditError::WouldSplitCell(text.to_string()));
        }

        let old_end = self.token(id).map(|t| t.region().end).unwrap_or_default();
        let old_len = self.text(id).len() as isize;
        let delta = text.len() as isize - old_len;
        let column_delta = text.chars().count() as isize - self.text(id).chars().count() as isize;

        let line = &mut self.lines[id.line];
        if let LineElement::Token(token) = &mut line.elements[id.element] {
            token.set_text(text.to_string());
        }
        let mut position = line.elements[id.element].region().end;
        for element in line.elements.iter_mut().skip(id.element + 1) {
            element.set_position(position);
            position = position.advance(element.text());
        }
        line.end_of_line.position = position;

        for line in self.lines.iter_mut().skip(id.line + 1) {
            for element in line.elements.iter_mut() {
                let mut moved = element.position();
                moved.offset = shift(moved.offset, delta);
                element.set_position(moved);
            }
            line.end_of_line.position.offset = shift(line.end_of_line.position.offset, delta);
        }
        self.shift_model_positions(old_end, delta, column_delta);
        for problem in self.problems.iter_mut().filter(|p| p.token >= id) {
            if let Some(element) = self
                .lines
                .get(problem.token.line)
                .and_then(|line| line.elements.get(problem.token.element))
            {
                problem.region = element.region();
            }
        }
        Ok(())
    }
}

impl Document {
    /// Move the positions cached on tables and elements that start at or after `from`.
    fn shift_model_positions(&mut self, from: Position, delta: isize, column_delta: isize) {
        let moved = |position: &mut Position| {
            if position.offset < from.offset {
                return;
            }
            if position.line == from.line {
                position.column = shift(position.column, column_delta);
            }
            position.offset = shift(position.offset, delta);
        };

        let mut positions: Vec<&mut Position> = Vec::new();
        if let Some(table) = self.settings.as_mut() {
            positions.extend(table.headers.iter_mut().map(|h| &mut h.position));
            positions.extend(table.settings.iter_mut().map(|s| &mut s.position));
        }
        if let Some(table) = self.variables.as_mut() {
            positions.extend(table.headers.iter_mut().map(|h| &mut h.position));
            positions.extend(table.variables.iter_mut().map(|v| &mut v.position));
        }
        for table in [&mut self.test_cases, &mut self.tasks, &mut self.keywords]
            .into_iter()
            .flatten()
        {
            positions.extend(table.headers.iter_mut().map(|h| &mut h.position));
            positions.extend(table.units.iter_mut().map(|u| &mut u.position));
        }
        positions.into_iter().for_each(moved);
    }
}

fn shift(offset: usize, delta: isize) -> usize {
    (offset as isize + delta) as usize
}

fn stays_single_cell(syntax: SeparatorSyntax, text: &str) -> bool {
    if text.contains(['\n', '\r']) {
        return false;
    }
    let pieces = match syntax {
        SeparatorSyntax::Pipe => {
            if text.is_empty() {
                return true;
            }
            // a cell inside a pipe line sits between separators; check it the same way
            let framed = format!("| {} |", text);
            return matches!(
                PipeSplitter.split(&framed).as_slice(),
                [Piece::Separator(..), Piece::Cell(range), Piece::Separator(..)]
                    if range.len() == text.len()
            );
        }
        SeparatorSyntax::Space => SpaceSplitter.split(text),
    };
    matches!(pieces.as_slice(), [Piece::Cell(range)] if range.len() == text.len())
}
