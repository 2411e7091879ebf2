//! Parser
//!
//!     Turns lexed lines into a [`Document`]. The parser walks the file cell by cell, keeping
//!     its context in a [`ParsingStack`], and offers each cell to the [`MapperChain`]. The
//!     mapper that claims the cell tags its token, extends the model and returns the state
//!     to push.
//!
//! Lines
//!
//!     At the start of every line, states that only make sense within one line are popped
//!     (see [`ParsingStack::new_line`]). A line whose first meaningful cell is `...`
//!     continues the previous meaningful line instead: the stack saved at the end of that
//!     line is restored, so values keep flowing into the same element. Lines holding only
//!     comments or empty cells are not meaningful and do not interrupt a continuation.
//!
//! Errors
//!
//!     Parsing never fails. Cells that cannot be given a regular meaning are claimed by the
//!     fallback mappers and reported in [`Document::problems`].

pub mod finder;
pub mod mappers;
pub mod recognizers;
pub mod resolver;
pub mod state;
pub mod synonyms;

use crate::robot::lexing::lex;
use crate::robot::model::Document;
use crate::robot::token::line::SeparatorSyntax;
use crate::robot::token::{LexicalKind, TableKind, TokenType};
use crate::robot::version::RobotVersion;
use mappers::{tag, MapperChain};
use resolver::Cell;
use state::ParsingStack;

/// Settings resolved before parsing starts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParserOptions {
    pub version: RobotVersion,
    /// Separator convention; detected from the content when `None`
    pub separator: Option<SeparatorSyntax>,
}

#[derive(Default)]
pub struct RobotParser {
    options: ParserOptions,
    mappers: MapperChain,
}

impl RobotParser {
    pub fn new(options: ParserOptions) -> Self {
        Self {
            options,
            mappers: MapperChain::default(),
        }
    }

    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    pub fn parse(&self, source: &str) -> Document {
        let syntax = self
            .options
            .separator
            .unwrap_or_else(|| SeparatorSyntax::detect(source));
        let lines = lex(source, syntax);
        tracing::debug!(
            lines = lines.len(),
            version = %self.options.version,
            ?syntax,
            "parsing"
        );

        let mut document = Document::new(self.options.version, syntax, lines);
        let mut states = ParsingStack::default();
        let mut continued: Option<ParsingStack> = None;

        for line_index in 0..document.lines.len() {
            states.new_line();
            let cells = resolver::cells_of(&document.lines[line_index], line_index);
            let mut meaningful = false;
            for cell in &cells {
                if is_continuation(&states, cell) {
                    if let Some(saved) = &continued {
                        states = saved.clone();
                    }
                    tag(&mut document, cell.id, TokenType::PreviousLineContinue);
                    meaningful = true;
                    continue;
                }
                let state = self.mappers.map(&mut states, &mut document, cell);
                states.push(state);
                meaningful |= document
                    .token(cell.id)
                    .map(|t| t.primary_type())
                    .is_some_and(|t| !t.is_comment() && t != TokenType::EmptyCell);
            }
            if meaningful {
                continued = Some(states.without_comments());
            }
        }

        tracing::debug!(problems = document.problems.len(), "parsed");
        document
    }
}

/// `...` as the first meaningful cell of a line in a table with elements.
fn is_continuation(states: &ParsingStack, cell: &Cell) -> bool {
    cell.lexical == LexicalKind::ContinuationMarker
        && cell.is_first_meaningful()
        && states
            .current_table()
            .is_some_and(|t| t != TableKind::Comments)
}

/// Parse `source` with a one-off parser.
pub fn parse(source: &str, options: &ParserOptions) -> Document {
    RobotParser::new(*options).parse(source)
}
