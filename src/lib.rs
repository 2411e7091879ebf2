//! # robot-parser
//!
//! A parser for Robot tabular test data: settings, variables, test cases, tasks and
//! keywords written in space- or pipe-separated cells.
//!
//! Parsing never fails. Every cell ends up claimed by some element of the
//! [`Document`](robot::model::Document), and content that could not be given a regular
//! meaning is reported as a [`ParseProblem`](robot::model::ParseProblem).
//!
//! ```ignore
//! use robot_parser::robot::{parse, ParserOptions};
//!
//! let document = parse("*** Test Cases ***\nExample\n    Log    hi\n", &ParserOptions::default());
//! assert!(document.problems.is_empty());
//! ```

pub mod robot;

pub use robot::{parse, Document, ParserOptions, RobotParser, RobotVersion, SeparatorSyntax};
