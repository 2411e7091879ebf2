//! Main module for the Robot test data parser
//!
//! Layers, leaves first:
//!
//!     - [lexing]: lossless split of source text into lines, cells and separators
//!     - [model]: the document, its tables and their elements
//!     - [parsing]: the state stack and mapper chain that build the model
//!     - [expressions]: variables and inline expressions inside one cell
//!     - [nested]: keyword calls embedded in the arguments of control keywords

pub mod expressions;
pub mod lexing;
pub mod model;
pub mod nested;
pub mod parsing;
pub mod range;
pub mod token;
pub mod version;

pub use model::Document;
pub use parsing::{parse, ParserOptions, RobotParser};
pub use token::line::SeparatorSyntax;
pub use version::RobotVersion;
