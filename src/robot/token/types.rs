//! Token tags
//!
//! A token carries two kinds of classification:
//!
//!     - a [`LexicalKind`], set once by the lexer from the raw cell text alone,
//!     - a list of [`TokenType`] tags, assigned by whichever mapper claims the token.
//!
//! The first tag in the list is the primary one. Secondary tags mark refinements such as
//! [`TokenType::DeprecatedSynonym`] or [`TokenType::Assignment`].

use serde::Serialize;
use std::fmt;

/// Coarse category of a cell, decided without any parsing context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum LexicalKind {
    Word,
    /// `\` or a zero-length pipe cell
    EmptyCellMarker,
    /// starts with `#`
    CommentStart,
    /// `...`
    ContinuationMarker,
    /// exactly one variable, like `${x}` or `@{list}`
    VariableLiteral,
    NumberLiteral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TableKind {
    Settings,
    Variables,
    TestCases,
    Tasks,
    Keywords,
    Comments,
}

impl TableKind {
    /// Unit kind of the elements held by executable tables.
    pub fn unit_kind(&self) -> Option<UnitKind> {
        match self {
            TableKind::TestCases => Some(UnitKind::TestCase),
            TableKind::Tasks => Some(UnitKind::Task),
            TableKind::Keywords => Some(UnitKind::Keyword),
            _ => None,
        }
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TableKind::Settings => "Settings",
            TableKind::Variables => "Variables",
            TableKind::TestCases => "Test Cases",
            TableKind::Tasks => "Tasks",
            TableKind::Keywords => "Keywords",
            TableKind::Comments => "Comments",
        };
        f.write_str(name)
    }
}

/// Named, executable element: test case, task or user keyword
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnitKind {
    TestCase,
    Task,
    Keyword,
}

impl UnitKind {
    pub fn table(&self) -> TableKind {
        match self {
            UnitKind::TestCase => TableKind::TestCases,
            UnitKind::Task => TableKind::Tasks,
            UnitKind::Keyword => TableKind::Keywords,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SettingKind {
    Library,
    Resource,
    Variables,
    Documentation,
    Metadata,
    SuiteSetup,
    SuiteTeardown,
    TestSetup,
    TestTeardown,
    TestTemplate,
    TestTimeout,
    ForceTags,
    DefaultTags,
    Unknown,
}

impl SettingKind {
    /// Whether the first value after the declaration has a dedicated meaning
    /// (library name, file path, metadata key, keyword name, timeout value).
    pub fn has_primary_value(&self) -> bool {
        !matches!(
            self,
            SettingKind::Documentation
                | SettingKind::ForceTags
                | SettingKind::DefaultTags
                | SettingKind::Unknown
        )
    }

    /// Whether values after the primary one are not accepted.
    pub fn rejects_arguments(&self) -> bool {
        matches!(self, SettingKind::Resource | SettingKind::TestTemplate)
    }

    pub fn canonical_name(&self) -> &'static str {
        match self {
            SettingKind::Library => "Library",
            SettingKind::Resource => "Resource",
            SettingKind::Variables => "Variables",
            SettingKind::Documentation => "Documentation",
            SettingKind::Metadata => "Metadata",
            SettingKind::SuiteSetup => "Suite Setup",
            SettingKind::SuiteTeardown => "Suite Teardown",
            SettingKind::TestSetup => "Test Setup",
            SettingKind::TestTeardown => "Test Teardown",
            SettingKind::TestTemplate => "Test Template",
            SettingKind::TestTimeout => "Test Timeout",
            SettingKind::ForceTags => "Force Tags",
            SettingKind::DefaultTags => "Default Tags",
            SettingKind::Unknown => "",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum LocalSettingKind {
    Documentation,
    Tags,
    Setup,
    Teardown,
    Template,
    Timeout,
    Arguments,
    Return,
    Unknown,
}

impl LocalSettingKind {
    pub fn is_allowed_in(&self, unit: UnitKind) -> bool {
        match self {
            LocalSettingKind::Documentation
            | LocalSettingKind::Tags
            | LocalSettingKind::Teardown
            | LocalSettingKind::Timeout => true,
            LocalSettingKind::Setup | LocalSettingKind::Template => unit != UnitKind::Keyword,
            LocalSettingKind::Arguments | LocalSettingKind::Return => unit == UnitKind::Keyword,
            LocalSettingKind::Unknown => false,
        }
    }

    pub fn canonical_name(&self) -> &'static str {
        match self {
            LocalSettingKind::Documentation => "[Documentation]",
            LocalSettingKind::Tags => "[Tags]",
            LocalSettingKind::Setup => "[Setup]",
            LocalSettingKind::Teardown => "[Teardown]",
            LocalSettingKind::Template => "[Template]",
            LocalSettingKind::Timeout => "[Timeout]",
            LocalSettingKind::Arguments => "[Arguments]",
            LocalSettingKind::Return => "[Return]",
            LocalSettingKind::Unknown => "",
        }
    }

    pub fn has_primary_value(&self) -> bool {
        matches!(
            self,
            LocalSettingKind::Setup
                | LocalSettingKind::Teardown
                | LocalSettingKind::Template
                | LocalSettingKind::Timeout
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum VariableKind {
    Scalar,
    List,
    Dictionary,
    Invalid,
}

/// Semantic tag assigned by the mapper that claimed a token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TokenType {
    Unknown,
    TableHeader(TableKind),
    UnknownTableHeader,
    TableHeaderColumn,
    CommentTableContent,
    StartHashComment,
    CommentContinue,
    PreviousLineContinue,
    EmptyCell,
    DeprecatedSynonym,
    SettingDeclaration(SettingKind),
    SettingValue(SettingKind),
    SettingArgument(SettingKind),
    SettingUnwantedArgument(SettingKind),
    LibraryAlias,
    LibraryAliasValue,
    VariableDeclaration(VariableKind),
    VariableValue,
    UnitName(UnitKind),
    LocalSettingDeclaration(UnitKind, LocalSettingKind),
    LocalSettingValue(UnitKind, LocalSettingKind),
    LocalSettingArgument(UnitKind, LocalSettingKind),
    Assignment,
    ActionName(UnitKind),
    ActionArgument(UnitKind),
    ForToken,
    InToken,
    EndToken,
    ForContinue,
}

impl TokenType {
    pub fn is_comment(&self) -> bool {
        matches!(self, TokenType::StartHashComment | TokenType::CommentContinue)
    }
}
