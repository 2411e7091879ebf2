//! Cell recognizers
//!
//!     Recognizers decide what a cell's text names, regardless of where the cell sits.
//!     Context (which table, which column, what came before) is the mappers' business.
//!
//!     Names are compared after normalization: lowercase, whitespace removed. Canonical
//!     names are tried first, then the deprecated synonyms of the matching scope.

use super::synonyms::{self, DeprecatedSynonym, SynonymScope, SynonymTarget};
use crate::robot::token::{LocalSettingKind, SettingKind, TableKind};
use crate::robot::version::RobotVersion;
use once_cell::sync::Lazy;
use regex::Regex;

/// A recognized name; `deprecated` holds the canonical spelling when a synonym was used
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Recognized<K> {
    pub kind: K,
    pub deprecated: Option<&'static str>,
}

impl<K> Recognized<K> {
    fn canonical(kind: K) -> Self {
        Self {
            kind,
            deprecated: None,
        }
    }

    fn synonym(kind: K, canonical: &'static str) -> Self {
        Self {
            kind,
            deprecated: Some(canonical),
        }
    }
}

/// What a `*`-prefixed cell opens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderKind {
    Known(TableKind),
    /// `*** Tasks ***` before tasks existed
    TasksNotSupported,
    Unknown,
}

pub fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

const TABLE_NAMES: &[(&str, TableKind)] = &[
    ("setting", TableKind::Settings),
    ("settings", TableKind::Settings),
    ("variable", TableKind::Variables),
    ("variables", TableKind::Variables),
    ("testcase", TableKind::TestCases),
    ("testcases", TableKind::TestCases),
    ("task", TableKind::Tasks),
    ("tasks", TableKind::Tasks),
    ("keyword", TableKind::Keywords),
    ("keywords", TableKind::Keywords),
    ("comment", TableKind::Comments),
    ("comments", TableKind::Comments),
];

const SETTING_NAMES: &[(&str, SettingKind)] = &[
    ("library", SettingKind::Library),
    ("resource", SettingKind::Resource),
    ("variables", SettingKind::Variables),
    ("documentation", SettingKind::Documentation),
    ("metadata", SettingKind::Metadata),
    ("suitesetup", SettingKind::SuiteSetup),
    ("suiteteardown", SettingKind::SuiteTeardown),
    ("testsetup", SettingKind::TestSetup),
    ("testteardown", SettingKind::TestTeardown),
    ("testtemplate", SettingKind::TestTemplate),
    ("testtimeout", SettingKind::TestTimeout),
    ("forcetags", SettingKind::ForceTags),
    ("defaulttags", SettingKind::DefaultTags),
];

const TASK_SETTING_NAMES: &[(&str, SettingKind)] = &[
    ("tasksetup", SettingKind::TestSetup),
    ("taskteardown", SettingKind::TestTeardown),
    ("tasktemplate", SettingKind::TestTemplate),
    ("tasktimeout", SettingKind::TestTimeout),
];

const LOCAL_SETTING_NAMES: &[(&str, LocalSettingKind)] = &[
    ("documentation", LocalSettingKind::Documentation),
    ("tags", LocalSettingKind::Tags),
    ("setup", LocalSettingKind::Setup),
    ("teardown", LocalSettingKind::Teardown),
    ("template", LocalSettingKind::Template),
    ("timeout", LocalSettingKind::Timeout),
    ("arguments", LocalSettingKind::Arguments),
    ("return", LocalSettingKind::Return),
];

fn lookup<K: Copy>(names: &[(&str, K)], name: &str) -> Option<K> {
    names.iter().find(|(n, _)| *n == name).map(|(_, k)| *k)
}

/// Recognize a table header cell such as `*** Test Cases ***`.
pub fn table_header(text: &str, version: RobotVersion) -> Option<Recognized<HeaderKind>> {
    if !text.starts_with('*') {
        return None;
    }
    let name = normalize(text.trim_matches(|c: char| c == '*' || c.is_whitespace()));
    let recognized = match lookup(TABLE_NAMES, &name) {
        Some(kind) => Recognized::canonical(kind),
        None => match synonyms::find(SynonymScope::TableHeader, &name) {
            Some(DeprecatedSynonym {
                target: SynonymTarget::Table(kind),
                canonical,
                ..
            }) => Recognized::synonym(*kind, *canonical),
            _ => return Some(Recognized::canonical(HeaderKind::Unknown)),
        },
    };
    if recognized.kind == TableKind::Tasks && !version.supports_tasks() {
        return Some(Recognized::canonical(HeaderKind::TasksNotSupported));
    }
    Some(Recognized {
        kind: HeaderKind::Known(recognized.kind),
        deprecated: recognized.deprecated,
    })
}

/// Recognize a suite setting name. Unknown names give `None`.
pub fn setting(text: &str, version: RobotVersion) -> Option<Recognized<SettingKind>> {
    let name = normalize(text);
    if let Some(found) = setting_name(&name, version) {
        return Some(found);
    }
    let stripped = name.strip_suffix(':')?;
    setting_name(stripped, version).map(|found| {
        let canonical = found.deprecated.unwrap_or(found.kind.canonical_name());
        Recognized::synonym(found.kind, canonical)
    })
}

fn setting_name(name: &str, version: RobotVersion) -> Option<Recognized<SettingKind>> {
    if let Some(kind) = lookup(SETTING_NAMES, name) {
        return Some(Recognized::canonical(kind));
    }
    if version.supports_task_settings() {
        if let Some(kind) = lookup(TASK_SETTING_NAMES, name) {
            return Some(Recognized::canonical(kind));
        }
    }
    let synonym = synonyms::find(SynonymScope::Setting, name)?;
    match synonym.target {
        SynonymTarget::Setting(kind) => Some(Recognized::synonym(kind, synonym.canonical)),
        _ => None,
    }
}

static LOCAL_SETTING: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\[(.*)\]$").expect("valid regex"));

/// Recognize a bracketed local setting. Bracketed text with an unknown name gives
/// [`LocalSettingKind::Unknown`]; text without brackets gives `None`.
pub fn local_setting(text: &str) -> Option<Recognized<LocalSettingKind>> {
    let inner = LOCAL_SETTING.captures(text.trim())?.get(1)?.as_str();
    let name = normalize(inner);
    if let Some(kind) = lookup(LOCAL_SETTING_NAMES, &name) {
        return Some(Recognized::canonical(kind));
    }
    let found = synonyms::find(SynonymScope::LocalSetting, &name).and_then(|s| match s.target {
        SynonymTarget::LocalSetting(kind) => Some(Recognized::synonym(kind, s.canonical)),
        _ => None,
    });
    Some(found.unwrap_or(Recognized::canonical(LocalSettingKind::Unknown)))
}

/// Recognize the `WITH NAME` marker of a library import.
pub fn library_alias(text: &str) -> Option<Recognized<()>> {
    if text == "WITH NAME" {
        return Some(Recognized::canonical(()));
    }
    synonyms::find(SynonymScope::LibraryAlias, &normalize(text))
        .map(|s| Recognized::synonym((), s.canonical))
}

static VARIABLE_DECLARATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([$@&])\{[^{}]+\} ?=?$").expect("valid regex"));

/// Sigil of a variable table declaration such as `${name}` or `@{list} =`.
pub fn variable_declaration(text: &str) -> Option<char> {
    VARIABLE_DECLARATION
        .captures(text)?
        .get(1)?
        .as_str()
        .chars()
        .next()
}

static ASSIGNMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[$@&]\{[^{}]+\} ?=?$").expect("valid regex"));

/// A cell assigning the result of the row's action: `${x}`, `${x}=` or `@{x} =`.
pub fn is_assignment(text: &str) -> bool {
    ASSIGNMENT.is_match(text)
}

/// `:FOR` in any case and spacing, or `FOR` where loops end with `END`.
pub fn is_for_marker(text: &str, version: RobotVersion) -> bool {
    normalize(text) == ":for" || (version.supports_end_of_loop() && text == "FOR")
}

pub fn is_in_marker(text: &str) -> bool {
    matches!(
        normalize(text).as_str(),
        "in" | "inrange" | "inenumerate" | "inzip"
    )
}

pub fn is_end_marker(text: &str, version: RobotVersion) -> bool {
    version.supports_end_of_loop() && text == "END"
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const V30: RobotVersion = RobotVersion::new(3, 0);
    const V32: RobotVersion = RobotVersion::new(3, 2);

    #[rstest]
    #[case("*** Settings ***", HeaderKind::Known(TableKind::Settings), None)]
    #[case("*setting", HeaderKind::Known(TableKind::Settings), None)]
    #[case("***Test Cases***", HeaderKind::Known(TableKind::TestCases), None)]
    #[case("*** Metadata ***", HeaderKind::Known(TableKind::Settings), Some("Settings"))]
    #[case("*** User Keywords", HeaderKind::Known(TableKind::Keywords), Some("Keywords"))]
    #[case("*** Comments ***", HeaderKind::Known(TableKind::Comments), None)]
    #[case("*** Whatever ***", HeaderKind::Unknown, None)]
    fn test_table_header(
        #[case] text: &str,
        #[case] kind: HeaderKind,
        #[case] deprecated: Option<&'static str>,
    ) {
        assert_eq!(
            table_header(text, V32),
            Some(Recognized { kind, deprecated })
        );
    }

    #[test]
    fn test_tasks_header_depends_on_version() {
        assert_eq!(
            table_header("*** Tasks ***", V30).map(|r| r.kind),
            Some(HeaderKind::TasksNotSupported)
        );
        assert_eq!(
            table_header("*** Tasks ***", V32).map(|r| r.kind),
            Some(HeaderKind::Known(TableKind::Tasks))
        );
        assert_eq!(table_header("Tasks", V32), None);
    }

    #[rstest]
    #[case("Library", SettingKind::Library, None)]
    #[case("suite  SETUP", SettingKind::SuiteSetup, None)]
    #[case("Suite Precondition", SettingKind::SuiteSetup, Some("Suite Setup"))]
    #[case("Library:", SettingKind::Library, Some("Library"))]
    #[case("Meta:", SettingKind::Metadata, Some("Metadata"))]
    #[case("Metadata", SettingKind::Metadata, None)]
    #[case("Test Postcondition:", SettingKind::TestTeardown, Some("Test Teardown"))]
    #[case("Task Timeout", SettingKind::TestTimeout, None)]
    fn test_setting(
        #[case] text: &str,
        #[case] kind: SettingKind,
        #[case] deprecated: Option<&'static str>,
    ) {
        assert_eq!(setting(text, V32), Some(Recognized { kind, deprecated }));
    }

    #[test]
    fn test_unknown_settings() {
        assert_eq!(setting("Libary", V32), None);
        assert_eq!(setting("Task Setup", V30), None);
        assert_eq!(setting(":", V32), None);
    }

    #[rstest]
    #[case("[Setup]", LocalSettingKind::Setup, None)]
    #[case("[ Tags ]", LocalSettingKind::Tags, None)]
    #[case("[Precondition]", LocalSettingKind::Setup, Some("[Setup]"))]
    #[case("[Document]", LocalSettingKind::Documentation, Some("[Documentation]"))]
    #[case("[Foo]", LocalSettingKind::Unknown, None)]
    fn test_local_setting(
        #[case] text: &str,
        #[case] kind: LocalSettingKind,
        #[case] deprecated: Option<&'static str>,
    ) {
        assert_eq!(local_setting(text), Some(Recognized { kind, deprecated }));
    }

    #[test]
    fn test_library_alias() {
        assert_eq!(library_alias("WITH NAME").unwrap().deprecated, None);
        assert_eq!(library_alias("with name").unwrap().deprecated, Some("WITH NAME"));
        assert_eq!(library_alias("AS"), None);
    }

    #[rstest]
    #[case("${x}", Some('$'))]
    #[case("@{list} =", Some('@'))]
    #[case("&{d}=", Some('&'))]
    #[case("${a}${b}", None)]
    #[case("x", None)]
    fn test_variable_declaration(#[case] text: &str, #[case] sigil: Option<char>) {
        assert_eq!(variable_declaration(text), sigil);
    }

    #[test]
    fn test_loop_markers() {
        assert!(is_for_marker(": FOR", V30));
        assert!(!is_for_marker("FOR", V30));
        assert!(is_for_marker("FOR", V32));
        assert!(is_in_marker("IN RANGE"));
        assert!(!is_end_marker("END", V30));
        assert!(is_end_marker("END", V32));
    }
}
