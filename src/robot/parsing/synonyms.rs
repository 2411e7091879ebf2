//! Deprecated spellings
//!
//!     Older releases of the format accepted other names for several headers, settings and
//!     markers. They are still recognized, mapped to the canonical element, and reported.
//!     All of them are listed in [`DEPRECATED_SYNONYMS`]; recognizers consult the table for
//!     their scope after the canonical names failed to match.
//!
//!     Patterns are matched against normalized names: lowercased, with whitespace removed
//!     and, for headers and local settings, without the surrounding `*` or brackets.
//!
//!     Setting names written with a trailing colon (`Library:`) are deprecated as well; that
//!     rule applies to every setting and lives in the setting recognizer.

use crate::robot::token::{LocalSettingKind, SettingKind, TableKind};
use once_cell::sync::Lazy;
use regex::Regex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SynonymScope {
    TableHeader,
    Setting,
    LocalSetting,
    LibraryAlias,
}

/// What a deprecated spelling stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SynonymTarget {
    Table(TableKind),
    Setting(SettingKind),
    LocalSetting(LocalSettingKind),
    LibraryAlias,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeprecatedSynonym {
    pub scope: SynonymScope,
    pub pattern: &'static str,
    pub target: SynonymTarget,
    /// Spelling to use instead
    pub canonical: &'static str,
}

const fn synonym(
    scope: SynonymScope,
    pattern: &'static str,
    target: SynonymTarget,
    canonical: &'static str,
) -> DeprecatedSynonym {
    DeprecatedSynonym {
        scope,
        pattern,
        target,
        canonical,
    }
}

use SynonymScope as Scope;
use SynonymTarget as Target;

pub const DEPRECATED_SYNONYMS: &[DeprecatedSynonym] = &[
    synonym(Scope::TableHeader, r"^metadata$", Target::Table(TableKind::Settings), "Settings"),
    synonym(Scope::TableHeader, r"^userkeywords?$", Target::Table(TableKind::Keywords), "Keywords"),
    synonym(Scope::Setting, r"^suiteprecondition$", Target::Setting(SettingKind::SuiteSetup), "Suite Setup"),
    synonym(Scope::Setting, r"^suitepostcondition$", Target::Setting(SettingKind::SuiteTeardown), "Suite Teardown"),
    synonym(Scope::Setting, r"^testprecondition$", Target::Setting(SettingKind::TestSetup), "Test Setup"),
    synonym(Scope::Setting, r"^testpostcondition$", Target::Setting(SettingKind::TestTeardown), "Test Teardown"),
    synonym(Scope::Setting, r"^document$", Target::Setting(SettingKind::Documentation), "Documentation"),
    synonym(Scope::Setting, r"^meta:?$", Target::Setting(SettingKind::Metadata), "Metadata"),
    synonym(Scope::LocalSetting, r"^precondition$", Target::LocalSetting(LocalSettingKind::Setup), "[Setup]"),
    synonym(Scope::LocalSetting, r"^postcondition$", Target::LocalSetting(LocalSettingKind::Teardown), "[Teardown]"),
    synonym(Scope::LocalSetting, r"^document$", Target::LocalSetting(LocalSettingKind::Documentation), "[Documentation]"),
    synonym(Scope::LibraryAlias, r"^withname$", Target::LibraryAlias, "WITH NAME"),
];

static COMPILED: Lazy<Vec<(Regex, &'static DeprecatedSynonym)>> = Lazy::new(|| {
    DEPRECATED_SYNONYMS
        .iter()
        .map(|s| (Regex::new(s.pattern).expect("valid regex"), s))
        .collect()
});

/// First deprecated synonym of `scope` matching the normalized `name`.
pub fn find(scope: SynonymScope, name: &str) -> Option<&'static DeprecatedSynonym> {
    COMPILED
        .iter()
        .filter(|(_, s)| s.scope == scope)
        .find(|(regex, _)| regex.is_match(name))
        .map(|(_, s)| *s)
}
