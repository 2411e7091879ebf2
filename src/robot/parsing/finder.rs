//! Element finders
//!
//! Mappers that extend an element look it up here instead of keeping references around.
//! An element only counts when it sits after the latest header of its table.

use crate::robot::model::{Document, ExecutableUnit, Setting, Table, Variable};
use crate::robot::range::Position;
use crate::robot::token::UnitKind;

/// Last unit after the latest header of its table, without creating one.
pub fn unit(document: &Document, kind: UnitKind) -> Option<&ExecutableUnit> {
    let table = document.executable_table(kind)?;
    let header = table.latest_header()?.position;
    table.units.last().filter(|u| u.position > header)
}

pub fn setting(document: &Document) -> Option<&Setting> {
    let table = document.settings.as_ref()?;
    let header = table.latest_header()?.position;
    table.settings.last().filter(|s| s.position > header)
}

/// The unit rows and local settings currently go to.
///
/// This is the last unit declared after the latest header; when there is none, a synthetic
/// unit without a name is created at `position`, so that content following a lone header
/// still has a home.
pub fn unit_mut(
    document: &mut Document,
    kind: UnitKind,
    position: Position,
) -> Option<&mut ExecutableUnit> {
    document.table_mut_or_insert(kind.table())?;
    let table = document.executable_table_mut(kind)?;
    let header = table.latest_header().map(|h| h.position);
    let open = match (table.units.last(), header) {
        (Some(unit), Some(header)) => unit.position > header,
        (Some(_), None) => true,
        (None, _) => false,
    };
    if !open {
        tracing::trace!(%position, ?kind, "creating unnamed unit");
        table.units.push(ExecutableUnit::new(kind, None, position));
    }
    table.units.last_mut()
}

/// Last setting after the latest settings header.
pub fn setting_mut(document: &mut Document) -> Option<&mut Setting> {
    let table = document.settings.as_mut()?;
    let header = table.latest_header()?.position;
    table.settings.last_mut().filter(|s| s.position > header)
}

/// Last variable after the latest variables header.
pub fn variable_mut(document: &mut Document) -> Option<&mut Variable> {
    let table = document.variables.as_mut()?;
    let header = table.latest_header()?.position;
    table.variables.last_mut().filter(|v| v.position > header)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::robot::model::TableHeader;
    use crate::robot::token::line::SeparatorSyntax;
    use crate::robot::token::{TableKind, TokenId};
    use crate::robot::version::RobotVersion;

    fn empty_document() -> Document {
        Document::new(RobotVersion::default(), SeparatorSyntax::Space, Vec::new())
    }

    fn add_header(document: &mut Document, kind: TableKind, line: usize) {
        if let Some(table) = document.table_mut_or_insert(kind) {
            table
                .headers_mut()
                .push(TableHeader::new(TokenId::new(line - 1, 0), Position::new(line, 0, line * 10)));
        }
    }

    #[test]
    fn test_unit_mut_creates_synthetic_unit() {
        let mut document = empty_document();
        add_header(&mut document, TableKind::TestCases, 1);

        let unit = unit_mut(&mut document, UnitKind::TestCase, Position::new(2, 4, 24)).unwrap();
        assert_eq!(unit.name, None);
        assert_eq!(unit.position, Position::new(2, 4, 24));

        unit_mut(&mut document, UnitKind::TestCase, Position::new(3, 4, 34));
        assert_eq!(document.test_cases.as_ref().unwrap().units.len(), 1);
    }

    #[test]
    fn test_unit_mut_ignores_units_before_latest_header() {
        let mut document = empty_document();
        add_header(&mut document, TableKind::Keywords, 1);
        unit_mut(&mut document, UnitKind::Keyword, Position::new(2, 0, 20));
        add_header(&mut document, TableKind::Keywords, 5);

        unit_mut(&mut document, UnitKind::Keyword, Position::new(6, 4, 64));
        let units = &document.keywords.as_ref().unwrap().units;
        assert_eq!(units.len(), 2);
        assert_eq!(units[1].position.line, 6);
    }

    #[test]
    fn test_setting_mut_requires_header() {
        let mut document = empty_document();
        assert!(setting_mut(&mut document).is_none());
        add_header(&mut document, TableKind::Settings, 1);
        assert!(setting_mut(&mut document).is_none());
    }
}
