//! Token tags and positions as seen through `Document::dump_tokens`

use robot_parser::robot::model::EditError;
use robot_parser::{parse, Document, ParserOptions};

const SMALL: &str = "*** Settings ***\nLibrary    Collections\n*** Test Cases ***\nExample\n    Log    ${x}\n";

fn parse_default(source: &str) -> Document {
    parse(source, &ParserOptions::default())
}

#[test]
fn test_small_document_tokens() {
    let document = parse_default(SMALL);
    insta::assert_snapshot!(document.dump_tokens(), @r###"
    1:0 TableHeader(Settings) "*** Settings ***"
    2:0 SettingDeclaration(Library) "Library"
    2:11 SettingValue(Library) "Collections"
    3:0 TableHeader(TestCases) "*** Test Cases ***"
    4:0 UnitName(TestCase) "Example"
    5:4 ActionName(TestCase) "Log"
    5:11 ActionArgument(TestCase) "${x}"
    "###);
}

#[test]
fn test_edit_then_reparse_gives_same_tokens() {
    let mut document = parse_default(SMALL);
    let id = document
        .tokens()
        .find(|(_, token)| token.text() == "Log")
        .map(|(id, _)| id)
        .expect("Log token");

    document.set_token_text(id, "Log To Console").expect("single cell edit");
    let source = document.to_source();
    assert_eq!(
        source,
        "*** Settings ***\nLibrary    Collections\n*** Test Cases ***\nExample\n    Log To Console    ${x}\n"
    );

    let reparsed = parse_default(&source);
    assert_eq!(reparsed.dump_tokens(), document.dump_tokens());
}

#[test]
fn test_edit_shifts_following_lines() {
    let mut document = parse_default(SMALL);
    let library = document
        .tokens()
        .find(|(_, token)| token.text() == "Collections")
        .map(|(id, _)| id)
        .expect("library value");
    let before = document
        .tokens()
        .find(|(_, token)| token.text() == "${x}")
        .map(|(_, token)| token.position())
        .expect("argument");

    document.set_token_text(library, "String").expect("single cell edit");
    let after = document
        .tokens()
        .find(|(_, token)| token.text() == "${x}")
        .map(|(_, token)| token.position())
        .expect("argument");

    assert_eq!(after.line, before.line);
    assert_eq!(after.column, before.column);
    assert_eq!(after.offset + 5, before.offset);

    let reparsed = parse_default(&document.to_source());
    assert_eq!(reparsed, document);
}

#[test]
fn test_edit_rejects_text_that_splits_the_cell() {
    let mut document = parse_default(SMALL);
    let id = document
        .tokens()
        .find(|(_, token)| token.text() == "Log")
        .map(|(id, _)| id)
        .expect("Log token");

    let result = document.set_token_text(id, "Log    twice");
    assert_eq!(result, Err(EditError::WouldSplitCell("Log    twice".to_string())));
    assert_eq!(document.to_source(), SMALL);
}
