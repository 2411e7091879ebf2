//! End-to-end tests over the sample documents in `docs/samples/`

use robot_parser::robot::model::Table;
use robot_parser::robot::nested::row_executables;
use robot_parser::robot::token::{SettingKind, TokenType};
use robot_parser::{parse, Document, ParserOptions, RobotVersion, SeparatorSyntax};
use std::fs;

fn read_sample_document(path: &str) -> String {
    fs::read_to_string(path).expect("Failed to read sample document")
}

fn parse_sample(path: &str) -> (String, Document) {
    let source = read_sample_document(path);
    let document = parse(&source, &ParserOptions::default());
    (source, document)
}

fn unit_names(document: &Document, table: Option<&robot_parser::robot::model::ExecutableTable>) -> Vec<String> {
    table
        .map(|t| {
            t.named_units()
                .filter_map(|u| u.name)
                .map(|id| document.text(id).to_string())
                .collect()
        })
        .unwrap_or_default()
}

#[test]
fn test_suite_sample_is_lossless() {
    let (source, document) = parse_sample("docs/samples/suite.robot");
    assert_eq!(document.to_source(), source);
}

#[test]
fn test_suite_sample_has_no_problems() {
    let (_, document) = parse_sample("docs/samples/suite.robot");
    assert_eq!(document.syntax, SeparatorSyntax::Space);
    assert_eq!(document.problems, vec![]);
}

#[test]
fn test_suite_sample_tables() {
    let (_, document) = parse_sample("docs/samples/suite.robot");

    let settings = document.settings.as_ref().expect("settings table");
    assert_eq!(settings.settings.len(), 5);
    assert_eq!(settings.settings_of(SettingKind::Library).count(), 2);

    let aliased = settings
        .settings_of(SettingKind::Library)
        .find_map(|s| s.alias.as_ref())
        .expect("library alias");
    assert_eq!(aliased.name.map(|id| document.text(id)), Some("Browser"));

    let variables = document.variables.as_ref().expect("variables table");
    let declared: Vec<&str> = variables
        .variables
        .iter()
        .map(|v| document.text(v.declaration))
        .collect();
    assert_eq!(declared, vec!["${HOST}", "@{USERS}", "&{LIMITS}"]);

    assert_eq!(
        unit_names(&document, document.test_cases.as_ref()),
        vec!["Login Works", "Loops"]
    );
    assert_eq!(
        unit_names(&document, document.keywords.as_ref()),
        vec!["Open Session"]
    );
    assert!(document.tasks.is_none());
}

#[test]
fn test_documentation_continues_across_lines() {
    let (_, document) = parse_sample("docs/samples/suite.robot");
    let settings = document.settings.as_ref().expect("settings table");
    let documentation = settings
        .settings_of(SettingKind::Documentation)
        .next()
        .expect("documentation");

    let mut texts: Vec<&str> = documentation.value.iter().map(|id| document.text(*id)).collect();
    texts.extend(documentation.arguments.iter().map(|id| document.text(*id)));
    assert_eq!(texts, vec!["Example suite", "spanning two lines"]);
}

#[test]
fn test_continued_row_collects_arguments() {
    let (_, document) = parse_sample("docs/samples/suite.robot");
    let tests = document.test_cases.as_ref().expect("test case table");
    let row = tests.units[0]
        .rows()
        .find(|r| r.action.map(|id| document.text(id)) == Some("Log Many"))
        .expect("Log Many row");

    let arguments: Vec<&str> = row.arguments.iter().map(|id| document.text(*id)).collect();
    assert_eq!(arguments, vec!["a", "b"]);
}

#[test]
fn test_assignment_row() {
    let (_, document) = parse_sample("docs/samples/suite.robot");
    let tests = document.test_cases.as_ref().expect("test case table");
    let row = tests.units[0]
        .rows()
        .find(|r| !r.assignments.is_empty())
        .expect("assignment row");

    assert_eq!(document.text(row.assignments[0]), "${user} =");
    assert_eq!(row.action.map(|id| document.text(id)), Some("Set Variable"));
}

#[test]
fn test_old_style_for_loop() {
    let (_, document) = parse_sample("docs/samples/suite.robot");
    let tests = document.test_cases.as_ref().expect("test case table");
    let rows: Vec<_> = tests.units[1].rows().collect();
    assert_eq!(rows.len(), 2);

    let header = rows[0].action.and_then(|id| document.token(id)).expect("for header");
    assert!(header.has_type(TokenType::ForToken));

    let body = rows[1];
    let marker = body.for_continue.and_then(|id| document.token(id)).expect("body marker");
    assert_eq!(marker.primary_type(), TokenType::ForContinue);
    assert_eq!(body.action.map(|id| document.text(id)), Some("Log"));
}

#[test]
fn test_run_keyword_if_branches() {
    let (_, document) = parse_sample("docs/samples/suite.robot");
    let tests = document.test_cases.as_ref().expect("test case table");
    let row = tests.units[0]
        .rows()
        .find(|r| r.action.map(|id| document.text(id)) == Some("Run Keyword If"))
        .expect("Run Keyword If row");

    let nested = row_executables(&document, row).expect("well-formed branches");
    let calls: Vec<(&str, Vec<&str>)> = nested
        .executables
        .iter()
        .map(|call| (call.action.text(), call.arguments.iter().map(|t| t.text()).collect()))
        .collect();
    assert_eq!(
        calls,
        vec![
            ("Log", vec!["hi"]),
            ("Log", vec!["bye"]),
            ("Log", vec!["default"]),
        ]
    );
    let omitted: Vec<&str> = nested.omitted.iter().map(|t| t.text()).collect();
    assert_eq!(omitted, vec!["${ok}", "${other}"]);
}

#[test]
fn test_pipe_sample() {
    let (source, document) = parse_sample("docs/samples/pipes.robot");
    assert_eq!(document.syntax, SeparatorSyntax::Pipe);
    assert_eq!(document.to_source(), source);
    assert_eq!(document.problems, vec![]);

    let tests = document.test_cases.as_ref().expect("test case table");
    let rows: Vec<_> = tests.units[0].rows().collect();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1].action.map(|id| document.text(id)), Some("Should Be Equal"));
    let arguments: Vec<&str> = rows[1].arguments.iter().map(|id| document.text(*id)).collect();
    assert_eq!(arguments, vec!["${a}", "${b}"]);
}

#[test]
fn test_repeated_header_reuses_table() {
    let source = "\
*** Test Cases ***
First
    Log    one
*** Keywords ***
Helper
    No Operation
*** Test Cases ***
Second
    Log    two
";
    let document = parse(source, &ParserOptions::default());
    let tests = document.test_cases.as_ref().expect("test case table");
    assert_eq!(tests.headers().len(), 2);
    assert_eq!(unit_names(&document, Some(tests)), vec!["First", "Second"]);

    // every unit sits after the first header of its table
    let first_header = tests.headers()[0].position;
    assert!(tests.units.iter().all(|u| u.position > first_header));
    let second_header = tests.headers()[1].position;
    assert!(tests.units[1].position > second_header);
    assert!(tests.units[0].position < second_header);
}

#[test]
fn test_content_after_repeated_header_starts_a_new_unit() {
    let source = "\
*** Test Cases ***
First
    Log    one
*** Test Cases ***
    Log    two
";
    let document = parse(source, &ParserOptions::default());
    let tests = document.test_cases.as_ref().expect("test case table");
    assert_eq!(tests.units.len(), 2);
    assert!(tests.units[1].name.is_none());
    assert_eq!(tests.units[0].rows().count(), 1);
}

#[test]
fn test_version_is_recorded() {
    let options = ParserOptions {
        version: "3.0".parse::<RobotVersion>().expect("version"),
        separator: None,
    };
    let document = parse("*** Settings ***\n", &options);
    assert_eq!(document.version, options.version);
}
