//! Keyword calls nested in the arguments of control keywords
//!
//!     `Run Keyword If    ${ok}    Log    yes    ELSE    Fail` is one row, but it executes
//!     `Log` or `Fail`. [`nested_executables`] splits the arguments of such keywords back
//!     into the calls they contain, so those calls can be checked like regular rows.
//!
//!     Arguments that belong to the control keyword itself (conditions, retry counts,
//!     expected errors) are returned as omitted tokens: they are not calls, yet their
//!     variables still need checking.
//!
//!     Keywords are matched by name, ignoring case, spaces and underscores, with an optional
//!     `BuiltIn.` prefix.

use crate::robot::model::{Document, ExecutableRow};
use crate::robot::token::RobotToken;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Position of the nested keyword name among the arguments of simple control keywords
const KEYWORD_ARGUMENT: &[(&str, usize)] = &[
    ("Repeat Keyword", 1),
    ("Run Keyword", 0),
    ("Run Keyword And Continue On Failure", 0),
    ("Run Keyword And Expect Error", 1),
    ("Run Keyword And Ignore Error", 0),
    ("Run Keyword And Return", 0),
    ("Run Keyword And Return If", 1),
    ("Run Keyword And Return Status", 0),
    ("Run Keyword If All Critical Tests Passed", 0),
    ("Run Keyword If All Tests Passed", 0),
    ("Run Keyword If Any Critical Tests Failed", 0),
    ("Run Keyword If Any Tests Failed", 0),
    ("Run Keyword If Test Failed", 0),
    ("Run Keyword If Test Passed", 0),
    ("Run Keyword If Timeout Occurred", 0),
    ("Run Keyword Unless", 1),
    ("Wait Until Keyword Succeeds", 2),
];

/// Keywords that set the variable named by their first argument
const VARIABLE_CREATING: &[&str] = &["Set Test Variable", "Set Suite Variable", "Set Global Variable"];

/// Keywords whose first argument names a variable instead of using it
const VARIABLE_NAMING: &[&str] = &[
    "Set Test Variable",
    "Set Suite Variable",
    "Set Global Variable",
    "Get Variable Value",
    "Variable Should Exist",
    "Variable Should Not Exist",
];

const ELSE: &str = "ELSE";
const ELSE_IF: &str = "ELSE IF";
const AND: &str = "AND";

/// Normalized keyword name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct KeywordName(String);

impl KeywordName {
    pub fn new(name: &str) -> Self {
        let trimmed = name.trim();
        let unqualified = match trimmed.get(..8) {
            Some(prefix) if prefix.eq_ignore_ascii_case("builtin.") => &trimmed[8..],
            _ => trimmed,
        };
        Self(
            unqualified
                .chars()
                .filter(|c| !c.is_whitespace() && *c != '_')
                .flat_map(char::to_lowercase)
                .collect(),
        )
    }

    pub fn is(&self, name: &str) -> bool {
        *self == KeywordName::new(name)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the first argument is the name of a variable the keyword creates.
    pub fn creates_variable(&self) -> bool {
        VARIABLE_CREATING.iter().any(|name| self.is(name))
    }

    /// Whether the first argument names a variable rather than using it.
    pub fn names_variable(&self) -> bool {
        VARIABLE_NAMING.iter().any(|name| self.is(name))
    }

    /// Whether arguments of this keyword may hold keyword calls.
    pub fn has_nested_executables(&self) -> bool {
        self.is("Run Keyword If") || self.is("Run Keywords") || self.keyword_argument().is_some()
    }

    fn keyword_argument(&self) -> Option<usize> {
        KEYWORD_ARGUMENT
            .iter()
            .find(|(name, _)| self.is(name))
            .map(|(_, index)| *index)
    }
}

impl fmt::Display for KeywordName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One keyword call found in the arguments
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NestedCall<'a> {
    pub action: &'a RobotToken,
    pub arguments: Vec<&'a RobotToken>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NestedExecutables<'a> {
    pub executables: Vec<NestedCall<'a>>,
    /// Arguments of the control keyword itself
    pub omitted: Vec<&'a RobotToken>,
}

impl<'a> NestedExecutables<'a> {
    fn add_call(&mut self, action: &'a RobotToken, arguments: &[&'a RobotToken]) {
        if action.text().is_empty() {
            return;
        }
        self.executables.push(NestedCall {
            action,
            arguments: arguments.to_vec(),
        });
    }

    pub fn has_executables(&self) -> bool {
        !self.executables.is_empty()
    }
}

/// One violation of the `ELSE IF` / `ELSE` structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NestedProblem {
    pub message: &'static str,
    pub token: RobotToken,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", summary(.problems))]
pub struct NestedKeywordsSyntaxError {
    pub problems: Vec<NestedProblem>,
}

fn summary(problems: &[NestedProblem]) -> String {
    problems
        .iter()
        .map(|p| format!("{} ({})", p.message, p.token.position()))
        .collect::<Vec<_>>()
        .join("; ")
}

impl NestedKeywordsSyntaxError {
    fn with_message(message: &'static str, tokens: &[&RobotToken]) -> Self {
        Self {
            problems: tokens
                .iter()
                .map(|token| NestedProblem {
                    message,
                    token: (*token).clone(),
                })
                .collect(),
        }
    }
}

/// Split the arguments of `keyword` into the calls they hold.
///
/// Keywords without nested calls give an empty result.
pub fn nested_executables<'a, I>(
    keyword: &str,
    arguments: I,
) -> Result<NestedExecutables<'a>, NestedKeywordsSyntaxError>
where
    I: IntoIterator<Item = &'a RobotToken>,
{
    let name = KeywordName::new(keyword);
    let arguments: Vec<&'a RobotToken> = arguments.into_iter().collect();

    if name.is("Run Keyword If") {
        return run_keyword_if(&arguments);
    }
    if name.is("Run Keywords") {
        return Ok(run_keywords(&arguments));
    }
    let mut nested = NestedExecutables::default();
    if let Some(index) = name.keyword_argument() {
        let omitted = (index + 1).min(arguments.len());
        nested.omitted.extend_from_slice(&arguments[..omitted]);
        if let Some(action) = arguments.get(index).copied() {
            nested.add_call(action, &arguments[index + 1..]);
        }
    }
    Ok(nested)
}

/// Nested calls of one parsed row.
pub fn row_executables<'a>(
    document: &'a Document,
    row: &ExecutableRow,
) -> Result<NestedExecutables<'a>, NestedKeywordsSyntaxError> {
    let Some(action) = row.action else {
        return Ok(NestedExecutables::default());
    };
    let arguments = row.arguments.iter().filter_map(|id| document.token(*id));
    nested_executables(document.text(action), arguments)
}

struct Branch<'a> {
    marker: Option<&'a RobotToken>,
    tokens: Vec<&'a RobotToken>,
}

impl Branch<'_> {
    fn is(&self, marker: &str) -> bool {
        self.marker.is_some_and(|m| m.text() == marker)
    }
}

fn run_keyword_if<'a>(
    arguments: &[&'a RobotToken],
) -> Result<NestedExecutables<'a>, NestedKeywordsSyntaxError> {
    let mut nested = NestedExecutables::default();
    let Some((condition, rest)) = arguments.split_first() else {
        return Ok(nested);
    };

    // a marker right after a condition opens the next branch and leaves this one without keyword
    let mut branches = vec![Branch {
        marker: None,
        tokens: vec![*condition],
    }];
    for argument in rest.iter().copied() {
        if argument.text() == ELSE_IF || argument.text() == ELSE {
            branches.push(Branch {
                marker: Some(argument),
                tokens: Vec::new(),
            });
        } else if let Some(branch) = branches.last_mut() {
            branch.tokens.push(argument);
        }
    }
    validate_branches(&branches)?;

    for branch in &branches {
        if branch.is(ELSE) {
            nested.add_call(branch.tokens[0], &branch.tokens[1..]);
        } else {
            nested.omitted.push(branch.tokens[0]);
            nested.add_call(branch.tokens[1], &branch.tokens[2..]);
        }
    }
    Ok(nested)
}

fn validate_branches(branches: &[Branch<'_>]) -> Result<(), NestedKeywordsSyntaxError> {
    let else_markers: Vec<&RobotToken> = branches
        .iter()
        .filter(|b| b.is(ELSE))
        .filter_map(|b| b.marker)
        .collect();
    if else_markers.len() > 1 {
        return Err(NestedKeywordsSyntaxError::with_message(
            "Multiple ELSE branches are defined",
            &else_markers,
        ));
    }
    if else_markers.len() == 1 && !branches.last().is_some_and(|b| b.is(ELSE)) {
        return Err(NestedKeywordsSyntaxError::with_message(
            "ELSE branch should not be followed by ELSE IF branches",
            &else_markers,
        ));
    }

    let mut problems = Vec::new();
    for branch in branches {
        let (message, token) = match branch.marker {
            None if branch.tokens.len() < 2 => (
                "Run Keyword If requires condition and keyword to be defined",
                branch.tokens.first().copied(),
            ),
            Some(marker) if branch.is(ELSE_IF) && branch.tokens.len() < 2 => (
                "ELSE IF branch requires condition and keyword to be defined",
                Some(marker),
            ),
            Some(marker) if branch.is(ELSE) && branch.tokens.is_empty() => {
                ("ELSE branch requires keyword to be defined", Some(marker))
            }
            _ => continue,
        };
        if let Some(token) = token {
            problems.push(NestedProblem {
                message,
                token: token.clone(),
            });
        }
    }
    if problems.is_empty() {
        Ok(())
    } else {
        Err(NestedKeywordsSyntaxError { problems })
    }
}

fn run_keywords<'a>(arguments: &[&'a RobotToken]) -> NestedExecutables<'a> {
    let mut nested = NestedExecutables::default();
    if !arguments.iter().any(|a| a.text() == AND) {
        for argument in arguments.iter().copied() {
            nested.add_call(argument, &[]);
        }
        return nested;
    }

    let mut action: Option<&'a RobotToken> = None;
    let mut call_arguments: Vec<&'a RobotToken> = Vec::new();
    for argument in arguments.iter().copied() {
        match action {
            Some(current) if argument.text() == AND => {
                nested.add_call(current, &call_arguments);
                action = None;
                call_arguments.clear();
            }
            None => action = Some(argument),
            Some(_) => call_arguments.push(argument),
        }
    }
    if let Some(current) = action {
        nested.add_call(current, &call_arguments);
    }
    nested
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::robot::range::Position;
    use rstest::rstest;

    fn tokens(texts: &[&str]) -> Vec<RobotToken> {
        let mut offset = 0;
        texts
            .iter()
            .map(|text| {
                let token = RobotToken::new(*text, Position::new(1, offset, offset));
                offset += text.len() + 4;
                token
            })
            .collect()
    }

    fn calls(nested: &NestedExecutables<'_>) -> Vec<(String, Vec<String>)> {
        nested
            .executables
            .iter()
            .map(|call| {
                (
                    call.action.text().to_string(),
                    call.arguments.iter().map(|a| a.text().to_string()).collect(),
                )
            })
            .collect()
    }

    fn texts(found: &[&RobotToken]) -> Vec<String> {
        found.iter().map(|t| t.text().to_string()).collect()
    }

    #[rstest]
    #[case("Run Keyword If", true)]
    #[case("run_keyword_if", true)]
    #[case("BuiltIn.Run Keyword If", true)]
    #[case("builtin.RUN KEYWORDS", true)]
    #[case("Wait Until Keyword Succeeds", true)]
    #[case("Log", false)]
    #[case("Other.Run Keyword", false)]
    fn test_keyword_names(#[case] name: &str, #[case] nested: bool) {
        assert_eq!(KeywordName::new(name).has_nested_executables(), nested);
    }

    #[test]
    fn test_run_keyword_if_branches() {
        let args = tokens(&[
            "${cond}", "Log", "hi", "ELSE IF", "${cond2}", "Log", "bye", "ELSE", "Log", "default",
        ]);
        let nested = nested_executables("Run Keyword If", &args).unwrap();
        assert_eq!(
            calls(&nested),
            vec![
                ("Log".to_string(), vec!["hi".to_string()]),
                ("Log".to_string(), vec!["bye".to_string()]),
                ("Log".to_string(), vec!["default".to_string()]),
            ]
        );
        assert_eq!(texts(&nested.omitted), vec!["${cond}", "${cond2}"]);
    }

    #[test]
    fn test_else_if_without_keyword() {
        let args = tokens(&["${a}", "Log", "x", "ELSE IF", "${b}", "ELSE", "Log", "y"]);
        let error = nested_executables("Run Keyword If", &args).unwrap_err();
        assert_eq!(error.problems.len(), 1);
        assert_eq!(
            error.problems[0].message,
            "ELSE IF branch requires condition and keyword to be defined"
        );
        assert_eq!(error.problems[0].token, args[3]);
    }

    #[test]
    fn test_every_branch_problem_is_reported() {
        let args = tokens(&["${a}", "Log", "ELSE IF", "${b}", "ELSE IF", "${c}", "ELSE"]);
        let error = nested_executables("Run Keyword If", &args).unwrap_err();
        let messages: Vec<_> = error.problems.iter().map(|p| p.message).collect();
        assert_eq!(
            messages,
            vec![
                "ELSE IF branch requires condition and keyword to be defined",
                "ELSE IF branch requires condition and keyword to be defined",
                "ELSE branch requires keyword to be defined",
            ]
        );
        assert!(error.to_string().contains("ELSE branch requires keyword to be defined"));
    }

    #[rstest]
    #[case(&["${a}", "Log", "ELSE", "A", "ELSE", "B"], "Multiple ELSE branches are defined", 2)]
    #[case(
        &["${a}", "Log", "ELSE", "A", "ELSE IF", "${b}", "B"],
        "ELSE branch should not be followed by ELSE IF branches",
        1
    )]
    fn test_misplaced_else(#[case] texts: &[&str], #[case] message: &str, #[case] count: usize) {
        let args = tokens(texts);
        let error = nested_executables("Run Keyword If", &args).unwrap_err();
        assert_eq!(error.problems.len(), count);
        assert!(error.problems.iter().all(|p| p.message == message && p.token.text() == "ELSE"));
    }

    #[test]
    fn test_run_keyword_if_without_arguments() {
        let args = tokens(&[]);
        let nested = nested_executables("Run Keyword If", &args).unwrap();
        assert!(!nested.has_executables());
        assert!(nested.omitted.is_empty());
    }

    #[rstest]
    #[case(&["${c}"])]
    #[case(&["${c}", "ELSE", "Log", "x"])]
    #[case(&["${c}", "ELSE IF", "${d}", "Log"])]
    fn test_condition_without_keyword(#[case] texts: &[&str]) {
        let args = tokens(texts);
        let error = nested_executables("Run Keyword If", &args).unwrap_err();
        assert_eq!(error.problems.len(), 1);
        assert_eq!(
            error.problems[0].message,
            "Run Keyword If requires condition and keyword to be defined"
        );
        assert_eq!(error.problems[0].token, args[0]);
    }

    #[test]
    fn test_else_directly_after_condition_is_not_called() {
        let args = tokens(&["${c}", "ELSE", "Log", "x", "ELSE", "Log", "y"]);
        let error = nested_executables("Run Keyword If", &args).unwrap_err();
        assert!(error
            .problems
            .iter()
            .all(|p| p.message == "Multiple ELSE branches are defined"));
    }

    #[test]
    fn test_run_keywords_with_and() {
        let args = tokens(&["Log", "a", "AND", "No Operation", "AND", "Log", "b", "c"]);
        let nested = nested_executables("Run Keywords", &args).unwrap();
        assert_eq!(
            calls(&nested),
            vec![
                ("Log".to_string(), vec!["a".to_string()]),
                ("No Operation".to_string(), vec![]),
                ("Log".to_string(), vec!["b".to_string(), "c".to_string()]),
            ]
        );
    }

    #[test]
    fn test_run_keywords_without_and() {
        let args = tokens(&["Setup One", "", "Setup Two"]);
        let nested = nested_executables("BuiltIn.Run Keywords", &args).unwrap();
        assert_eq!(
            calls(&nested),
            vec![("Setup One".to_string(), vec![]), ("Setup Two".to_string(), vec![])]
        );
    }

    #[rstest]
    #[case("Wait Until Keyword Succeeds", &["3x", "1s", "Click", "id"], &["3x", "1s", "Click"], Some("Click"))]
    #[case("Run Keyword", &["Log", "x"], &["Log"], Some("Log"))]
    #[case("Repeat Keyword", &["5"], &["5"], None)]
    #[case("Log", &["a", "b"], &[], None)]
    fn test_generic_keywords(
        #[case] keyword: &str,
        #[case] arguments: &[&str],
        #[case] omitted: &[&str],
        #[case] action: Option<&str>,
    ) {
        let args = tokens(arguments);
        let nested = nested_executables(keyword, &args).unwrap();
        assert_eq!(texts(&nested.omitted), omitted.to_vec());
        assert_eq!(nested.executables.first().map(|c| c.action.text()), action);
    }

    #[test]
    fn test_variable_keywords() {
        assert!(KeywordName::new("Set Suite Variable").creates_variable());
        assert!(KeywordName::new("Get Variable Value").names_variable());
        assert!(!KeywordName::new("Get Variable Value").creates_variable());
    }
}
