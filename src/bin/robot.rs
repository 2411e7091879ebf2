//! Command-line interface for robot test data
//! Parses test data files and reports what the parser sees in them.
//!
//! Usage:
//!   robot parse `<path>` [--format json|yaml|tokens]     - Print the document model
//!   robot check `<paths>...` [--jobs `<n>`]                - Report problems, exit 1 when any
//!   robot vars `<expression>`                            - Show the variables of one cell
//!
//! Every subcommand accepts --config `<file>`, --version `<X.Y>` and --separator.
//! Without --config, the nearest `robot.toml` in the working directory or its parents is used.
//! `check` keeps going past unreadable files and exits 1 when any file failed.

use clap::{Arg, ArgAction, ArgMatches, Command};
use robot_config::{
    Error as ConfigError, FileSettings, OutputFormat, Overrides, RobotConfig, SeparatorChoice,
};
use robot_parser::robot::expressions::{ExpressionPart, ExpressionSyntax, VariableUse};
use robot_parser::robot::nested::row_executables;
use robot_parser::robot::range::Position;
use robot_parser::robot::version::VersionParseError;
use robot_parser::{Document, ParserOptions, RobotParser, RobotVersion, SeparatorSyntax};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{AcquireError, Semaphore};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Error)]
enum CliError {
    #[error("cannot read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Version(#[from] VersionParseError),
    #[error("cannot write JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("cannot write YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("cannot start the runtime: {0}")]
    Runtime(#[source] std::io::Error),
    #[error("worker failed: {0}")]
    Join(#[from] tokio::task::JoinError),
    #[error("worker pool closed: {0}")]
    Pool(#[from] AcquireError),
}

fn main() -> ExitCode {
    let matches = cli().get_matches();
    let Some((name, sub)) = matches.subcommand() else {
        return ExitCode::FAILURE;
    };

    let config = match load_config(sub) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    init_logging(&config);

    let result = match name {
        "parse" => handle_parse_command(sub, &config),
        "check" => handle_check_command(sub, &config),
        "vars" => handle_vars_command(sub, &config),
        _ => Ok(true),
    };
    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn cli() -> Command {
    let common = [
        Arg::new("config")
            .long("config")
            .short('c')
            .help("Configuration file layered over the defaults"),
        Arg::new("version")
            .long("version")
            .short('V')
            .help("Grammar version of the test data (e.g. '3.1')"),
        Arg::new("separator")
            .long("separator")
            .help("Cell separators")
            .value_parser(["auto", "space", "pipe"]),
    ];

    Command::new("robot")
        .about("A tool for inspecting robot test data files")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("parse")
                .about("Print the document model of a file")
                .arg(
                    Arg::new("path")
                        .help("Path to the test data file")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("format")
                        .long("format")
                        .short('f')
                        .help("Output format")
                        .value_parser(["json", "yaml", "tokens"]),
                )
                .args(common.clone()),
        )
        .subcommand(
            Command::new("check")
                .about("Report parse problems of files")
                .arg(
                    Arg::new("paths")
                        .help("Paths to test data files")
                        .required(true)
                        .num_args(1..)
                        .action(ArgAction::Append),
                )
                .arg(
                    Arg::new("jobs")
                        .long("jobs")
                        .short('j')
                        .help("Files parsed at the same time")
                        .value_parser(clap::value_parser!(u32).range(1..)),
                )
                .args(common.clone()),
        )
        .subcommand(
            Command::new("vars")
                .about("Show the variables found in one cell")
                .arg(
                    Arg::new("expression")
                        .help("Cell text, e.g. '${a}[0]'")
                        .required(true)
                        .index(1),
                )
                .args(common),
        )
}

fn load_config(matches: &ArgMatches) -> Result<RobotConfig, CliError> {
    let file = match matches.get_one::<String>("config") {
        Some(path) => Some(PathBuf::from(path)),
        None => std::env::current_dir()
            .ok()
            .and_then(|dir| robot_config::discover(&dir)),
    };
    let overrides = Overrides {
        version: matches.get_one::<String>("version").cloned(),
        separator: matches
            .get_one::<String>("separator")
            .map(|value| match value.as_str() {
                "space" => SeparatorChoice::Space,
                "pipe" => SeparatorChoice::Pipe,
                _ => SeparatorChoice::Auto,
            }),
        format: matches
            .try_get_one::<String>("format")
            .ok()
            .flatten()
            .map(|value| match value.as_str() {
                "yaml" => OutputFormat::Yaml,
                "tokens" => OutputFormat::Tokens,
                _ => OutputFormat::Json,
            }),
        jobs: matches
            .try_get_one::<u32>("jobs")
            .ok()
            .flatten()
            .map(|jobs| *jobs as usize),
    };
    Ok(robot_config::load(file.as_deref(), &overrides)?)
}

fn init_logging(config: &RobotConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn parser_options(settings: FileSettings<'_>) -> Result<ParserOptions, CliError> {
    let version: RobotVersion = settings.version.parse()?;
    let separator = match settings.separator {
        SeparatorChoice::Auto => None,
        SeparatorChoice::Space => Some(SeparatorSyntax::Space),
        SeparatorChoice::Pipe => Some(SeparatorSyntax::Pipe),
    };
    Ok(ParserOptions { version, separator })
}

fn read(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Handle the parse command
fn handle_parse_command(matches: &ArgMatches, config: &RobotConfig) -> Result<bool, CliError> {
    let path = matches
        .get_one::<String>("path")
        .map(PathBuf::from)
        .unwrap_or_default();
    let source = read(&path)?;
    let options = parser_options(config.parser.for_path(&path))?;
    let document = RobotParser::new(options).parse(&source);

    let output = match config.output.format {
        OutputFormat::Json => serde_json::to_string_pretty(&document)? + "\n",
        OutputFormat::Yaml => serde_yaml::to_string(&document)?,
        OutputFormat::Tokens => document.dump_tokens(),
    };
    print!("{}", output);
    Ok(true)
}

/// Handle the check command
fn handle_check_command(matches: &ArgMatches, config: &RobotConfig) -> Result<bool, CliError> {
    let files = matches
        .get_many::<String>("paths")
        .into_iter()
        .flatten()
        .map(|value| {
            let path = PathBuf::from(value);
            let options = parser_options(config.parser.for_path(&path))?;
            Ok((path, options))
        })
        .collect::<Result<Vec<_>, CliError>>()?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(CliError::Runtime)?;
    let report = runtime.block_on(check_files(files, config.check.jobs))?;
    for line in &report.diagnostics {
        println!("{}", line);
    }
    for error in &report.errors {
        eprintln!("Error: {}", error);
    }
    Ok(report.is_clean())
}

/// Outcome of a `check` batch: diagnostics in file order and files that could not be checked.
#[derive(Debug, Default)]
struct CheckReport {
    diagnostics: Vec<String>,
    errors: Vec<CliError>,
}

impl CheckReport {
    fn is_clean(&self) -> bool {
        self.diagnostics.is_empty() && self.errors.is_empty()
    }
}

/// Check every file. A file that cannot be read is recorded and the batch goes on.
async fn check_files(
    files: Vec<(PathBuf, ParserOptions)>,
    jobs: usize,
) -> Result<CheckReport, CliError> {
    let pool = Arc::new(Semaphore::new(jobs.max(1)));
    let mut workers = Vec::with_capacity(files.len());
    for (path, options) in files {
        let permit = pool.clone().acquire_owned().await?;
        workers.push(tokio::task::spawn_blocking(move || {
            let _permit = permit;
            check_file(&path, options)
        }));
    }

    let mut report = CheckReport::default();
    for worker in workers {
        match worker.await.map_err(CliError::from).and_then(|checked| checked) {
            Ok(lines) => report.diagnostics.extend(lines),
            Err(e) => report.errors.push(e),
        }
    }
    Ok(report)
}

fn check_file(path: &Path, options: ParserOptions) -> Result<Vec<String>, CliError> {
    let source = read(path)?;
    let document = RobotParser::new(options).parse(&source);
    let mut diagnostics = diagnostics(&document);
    diagnostics.sort_by_key(|(position, _)| *position);
    tracing::debug!(path = %path.display(), count = diagnostics.len(), "checked");
    Ok(diagnostics
        .into_iter()
        .map(|(position, message)| format!("{}:{}: {}", path.display(), position, message))
        .collect())
}

/// Parse problems, misplaced `ELSE` branches and malformed variables.
fn diagnostics(document: &Document) -> Vec<(Position, String)> {
    let mut found: Vec<(Position, String)> = document
        .problems
        .iter()
        .map(|problem| (problem.region.start, problem.cause.to_string()))
        .collect();

    let tables = [&document.test_cases, &document.tasks, &document.keywords];
    for table in tables.into_iter().flatten() {
        for row in table.units.iter().flat_map(|unit| unit.rows()) {
            if let Err(error) = row_executables(document, row) {
                found.extend(
                    error
                        .problems
                        .iter()
                        .map(|p| (p.token.position(), p.message.to_string())),
                );
            }
        }
    }

    let syntax = ExpressionSyntax::for_version(document.version);
    for (_, token) in document.tokens() {
        if token.primary_type().is_comment() {
            continue;
        }
        let tree = syntax.build_token(token);
        for variable in tree.variables() {
            if let Err(error) = syntax.validate(&variable) {
                found.push((variable.region().start, error.to_string()));
            }
        }
    }
    found
}

/// Handle the vars command
fn handle_vars_command(matches: &ArgMatches, config: &RobotConfig) -> Result<bool, CliError> {
    let expression = matches
        .get_one::<String>("expression")
        .cloned()
        .unwrap_or_default();
    let syntax = ExpressionSyntax::for_version(parser_options(config.parser.settings())?.version);
    let tree = syntax.build(&expression);

    let mut valid = true;
    for variable in tree.variables() {
        println!("{}", describe(&variable));
        if let Err(error) = syntax.validate(&variable) {
            valid = false;
            match error.fix() {
                Some(fix) => println!("    error: {} (fix: {})", error, fix),
                None => println!("    error: {}", error),
            }
        }
    }
    for python in tree.python_expressions() {
        let span = python.span();
        println!("{}..{} python {:?}", span.start, span.end, python.expression());
    }
    let parts: Vec<String> = tree
        .parts()
        .iter()
        .map(|part| match part {
            ExpressionPart::Text { text, .. } => format!("{:?}", text),
            ExpressionPart::Variable(variable) => variable.text().to_string(),
            ExpressionPart::Python(python) => python.text().to_string(),
        })
        .collect();
    println!("parts: {}", parts.join(" "));
    Ok(valid)
}

fn describe(variable: &VariableUse<'_>) -> String {
    let span = variable.span();
    let flags = [
        (variable.is_dynamic(), "dynamic"),
        (variable.is_indexed(), "indexed"),
        (variable.is_invalid(), "invalid"),
        (variable.is_plain_variable(), "plain"),
    ]
    .iter()
    .filter(|(set, _)| *set)
    .map(|(_, name)| *name)
    .collect::<Vec<_>>()
    .join(",");
    format!(
        "{}..{} {} {:?} base={:?} [{}]",
        span.start,
        span.end,
        variable.text(),
        variable.variable_type(),
        variable.base_name(),
        flags
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_check(files: Vec<(PathBuf, ParserOptions)>) -> CheckReport {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("runtime");
        runtime.block_on(check_files(files, 2)).expect("batch to finish")
    }

    #[test]
    fn test_check_continues_past_unreadable_file() {
        let dir = std::env::temp_dir().join(format!("robot-check-{}", std::process::id()));
        std::fs::create_dir_all(&dir).expect("temp dir");
        let broken = dir.join("broken.robot");
        std::fs::write(&broken, "*** Test Cases ***\nT\n    Run Keyword If    ${c}\n")
            .expect("write");

        let options = ParserOptions::default();
        let report = run_check(vec![
            (dir.join("missing.robot"), options),
            (PathBuf::from("docs/samples/suite.robot"), options),
            (broken.clone(), options),
        ]);

        assert_eq!(report.errors.len(), 1);
        assert!(matches!(&report.errors[0], CliError::Read { path, .. } if path.ends_with("missing.robot")));
        assert_eq!(report.diagnostics.len(), 1);
        assert!(report.diagnostics[0].starts_with(&broken.display().to_string()));
        assert!(report.diagnostics[0].ends_with("Run Keyword If requires condition and keyword to be defined"));
        assert!(!report.is_clean());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_clean_batch() {
        let options = ParserOptions::default();
        let report = run_check(vec![
            (PathBuf::from("docs/samples/suite.robot"), options),
            (PathBuf::from("docs/samples/pipes.robot"), options),
        ]);
        assert!(report.is_clean());
    }

    #[test]
    fn test_parser_options_from_file_settings() {
        let options = parser_options(FileSettings {
            version: "3.0",
            separator: SeparatorChoice::Pipe,
        })
        .expect("valid version");
        assert_eq!(options.version, "3.0".parse::<RobotVersion>().expect("version"));
        assert_eq!(options.separator, Some(SeparatorSyntax::Pipe));

        let invalid = parser_options(FileSettings {
            version: "three",
            separator: SeparatorChoice::Auto,
        });
        assert!(matches!(invalid, Err(CliError::Version(_))));
    }
}
