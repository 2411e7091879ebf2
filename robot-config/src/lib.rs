//! Configuration for the robot tools.
//!
//! Three layers, lowest first: the embedded `defaults/robot.default.toml`, a project
//! `robot.toml` and the command line flags in [`Overrides`]. Parser values can differ per
//! file extension (`[parser.extensions.tsv]`); [`ParserConfig::for_path`] resolves them for
//! one input file.

use config::{Config, ConfigError, File, FileFormat};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub use config::ConfigError as Error;

const DEFAULT_TOML: &str = include_str!("../defaults/robot.default.toml");

/// Name of the project configuration file looked up by [`discover`].
pub const PROJECT_FILE: &str = "robot.toml";

/// Top-level configuration consumed by the robot tools.
#[derive(Debug, Clone, Deserialize)]
pub struct RobotConfig {
    pub parser: ParserConfig,
    pub output: OutputConfig,
    pub logging: LoggingConfig,
    pub check: CheckConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ParserConfig {
    /// Grammar version, `major.minor`
    pub version: String,
    pub separator: SeparatorChoice,
    /// Keyed by lowercase extension without the dot
    #[serde(default)]
    pub extensions: BTreeMap<String, ExtensionConfig>,
}

/// Parser values for files with one extension. Unset fields fall back to `[parser]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ExtensionConfig {
    pub version: Option<String>,
    pub separator: Option<SeparatorChoice>,
}

/// Parser values that apply to one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileSettings<'a> {
    pub version: &'a str,
    pub separator: SeparatorChoice,
}

impl ParserConfig {
    /// The table-wide values, for input that has no file name.
    pub fn settings(&self) -> FileSettings<'_> {
        FileSettings {
            version: &self.version,
            separator: self.separator,
        }
    }

    pub fn for_path(&self, path: &Path) -> FileSettings<'_> {
        let base = self.settings();
        let Some(entry) = path
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| self.extensions.get(&ext.to_ascii_lowercase()))
        else {
            return base;
        };
        FileSettings {
            version: entry.version.as_deref().unwrap_or(base.version),
            separator: entry.separator.unwrap_or(base.separator),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SeparatorChoice {
    Auto,
    Space,
    Pipe,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    Json,
    Yaml,
    Tokens,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// `tracing` filter directive
    pub filter: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CheckConfig {
    pub jobs: usize,
}

/// Values given on the command line. Each one beats every file value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub version: Option<String>,
    pub separator: Option<SeparatorChoice>,
    pub format: Option<OutputFormat>,
    pub jobs: Option<usize>,
}

impl Overrides {
    fn apply(&self, config: &mut RobotConfig) {
        let parser = &mut config.parser;
        if let Some(version) = &self.version {
            parser.version = version.clone();
            parser.extensions.values_mut().for_each(|e| e.version = None);
        }
        if let Some(separator) = self.separator {
            parser.separator = separator;
            parser.extensions.values_mut().for_each(|e| e.separator = None);
        }
        if let Some(format) = self.format {
            config.output.format = format;
        }
        if let Some(jobs) = self.jobs {
            config.check.jobs = jobs;
        }
    }
}

/// The nearest [`PROJECT_FILE`] in `start` or one of its ancestors.
pub fn discover(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(PROJECT_FILE))
        .find(|candidate| candidate.is_file())
}

/// Build the configuration from the defaults, `file` when given (it must exist) and
/// `overrides`.
pub fn load(file: Option<&Path>, overrides: &Overrides) -> Result<RobotConfig, ConfigError> {
    let mut builder =
        Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
    if let Some(path) = file {
        builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(true));
    }
    let mut config: RobotConfig = builder.build()?.try_deserialize()?;
    overrides.apply(&mut config);
    Ok(config)
}

pub fn load_defaults() -> Result<RobotConfig, ConfigError> {
    load(None, &Overrides::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("robot-config-{}-{}", name, std::process::id()));
        std::fs::create_dir_all(&dir).expect("temp dir");
        dir
    }

    fn write_file(path: &Path, content: &str) {
        let mut file = std::fs::File::create(path).expect("config file");
        write!(file, "{}", content).expect("write");
    }

    #[test]
    fn loads_default_config() {
        let config = load_defaults().expect("defaults to deserialize");
        assert_eq!(config.parser.version, "3.2");
        assert_eq!(config.parser.separator, SeparatorChoice::Auto);
        assert_eq!(config.output.format, OutputFormat::Json);
        assert_eq!(config.logging.filter, "warn");
        assert_eq!(config.check.jobs, 4);
    }

    #[test]
    fn tsv_files_default_to_space_separators() {
        let parser = load_defaults().expect("defaults to deserialize").parser;
        assert_eq!(parser.for_path(Path::new("suite.tsv")).separator, SeparatorChoice::Space);
        assert_eq!(parser.for_path(Path::new("SUITE.TSV")).separator, SeparatorChoice::Space);
        assert_eq!(parser.for_path(Path::new("suite.robot")).separator, SeparatorChoice::Auto);
        assert_eq!(parser.for_path(Path::new("README")), parser.settings());
    }

    #[test]
    fn project_file_adds_extension_entries() {
        let dir = temp_dir("extensions");
        let path = dir.join(PROJECT_FILE);
        write_file(
            &path,
            "[parser]\nversion = \"3.1\"\n\n[parser.extensions.txt]\nversion = \"2.9\"\nseparator = \"pipe\"\n",
        );

        let parser = load(Some(&path), &Overrides::default()).expect("config to build").parser;
        let txt = parser.for_path(Path::new("old/suite.txt"));
        assert_eq!(txt.version, "2.9");
        assert_eq!(txt.separator, SeparatorChoice::Pipe);
        assert_eq!(parser.for_path(Path::new("suite.robot")).version, "3.1");
        // entries from the defaults survive a user file
        assert_eq!(parser.for_path(Path::new("suite.tsv")).separator, SeparatorChoice::Space);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn command_line_beats_extension_entries() {
        let overrides = Overrides {
            version: Some("3.0".to_string()),
            separator: Some(SeparatorChoice::Pipe),
            format: Some(OutputFormat::Yaml),
            jobs: Some(8),
        };
        let config = load(None, &overrides).expect("config to build");
        let tsv = config.parser.for_path(Path::new("suite.tsv"));
        assert_eq!(tsv.separator, SeparatorChoice::Pipe);
        assert_eq!(tsv.version, "3.0");
        assert_eq!(config.output.format, OutputFormat::Yaml);
        assert_eq!(config.check.jobs, 8);
    }

    #[test]
    fn discovers_project_file_in_ancestors() {
        let root = temp_dir("discover");
        let nested = root.join("suites").join("login");
        std::fs::create_dir_all(&nested).expect("nested dir");
        write_file(&root.join(PROJECT_FILE), "[check]\njobs = 2\n");

        let found = discover(&nested).expect("project file");
        assert_eq!(found, root.join(PROJECT_FILE));
        let config = load(Some(&found), &Overrides::default()).expect("config to build");
        assert_eq!(config.check.jobs, 2);

        std::fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn missing_project_file_fails() {
        let result = load(Some(Path::new("/nonexistent/robot.toml")), &Overrides::default());
        assert!(result.is_err());
    }
}
