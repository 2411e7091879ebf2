//! Declared grammar version
//!
//! The version is resolved once, before parsing starts, and threaded through the mapper
//! chain and the expression builder. Behavior never re-inspects it per token beyond a
//! simple comparison.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// A `major.minor` grammar version
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct RobotVersion {
    pub major: u32,
    pub minor: u32,
}

impl RobotVersion {
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// `*** Tasks ***` tables.
    pub fn supports_tasks(&self) -> bool {
        *self >= Self::new(3, 1)
    }

    /// `Task Setup`, `Task Teardown`, `Task Template` and `Task Timeout` settings.
    pub fn supports_task_settings(&self) -> bool {
        self.supports_tasks()
    }

    /// `FOR ... END` loops without the leading colon.
    pub fn supports_end_of_loop(&self) -> bool {
        *self >= Self::new(3, 1)
    }

    /// Generic `{...}` groups, invalid-node marking and inline python expressions.
    pub fn uses_modern_variable_syntax(&self) -> bool {
        *self >= Self::new(3, 2)
    }
}

impl Default for RobotVersion {
    fn default() -> Self {
        Self::new(3, 2)
    }
}

impl fmt::Display for RobotVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid version '{0}', expected MAJOR.MINOR")]
pub struct VersionParseError(pub String);

impl FromStr for RobotVersion {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || VersionParseError(s.to_string());
        let mut parts = s.trim().split('.');
        let major = parts
            .next()
            .and_then(|p| p.parse().ok())
            .ok_or_else(invalid)?;
        let minor = match parts.next() {
            Some(p) => p.parse().map_err(|_| invalid())?,
            None => 0,
        };
        // a patch component is accepted and ignored
        if let Some(patch) = parts.next() {
            patch.parse::<u32>().map_err(|_| invalid())?;
        }
        if parts.next().is_some() {
            return Err(invalid());
        }
        Ok(Self::new(major, minor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("3.2", RobotVersion::new(3, 2))]
    #[case("3.1.2", RobotVersion::new(3, 1))]
    #[case(" 4 ", RobotVersion::new(4, 0))]
    #[case("2.9", RobotVersion::new(2, 9))]
    fn test_parse(#[case] input: &str, #[case] expected: RobotVersion) {
        assert_eq!(input.parse::<RobotVersion>().unwrap(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("three")]
    #[case("3.x")]
    #[case("3.1.2.4")]
    fn test_parse_rejects(#[case] input: &str) {
        assert!(input.parse::<RobotVersion>().is_err());
    }

    #[test]
    fn test_feature_gates() {
        assert!(!RobotVersion::new(3, 0).supports_tasks());
        assert!(RobotVersion::new(3, 1).supports_tasks());
        assert!(!RobotVersion::new(3, 1).uses_modern_variable_syntax());
        assert!(RobotVersion::new(3, 2).uses_modern_variable_syntax());
        assert!(RobotVersion::new(4, 0).uses_modern_variable_syntax());
    }

    #[test]
    fn test_display() {
        assert_eq!(RobotVersion::new(3, 2).to_string(), "3.2");
    }
}
