//! Rollbook configuration file.
//!
//! # Responsibility
//! - Load settings from a JSON file, falling back to defaults.
//! - Reject settings the store cannot work with.
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `data_file` | `students.json` | Record file; relative paths resolve against the config file directory |
//! | `page_size` | `20` | Rows per table page, must be positive |
//! | `log_level` | build mode | `trace`, `debug`, `info`, `warn` or `error` |
//! | `log_dir` | none | Absolute directory for rolling log files |

use crate::logging::default_log_level;
use crate::query::page::DEFAULT_PAGE_SIZE;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

pub const DEFAULT_DATA_FILE: &str = "students.json";

/// Configuration load/validation failure.
#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "cannot read config `{}`: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "config `{}` is malformed: {source}", path.display())
            }
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::Invalid(_) => None,
        }
    }
}

fn default_data_file() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_FILE)
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RollbookConfig {
    #[serde(default = "default_data_file")]
    pub data_file: PathBuf,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default)]
    pub log_level: Option<String>,
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
}

impl Default for RollbookConfig {
    fn default() -> Self {
        Self {
            data_file: default_data_file(),
            page_size: DEFAULT_PAGE_SIZE,
            log_level: None,
            log_dir: None,
        }
    }
}

impl RollbookConfig {
    /// Reads and validates `path`. A missing file yields defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let mut config: Self =
            serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        if config.data_file.is_relative() {
            if let Some(base) = path.parent() {
                config.data_file = base.join(&config.data_file);
            }
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.page_size == 0 {
            return Err(ConfigError::Invalid(
                "page_size must be greater than zero".to_string(),
            ));
        }
        if self.data_file.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("data_file cannot be empty".to_string()));
        }
        if let Some(dir) = &self.log_dir {
            if !dir.is_absolute() {
                return Err(ConfigError::Invalid(format!(
                    "log_dir must be an absolute path, got `{}`",
                    dir.display()
                )));
            }
        }
        Ok(())
    }

    /// Configured log level, or the build-mode default.
    pub fn effective_log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or(default_log_level())
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, RollbookConfig};
    use crate::logging::default_log_level;
    use std::fs;
    use std::path::PathBuf;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = RollbookConfig::load(&dir.path().join("rollbook.json")).unwrap();
        assert_eq!(config, RollbookConfig::default());
        assert_eq!(config.page_size, 20);
        assert_eq!(config.data_file, PathBuf::from("students.json"));
    }

    #[test]
    fn relative_data_file_resolves_against_config_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rollbook.json");
        fs::write(&path, r#"{"data_file": "group.json", "page_size": 10}"#).unwrap();

        let config = RollbookConfig::load(&path).unwrap();

        assert_eq!(config.data_file, dir.path().join("group.json"));
        assert_eq!(config.page_size, 10);
    }

    #[test]
    fn zero_page_size_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rollbook.json");
        fs::write(&path, r#"{"page_size": 0}"#).unwrap();

        let err = RollbookConfig::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn unknown_keys_are_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rollbook.json");
        fs::write(&path, r#"{"page_sise": 10}"#).unwrap();

        let err = RollbookConfig::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn log_level_falls_back_to_build_default() {
        let mut config = RollbookConfig::default();
        assert_eq!(config.effective_log_level(), default_log_level());

        config.log_level = Some("warn".to_string());
        assert_eq!(config.effective_log_level(), "warn");
    }
}
