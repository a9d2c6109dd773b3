//! Explicit runtime configuration.
//!
//! # Responsibility
//! - Hold every tunable the core needs (DB path, credential, catalog URL,
//!   lookup timeout, logging) in one value passed to constructors.
//! - Load from an optional TOML file, then apply `TRAVEL_*` environment
//!   overrides.
//!
//! # Invariants
//! - There is no process-wide configuration state.
//! - A loaded config has passed `validate()`.

use crate::logging::LogLevel;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Duration;

const ENV_PREFIX: &str = "TRAVEL_";

/// Errors while loading or validating configuration.
#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse(toml::de::Error),
    InvalidValue {
        key: &'static str,
        message: String,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid config file: {err}"),
            Self::InvalidValue { key, message } => write!(f, "invalid `{key}`: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::InvalidValue { .. } => None,
        }
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(value: toml::de::Error) -> Self {
        Self::Parse(value)
    }
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// SQLite database file.
    pub database_path: PathBuf,
    /// Shared secret every project/place call must present.
    pub api_key: String,
    /// Catalog API root, without the `/artworks` suffix.
    pub artic_api_base_url: String,
    /// Per-lookup HTTP timeout; a timeout counts as "not found".
    pub lookup_timeout_secs: u64,
    pub log_level: LogLevel,
    /// Absolute directory for rolling log files. Logging stays off when unset.
    pub log_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("./travel.db"),
            api_key: "dev-api-key-12345".to_string(),
            artic_api_base_url: "https://api.artic.edu/api/v1".to_string(),
            lookup_timeout_secs: 10,
            log_level: LogLevel::default_for_build(),
            log_dir: None,
        }
    }
}

impl AppConfig {
    /// Loads defaults, then `path` (when given), then environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let base = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        let config = base.with_env_overrides(std::env::vars())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(text.as_str())
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Defaults plus process environment overrides, validated.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load(None)
    }

    /// Applies `TRAVEL_*` variables. Names are matched case-insensitively.
    pub fn with_env_overrides<I>(mut self, vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (name, value) in vars {
            let upper = name.to_ascii_uppercase();
            let Some(key) = upper.strip_prefix(ENV_PREFIX) else {
                continue;
            };
            match key {
                "DATABASE_PATH" => self.database_path = PathBuf::from(value),
                "API_KEY" => self.api_key = value,
                "ARTIC_API_BASE_URL" => self.artic_api_base_url = value,
                "LOOKUP_TIMEOUT_SECS" => {
                    self.lookup_timeout_secs =
                        value
                            .trim()
                            .parse()
                            .map_err(|_| ConfigError::InvalidValue {
                                key: "lookup_timeout_secs",
                                message: format!("expected whole seconds, got `{value}`"),
                            })?;
                }
                "LOG_LEVEL" => {
                    self.log_level =
                        value
                            .parse()
                            .map_err(|message| ConfigError::InvalidValue {
                                key: "log_level",
                                message,
                            })?;
                }
                "LOG_DIR" => {
                    self.log_dir = Some(value)
                        .filter(|dir| !dir.trim().is_empty())
                        .map(PathBuf::from);
                }
                _ => {}
            }
        }
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "api_key",
                message: "must not be empty".to_string(),
            });
        }
        if self.artic_api_base_url.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "artic_api_base_url",
                message: "must not be empty".to_string(),
            });
        }
        if self.lookup_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "lookup_timeout_secs",
                message: "must be at least 1".to_string(),
            });
        }
        if let Some(dir) = self.log_dir.as_ref() {
            if !dir.is_absolute() {
                return Err(ConfigError::InvalidValue {
                    key: "log_dir",
                    message: format!("must be an absolute path, got `{}`", dir.display()),
                });
            }
        }
        Ok(())
    }

    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_secs(self.lookup_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::{AppConfig, ConfigError};
    use crate::logging::LogLevel;
    use std::path::PathBuf;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn defaults_match_public_catalog() {
        let config = AppConfig::default();
        assert_eq!(config.artic_api_base_url, "https://api.artic.edu/api/v1");
        assert_eq!(config.lookup_timeout_secs, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn toml_fills_missing_fields_with_defaults() {
        let config = AppConfig::from_toml_str(
            r#"
            api_key = "secret"
            log_level = "warning"
            "#,
        )
        .unwrap();
        assert_eq!(config.api_key, "secret");
        assert_eq!(config.log_level, LogLevel::Warn);
        assert_eq!(config.database_path, PathBuf::from("./travel.db"));
    }

    #[test]
    fn toml_rejects_unknown_keys() {
        let err = AppConfig::from_toml_str("apikey = \"typo\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn env_overrides_are_case_insensitive() {
        let config = AppConfig::default()
            .with_env_overrides(vars(&[
                ("travel_api_key", "from-env"),
                ("TRAVEL_LOOKUP_TIMEOUT_SECS", "3"),
                ("TRAVEL_LOG_LEVEL", "ERROR"),
                ("UNRELATED", "x"),
            ]))
            .unwrap();
        assert_eq!(config.api_key, "from-env");
        assert_eq!(config.lookup_timeout_secs, 3);
        assert_eq!(config.log_level, LogLevel::Error);
    }

    #[test]
    fn bad_env_values_are_rejected() {
        let err = AppConfig::default()
            .with_env_overrides(vars(&[("TRAVEL_LOOKUP_TIMEOUT_SECS", "soon")]))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                key: "lookup_timeout_secs",
                ..
            }
        ));
    }

    #[test]
    fn validate_rejects_empty_key_and_zero_timeout() {
        let mut config = AppConfig::default();
        config.api_key = "  ".to_string();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.lookup_timeout_secs = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.log_dir = Some(PathBuf::from("logs"));
        assert!(config.validate().is_err());
    }
}
