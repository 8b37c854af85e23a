//! User configuration loaded from `config.toml`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::calculator::{AngleMode, Backend};
use crate::ui::Theme;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine config directory")]
    NoConfigDir,
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Angle mode at startup.
    pub angle_mode: AngleMode,
    /// Expression evaluator.
    pub backend: Backend,
    pub theme: Theme,
    /// Show the history list below the display.
    pub show_history: bool,
    /// Extra keypad buttons, label -> token.
    pub keys: BTreeMap<String, String>,
}

impl Config {
    /// Get the path to the default config file.
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("zcalc").join("config.toml"))
    }

    /// Load the config from `path`, or from the default location.
    ///
    /// A missing default file yields the defaults; a missing explicit file is
    /// an error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (path, explicit) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => (Self::config_path()?, false),
        };

        if !explicit && !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        Self::parse(&contents).map_err(|source| ConfigError::Parse { path, source })
    }

    /// Parse a config from TOML text.
    pub fn parse(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_is_default() {
        assert_eq!(Config::parse("").unwrap(), Config::default());
    }

    #[test]
    fn test_full_config() {
        let config = Config::parse(
            r#"
angle_mode = "degrees"
backend = "fend"
theme = "light"
show_history = true

[keys]
tau = "(2*pi)"
"#,
        )
        .unwrap();

        assert_eq!(config.angle_mode, AngleMode::Degrees);
        assert_eq!(config.backend, Backend::Fend);
        assert_eq!(config.theme, Theme::Light);
        assert!(config.show_history);
        assert_eq!(config.keys.get("tau").map(String::as_str), Some("(2*pi)"));
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(Config::parse(r#"angle_mode = "gradians""#).is_err());
        assert!(Config::parse(r#"backend = "mathjs""#).is_err());
    }

    #[test]
    fn test_missing_explicit_file() {
        let err = Config::load(Some(Path::new("/nonexistent/zcalc.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
