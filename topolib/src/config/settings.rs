//! TOML settings file.
//!
//! ```toml
//! [context]
//! log_level = "debug"     # none | error | debug | trace
//! allow_network = false
//!
//! [keys]
//! some_key = "some value"
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::context::{ContextOptions, LogLevel};
use crate::error::{CrsError, CrsResult};

/// Overrides the settings file location.
pub const CONFIG_ENV_VAR: &str = "TOPOLIB_CONFIG";

const LOG_LEVEL_ENV_VAR: &str = "TOPOLIB_LOG_LEVEL";
const ALLOW_NETWORK_ENV_VAR: &str = "TOPOLIB_ALLOW_NETWORK";

/// Contents of the settings file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub context: ContextSettings,
    /// User key/value pairs, see [`super::KeyValueStore`].
    #[serde(default)]
    pub keys: BTreeMap<String, String>,
}

/// `[context]` table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContextSettings {
    #[serde(default)]
    pub log_level: LogLevel,
    #[serde(default)]
    pub allow_network: bool,
}

impl Settings {
    /// Read and parse a settings file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> CrsResult<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            CrsError::config(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> CrsResult<Self> {
        toml::from_str(content)
            .map_err(|e| CrsError::config(format!("Failed to parse config file: {}", e)))
    }

    /// Like [`Settings::from_file`], but a missing file yields the defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> CrsResult<Self> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Write the settings atomically: a sibling temp file renamed over `path`.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> CrsResult<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self)
            .map_err(|e| CrsError::config(format!("Failed to serialize settings: {}", e)))?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let tmp = path.with_extension("toml.tmp");
        fs::write(&tmp, content)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }

    /// Apply `TOPOLIB_LOG_LEVEL` and `TOPOLIB_ALLOW_NETWORK` on top of the
    /// file values.
    pub fn with_env_overrides(mut self) -> CrsResult<Self> {
        if let Ok(level) = env::var(LOG_LEVEL_ENV_VAR) {
            self.context.log_level = parse_log_level(&level).ok_or_else(|| {
                CrsError::config(format!(
                    "{} must be none, error, debug, trace or 0-3, got '{}'",
                    LOG_LEVEL_ENV_VAR, level
                ))
            })?;
        }
        if let Ok(flag) = env::var(ALLOW_NETWORK_ENV_VAR) {
            self.context.allow_network = parse_flag(&flag).ok_or_else(|| {
                CrsError::config(format!(
                    "{} must be true or false, got '{}'",
                    ALLOW_NETWORK_ENV_VAR, flag
                ))
            })?;
        }
        Ok(self)
    }

    pub fn context_options(&self) -> ContextOptions {
        ContextOptions::new(self.context.log_level, self.context.allow_network)
    }
}

/// `$TOPOLIB_CONFIG`, else `<data dir>/TopoLib/TopoLib.toml`.
pub fn default_config_path() -> CrsResult<PathBuf> {
    if let Ok(path) = env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return Ok(PathBuf::from(path));
        }
    }
    data_dir()
        .map(|dir| dir.join("TopoLib").join("TopoLib.toml"))
        .ok_or_else(|| CrsError::config("Cannot determine a data directory for TopoLib.toml"))
}

fn data_dir() -> Option<PathBuf> {
    let non_empty = |name: &str| env::var_os(name).filter(|v| !v.is_empty()).map(PathBuf::from);
    non_empty("XDG_DATA_HOME")
        .or_else(|| non_empty("LOCALAPPDATA"))
        .or_else(|| non_empty("HOME").map(|home| home.join(".local").join("share")))
}

fn parse_log_level(value: &str) -> Option<LogLevel> {
    let value = value.trim();
    if let Ok(level) = value.parse::<i64>() {
        return Some(LogLevel::from_level(level));
    }
    match value.to_ascii_lowercase().as_str() {
        "none" | "off" => Some(LogLevel::None),
        "error" => Some(LogLevel::Error),
        "debug" => Some(LogLevel::Debug),
        "trace" => Some(LogLevel::Trace),
        _ => None,
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_file() {
        let settings = Settings::from_toml(
            r#"
            [context]
            log_level = "debug"
            allow_network = true

            [keys]
            grid_dir = "/opt/grids"
            "#,
        )
        .unwrap();
        assert_eq!(settings.context.log_level, LogLevel::Debug);
        assert!(settings.context.allow_network);
        assert_eq!(settings.keys.get("grid_dir").map(String::as_str), Some("/opt/grids"));
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let settings = Settings::from_toml("").unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.context_options(), ContextOptions::default());
    }

    #[test]
    fn test_bad_level_is_config_error() {
        let err = Settings::from_toml("[context]\nlog_level = \"loud\"").unwrap_err();
        assert!(matches!(err, CrsError::Config(_)));
    }

    #[test]
    fn test_parse_env_values() {
        assert_eq!(parse_log_level("2"), Some(LogLevel::Debug));
        assert_eq!(parse_log_level(" TRACE "), Some(LogLevel::Trace));
        assert_eq!(parse_log_level("verbose"), None);
        assert_eq!(parse_flag("Yes"), Some(true));
        assert_eq!(parse_flag("0"), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }

    #[test]
    fn test_load_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load(dir.path().join("absent.toml")).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("TopoLib.toml");
        let mut settings = Settings::default();
        settings.context.log_level = LogLevel::Error;
        settings.keys.insert("a".into(), "1".into());
        settings.save(&path).unwrap();

        assert!(!path.with_extension("toml.tmp").exists());
        assert_eq!(Settings::load(&path).unwrap(), settings);
    }
}
