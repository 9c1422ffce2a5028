//! Persisted key/value pairs in the `[keys]` table of the settings file.
//!
//! Every call reads the file, applies one change and writes it back, so the
//! `[context]` table and edits made by other processes between calls are
//! preserved. Status strings are what the host shows in a cell.

use parking_lot::Mutex;
use std::path::{Path, PathBuf};

use super::settings::{default_config_path, Settings};
use crate::cells::CellOutput;
use crate::error::{CrsError, CrsResult};

/// Output shape of [`KeyValueStore::read_all`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadAllMode {
    /// Number of pairs
    Count,
    /// One column of keys
    Keys,
    /// One column of values
    Values,
    /// Two columns: key, value
    Pairs,
}

impl ReadAllMode {
    /// 0 = count, 1 = keys, 2 = values, 3 = pairs.
    pub fn from_mode(mode: i64) -> CrsResult<Self> {
        match mode {
            0 => Ok(ReadAllMode::Count),
            1 => Ok(ReadAllMode::Keys),
            2 => Ok(ReadAllMode::Values),
            3 => Ok(ReadAllMode::Pairs),
            other => Err(CrsError::InvalidArgument(format!(
                "mode must be 0, 1, 2 or 3, got {}",
                other
            ))),
        }
    }
}

/// Key/value store backed by a TOML settings file.
pub struct KeyValueStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl KeyValueStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Store at [`default_config_path`].
    pub fn open_default() -> CrsResult<Self> {
        Ok(Self::new(default_config_path()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> CrsResult<Settings> {
        Settings::load(&self.path)
    }

    pub fn add_or_update(&self, key: &str, value: &str) -> CrsResult<String> {
        let key = check_key(key)?;
        let _guard = self.lock.lock();
        let mut settings = self.load()?;
        settings.keys.insert(key.to_string(), value.to_string());
        settings.save(&self.path)?;
        tracing::debug!(key, "key stored");
        Ok(format!("[key:<{}>, value:<{}>]", key, value))
    }

    pub fn clear_all(&self) -> CrsResult<String> {
        let _guard = self.lock.lock();
        let mut settings = self.load()?;
        if settings.keys.is_empty() {
            return Ok("[no key-value pairs present]".to_string());
        }
        settings.keys.clear();
        settings.save(&self.path)?;
        Ok("[all key-value pairs cleared]".to_string())
    }

    pub fn get(&self, key: &str) -> CrsResult<Option<String>> {
        let key = check_key(key)?;
        Ok(self.load()?.keys.get(key).cloned())
    }

    /// The stored value; if absent, `default` when given, else a
    /// `not found` status string.
    pub fn get_key_value(&self, key: &str, default: Option<&str>) -> CrsResult<String> {
        Ok(match (self.get(key)?, default) {
            (Some(value), _) => value,
            (None, Some(default)) => default.to_string(),
            (None, None) => not_found(key),
        })
    }

    /// Stored value as an integer, `default` when absent, `i32::MIN` when
    /// the stored text does not parse.
    pub fn get_int(&self, key: &str, default: i32) -> CrsResult<i32> {
        Ok(match self.get(key)? {
            Some(value) => value.trim().parse().unwrap_or(i32::MIN),
            None => default,
        })
    }

    /// Stored value as a double, `default` when absent, `f64::MAX` when the
    /// stored text does not parse.
    pub fn get_double(&self, key: &str, default: f64) -> CrsResult<f64> {
        Ok(match self.get(key)? {
            Some(value) => value.trim().parse().unwrap_or(f64::MAX),
            None => default,
        })
    }

    pub fn read_key(&self, key: &str) -> CrsResult<String> {
        Ok(match self.get(key)? {
            Some(value) => format!("[key:<{}>, value:<{}>]", key, value),
            None => not_found(key),
        })
    }

    pub fn remove_key(&self, key: &str) -> CrsResult<String> {
        let key = check_key(key)?;
        let _guard = self.lock.lock();
        let mut settings = self.load()?;
        if settings.keys.remove(key).is_none() {
            return Ok(not_found(key));
        }
        settings.save(&self.path)?;
        tracing::debug!(key, "key removed");
        Ok(format!("[key:<{}>, removed]", key))
    }

    /// All pairs, sorted by key.
    pub fn entries(&self) -> CrsResult<Vec<(String, String)>> {
        Ok(self.load()?.keys.into_iter().collect())
    }

    /// All pairs shaped for the host.
    pub fn read_all(&self, mode: ReadAllMode) -> CrsResult<CellOutput> {
        let entries = self.entries()?;
        if entries.is_empty() {
            return Ok(match mode {
                ReadAllMode::Count => CellOutput::Number(0.0),
                _ => CellOutput::Text("[No key-value pairs found]".to_string()),
            });
        }

        let rows = match mode {
            ReadAllMode::Count => return Ok(CellOutput::from(entries.len())),
            ReadAllMode::Keys => entries
                .into_iter()
                .map(|(k, _)| vec![CellOutput::Text(k)])
                .collect(),
            ReadAllMode::Values => entries
                .into_iter()
                .map(|(_, v)| vec![CellOutput::Text(v)])
                .collect(),
            ReadAllMode::Pairs => entries
                .into_iter()
                .map(|(k, v)| vec![CellOutput::Text(k), CellOutput::Text(v)])
                .collect(),
        };
        Ok(CellOutput::Array(rows))
    }
}

fn check_key(key: &str) -> CrsResult<&str> {
    if key.trim().is_empty() {
        Err(CrsError::InvalidArgument("key must not be blank".to_string()))
    } else {
        Ok(key)
    }
}

fn not_found(key: &str) -> String {
    format!("[key:<{}>, not found]", key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_all_mode() {
        assert_eq!(ReadAllMode::from_mode(0).unwrap(), ReadAllMode::Count);
        assert_eq!(ReadAllMode::from_mode(3).unwrap(), ReadAllMode::Pairs);
        assert!(ReadAllMode::from_mode(4).is_err());
        assert!(ReadAllMode::from_mode(-1).is_err());
    }

    #[test]
    fn test_blank_key_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = KeyValueStore::new(dir.path().join("TopoLib.toml"));
        assert!(store.add_or_update("  ", "x").is_err());
        assert!(store.read_key("").is_err());
    }
}
