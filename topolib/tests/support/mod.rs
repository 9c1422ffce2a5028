#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Mutex;

use tempfile::TempDir;
use topolib::cells::{CellBlock, CellOutput, CellValue};
use topolib::config::KeyValueStore;
use topolib::context::ContextOptions;

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Runs `f` with environment variables temporarily modified.
///
/// Restores variables on unwind and serializes access to process-global env
/// vars, since tests run in parallel.
///
/// `changes` is a list of `(key, value)` pairs:
/// - `Some(v)` sets the variable to `v`
/// - `None` removes the variable
pub fn with_scoped_env<F, R>(changes: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let _guard = ScopedEnv::new(changes);
    f()
}

struct ScopedEnv {
    snapshot: Vec<(String, Option<String>)>,
}

impl ScopedEnv {
    fn new(changes: &[(&str, Option<&str>)]) -> Self {
        let keys: HashSet<&str> = changes.iter().map(|(k, _)| *k).collect();
        let snapshot = keys
            .into_iter()
            .map(|k| (k.to_string(), std::env::var(k).ok()))
            .collect::<Vec<_>>();

        for (k, v) in changes {
            match v {
                Some(val) => std::env::set_var(k, val),
                None => std::env::remove_var(k),
            }
        }

        Self { snapshot }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (k, v) in self.snapshot.drain(..) {
            match v {
                Some(val) => std::env::set_var(&k, val),
                None => std::env::remove_var(&k),
            }
        }
    }
}

/// Facade over the built-in catalogue.
#[cfg(feature = "catalog-engine")]
pub fn catalog_facade() -> topolib::Facade<topolib::engine::CatalogEngine> {
    let engine = topolib::engine::CatalogEngine::new().expect("embedded catalogue loads");
    topolib::Facade::new(engine, ContextOptions::default())
}

/// Key/value store in a fresh temporary directory.
pub fn temp_store() -> (TempDir, KeyValueStore) {
    let dir = tempfile::tempdir().expect("temp dir");
    let store = KeyValueStore::new(dir.path().join("TopoLib.toml"));
    (dir, store)
}

/// EPSG code as a numeric cell.
pub fn epsg(code: i32) -> CellBlock {
    CellBlock::scalar(code)
}

/// A point row.
pub fn point(ordinates: &[f64]) -> CellBlock {
    CellBlock::row(ordinates.iter().copied())
}

pub fn text(output: &CellOutput) -> &str {
    output
        .as_text()
        .unwrap_or_else(|| panic!("expected text, got {:?}", output))
}

pub fn number(output: &CellOutput) -> f64 {
    output
        .as_number()
        .unwrap_or_else(|| panic!("expected number, got {:?}", output))
}

pub fn blank() -> CellBlock {
    CellBlock::scalar(CellValue::Empty)
}
