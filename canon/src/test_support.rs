//! Test-only helpers for constructing value trees and scratch files.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::Value as JsonValue;
use tempfile::TempDir;

use crate::core::value::{Key, Mapping, Value};

/// Build a list node.
pub fn list(items: Vec<Value>) -> Value {
    Value::List(items)
}

/// Build a plain mapping node; entries keep the given insertion order.
pub fn map<K: Into<Key>, const N: usize>(entries: [(K, Value); N]) -> Value {
    Value::Map(entries.into_iter().collect::<Mapping>())
}

/// Build an untyped reference: a mapping with a `uri` and optional checksum.
pub fn uri_marker(uri: &str, checksum: Option<&str>) -> Value {
    let mut mapping = Mapping::new();
    mapping.insert("uri", uri);
    if let Some(checksum) = checksum {
        mapping.insert("checksum", checksum);
    }
    Value::Map(mapping)
}

/// Scratch directory for file-based tests.
pub struct TestDir {
    temp: TempDir,
}

impl TestDir {
    pub fn new() -> Result<Self> {
        let temp = tempfile::tempdir().context("create tempdir")?;
        Ok(Self { temp })
    }

    pub fn path(&self) -> &Path {
        self.temp.path()
    }

    /// Write `value` as pretty JSON under `name`, returning the file path.
    pub fn write_json(&self, name: &str, value: &JsonValue) -> Result<PathBuf> {
        let path = self.temp.path().join(name);
        let contents = serde_json::to_string_pretty(value).context("serialize json")?;
        fs::write(&path, contents).with_context(|| format!("write {}", path.display()))?;
        Ok(path)
    }

    pub fn write_text(&self, name: &str, contents: &str) -> Result<PathBuf> {
        let path = self.temp.path().join(name);
        fs::write(&path, contents).with_context(|| format!("write {}", path.display()))?;
        Ok(path)
    }
}
