//! Value tree load/store helpers.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value as JsonValue;

use crate::core::value::Value;

/// Load a JSON document from disk as a value tree.
pub fn load_tree(path: &Path) -> Result<Value> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read tree {}", path.display()))?;
    let json: JsonValue = serde_json::from_str(&contents)
        .with_context(|| format!("parse tree {}", path.display()))?;
    Ok(Value::from(json))
}

/// Render JSON with a trailing newline, pretty or compact.
pub fn render_json(value: &JsonValue, pretty: bool) -> Result<String> {
    let mut buf = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .context("serialize json")?;
    buf.push('\n');
    Ok(buf)
}

/// Write rendered JSON to `path`.
pub fn write_json(path: &Path, value: &JsonValue, pretty: bool) -> Result<()> {
    let buf = render_json(value, pretty)?;
    fs::write(path, buf).with_context(|| format!("write {}", path.display()))
}
