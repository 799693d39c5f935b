//! Canon configuration stored in `canon.toml`.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::core::external::Scheme;

/// Default config file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "canon.toml";

/// Canon configuration (TOML).
///
/// Missing fields default to values that accept every reference scheme and
/// pretty-print output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CanonConfig {
    /// Pretty-print JSON output.
    pub pretty: bool,

    /// Validate every reference before writing serialized output.
    pub check_references: bool,

    /// Reference schemes accepted by reference checks.
    pub allowed_schemes: Vec<Scheme>,
}

impl Default for CanonConfig {
    fn default() -> Self {
        Self {
            pretty: true,
            check_references: true,
            allowed_schemes: Scheme::ALL.to_vec(),
        }
    }
}

impl CanonConfig {
    pub fn validate(&self) -> Result<()> {
        if self.allowed_schemes.is_empty() {
            return Err(anyhow!("allowed_schemes must be a non-empty array"));
        }
        Ok(())
    }

    pub fn allows(&self, scheme: Scheme) -> bool {
        self.allowed_schemes.contains(&scheme)
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `CanonConfig::default()`.
pub fn load_config(path: &Path) -> Result<CanonConfig> {
    if !path.exists() {
        let cfg = CanonConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: CanonConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Atomically write config to disk (temp file + rename).
pub fn write_config(path: &Path, cfg: &CanonConfig) -> Result<()> {
    cfg.validate()?;
    let mut buf = toml::to_string_pretty(cfg).context("serialize config toml")?;
    buf.push('\n');
    write_atomic(path, &buf)
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let parent = path
        .parent()
        .with_context(|| format!("config path missing parent {}", path.display()))?;
    fs::create_dir_all(parent).with_context(|| format!("create directory {}", parent.display()))?;
    let tmp_path = path.with_extension("toml.tmp");
    fs::write(&tmp_path, contents)
        .with_context(|| format!("write temp config {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace config {}", path.display()))?;
    Ok(())
}
