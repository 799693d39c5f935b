//! Canonicalization for `canon serialize`.

use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value as JsonValue;
use tracing::{debug, instrument};

use crate::core::serialize::serialize;
use crate::core::value::Value;
use crate::io::config::CanonConfig;
use crate::io::tree_store::load_tree;
use crate::refs::{ReferenceCheckFailed, check_references, collect_references};

/// Serialize an in-memory tree, checking its references first when
/// `cfg.check_references` is set.
#[instrument(skip_all)]
pub fn canonicalize(tree: &Value, cfg: &CanonConfig) -> Result<JsonValue> {
    if cfg.check_references {
        let entries = collect_references(tree)?;
        let errors = check_references(&entries, cfg)?;
        if !errors.is_empty() {
            return Err(ReferenceCheckFailed { errors }.into());
        }
    }
    let json = serialize(tree).context("serialize tree")?;
    debug!("tree canonicalized");
    Ok(json)
}

/// Load a tree from disk and canonicalize it.
pub fn canonicalize_file(input: &Path, cfg: &CanonConfig) -> Result<JsonValue> {
    let tree = load_tree(input)?;
    canonicalize(&tree, cfg).with_context(|| format!("canonicalize {}", input.display()))
}
