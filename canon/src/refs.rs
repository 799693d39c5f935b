//! Reference listing and validation for `canon refs` and `canon serialize`.

use anyhow::{Context, Result};
use tracing::{debug, instrument};

use crate::core::external::{ExternalDataInfo, is_external};
use crate::core::path::ValuePath;
use crate::core::serialize::serialize_at;
use crate::core::value::Value;
use crate::core::walk::apply;
use crate::io::config::CanonConfig;
use crate::io::ref_schema::ReferenceSchema;

/// A reference found in a tree, with its location.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceEntry {
    pub path: ValuePath,
    pub info: ExternalDataInfo,
}

impl ReferenceEntry {
    /// Tab-separated `<path> <scheme> <resource path>` line.
    pub fn to_line(&self) -> String {
        let scheme = self
            .info
            .scheme()
            .map_or_else(|| "-".to_string(), |scheme| scheme.to_string());
        let resource = self.info.path().unwrap_or(self.info.uri());
        format!("{}\t{}\t{}", self.path, scheme, resource)
    }
}

/// Reference validation failed; carries one message per problem.
#[derive(Debug, thiserror::Error)]
#[error("reference check failed:\n- {}", .errors.join("\n- "))]
pub struct ReferenceCheckFailed {
    pub errors: Vec<String>,
}

/// Collect every reference in `tree`, in walk order.
///
/// Untyped references (mappings with a `uri` key) are serialized and
/// wrapped; a `uri` that is not a string is an error.
#[instrument(skip_all)]
pub fn collect_references(tree: &Value) -> Result<Vec<ReferenceEntry>> {
    let mut entries = Vec::new();
    apply::<(), anyhow::Error, _>(tree, |node, path| {
        if !is_external(node) {
            return Ok(());
        }
        let info = match node {
            Value::Reference(info) => info.clone(),
            _ => {
                let json = serialize_at(node, path)?;
                ExternalDataInfo::from_json(json)
                    .with_context(|| format!("reference at {path}"))?
            }
        };
        entries.push(ReferenceEntry {
            path: path.clone(),
            info,
        });
        Ok(())
    })?;
    debug!(count = entries.len(), "references collected");
    Ok(entries)
}

/// Check references against the uri contract, the allowed schemes and the
/// wire schema.
///
/// Returns stable error messages in walk order (empty on success).
pub fn check_references(entries: &[ReferenceEntry], cfg: &CanonConfig) -> Result<Vec<String>> {
    let schema = ReferenceSchema::load()?;
    let mut errors = Vec::new();
    for entry in entries {
        let path = &entry.path;
        if let Err(err) = entry.info.path() {
            errors.push(format!("{path}: {err}"));
        }
        match entry.info.scheme() {
            None => errors.push(format!(
                "{path}: unknown scheme in uri '{}'",
                entry.info.uri()
            )),
            Some(scheme) if !cfg.allows(scheme) => {
                errors.push(format!("{path}: scheme '{scheme}' is not allowed"));
            }
            Some(_) => {}
        }
        let wire = serde_json::to_value(entry.info.serialize()).context("serialize reference")?;
        for violation in schema.violations(&wire) {
            errors.push(format!("{path}: {violation}"));
        }
    }
    debug!(errors = errors.len(), "references checked");
    Ok(errors)
}
