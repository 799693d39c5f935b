//! JSON Schema check for the reference wire shape.

use anyhow::{Context, Result};
use jsonschema::{Draft, Validator};
use serde_json::Value as JsonValue;

/// Bundled v1 schema of a serialized reference marker.
pub const V1_SCHEMA: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../schemas/external_ref/v1.schema.json"
));

/// Compiled reference schema (Draft 2020-12).
pub struct ReferenceSchema {
    validator: Validator,
}

impl ReferenceSchema {
    pub fn load() -> Result<Self> {
        let schema: JsonValue = serde_json::from_str(V1_SCHEMA).context("parse reference schema")?;
        let validator = jsonschema::options()
            .with_draft(Draft::Draft202012)
            .build(&schema)
            .context("compile reference schema")?;
        Ok(Self { validator })
    }

    /// Schema violations of one serialized reference (empty when valid).
    pub fn violations(&self, reference: &JsonValue) -> Vec<String> {
        self.validator
            .iter_errors(reference)
            .map(|err| err.to_string())
            .collect()
    }
}
