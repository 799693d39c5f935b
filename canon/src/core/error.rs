//! Error taxonomy for the pure core.
//!
//! `ExternalError` reports a broken reference contract (a caller bug);
//! `SerializeError` reports a node that cannot be made JSON-safe. Both are
//! deterministic for a given input.

use crate::core::path::ValuePath;

/// Violations of the external reference contract.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExternalError {
    #[error("not an external reference: missing string `uri` field")]
    NotAReference,

    #[error("malformed uri '{uri}': expected exactly one '://', found {found}")]
    MalformedUri { uri: String, found: usize },

    #[error("invalid http url '{url}': expected http:// or https:// with exactly one '://'")]
    InvalidHttpUrl { url: String },
}

/// Values the serializer refuses to emit.
#[derive(Debug, thiserror::Error)]
pub enum SerializeError {
    #[error("cannot serialize value '{value}' of type {type_name} at {path}")]
    Unsupported {
        value: String,
        type_name: String,
        path: ValuePath,
    },

    #[error("cannot serialize non-finite float {value} at {path}")]
    NonFiniteFloat { value: f64, path: ValuePath },

    #[error("text at {path} is not valid UTF-8")]
    InvalidText {
        path: ValuePath,
        #[source]
        source: std::str::Utf8Error,
    },

    #[error("cannot serialize mapping at {path}: key '{key}' appears more than once")]
    KeyCollision { key: String, path: ValuePath },
}

impl SerializeError {
    /// Location of the offending leaf.
    pub fn path(&self) -> &ValuePath {
        match self {
            SerializeError::Unsupported { path, .. }
            | SerializeError::NonFiniteFloat { path, .. }
            | SerializeError::InvalidText { path, .. }
            | SerializeError::KeyCollision { path, .. } => path,
        }
    }
}
