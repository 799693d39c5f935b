//! Guarded mapping used for serialized reference markers.

use std::collections::BTreeMap;
use std::ops::Index;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// A terminal, opaque JSON object.
///
/// Reference markers are built as `CanonicalObject`s so code that walks
/// generic mappings cannot mistake them for containers: the type offers
/// lookup, insertion and removal but no way to iterate its entries. Use
/// [`CanonicalObject::to_plain`] to get an ordinary map when the contents
/// must be handed to a JSON consumer.
///
/// ```compile_fail
/// let object = canon::core::canonical::CanonicalObject::new();
/// for _entry in object {}
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanonicalObject(BTreeMap<String, JsonValue>);

impl CanonicalObject {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.0.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut JsonValue> {
        self.0.get_mut(key)
    }

    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<JsonValue>,
    ) -> Option<JsonValue> {
        self.0.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<JsonValue> {
        self.0.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Merge every entry of `other`, overwriting existing keys.
    pub fn extend_with(&mut self, other: Map<String, JsonValue>) {
        self.0.extend(other);
    }

    /// Plain, iterable copy of the contents.
    pub fn to_plain(&self) -> Map<String, JsonValue> {
        self.0
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    pub fn into_plain(self) -> Map<String, JsonValue> {
        self.0.into_iter().collect()
    }
}

impl From<Map<String, JsonValue>> for CanonicalObject {
    fn from(map: Map<String, JsonValue>) -> Self {
        Self(map.into_iter().collect())
    }
}

impl From<CanonicalObject> for JsonValue {
    fn from(object: CanonicalObject) -> Self {
        JsonValue::Object(object.into_plain())
    }
}

impl Index<&str> for CanonicalObject {
    type Output = JsonValue;

    /// Panics if `key` is absent, like indexing a `BTreeMap`.
    fn index(&self, key: &str) -> &JsonValue {
        &self.0[key]
    }
}
