//! In-memory value trees built by test code before serialization.

use std::fmt;

use indexmap::IndexMap;
use serde_json::Value as JsonValue;

use crate::core::external::{ExternalDataInfo, URI_KEY};

/// Mapping key. Integer keys sort before string keys.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Key {
    Int(i64),
    Str(String),
}

impl Key {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Key::Str(key) => Some(key.as_str()),
            Key::Int(_) => None,
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Int(key) => write!(f, "{key}"),
            Key::Str(key) => f.write_str(key),
        }
    }
}

impl From<&str> for Key {
    fn from(key: &str) -> Self {
        Key::Str(key.to_string())
    }
}

impl From<String> for Key {
    fn from(key: String) -> Self {
        Key::Str(key)
    }
}

impl From<i64> for Key {
    fn from(key: i64) -> Self {
        Key::Int(key)
    }
}

/// A value of a type canon does not know how to serialize.
///
/// Carries enough to report it: the producer's type name and a printable
/// rendering of the value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Opaque {
    pub type_name: String,
    pub repr: String,
}

/// Insertion-ordered mapping. Inserting an existing key replaces its value
/// in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mapping {
    entries: IndexMap<Key, Value>,
}

impl Mapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: IndexMap::with_capacity(capacity),
        }
    }

    /// Insert `value` under `key`, returning the previous value if any.
    pub fn insert(&mut self, key: impl Into<Key>, value: impl Into<Value>) -> Option<Value> {
        self.entries.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &Key) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&Value> {
        self.entries.get(&Key::from(key))
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get_str(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&Key, &Value)> {
        self.entries.iter()
    }

    /// Entries sorted ascending by key, independent of insertion order.
    pub fn sorted_entries(&self) -> Vec<(&Key, &Value)> {
        let mut entries: Vec<_> = self.iter().collect();
        entries.sort_unstable_by(|a, b| a.0.cmp(b.0));
        entries
    }
}

impl<K: Into<Key>, V: Into<Value>> FromIterator<(K, V)> for Mapping {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let mut mapping = Mapping::with_capacity(iter.size_hint().0);
        for (key, value) in iter {
            mapping.insert(key, value);
        }
        mapping
    }
}

/// A node of a result tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    /// Integers above `i64::MAX`.
    UInt(u64),
    Float(f64),
    Text(String),
    /// Raw text bytes; must decode as UTF-8 to serialize.
    Bytes(Vec<u8>),
    List(Vec<Value>),
    Tuple(Vec<Value>),
    Map(Mapping),
    Reference(ExternalDataInfo),
    Opaque(Opaque),
}

/// Structural classification of a node, checked in declaration order.
#[derive(Debug, Clone, Copy)]
pub enum NodeKind<'a> {
    /// `List` or `Tuple`.
    Sequence(&'a [Value]),
    /// A typed reference, or a mapping carrying a `uri` key.
    Reference,
    /// A mapping walked entry by entry.
    Container(&'a Mapping),
    Leaf,
}

impl Value {
    pub fn kind(&self) -> NodeKind<'_> {
        match self {
            Value::List(items) | Value::Tuple(items) => NodeKind::Sequence(items),
            Value::Reference(_) => NodeKind::Reference,
            Value::Map(mapping) if mapping.contains_key(URI_KEY) => NodeKind::Reference,
            Value::Map(mapping) => NodeKind::Container(mapping),
            _ => NodeKind::Leaf,
        }
    }

    pub fn type_name(&self) -> &str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) | Value::UInt(_) => "int",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
            Value::Bytes(_) => "bytes",
            Value::List(_) => "list",
            Value::Tuple(_) => "tuple",
            Value::Map(_) => "map",
            Value::Reference(_) => "reference",
            Value::Opaque(opaque) => opaque.type_name.as_str(),
        }
    }

    pub fn opaque(type_name: &str, repr: &str) -> Self {
        Value::Opaque(Opaque {
            type_name: type_name.to_string(),
            repr: repr.to_string(),
        })
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        match i64::try_from(value) {
            Ok(small) => Value::Int(small),
            Err(_) => Value::UInt(value),
        }
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<Mapping> for Value {
    fn from(mapping: Mapping) -> Self {
        Value::Map(mapping)
    }
}

impl From<ExternalDataInfo> for Value {
    fn from(info: ExternalDataInfo) -> Self {
        Value::Reference(info)
    }
}

/// Read a parsed JSON document as a value tree.
///
/// Objects become plain mappings; objects with a `uri` key are still
/// recognized as references by [`Value::kind`].
impl From<JsonValue> for Value {
    fn from(json: JsonValue) -> Self {
        match json {
            JsonValue::Null => Value::Null,
            JsonValue::Bool(flag) => Value::Bool(flag),
            JsonValue::Number(number) => {
                if let Some(int) = number.as_i64() {
                    Value::Int(int)
                } else if let Some(uint) = number.as_u64() {
                    Value::UInt(uint)
                } else {
                    Value::Float(number.as_f64().unwrap_or(f64::NAN))
                }
            }
            JsonValue::String(text) => Value::Text(text),
            JsonValue::Array(items) => Value::List(items.into_iter().map(Value::from).collect()),
            JsonValue::Object(map) => Value::Map(map.into_iter().collect()),
        }
    }
}
