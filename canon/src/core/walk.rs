//! Depth-first walker over value trees.
//!
//! [`apply`] rebuilds a tree of the same shape, calling a leaf function on
//! every leaf and on every reference node. Nodes are classified by
//! [`Value::kind`] in priority order:
//!
//! 1. Sequences (`List` and `Tuple`) are walked by index and rebuilt as a
//!    sequence.
//! 2. Reference nodes are handed to the leaf function whole and never
//!    entered, at any depth.
//! 3. Other mappings are walked in ascending key order and rebuilt with the
//!    same keys, so output never depends on insertion order.
//! 4. Everything else is a leaf.
//!
//! Empty sequences and mappings produce empty output without calling the
//! leaf function.

use serde_json::{Map, Value as JsonValue};
use tracing::trace;

use crate::core::path::ValuePath;
use crate::core::value::{Key, Mapping, NodeKind, Value};

/// Tree shapes the walker can assemble.
pub trait TreeOutput: Sized {
    fn sequence(items: Vec<Self>) -> Self;

    /// Build a mapping from entries given in ascending key order.
    fn mapping(entries: Vec<(Key, Self)>) -> Self;
}

impl TreeOutput for Value {
    fn sequence(items: Vec<Self>) -> Self {
        Value::List(items)
    }

    fn mapping(entries: Vec<(Key, Self)>) -> Self {
        Value::Map(entries.into_iter().collect::<Mapping>())
    }
}

/// JSON objects need string keys: integer keys are rendered in decimal and
/// entries are ordered by the rendered string, so `10` sorts before `2`.
///
/// Two keys rendering to the same string collapse into one entry; callers
/// that must not lose data check for that first (see
/// [`crate::core::serialize`]).
impl TreeOutput for JsonValue {
    fn sequence(items: Vec<Self>) -> Self {
        JsonValue::Array(items)
    }

    fn mapping(entries: Vec<(Key, Self)>) -> Self {
        let mut rendered: Vec<(String, Self)> = entries
            .into_iter()
            .map(|(key, value)| (key.to_string(), value))
            .collect();
        rendered.sort_by(|a, b| a.0.cmp(&b.0));
        JsonValue::Object(rendered.into_iter().collect::<Map<String, JsonValue>>())
    }
}

/// Visit-only walks: the leaf function runs for its side effects.
impl TreeOutput for () {
    fn sequence(_items: Vec<Self>) -> Self {}

    fn mapping(_entries: Vec<(Key, Self)>) -> Self {}
}

/// Rebuild `value`, replacing each leaf and reference node with the result
/// of `func(node, path)`.
///
/// The first error returned by `func` aborts the walk.
pub fn apply<T, E, F>(value: &Value, func: F) -> Result<T, E>
where
    T: TreeOutput,
    F: FnMut(&Value, &ValuePath) -> Result<T, E>,
{
    apply_at(value, None, func)
}

/// Like [`apply`], with paths reported relative to `start` (`None` means
/// the root).
pub fn apply_at<T, E, F>(value: &Value, start: Option<&ValuePath>, mut func: F) -> Result<T, E>
where
    T: TreeOutput,
    F: FnMut(&Value, &ValuePath) -> Result<T, E>,
{
    let root = start.cloned().unwrap_or_default();
    walk(value, &root, &mut func)
}

fn walk<T, E, F>(value: &Value, path: &ValuePath, func: &mut F) -> Result<T, E>
where
    T: TreeOutput,
    F: FnMut(&Value, &ValuePath) -> Result<T, E>,
{
    match value.kind() {
        NodeKind::Sequence(items) => {
            let mut output = Vec::with_capacity(items.len());
            for (index, item) in items.iter().enumerate() {
                output.push(walk(item, &path.child(index), func)?);
            }
            Ok(T::sequence(output))
        }
        NodeKind::Reference => {
            trace!(path = %path, "reference node");
            func(value, path)
        }
        NodeKind::Container(mapping) => {
            let entries = mapping.sorted_entries();
            let mut output = Vec::with_capacity(entries.len());
            for (key, item) in entries {
                let child = walk(item, &path.child(key.clone()), func)?;
                output.push((key.clone(), child));
            }
            Ok(T::mapping(output))
        }
        NodeKind::Leaf => func(value, path),
    }
}
