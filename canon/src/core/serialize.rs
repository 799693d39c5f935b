//! JSON-safe serialization of value trees.
//!
//! The output is built only from `null`, strings, numbers, booleans, arrays
//! and objects. Reference nodes come out as plain objects; any leaf outside
//! that closed set is an error rather than being coerced. Object keys are
//! strings ordered as strings, so an integer key `10` precedes `2`, and a
//! mapping whose keys render to the same string (`1` and `"1"`) is an error.

use std::collections::HashSet;

use serde_json::{Map, Number, Value as JsonValue};

use crate::core::error::SerializeError;
use crate::core::external::is_external;
use crate::core::path::ValuePath;
use crate::core::text::{bytes_to_canonical_text, to_canonical_text};
use crate::core::value::{Mapping, Value};
use crate::core::walk::apply_at;

/// Serialize `value` into its canonical JSON form.
///
/// Mapping keys come out sorted; serializing the output again (after
/// reading it back with `Value::from`) yields the same document.
pub fn serialize(value: &Value) -> Result<JsonValue, SerializeError> {
    serialize_at(value, &ValuePath::root())
}

/// Serialize a subtree, reporting error paths relative to `path`.
pub fn serialize_at(value: &Value, path: &ValuePath) -> Result<JsonValue, SerializeError> {
    check_keys(value, path)?;
    emit(value, path)
}

fn emit(value: &Value, path: &ValuePath) -> Result<JsonValue, SerializeError> {
    apply_at(value, Some(path), serialize_leaf)
}

/// Every mapping below `value`, uri mappings included, must render to
/// distinct object keys.
fn check_keys(value: &Value, path: &ValuePath) -> Result<(), SerializeError> {
    match value {
        Value::List(items) | Value::Tuple(items) => {
            for (index, item) in items.iter().enumerate() {
                check_keys(item, &path.child(index))?;
            }
            Ok(())
        }
        Value::Map(mapping) => {
            let mut rendered = HashSet::with_capacity(mapping.len());
            for (key, item) in mapping.sorted_entries() {
                if !rendered.insert(key.to_string()) {
                    return Err(SerializeError::KeyCollision {
                        key: key.to_string(),
                        path: path.clone(),
                    });
                }
                check_keys(item, &path.child(key.clone()))?;
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

fn serialize_leaf(value: &Value, path: &ValuePath) -> Result<JsonValue, SerializeError> {
    match value {
        Value::Null => Ok(JsonValue::Null),
        Value::Text(text) => Ok(JsonValue::String(to_canonical_text(text))),
        Value::Bytes(bytes) => bytes_to_canonical_text(bytes)
            .map(JsonValue::String)
            .map_err(|source| SerializeError::InvalidText {
                path: path.clone(),
                source,
            }),
        Value::Bool(flag) => Ok(JsonValue::Bool(*flag)),
        Value::Int(int) => Ok(JsonValue::from(*int)),
        Value::UInt(uint) => Ok(JsonValue::from(*uint)),
        Value::Float(float) => Number::from_f64(*float)
            .map(JsonValue::Number)
            .ok_or_else(|| SerializeError::NonFiniteFloat {
                value: *float,
                path: path.clone(),
            }),
        Value::Reference(info) => Ok(JsonValue::Object(info.serialize().to_plain())),
        Value::Map(mapping) if is_external(value) => plain_copy(mapping, path),
        other => Err(SerializeError::Unsupported {
            value: describe(other),
            type_name: other.type_name().to_string(),
            path: path.clone(),
        }),
    }
}

/// Copy a uri-bearing mapping into a plain object, serializing each entry.
fn plain_copy(mapping: &Mapping, path: &ValuePath) -> Result<JsonValue, SerializeError> {
    let mut object = Map::new();
    let mut entries = mapping.sorted_entries();
    entries.sort_by_cached_key(|(key, _)| key.to_string());
    for (key, item) in entries {
        let child = emit(item, &path.child(key.clone()))?;
        object.insert(key.to_string(), child);
    }
    Ok(JsonValue::Object(object))
}

fn describe(value: &Value) -> String {
    match value {
        Value::Opaque(opaque) => opaque.repr.clone(),
        other => format!("{other:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::external::{ExternalDataInfo, FileAttrs};
    use crate::core::value::Key;
    use crate::test_support::{list, map, uri_marker};
    use serde_json::json;

    #[test]
    fn primitives_pass_through() {
        let tree = list(vec![
            Value::Null,
            Value::Bool(false),
            Value::Int(-4),
            Value::UInt(u64::MAX),
            Value::Float(1.5),
            Value::from("text"),
            Value::Bytes(b"raw".to_vec()),
        ]);
        assert_eq!(
            serialize(&tree).expect("serialize"),
            json!([null, false, -4, u64::MAX, 1.5, "text", "raw"])
        );
    }

    #[test]
    fn end_to_end_example_sorts_keys_and_keeps_reference() {
        let tree = map([
            ("b", Value::Int(2)),
            (
                "a",
                list(vec![Value::Int(1), uri_marker("file://out/log.txt", Some("abc"))]),
            ),
        ]);
        let out = serialize(&tree).expect("serialize");
        assert_eq!(
            out,
            json!({"a": [1, {"uri": "file://out/log.txt", "checksum": "abc"}], "b": 2})
        );
        let keys: Vec<&String> = out.as_object().expect("object").keys().collect();
        assert_eq!(keys, vec!["a", "b"]);
    }

    #[test]
    fn typed_reference_becomes_plain_object() {
        let object = ExternalDataInfo::serialize_file(
            "a/b.txt",
            None,
            FileAttrs {
                size: Some(0),
                ..FileAttrs::default()
            },
        );
        let info = ExternalDataInfo::new(object).expect("reference");
        let out = serialize(&list(vec![Value::Reference(info)])).expect("serialize");
        assert_eq!(out, json!([{"uri": "file://a/b.txt", "size": 0}]));
    }

    #[test]
    fn empty_inputs_stay_empty() {
        assert_eq!(serialize(&Value::List(Vec::new())).expect("list"), json!([]));
        assert_eq!(serialize(&Value::Map(Mapping::new())).expect("map"), json!({}));
    }

    #[test]
    fn serialize_is_idempotent() {
        let tree = map([
            ("z", Value::Tuple(vec![Value::Float(0.25), Value::from("ü")])),
            ("m", map([(Key::Int(1), Value::Null)])),
            ("r", uri_marker("delayed://up-1", Some("sha"))),
        ]);
        let once = serialize(&tree).expect("first");
        let twice = serialize(&Value::from(once.clone())).expect("second");
        assert_eq!(once, twice);
    }

    #[test]
    fn insertion_order_does_not_change_output() {
        let forward = map([("a", Value::Int(1)), ("b", Value::Int(2)), ("c", Value::Int(3))]);
        let backward = map([("c", Value::Int(3)), ("b", Value::Int(2)), ("a", Value::Int(1))]);
        let forward = serde_json::to_string(&serialize(&forward).expect("forward")).expect("json");
        let backward =
            serde_json::to_string(&serialize(&backward).expect("backward")).expect("json");
        assert_eq!(forward, backward);
        assert_eq!(forward, r#"{"a":1,"b":2,"c":3}"#);
    }

    #[test]
    fn opaque_leaf_is_rejected_with_its_type() {
        let tree = map([("meta", list(vec![Value::opaque("object", "<object at 0x1>")]))]);
        let err = serialize(&tree).expect_err("opaque leaf");
        let msg = err.to_string();
        assert!(msg.contains("of type object"), "{msg}");
        assert!(msg.contains("<object at 0x1>"), "{msg}");
        assert_eq!(err.path().to_string(), "meta/0");
    }

    #[test]
    fn bare_opaque_value_is_rejected() {
        let err = serialize(&Value::opaque("object", "<object>")).expect_err("opaque");
        assert!(matches!(
            err,
            SerializeError::Unsupported { ref type_name, .. } if type_name == "object"
        ));
    }

    #[test]
    fn non_finite_float_is_rejected() {
        let err = serialize(&list(vec![Value::Float(f64::NAN)])).expect_err("nan");
        assert!(matches!(err, SerializeError::NonFiniteFloat { .. }));
    }

    #[test]
    fn invalid_utf8_bytes_are_rejected() {
        let err = serialize(&Value::Bytes(vec![0xc3, 0x28])).expect_err("bytes");
        assert!(matches!(err, SerializeError::InvalidText { .. }));
    }

    #[test]
    fn int_and_string_keys_rendering_alike_are_rejected() {
        let tree = map([(
            "results",
            map([
                (Key::Int(1), Value::from("int-one")),
                (Key::from("1"), Value::from("str-one")),
            ]),
        )]);
        let err = serialize(&tree).expect_err("colliding keys");
        assert!(matches!(
            err,
            SerializeError::KeyCollision { ref key, .. } if key == "1"
        ));
        assert_eq!(err.path().to_string(), "results");
    }

    #[test]
    fn colliding_keys_inside_uri_mapping_are_rejected() {
        let mut marker = Mapping::new();
        marker.insert("uri", "file://a");
        marker.insert(Key::Int(7), Value::Null);
        marker.insert("7", Value::Null);
        let err = serialize(&list(vec![Value::Map(marker)])).expect_err("colliding keys");
        assert_eq!(err.path().to_string(), "0");
        assert!(err.to_string().contains("key '7'"), "{err}");
    }

    #[test]
    fn int_keys_are_ordered_as_strings_in_output() {
        let tree = map([
            (Key::Int(2), Value::Int(2)),
            (Key::Int(10), Value::Int(10)),
            (Key::from("a"), Value::Int(0)),
        ]);
        let once = serialize(&tree).expect("serialize");
        let text = serde_json::to_string(&once).expect("json");
        assert_eq!(text, r#"{"10":10,"2":2,"a":0}"#);
        let again = serialize(&Value::from(once)).expect("reserialize");
        assert_eq!(serde_json::to_string(&again).expect("json"), text);
    }

    #[test]
    fn opaque_inside_uri_mapping_is_rejected() {
        let mut marker = Mapping::new();
        marker.insert("uri", "file://a");
        marker.insert("extra", Value::opaque("socket", "<socket>"));
        let err = serialize(&Value::Map(marker)).expect_err("opaque attr");
        assert_eq!(err.path().to_string(), "extra");
    }
}
