//! External reference markers.
//!
//! A reference stands in for data kept outside the result tree: a local
//! file, a sandbox resource, an upload that has not finished yet, or a remote
//! url. On the wire it is a small JSON object:
//!
//! ```text
//! { "uri": "<scheme>://<path>", "checksum"?: str, "size"?: int,
//!   "diff_tool"?: str, "local"?: bool, "diff_file_name"?: str,
//!   "diff_tool_timeout"?: number }
//! ```
//!
//! Unset optional fields are omitted, never written as `null`.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::core::canonical::CanonicalObject;
use crate::core::error::ExternalError;
use crate::core::value::Value;

pub const URI_KEY: &str = "uri";
pub const CHECKSUM_KEY: &str = "checksum";
pub const SIZE_KEY: &str = "size";
pub const DIFF_TOOL_KEY: &str = "diff_tool";
pub const LOCAL_KEY: &str = "local";
pub const DIFF_FILE_NAME_KEY: &str = "diff_file_name";
pub const DIFF_TOOL_TIMEOUT_KEY: &str = "diff_tool_timeout";

const SCHEME_SEPARATOR: &str = "://";

/// True if `value` is a reference node: a typed reference, or a mapping
/// carrying a `uri` key.
pub fn is_external(value: &Value) -> bool {
    match value {
        Value::Reference(_) => true,
        Value::Map(mapping) => mapping.contains_key(URI_KEY),
        _ => false,
    }
}

/// Kind of resource a reference points at, identified by its uri prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Scheme {
    #[serde(rename = "file")]
    File,
    #[serde(rename = "sbr")]
    SandboxResource,
    #[serde(rename = "delayed")]
    Delayed,
    #[serde(rename = "http")]
    Http,
}

impl Scheme {
    pub const ALL: [Scheme; 4] = [
        Scheme::File,
        Scheme::SandboxResource,
        Scheme::Delayed,
        Scheme::Http,
    ];

    pub fn prefix(self) -> &'static str {
        match self {
            Scheme::File => "file",
            Scheme::SandboxResource => "sbr",
            Scheme::Delayed => "delayed",
            Scheme::Http => "http",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Scheme::File => "File",
            Scheme::SandboxResource => "Sandbox resource",
            Scheme::Delayed => "Delayed upload",
            Scheme::Http => "HTTP resource",
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// Optional attributes of a `file` reference.
///
/// Each field is written only when set: non-empty strings, `local == true`
/// and a non-zero timeout. `size` is written whenever present, zero included.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileAttrs {
    /// Tool used to diff this file against its canonical copy.
    pub diff_tool: Option<String>,
    /// The file stays on the local filesystem and is not uploaded.
    pub local: bool,
    pub diff_file_name: Option<String>,
    /// Diff tool timeout in seconds.
    pub diff_tool_timeout: Option<u64>,
    /// File size in bytes.
    pub size: Option<u64>,
}

impl FileAttrs {
    fn write_into(self, object: &mut CanonicalObject) {
        if let Some(diff_tool) = self.diff_tool.filter(|tool| !tool.is_empty()) {
            object.insert(DIFF_TOOL_KEY, diff_tool);
        }
        if self.local {
            object.insert(LOCAL_KEY, true);
        }
        if let Some(name) = self.diff_file_name.filter(|name| !name.is_empty()) {
            object.insert(DIFF_FILE_NAME_KEY, name);
        }
        if let Some(timeout) = self.diff_tool_timeout.filter(|secs| *secs > 0) {
            object.insert(DIFF_TOOL_TIMEOUT_KEY, timeout);
        }
        if let Some(size) = self.size {
            object.insert(SIZE_KEY, size);
        }
    }
}

/// Read access to a reference marker.
///
/// Wraps the marker object without copying it; [`ExternalDataInfo::serialize`]
/// hands back the same object.
#[derive(Debug, Clone, PartialEq)]
pub struct ExternalDataInfo {
    data: CanonicalObject,
}

impl ExternalDataInfo {
    /// Wrap a marker object. The object must carry a string `uri`.
    pub fn new(data: CanonicalObject) -> Result<Self, ExternalError> {
        match data.get(URI_KEY) {
            Some(JsonValue::String(_)) => Ok(Self { data }),
            _ => Err(ExternalError::NotAReference),
        }
    }

    /// Wrap a parsed JSON object.
    pub fn from_json(json: JsonValue) -> Result<Self, ExternalError> {
        match json {
            JsonValue::Object(map) => Self::new(CanonicalObject::from(map)),
            _ => Err(ExternalError::NotAReference),
        }
    }

    pub fn uri(&self) -> &str {
        self.data
            .get(URI_KEY)
            .and_then(JsonValue::as_str)
            .unwrap_or_default()
    }

    /// First scheme whose prefix starts the uri.
    pub fn scheme(&self) -> Option<Scheme> {
        Scheme::ALL
            .into_iter()
            .find(|scheme| self.uri().starts_with(scheme.prefix()))
    }

    pub fn is_file(&self) -> bool {
        self.uri().starts_with(Scheme::File.prefix())
    }

    pub fn is_sandbox_resource(&self) -> bool {
        self.uri().starts_with(Scheme::SandboxResource.prefix())
    }

    pub fn is_delayed(&self) -> bool {
        self.uri().starts_with(Scheme::Delayed.prefix())
    }

    pub fn is_http(&self) -> bool {
        self.uri().starts_with(Scheme::Http.prefix())
    }

    /// Part of the uri after `://`. The uri must contain exactly one `://`.
    pub fn path(&self) -> Result<&str, ExternalError> {
        let uri = self.uri();
        let found = uri.matches(SCHEME_SEPARATOR).count();
        match uri.split_once(SCHEME_SEPARATOR) {
            Some((_, path)) if found == 1 => Ok(path),
            _ => Err(ExternalError::MalformedUri {
                uri: uri.to_string(),
                found,
            }),
        }
    }

    pub fn checksum(&self) -> Option<&str> {
        self.data.get(CHECKSUM_KEY).and_then(JsonValue::as_str)
    }

    pub fn size(&self) -> Option<u64> {
        self.data.get(SIZE_KEY).and_then(JsonValue::as_u64)
    }

    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.data.get(key)
    }

    pub fn get_or<'a>(&'a self, key: &str, default: &'a JsonValue) -> &'a JsonValue {
        self.data.get(key).unwrap_or(default)
    }

    /// The wrapped marker object, as is.
    pub fn serialize(&self) -> &CanonicalObject {
        &self.data
    }

    pub fn into_inner(self) -> CanonicalObject {
        self.data
    }

    /// Marker for a local file at `path`.
    pub fn serialize_file(
        path: &str,
        checksum: Option<&str>,
        attrs: FileAttrs,
    ) -> CanonicalObject {
        let mut object = marker(Scheme::File.prefix(), path, checksum);
        attrs.write_into(&mut object);
        object
    }

    /// Marker for a sandbox resource.
    pub fn serialize_resource(id: &str, checksum: Option<&str>) -> CanonicalObject {
        marker(Scheme::SandboxResource.prefix(), id, checksum)
    }

    /// Marker for an upload that has not completed yet.
    pub fn serialize_delayed(upload_id: &str, checksum: &str) -> CanonicalObject {
        marker(Scheme::Delayed.prefix(), upload_id, Some(checksum))
    }

    /// Marker for a remote resource. `url` becomes the uri verbatim.
    pub fn serialize_http(
        url: &str,
        checksum: Option<&str>,
    ) -> Result<CanonicalObject, ExternalError> {
        let well_formed = (url.starts_with("http://") || url.starts_with("https://"))
            && url.matches(SCHEME_SEPARATOR).count() == 1;
        if !well_formed {
            return Err(ExternalError::InvalidHttpUrl {
                url: url.to_string(),
            });
        }
        let mut object = CanonicalObject::new();
        object.insert(URI_KEY, url);
        insert_checksum(&mut object, checksum);
        Ok(object)
    }
}

impl fmt::Display for ExternalDataInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = self.scheme().map_or("Unknown resource", Scheme::label);
        let path = self.path().unwrap_or(self.uri());
        write!(f, "{label}({path})")
    }
}

fn marker(prefix: &str, path: &str, checksum: Option<&str>) -> CanonicalObject {
    let mut object = CanonicalObject::new();
    object.insert(URI_KEY, format!("{prefix}{SCHEME_SEPARATOR}{path}"));
    insert_checksum(&mut object, checksum);
    object
}

fn insert_checksum(object: &mut CanonicalObject, checksum: Option<&str>) {
    if let Some(checksum) = checksum.filter(|checksum| !checksum.is_empty()) {
        object.insert(CHECKSUM_KEY, checksum);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::value::Mapping;
    use serde_json::json;

    fn info(object: CanonicalObject) -> ExternalDataInfo {
        ExternalDataInfo::new(object).expect("reference")
    }

    fn flags(info: &ExternalDataInfo) -> [bool; 4] {
        [
            info.is_file(),
            info.is_sandbox_resource(),
            info.is_delayed(),
            info.is_http(),
        ]
    }

    #[test]
    fn is_external_requires_uri_key() {
        let marker: Mapping = [("uri", "file://a"), ("checksum", "abc")]
            .into_iter()
            .collect();
        assert!(is_external(&Value::Map(marker)));

        let plain: Mapping = [("path", "a")].into_iter().collect();
        assert!(!is_external(&Value::Map(plain)));
        assert!(!is_external(&Value::from("uri")));
        assert!(!is_external(&Value::List(vec![Value::from("uri")])));
    }

    #[test]
    fn new_rejects_objects_without_uri() {
        let mut object = CanonicalObject::new();
        object.insert("checksum", "abc");
        assert_eq!(
            ExternalDataInfo::new(object),
            Err(ExternalError::NotAReference)
        );
    }

    #[test]
    fn new_rejects_non_string_uri() {
        let mut object = CanonicalObject::new();
        object.insert("uri", 5);
        assert_eq!(
            ExternalDataInfo::new(object),
            Err(ExternalError::NotAReference)
        );
    }

    #[test]
    fn file_reference_classifies_as_file_only() {
        let file = info(ExternalDataInfo::serialize_file("a/b.txt", None, FileAttrs::default()));
        assert_eq!(flags(&file), [true, false, false, false]);
        assert_eq!(file.scheme(), Some(Scheme::File));
        assert_eq!(file.path(), Ok("a/b.txt"));
    }

    #[test]
    fn resource_reference_classifies_as_sandbox_resource_only() {
        let resource = info(ExternalDataInfo::serialize_resource("12345", Some("md5")));
        assert_eq!(flags(&resource), [false, true, false, false]);
        assert_eq!(resource.path(), Ok("12345"));
        assert_eq!(resource.checksum(), Some("md5"));
    }

    #[test]
    fn delayed_reference_classifies_as_delayed_only() {
        let delayed = info(ExternalDataInfo::serialize_delayed("upload-1", "sha"));
        assert_eq!(flags(&delayed), [false, false, true, false]);
        assert_eq!(delayed.checksum(), Some("sha"));
    }

    #[test]
    fn http_reference_classifies_as_http_only() {
        let http = info(
            ExternalDataInfo::serialize_http("https://example.com/log.txt", None).expect("url"),
        );
        assert_eq!(flags(&http), [false, false, false, true]);
        assert_eq!(http.path(), Ok("example.com/log.txt"));
    }

    #[test]
    fn http_factory_rejects_other_schemes() {
        let err = ExternalDataInfo::serialize_http("ftp://example.com", None)
            .expect_err("ftp is not http");
        assert!(matches!(err, ExternalError::InvalidHttpUrl { .. }));
        assert!(ExternalDataInfo::serialize_http("http://a/http://b", None).is_err());
    }

    #[test]
    fn scheme_prefixes_are_not_prefixes_of_each_other() {
        for left in Scheme::ALL {
            for right in Scheme::ALL {
                if left != right {
                    assert!(!left.prefix().starts_with(right.prefix()));
                }
            }
        }
    }

    #[test]
    fn path_rejects_uri_without_separator() {
        let mut object = CanonicalObject::new();
        object.insert("uri", "bad_uri_no_scheme");
        let err = info(object).path().expect_err("malformed");
        assert_eq!(
            err,
            ExternalError::MalformedUri {
                uri: "bad_uri_no_scheme".to_string(),
                found: 0
            }
        );
    }

    #[test]
    fn path_rejects_uri_with_two_separators() {
        let file = info(ExternalDataInfo::serialize_file(
            "http://x",
            None,
            FileAttrs::default(),
        ));
        assert!(matches!(
            file.path(),
            Err(ExternalError::MalformedUri { found: 2, .. })
        ));
    }

    #[test]
    fn file_attrs_are_written_only_when_set() {
        let object = ExternalDataInfo::serialize_file(
            "out/log.txt",
            Some(""),
            FileAttrs {
                diff_tool: Some(String::new()),
                local: false,
                diff_file_name: None,
                diff_tool_timeout: Some(0),
                size: Some(0),
            },
        );
        assert_eq!(
            serde_json::to_value(&object).expect("json"),
            json!({"uri": "file://out/log.txt", "size": 0})
        );
    }

    #[test]
    fn file_attrs_full_wire_shape() {
        let object = ExternalDataInfo::serialize_file(
            "out/log.txt",
            Some("abc"),
            FileAttrs {
                diff_tool: Some("cmp".to_string()),
                local: true,
                diff_file_name: Some("log.diff".to_string()),
                diff_tool_timeout: Some(60),
                size: Some(1024),
            },
        );
        assert_eq!(
            serde_json::to_value(&object).expect("json"),
            json!({
                "uri": "file://out/log.txt",
                "checksum": "abc",
                "diff_tool": "cmp",
                "local": true,
                "diff_file_name": "log.diff",
                "diff_tool_timeout": 60,
                "size": 1024,
            })
        );
        assert_eq!(info(object).size(), Some(1024));
    }

    #[test]
    fn missing_optional_fields_read_as_none() {
        let resource = info(ExternalDataInfo::serialize_resource("1", None));
        assert_eq!(resource.checksum(), None);
        assert_eq!(resource.size(), None);
        assert_eq!(resource.get("diff_tool"), None);
        let default = json!("fallback");
        assert_eq!(resource.get_or("diff_tool", &default), &default);
    }

    #[test]
    fn serialize_returns_wrapped_object() {
        let object = ExternalDataInfo::serialize_resource("9", Some("c"));
        let wrapped = info(object.clone());
        assert_eq!(wrapped.serialize(), &object);
        assert_eq!(wrapped.into_inner(), object);
    }

    #[test]
    fn display_uses_scheme_label_and_path() {
        let file = info(ExternalDataInfo::serialize_file("a.txt", None, FileAttrs::default()));
        assert_eq!(file.to_string(), "File(a.txt)");
        let resource = info(ExternalDataInfo::serialize_resource("42", None));
        assert_eq!(resource.to_string(), "Sandbox resource(42)");
    }

    #[test]
    fn from_json_requires_object() {
        assert_eq!(
            ExternalDataInfo::from_json(json!(["uri"])),
            Err(ExternalError::NotAReference)
        );
        let parsed = ExternalDataInfo::from_json(json!({"uri": "sbr://5"})).expect("object");
        assert!(parsed.is_sandbox_resource());
    }
}
