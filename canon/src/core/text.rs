//! Canonical text form for string leaves.

use std::str::Utf8Error;

/// Canonical form of a text leaf: its UTF-8 string.
pub fn to_canonical_text(text: &str) -> String {
    text.to_owned()
}

/// Canonical form of raw text bytes. Bytes must already be UTF-8.
pub fn bytes_to_canonical_text(bytes: &[u8]) -> Result<String, Utf8Error> {
    std::str::from_utf8(bytes).map(to_canonical_text)
}
