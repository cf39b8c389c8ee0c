//! Custom-element name validation.
//!
//! One validity check shared by `define` and `when_defined`, so a name
//! accepted by one is accepted by the other.

use memchr::memchr;

use crate::error::{NameError, NameErrorReason};

/// Names that look like custom-element names but belong to the markup
/// language.
const RESERVED: &[&str] = &[
    "annotation-xml",
    "color-profile",
    "font-face",
    "font-face-src",
    "font-face-uri",
    "font-face-format",
    "font-face-name",
    "missing-glyph",
];

/// A valid name starts with an ASCII lowercase letter, contains at least one
/// hyphen, draws only from `[a-z0-9._-]`, and is not reserved.
pub fn validate_name(name: &str) -> Result<(), NameError> {
    let bytes = name.as_bytes();
    let starts_lower = bytes.first().is_some_and(u8::is_ascii_lowercase);
    let body_ok = bytes
        .iter()
        .all(|&b| matches!(b, b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_'));
    if !starts_lower || !body_ok || memchr(b'-', bytes).is_none() {
        return Err(NameError {
            name: name.to_string(),
            reason: NameErrorReason::Malformed,
        });
    }
    if RESERVED.contains(&name) {
        return Err(NameError {
            name: name.to_string(),
            reason: NameErrorReason::Reserved,
        });
    }
    Ok(())
}
