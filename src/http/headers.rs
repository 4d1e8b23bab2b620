//! HTTP header collection shared by [`Request`](crate::http::request::Request)
//! parsing and the [`ResponseWriter`](crate::http::response::ResponseWriter).
//!
//! Field names are stored lower-cased, so every lookup and mutation is
//! case-insensitive. Setting a name that already exists appends the new value
//! with `", "` (list-value semantics); [`Headers::replace`] overwrites instead.
//!
//! Parsing is line oriented: [`Headers::parse_one_line`] consumes at most one
//! field line from the front of a buffer and reports how many bytes it used,
//! so the request parser can drive it across partial reads without this type
//! doing any buffering of its own.

use indexmap::IndexMap;

use crate::http::error::HeaderError;
use crate::http::find_crlf;

/// Punctuation allowed in a field-name token besides ASCII letters and digits.
const TOKEN_PUNCTUATION: &[u8] = b"!#$%&'*+-.^_`|~";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    headers: IndexMap<String, String>,
}

impl Headers {
    pub fn new() -> Self {
        Self {
            headers: IndexMap::new(),
        }
    }

    /// Parses the next field line at the front of `data`.
    ///
    /// Returns the number of bytes consumed and whether the header section is
    /// finished. `Ok((0, false))` means no CRLF is buffered yet and the caller
    /// must supply more bytes. A bare CRLF ends the section: `Ok((2, true))`,
    /// with no mutation.
    pub fn parse_one_line(&mut self, data: &[u8]) -> Result<(usize, bool), HeaderError> {
        let line_end = match find_crlf(data) {
            Some(idx) => idx,
            None => return Ok((0, false)),
        };

        if line_end == 0 {
            return Ok((2, true));
        }

        let line = &data[..line_end];
        let colon = match line.iter().position(|&b| b == b':') {
            Some(idx) => idx,
            None => return Err(HeaderError::invalid_field_name(line)),
        };

        if colon > 0 && matches!(line[colon - 1], b' ' | b'\t') {
            return Err(HeaderError::malformed_header_syntax(line));
        }

        let name = line[..colon].trim_ascii();
        let value = line[colon + 1..].trim_ascii();

        if !is_valid_field_name(name) {
            return Err(HeaderError::invalid_field_name(name));
        }

        // name is pure ASCII after validation
        let name = String::from_utf8_lossy(name);
        let value = String::from_utf8_lossy(value);
        self.set(&name, &value);

        Ok((line_end + 2, false))
    }

    /// Adds a value, joining it to any existing value with `", "`.
    pub fn set(&mut self, name: &str, value: &str) {
        self.headers
            .entry(name.to_ascii_lowercase())
            .and_modify(|current| {
                current.push_str(", ");
                current.push_str(value);
            })
            .or_insert_with(|| value.to_string());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Sets a value, discarding whatever was there before.
    pub fn replace(&mut self, name: &str, value: &str) {
        self.headers
            .insert(name.to_ascii_lowercase(), value.to_string());
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.headers.shift_remove(&name.to_ascii_lowercase())
    }

    /// Sets every entry of `other` into `self` with [`Headers::set`] semantics.
    pub fn merge_from(&mut self, other: &Headers) {
        for (name, value) in other.iter() {
            self.set(name, value);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    /// Serializes every entry as `name: value\r\n`, without the terminating
    /// blank line.
    pub fn stringify(&self) -> String {
        let mut result = String::new();
        for (name, value) in self.iter() {
            result.push_str(name);
            result.push_str(": ");
            result.push_str(value);
            result.push_str("\r\n");
        }
        result
    }
}

fn is_valid_field_name(name: &[u8]) -> bool {
    !name.is_empty()
        && name
            .iter()
            .all(|b| b.is_ascii_alphanumeric() || TOKEN_PUNCTUATION.contains(b))
}
