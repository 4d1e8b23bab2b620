use std::io;
use thiserror::Error;

use crate::http::parser::ParserState;
use crate::http::response::WriterState;

/// Longest piece of peer input echoed back inside an error message.
const MAX_EXCERPT_CHARS: usize = 64;

/// `text` cut to [`MAX_EXCERPT_CHARS`], marked with `...` when cut.
fn excerpt(text: &str) -> String {
    match text.char_indices().nth(MAX_EXCERPT_CHARS) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// Failures while parsing a single header line.
#[derive(Error, Debug)]
pub enum HeaderError {
    #[error("no whitespace is allowed between the field name and colon: {line:?}")]
    MalformedHeaderSyntax { line: String },

    #[error("field name contains invalid characters: {name:?}")]
    InvalidFieldName { name: String },
}

impl HeaderError {
    pub fn malformed_header_syntax(line: &[u8]) -> Self {
        Self::MalformedHeaderSyntax {
            line: excerpt(&String::from_utf8_lossy(line)),
        }
    }

    pub fn invalid_field_name(name: &[u8]) -> Self {
        Self::InvalidFieldName {
            name: excerpt(&String::from_utf8_lossy(name)),
        }
    }
}

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("malformed request line: {line:?}")]
    MalformedRequestLine { line: String },

    #[error("invalid request method {method:?}, only capital letters are allowed")]
    InvalidMethod { method: String },

    #[error("unsupported http version {version:?}, only HTTP/1.1 is supported")]
    UnsupportedVersion { version: String },

    #[error("invalid header: {source}")]
    Header {
        #[from]
        source: HeaderError,
    },

    #[error("invalid content-length header: {value:?}")]
    InvalidContentLength { value: String },

    #[error("body is larger than reported content-length ({expected}), received {received}")]
    BodyExceedsContentLength { expected: usize, received: usize },

    #[error("trying to parse data in a done state")]
    ParseAfterComplete,

    #[error("incomplete request in state {state:?}, {buffered} bytes left unparsed")]
    IncompleteRequest { state: ParserState, buffered: usize },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl ParseError {
    pub fn malformed_request_line<S: ToString>(line: S) -> Self {
        Self::MalformedRequestLine {
            line: excerpt(&line.to_string()),
        }
    }

    pub fn invalid_method<S: ToString>(method: S) -> Self {
        Self::InvalidMethod {
            method: excerpt(&method.to_string()),
        }
    }

    pub fn unsupported_version<S: ToString>(version: S) -> Self {
        Self::UnsupportedVersion {
            version: excerpt(&version.to_string()),
        }
    }

    pub fn invalid_content_length<S: ToString>(value: S) -> Self {
        Self::InvalidContentLength {
            value: excerpt(&value.to_string()),
        }
    }

    /// Whether the failure came from the transport rather than the bytes on it.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Io { .. } | Self::IncompleteRequest { .. })
    }
}

#[derive(Error, Debug)]
pub enum WriteError {
    #[error("tried to {operation} with invalid writer state: {state:?}")]
    InvalidState {
        operation: &'static str,
        state: WriterState,
    },

    #[error("unknown status code: {0}")]
    UnknownStatusCode(u16),

    #[error("partial write: {written} of {expected} bytes")]
    ShortWrite { written: usize, expected: usize },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl WriteError {
    pub fn invalid_state(operation: &'static str, state: WriterState) -> Self {
        Self::InvalidState { operation, state }
    }
}
