use crate::http::headers::Headers;

/// `METHOD SP TARGET SP HTTP/1.1`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestLine {
    pub method: String,
    pub request_target: String,
    /// Version number only, always `1.1` for a parsed request.
    pub http_version: String,
}

/// A fully parsed request, produced by [`RequestParser`](crate::http::parser::RequestParser).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Request {
    pub request_line: RequestLine,
    pub headers: Headers,
    pub body: Vec<u8>,
}

impl Request {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn method(&self) -> &str {
        &self.request_line.method
    }

    pub fn target(&self) -> &str {
        &self.request_line.request_target
    }
}
