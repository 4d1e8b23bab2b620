//! HTTP/1.1 message framing: header collection, incremental request parser
//! and the staged response writer.

pub mod chunked;
pub mod error;
pub mod headers;
pub mod parser;
pub mod request;
pub mod response;
pub mod status;

pub use error::{HeaderError, ParseError, WriteError};
pub use headers::Headers;
pub use parser::{RequestParser, read_request};
pub use request::{Request, RequestLine};
pub use response::ResponseWriter;
pub use status::StatusCode;

pub(crate) const CRLF: &[u8] = b"\r\n";

/// Offset of the first `\r\n` in `data`, if any.
pub(crate) fn find_crlf(data: &[u8]) -> Option<usize> {
    data.windows(CRLF.len()).position(|w| w == CRLF)
}
