//! Incremental HTTP/1.1 request parser.
//!
//! [`RequestParser`] is a pure state machine: it never reads from the network.
//! Each call to [`RequestParser::feed`] receives every byte buffered so far that
//! has not been consumed yet, makes as much progress as it can and reports how
//! many bytes it consumed. The caller keeps the unconsumed tail and feeds it
//! again, with more data appended, on the next round.
//!
//! [`read_request`] is the byte pump around it: it reads from an async source
//! into a growable buffer, feeds the parser and compacts the buffer until the
//! request is complete.

use async_std::io::{Read, ReadExt};
use tracing::trace;

use crate::http::error::ParseError;
use crate::http::find_crlf;
use crate::http::request::{Request, RequestLine};

const SUPPORTED_VERSION: &str = "1.1";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserState {
    Initialized,
    ParsingHeaders,
    ParsingBody,
    Done,
}

pub struct RequestParser {
    state: ParserState,
    request: Request,
}

impl Default for RequestParser {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestParser {
    pub fn new() -> Self {
        Self {
            state: ParserState::Initialized,
            request: Request::new(),
        }
    }

    pub fn state(&self) -> ParserState {
        self.state
    }

    pub fn is_done(&self) -> bool {
        self.state == ParserState::Done
    }

    /// The parsed request, once the parser reached [`ParserState::Done`].
    pub fn into_request(self) -> Option<Request> {
        match self.state {
            ParserState::Done => Some(self.request),
            _ => None,
        }
    }

    /// Runs parse steps against `data` until one of them needs more input or
    /// the request is complete, and returns the total number of bytes consumed.
    ///
    /// On error nothing is reported as consumed and the parser must be dropped.
    pub fn feed(&mut self, data: &[u8]) -> Result<usize, ParseError> {
        if self.state == ParserState::Done {
            return Err(ParseError::ParseAfterComplete);
        }

        let mut total = 0;
        while self.state != ParserState::Done {
            let n = self.parse_single(&data[total..])?;
            if n == 0 {
                break;
            }
            total += n;
        }

        Ok(total)
    }

    fn parse_single(&mut self, data: &[u8]) -> Result<usize, ParseError> {
        match self.state {
            ParserState::Initialized => {
                let Some((request_line, n)) = parse_request_line(data)? else {
                    return Ok(0);
                };

                trace!(
                    method = %request_line.method,
                    target = %request_line.request_target,
                    "parsed request line"
                );
                self.request.request_line = request_line;
                self.state = ParserState::ParsingHeaders;
                Ok(n)
            }
            ParserState::ParsingHeaders => {
                let (n, done) = self.request.headers.parse_one_line(data)?;
                if done {
                    trace!(headers = self.request.headers.len(), "parsed header section");
                    self.state = ParserState::ParsingBody;
                }
                Ok(n)
            }
            ParserState::ParsingBody => self.parse_body(data),
            ParserState::Done => Err(ParseError::ParseAfterComplete),
        }
    }

    fn parse_body(&mut self, data: &[u8]) -> Result<usize, ParseError> {
        let Some(value) = self.request.headers.get("content-length") else {
            self.state = ParserState::Done;
            return Ok(0);
        };

        let content_length = value
            .parse::<usize>()
            .map_err(|_| ParseError::invalid_content_length(value))?;

        if data.len() > content_length {
            return Err(ParseError::BodyExceedsContentLength {
                expected: content_length,
                received: data.len(),
            });
        }

        if data.len() < content_length {
            return Ok(0);
        }

        self.request.body = data.to_vec();
        self.state = ParserState::Done;
        trace!(body = content_length, "parsed body");
        Ok(content_length)
    }
}

/// Parses `METHOD SP TARGET SP HTTP/1.1 CRLF` from the front of `data`.
///
/// `Ok(None)` means the line is not terminated yet.
fn parse_request_line(data: &[u8]) -> Result<Option<(RequestLine, usize)>, ParseError> {
    let Some(line_end) = find_crlf(data) else {
        return Ok(None);
    };

    let line = std::str::from_utf8(&data[..line_end])
        .map_err(|_| ParseError::malformed_request_line(String::from_utf8_lossy(&data[..line_end])))?;

    let parts: Vec<&str> = line.split(' ').collect();
    let [method, target, version] = parts[..] else {
        return Err(ParseError::malformed_request_line(line));
    };

    if method.is_empty() || !method.bytes().all(|b| b.is_ascii_uppercase()) {
        return Err(ParseError::invalid_method(method));
    }

    let version_number = match version.split('/').collect::<Vec<_>>()[..] {
        ["HTTP", number] if number == SUPPORTED_VERSION => number,
        _ => {
            return Err(ParseError::unsupported_version(version));
        }
    };

    let request_line = RequestLine {
        method: method.to_string(),
        request_target: target.to_string(),
        http_version: version_number.to_string(),
    };

    Ok(Some((request_line, line_end + 2)))
}

/// Reads one request from `reader`.
///
/// The read buffer starts at `initial_capacity` bytes and doubles whenever it
/// fills up. End of stream before the request is complete is an error, a
/// truncated message is never returned.
pub async fn read_request<R>(reader: &mut R, initial_capacity: usize) -> Result<Request, ParseError>
where
    R: Read + Unpin,
{
    let mut parser = RequestParser::new();
    let mut buf = vec![0u8; initial_capacity.max(1)];
    let mut read_to = 0;

    while !parser.is_done() {
        if read_to >= buf.len() {
            let new_len = buf.len() * 2;
            buf.resize(new_len, 0);
        }

        let n = match reader.read(&mut buf[read_to..]).await {
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };

        if n == 0 {
            return Err(ParseError::IncompleteRequest {
                state: parser.state(),
                buffered: read_to,
            });
        }
        read_to += n;

        let parsed = parser.feed(&buf[..read_to])?;
        buf.copy_within(parsed..read_to, 0);
        read_to -= parsed;
    }

    parser.into_request().ok_or(ParseError::ParseAfterComplete)
}
