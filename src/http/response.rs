//! Staged HTTP/1.1 response writer.
//!
//! A [`ResponseWriter`] is bound to one sink for one message and only accepts
//! writes in protocol order:
//!
//! ```text
//! status line -> headers -> body -> done
//!                           body (chunked)* -> chunked done -> trailers -> done
//! ```
//!
//! Calling an operation in the wrong stage fails with
//! [`WriteError::InvalidState`] before anything reaches the sink. A partial
//! write from the sink is reported as [`WriteError::ShortWrite`]; the writer
//! does not retry. After any error the response is unusable.
//!
//! The chunked operations live in [`chunked`](crate::http::chunked).

use async_std::io::{Write, WriteExt};

use crate::http::CRLF;
use crate::http::error::WriteError;
use crate::http::headers::Headers;
use crate::http::status::StatusCode;

pub(crate) const DEFAULT_CHUNK_SIZE: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriterState {
    WritingStatusLine,
    WritingHeaders,
    WritingBody,
    WritingTrailers,
    Done,
}

pub struct ResponseWriter<W> {
    pub(crate) writer: W,
    pub(crate) state: WriterState,
    pub(crate) chunk_size: usize,
}

impl<W> ResponseWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            state: WriterState::WritingStatusLine,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Scratch buffer size used by
    /// [`write_chunked_body_from_reader`](ResponseWriter::write_chunked_body_from_reader).
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub fn state(&self) -> WriterState {
        self.state
    }

    pub fn is_done(&self) -> bool {
        self.state == WriterState::Done
    }

    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    pub(crate) fn expect_state(&self, expected: WriterState, operation: &'static str) -> Result<(), WriteError> {
        if self.state != expected {
            return Err(WriteError::invalid_state(operation, self.state));
        }
        Ok(())
    }
}

impl<W: Write + Unpin> ResponseWriter<W> {
    /// Writes `data` with a single sink write; anything short of the full
    /// length is an error.
    pub(crate) async fn write_all_once(&mut self, data: &[u8]) -> Result<usize, WriteError> {
        let written = self.writer.write(data).await?;
        if written != data.len() {
            return Err(WriteError::ShortWrite {
                written,
                expected: data.len(),
            });
        }
        Ok(written)
    }

    /// Accepts a [`StatusCode`] or a raw code; raw codes outside the closed
    /// set fail with [`WriteError::UnknownStatusCode`].
    pub async fn write_status_line(&mut self, code: impl Into<u16>) -> Result<(), WriteError> {
        self.expect_state(WriterState::WritingStatusLine, "write status line")?;

        let status = StatusCode::try_from(code.into())?;
        self.write_all_once(status.status_line().as_bytes()).await?;

        self.state = WriterState::WritingHeaders;
        Ok(())
    }

    pub async fn write_headers(&mut self, headers: &Headers) -> Result<(), WriteError> {
        self.expect_state(WriterState::WritingHeaders, "write headers")?;

        let mut block = headers.stringify().into_bytes();
        block.extend_from_slice(CRLF);
        self.write_all_once(&block).await?;

        self.state = WriterState::WritingBody;
        Ok(())
    }

    /// Writes a fixed-length body. The caller is responsible for a matching
    /// `Content-Length` header.
    pub async fn write_body(&mut self, body: &[u8]) -> Result<usize, WriteError> {
        self.expect_state(WriterState::WritingBody, "write body")?;

        let n = self.write_all_once(body).await?;

        self.state = WriterState::Done;
        Ok(n)
    }

    pub async fn flush(&mut self) -> Result<(), WriteError> {
        self.writer.flush().await?;
        Ok(())
    }
}

/// Headers for a fixed-length plain text response.
pub fn default_headers(content_len: usize) -> Headers {
    let mut headers = Headers::new();
    headers.set("Content-Length", &content_len.to_string());
    headers.set("Connection", "close");
    headers.set("Content-Type", "text/plain");
    headers
}

/// Headers for a chunked response; no `Content-Length`.
pub fn chunked_headers() -> Headers {
    let mut headers = Headers::new();
    headers.set("Transfer-Encoding", "chunked");
    headers.set("Connection", "close");
    headers.set("Content-Type", "text/plain");
    headers
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::pin::Pin;
    use std::task::{Context, Poll};

    /// Sink that accepts at most `limit` bytes per write.
    struct ShortSink {
        limit: usize,
        data: Vec<u8>,
    }

    impl Write for ShortSink {
        fn poll_write(mut self: Pin<&mut Self>, _cx: &mut Context<'_>, buf: &[u8]) -> Poll<io::Result<usize>> {
            let n = buf.len().min(self.limit);
            self.data.extend_from_slice(&buf[..n]);
            Poll::Ready(Ok(n))
        }

        fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }

        fn poll_close(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }
    }

    #[async_std::test]
    async fn test_fixed_length_response() {
        let mut writer = ResponseWriter::new(Vec::new());
        writer.write_status_line(StatusCode::Ok).await.unwrap();
        writer.write_headers(&default_headers(5)).await.unwrap();
        let n = writer.write_body(b"hello").await.unwrap();

        assert_eq!(n, 5);
        assert!(writer.is_done());
        assert_eq!(
            writer.into_inner(),
            b"HTTP/1.1 200 OK\r\ncontent-length: 5\r\nconnection: close\r\ncontent-type: text/plain\r\n\r\nhello"
        );
    }

    #[async_std::test]
    async fn test_raw_status_codes() {
        let mut writer = ResponseWriter::new(Vec::new());
        writer.write_status_line(500u16).await.unwrap();
        assert_eq!(writer.get_ref(), b"HTTP/1.1 500 Internal Server Error\r\n");

        let mut writer = ResponseWriter::new(Vec::new());
        let err = writer.write_status_line(418u16).await.unwrap_err();
        assert!(matches!(err, WriteError::UnknownStatusCode(418)));
        assert_eq!(writer.state(), WriterState::WritingStatusLine);
        assert!(writer.get_ref().is_empty());
    }

    #[async_std::test]
    async fn test_body_before_headers_is_rejected() {
        let mut writer = ResponseWriter::new(Vec::new());
        writer.write_status_line(StatusCode::BadRequest).await.unwrap();
        let written = writer.get_ref().len();

        let err = writer.write_body(b"oops").await.unwrap_err();
        assert!(matches!(
            err,
            WriteError::InvalidState { state: WriterState::WritingHeaders, .. }
        ));
        assert_eq!(writer.get_ref().len(), written);
    }

    #[async_std::test]
    async fn test_status_line_twice_is_rejected() {
        let mut writer = ResponseWriter::new(Vec::new());
        writer.write_status_line(StatusCode::Ok).await.unwrap();

        let err = writer.write_status_line(StatusCode::Ok).await.unwrap_err();
        assert!(matches!(err, WriteError::InvalidState { .. }));
    }

    #[async_std::test]
    async fn test_done_is_stable() {
        let mut writer = ResponseWriter::new(Vec::new());
        writer.write_status_line(StatusCode::Ok).await.unwrap();
        writer.write_headers(&Headers::new()).await.unwrap();
        writer.write_body(b"").await.unwrap();

        assert!(writer.is_done());
        assert!(writer.is_done());
        assert!(writer.write_body(b"more").await.is_err());
        assert!(writer.write_headers(&Headers::new()).await.is_err());
        assert!(writer.is_done());
        assert_eq!(writer.get_ref(), b"HTTP/1.1 200 OK\r\n\r\n");
    }

    #[async_std::test]
    async fn test_short_write_is_an_error() {
        let sink = ShortSink { limit: 4, data: Vec::new() };
        let mut writer = ResponseWriter::new(sink);

        let err = writer.write_status_line(StatusCode::Ok).await.unwrap_err();
        assert!(matches!(err, WriteError::ShortWrite { written: 4, expected: 17 }));
        assert_eq!(writer.state(), WriterState::WritingStatusLine);
    }
}
