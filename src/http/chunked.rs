//! Chunked transfer encoding for [`ResponseWriter`].
//!
//! Each chunk goes out as `<size in lowercase hex>\r\n<bytes>\r\n`. The body
//! is closed with `0\r\n`, after which the trailer section (possibly empty) and
//! its blank-line terminator complete the message.

use async_std::io::{Read, ReadExt, Write};
use tracing::debug;

use crate::http::CRLF;
use crate::http::error::WriteError;
use crate::http::headers::Headers;
use crate::http::response::{ResponseWriter, WriterState};

const LAST_CHUNK: &[u8] = b"0\r\n";

impl<W: Write + Unpin> ResponseWriter<W> {
    /// Writes one chunk and stays in the body stage.
    ///
    /// An empty `data` writes nothing, since a zero-size chunk would end the
    /// body; use [`write_chunked_body_done`](Self::write_chunked_body_done) for that.
    pub async fn write_chunked_body(&mut self, data: &[u8]) -> Result<usize, WriteError> {
        self.expect_state(WriterState::WritingBody, "write chunked body")?;

        if data.is_empty() {
            return Ok(0);
        }

        let size_line = format!("{:x}\r\n", data.len());
        let mut chunk = Vec::with_capacity(size_line.len() + data.len() + CRLF.len());
        chunk.extend_from_slice(size_line.as_bytes());
        chunk.extend_from_slice(data);
        chunk.extend_from_slice(CRLF);

        self.write_all_once(&chunk).await
    }

    pub async fn write_chunked_body_done(&mut self) -> Result<(), WriteError> {
        self.expect_state(WriterState::WritingBody, "end chunked body")?;

        self.write_all_once(LAST_CHUNK).await?;

        self.state = WriterState::WritingTrailers;
        Ok(())
    }

    /// Writes the trailer fields and the final blank line. An empty collection
    /// only writes the terminator.
    pub async fn write_trailers(&mut self, trailers: &Headers) -> Result<(), WriteError> {
        self.expect_state(WriterState::WritingTrailers, "write trailers")?;

        let mut block = trailers.stringify().into_bytes();
        block.extend_from_slice(CRLF);
        self.write_all_once(&block).await?;

        self.state = WriterState::Done;
        Ok(())
    }

    /// Streams `reader` to the sink as chunks until end of data, then writes
    /// the last chunk. Returns the number of body bytes forwarded.
    ///
    /// A read error is returned as is and the body is left unterminated.
    pub async fn write_chunked_body_from_reader<R>(&mut self, reader: &mut R) -> Result<usize, WriteError>
    where
        R: Read + Unpin,
    {
        self.expect_state(WriterState::WritingBody, "write chunked body")?;

        let mut scratch = vec![0u8; self.chunk_size];
        let mut forwarded = 0;

        loop {
            let n = match reader.read(&mut scratch).await {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };

            self.write_chunked_body(&scratch[..n]).await?;
            forwarded += n;
        }

        debug!(bytes = forwarded, "chunked body streamed");
        self.write_chunked_body_done().await?;
        Ok(forwarded)
    }
}
