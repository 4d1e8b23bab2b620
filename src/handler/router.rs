use async_std::io::Write;
use async_trait::async_trait;
use flate2::Crc;

use crate::config::ServerConfig;
use crate::handler::{Handler, HandlerError, responses};
use crate::http::headers::Headers;
use crate::http::request::Request;
use crate::http::response::{ResponseWriter, chunked_headers};
use crate::http::status::StatusCode;

const MAX_STREAM_LINES: usize = 100;

/// The bundled demo routes.
#[derive(Debug, Clone, Copy, Default)]
pub struct Router;

#[async_trait]
impl Handler for Router {
    async fn handle<S>(
        &self,
        cfg: &ServerConfig,
        writer: &mut ResponseWriter<S>,
        req: &Request,
    ) -> Result<(), HandlerError>
    where
        S: Write + Unpin + Send,
    {
        let target = req.target();

        if target == "/yourproblem" {
            return responses::bad_request(cfg, writer, req).await;
        }
        if target == "/myproblem" {
            return responses::internal_server_error(cfg, writer, req).await;
        }
        if target == "/echo" {
            return echo(writer, req).await;
        }
        if let Some(count) = target.strip_prefix("/stream/") {
            return stream(writer, count).await;
        }

        responses::ok(cfg, writer, req).await
    }
}

/// Sends `count` generated lines as one chunk each, followed by length and
/// checksum trailers.
async fn stream<S>(writer: &mut ResponseWriter<S>, count: &str) -> Result<(), HandlerError>
where
    S: Write + Unpin + Send,
{
    let count: usize = count
        .parse()
        .map_err(|_| HandlerError::bad_request(format!("invalid line count: {count:?}")))?;
    if count > MAX_STREAM_LINES {
        return Err(HandlerError::bad_request(format!(
            "line count {count} exceeds {MAX_STREAM_LINES}"
        )));
    }

    let mut headers = chunked_headers();
    headers.set("Trailer", "X-Content-Length, X-Content-Crc32");

    writer.write_status_line(StatusCode::Ok).await?;
    writer.write_headers(&headers).await?;

    let mut crc = Crc::new();
    for i in 0..count {
        let line = format!("{{\"line\": {i}}}\n");
        crc.update(line.as_bytes());
        writer.write_chunked_body(line.as_bytes()).await?;
    }
    writer.write_chunked_body_done().await?;

    let mut trailers = Headers::new();
    trailers.set("X-Content-Length", &crc.amount().to_string());
    trailers.set("X-Content-Crc32", &format!("{:08x}", crc.sum()));
    writer.write_trailers(&trailers).await?;
    Ok(())
}

/// Streams the request body back as a chunked response.
async fn echo<S>(writer: &mut ResponseWriter<S>, req: &Request) -> Result<(), HandlerError>
where
    S: Write + Unpin + Send,
{
    let mut headers = chunked_headers();
    if let Some(content_type) = req.headers.get("content-type") {
        headers.replace("Content-Type", content_type);
    }

    writer.write_status_line(StatusCode::Ok).await?;
    writer.write_headers(&headers).await?;

    let mut body: &[u8] = &req.body;
    writer.write_chunked_body_from_reader(&mut body).await?;
    writer.write_trailers(&Headers::new()).await?;
    Ok(())
}
