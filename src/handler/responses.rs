use async_std::io::Write;

use crate::config::ServerConfig;
use crate::handler::HandlerError;
use crate::handler::middleware;
use crate::http::request::Request;
use crate::http::response::{ResponseWriter, default_headers};
use crate::http::status::StatusCode;

const OK_HTML: &str = r#"<html>
  <head>
    <title>200 OK</title>
  </head>
  <body>
    <h1>Success!</h1>
    <p>Your request was parsed and answered.</p>
  </body>
</html>"#;

const BAD_REQUEST_HTML: &str = r#"<html>
  <head>
    <title>400 Bad Request</title>
  </head>
  <body>
    <h1>Bad Request</h1>
    <p>The problem is on your side of the wire.</p>
  </body>
</html>"#;

const INTERNAL_ERROR_HTML: &str = r#"<html>
  <head>
    <title>500 Internal Server Error</title>
  </head>
  <body>
    <h1>Internal Server Error</h1>
    <p>The problem is on our side of the wire.</p>
  </body>
</html>"#;

pub async fn ok<S>(cfg: &ServerConfig, writer: &mut ResponseWriter<S>, req: &Request) -> Result<(), HandlerError>
where
    S: Write + Unpin + Send,
{
    send_html(cfg, writer, req, StatusCode::Ok, OK_HTML).await
}

pub async fn bad_request<S>(cfg: &ServerConfig, writer: &mut ResponseWriter<S>, req: &Request) -> Result<(), HandlerError>
where
    S: Write + Unpin + Send,
{
    send_html(cfg, writer, req, StatusCode::BadRequest, BAD_REQUEST_HTML).await
}

pub async fn internal_server_error<S>(
    cfg: &ServerConfig,
    writer: &mut ResponseWriter<S>,
    req: &Request,
) -> Result<(), HandlerError>
where
    S: Write + Unpin + Send,
{
    send_html(cfg, writer, req, StatusCode::InternalServerError, INTERNAL_ERROR_HTML).await
}

async fn send_html<S>(
    cfg: &ServerConfig,
    writer: &mut ResponseWriter<S>,
    req: &Request,
    status: StatusCode,
    html: &str,
) -> Result<(), HandlerError>
where
    S: Write + Unpin + Send,
{
    let mut headers = default_headers(html.len());
    headers.replace("Content-Type", "text/html");
    let body = middleware::decorate(cfg, req, &mut headers, html.as_bytes().to_vec());

    writer.write_status_line(status).await?;
    writer.write_headers(&headers).await?;
    writer.write_body(&body).await?;
    Ok(())
}
