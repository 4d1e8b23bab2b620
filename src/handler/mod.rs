//! Request handlers driven by the [`Server`](crate::net::server::Server).
//!
//! A handler receives the serving [`ServerConfig`], the parsed [`Request`] and
//! a [`ResponseWriter`] bound to the connection, and writes the whole response
//! itself. Returning a
//! [`HandlerError`] before anything was written lets the server render it as
//! a plain text response instead.

pub mod middleware;
pub mod responses;
pub mod router;

use async_std::io::Write;
use async_trait::async_trait;
use thiserror::Error;

use crate::config::ServerConfig;
use crate::http::error::WriteError;
use crate::http::request::Request;
use crate::http::response::{ResponseWriter, default_headers};
use crate::http::status::StatusCode;

pub use router::Router;

#[async_trait]
pub trait Handler: Send + Sync + 'static {
    async fn handle<S>(
        &self,
        cfg: &ServerConfig,
        writer: &mut ResponseWriter<S>,
        req: &Request,
    ) -> Result<(), HandlerError>
    where
        S: Write + Unpin + Send;
}

#[derive(Error, Debug)]
#[error("{} {}: {message}", .status.as_u16(), .status.reason())]
pub struct HandlerError {
    pub status: StatusCode,
    pub message: String,
}

impl HandlerError {
    pub fn new<S: ToString>(status: StatusCode, message: S) -> Self {
        Self {
            status,
            message: message.to_string(),
        }
    }

    pub fn bad_request<S: ToString>(message: S) -> Self {
        Self::new(StatusCode::BadRequest, message)
    }

    pub fn internal<S: ToString>(message: S) -> Self {
        Self::new(StatusCode::InternalServerError, message)
    }

    /// Writes this error as a complete `text/plain` response.
    pub async fn write_to<S>(&self, writer: &mut ResponseWriter<S>) -> Result<(), WriteError>
    where
        S: Write + Unpin,
    {
        writer.write_status_line(self.status).await?;
        writer.write_headers(&default_headers(self.message.len())).await?;
        writer.write_body(self.message.as_bytes()).await?;
        Ok(())
    }
}

impl From<WriteError> for HandlerError {
    fn from(err: WriteError) -> Self {
        Self::internal(err)
    }
}
