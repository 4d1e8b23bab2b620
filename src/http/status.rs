use crate::http::error::WriteError;

/// The closed set of status codes the [`ResponseWriter`](crate::http::response::ResponseWriter)
/// knows how to emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    Ok = 200,
    BadRequest = 400,
    InternalServerError = 500,
}

impl StatusCode {
    pub fn as_u16(self) -> u16 {
        self as u16
    }

    pub fn reason(self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::InternalServerError => "Internal Server Error",
        }
    }

    /// Full status line including the trailing CRLF.
    pub fn status_line(self) -> &'static str {
        match self {
            StatusCode::Ok => "HTTP/1.1 200 OK\r\n",
            StatusCode::BadRequest => "HTTP/1.1 400 Bad Request\r\n",
            StatusCode::InternalServerError => "HTTP/1.1 500 Internal Server Error\r\n",
        }
    }
}

impl From<StatusCode> for u16 {
    fn from(status: StatusCode) -> Self {
        status.as_u16()
    }
}

impl TryFrom<u16> for StatusCode {
    type Error = WriteError;

    fn try_from(code: u16) -> Result<Self, Self::Error> {
        match code {
            200 => Ok(StatusCode::Ok),
            400 => Ok(StatusCode::BadRequest),
            500 => Ok(StatusCode::InternalServerError),
            other => Err(WriteError::UnknownStatusCode(other)),
        }
    }
}
