use flate2::Compression;
use flate2::write::{DeflateEncoder, GzEncoder};
use std::io::Write;
use std::time::SystemTime;
use tracing::warn;

use crate::config::ServerConfig;
use crate::http::headers::Headers;
use crate::http::request::Request;

/// Content codings this server can produce, named as in `Accept-Encoding`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionAlgorithm {
    Gzip,
    Deflate,
}

impl CompressionAlgorithm {
    pub fn as_str(&self) -> &str {
        match self {
            CompressionAlgorithm::Gzip => "gzip",
            CompressionAlgorithm::Deflate => "deflate",
        }
    }

    /// First coding in the client's list that we support, skipping codings
    /// with a zero quality value.
    pub fn negotiate(accept_encoding: &str) -> Option<Self> {
        accept_encoding.split(',').find_map(|item| {
            let mut params = item.split(';').map(str::trim);
            let coding = params.next()?;
            if params.any(is_zero_quality) {
                return None;
            }
            match coding.to_ascii_lowercase().as_str() {
                "gzip" | "x-gzip" => Some(CompressionAlgorithm::Gzip),
                "deflate" => Some(CompressionAlgorithm::Deflate),
                _ => None,
            }
        })
    }
}

/// `q=0` in any spelling: case-insensitive name, optional spaces around `=`.
fn is_zero_quality(param: &str) -> bool {
    match param.split_once('=') {
        Some((name, value)) if name.trim().eq_ignore_ascii_case("q") => {
            value.trim().parse::<f32>().is_ok_and(|q| q == 0.0)
        }
        _ => false,
    }
}

/// Adds the server-wide headers to a fixed-length response and compresses
/// the body when the client accepts it. `Content-Length` is set to match the
/// returned body.
pub fn decorate(cfg: &ServerConfig, req: &Request, headers: &mut Headers, body: Vec<u8>) -> Vec<u8> {
    headers.replace("Server", &cfg.server_name);
    headers.replace("Date", &httpdate::fmt_http_date(SystemTime::now()));

    let algo = match req.headers.get("accept-encoding") {
        Some(accept) if cfg.compress_responses && !body.is_empty() => {
            CompressionAlgorithm::negotiate(accept)
        }
        _ => None,
    };

    let body = match algo {
        Some(algo) => match compress(&body, algo) {
            Ok(compressed) => {
                headers.replace("Content-Encoding", algo.as_str());
                headers.set("Vary", "Accept-Encoding");
                compressed
            }
            Err(err) => {
                warn!(%err, algorithm = algo.as_str(), "compression failed, sending identity body");
                body
            }
        },
        None => body,
    };

    headers.replace("Content-Length", &body.len().to_string());
    body
}

fn compress(body: &[u8], algo: CompressionAlgorithm) -> std::io::Result<Vec<u8>> {
    match algo {
        CompressionAlgorithm::Gzip => {
            let mut e = GzEncoder::new(Vec::new(), Compression::default());
            e.write_all(body)?;
            e.finish()
        }
        CompressionAlgorithm::Deflate => {
            let mut e = DeflateEncoder::new(Vec::new(), Compression::default());
            e.write_all(body)?;
            e.finish()
        }
    }
}
