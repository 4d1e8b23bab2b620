//! HTTP/1.1 message framing from raw bytes, with a small async-std server
//! around it.
//!
//! - [`http`]: header collection, incremental request parser, staged
//!   response writer with chunked encoding and trailers
//! - [`net`]: connection driver, one task per connection
//! - [`handler`]: the handler trait and the bundled demo routes
//! - [`config`]: server configuration

pub mod config;
pub mod handler;
pub mod http;
pub mod net;
