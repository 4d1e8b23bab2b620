//! Connection driver.
//!
//! This module owns the networking side of the server:
//! - binding the listener and accepting TCP connections,
//! - pumping raw bytes from each connection into the request parser,
//! - handing the parsed request and a response writer to the handler,
//! - closing the connection once the response is written.
//!
//! Framing lives in [`http`](crate::http) and response content in
//! [`handler`](crate::handler). Every connection gets its own task, parser
//! and writer; tasks share nothing but the handler and the closed flag.
//!
//! ## Request handling flow
//!
//! 1. Accept a TCP connection
//! 2. Read and incrementally parse one request
//!    (delegated to [`read_request`](crate::http::parser::read_request))
//! 3. Answer malformed requests with `400 Bad Request`
//! 4. Run the [`Handler`] against a [`ResponseWriter`] over the stream
//! 5. Flush and shut the connection down, there is no keep-alive
//!
//! There is no read or write timeout: a peer that never finishes its message
//! keeps its task waiting.

use async_std::net::{TcpListener, TcpStream};
use async_std::prelude::*;
use async_std::task::{self, JoinHandle};
use std::io;
use std::net::{Shutdown, SocketAddr};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, error, info, warn};

use crate::config::ServerConfig;
use crate::handler::{Handler, HandlerError};
use crate::http::parser::read_request;
use crate::http::response::{ResponseWriter, WriterState};

pub struct Server {
    local_addr: SocketAddr,
    closed: Arc<AtomicBool>,
    accept_task: JoinHandle<()>,
}

impl Server {
    /// Binds the configured address and starts accepting connections in a
    /// background task.
    pub async fn serve<H: Handler>(cfg: ServerConfig, handler: H) -> io::Result<Server> {
        let listener = TcpListener::bind((cfg.address, cfg.port)).await?;
        let local_addr = listener.local_addr()?;
        let closed = Arc::new(AtomicBool::new(false));

        info!(%local_addr, "listening");
        let accept_task = task::spawn(Self::listen(
            listener,
            Arc::new(cfg),
            Arc::new(handler),
            Arc::clone(&closed),
        ));

        Ok(Server {
            local_addr,
            closed,
            accept_task,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stops accepting connections and waits for the accept loop to exit.
    /// Connections already being served run to completion.
    pub async fn close(self) {
        self.closed.store(true, Ordering::SeqCst);
        // wake the accept loop so it observes the flag
        if let Err(err) = TcpStream::connect(self.local_addr).await {
            debug!(%err, "wake-up connection failed");
        }
        self.accept_task.await;
        info!(local_addr = %self.local_addr, "server closed");
    }

    /// Waits for the accept loop, which only ends after [`Server::close`].
    pub async fn wait(self) {
        self.accept_task.await
    }

    async fn listen<H: Handler>(
        listener: TcpListener,
        cfg: Arc<ServerConfig>,
        handler: Arc<H>,
        closed: Arc<AtomicBool>,
    ) {
        let mut incoming = listener.incoming();

        while let Some(stream) = incoming.next().await {
            if closed.load(Ordering::SeqCst) {
                break;
            }

            match stream {
                Ok(stream) => {
                    task::spawn(Self::handle_client(stream, Arc::clone(&cfg), Arc::clone(&handler)));
                }
                Err(err) => warn!(%err, "failed to accept connection"),
            }
        }
    }

    /// Serves one request on `stream`, then closes it.
    async fn handle_client<H: Handler>(mut stream: TcpStream, cfg: Arc<ServerConfig>, handler: Arc<H>) {
        let peer = stream.peer_addr().ok();

        let req = match read_request(&mut stream, cfg.read_buffer_size).await {
            Ok(req) => req,
            Err(err) if err.is_transport() => {
                warn!(?peer, %err, "failed to read request");
                return;
            }
            Err(err) => {
                warn!(?peer, %err, "malformed request");
                let mut writer = ResponseWriter::new(stream);
                if let Err(err) = HandlerError::bad_request(err).write_to(&mut writer).await {
                    error!(?peer, %err, "failed to write error response");
                }
                Self::finish(writer).await;
                return;
            }
        };

        info!(?peer, method = req.method(), target = req.target(), "request");

        let mut writer = ResponseWriter::new(stream).with_chunk_size(cfg.chunk_size);
        match handler.handle(&cfg, &mut writer, &req).await {
            Ok(()) if !writer.is_done() => {
                warn!(?peer, state = ?writer.state(), "handler left the response incomplete");
            }
            Ok(()) => {}
            Err(err) if writer.state() == WriterState::WritingStatusLine => {
                warn!(?peer, %err, "handler failed");
                if let Err(err) = err.write_to(&mut writer).await {
                    error!(?peer, %err, "failed to write error response");
                }
            }
            Err(err) => {
                error!(?peer, %err, state = ?writer.state(), "handler failed mid-response");
            }
        }

        Self::finish(writer).await;
    }

    async fn finish(mut writer: ResponseWriter<TcpStream>) {
        if let Err(err) = writer.flush().await {
            debug!(%err, "flush failed");
        }
        if let Err(err) = writer.into_inner().shutdown(Shutdown::Both) {
            debug!(%err, "shutdown failed");
        }
    }
}
