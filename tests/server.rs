use async_std::net::TcpStream;
use async_std::prelude::*;
use async_std::task;
use std::time::Duration;
use rawhttp::config::ServerConfig;
use rawhttp::handler::Router;
use rawhttp::net::server::Server;

async fn start() -> Server {
    let cfg = ServerConfig {
        port: 0,
        read_buffer_size: 4,
        chunk_size: 4,
        ..ServerConfig::default()
    };
    Server::serve(cfg, Router).await.unwrap()
}

async fn exchange(server: &Server, fragments: &[&[u8]]) -> String {
    let mut stream = TcpStream::connect(server.local_addr()).await.unwrap();
    for fragment in fragments {
        stream.write_all(fragment).await.unwrap();
        stream.flush().await.unwrap();
    }

    let mut response = Vec::new();
    stream.read_to_end(&mut response).await.unwrap();
    String::from_utf8(response).unwrap()
}

#[async_std::test]
async fn test_fragmented_get() {
    let server = start().await;
    let out = exchange(
        &server,
        &[b"GET / HT", b"TP/1.1\r\nHo", b"st: localhost:42069\r\n", b"\r\n"],
    )
    .await;

    assert!(out.starts_with("HTTP/1.1 200 OK\r\n"), "{out}");
    assert!(out.contains("connection: close\r\n"));
    assert!(out.ends_with("</html>"));

    server.close().await;
}

#[async_std::test]
async fn test_malformed_request_gets_400() {
    let server = start().await;
    let out = exchange(&server, &[b"GET / HTTP/1.1\r\nHost : localhost\r\n"]).await;

    assert!(out.starts_with("HTTP/1.1 400 Bad Request\r\n"), "{out}");
    assert!(out.contains("content-type: text/plain\r\n"));
    assert!(out.contains("no whitespace is allowed between the field name and colon"));

    server.close().await;
}

#[async_std::test]
async fn test_chunked_echo() {
    let server = start().await;
    let out = exchange(
        &server,
        &[b"POST /echo HTTP/1.1\r\nContent-Length: 10\r\n\r\nhello", b" wire"],
    )
    .await;

    assert!(out.starts_with("HTTP/1.1 200 OK\r\n"), "{out}");
    assert!(out.contains("transfer-encoding: chunked\r\n"));
    assert!(out.ends_with("\r\n\r\n4\r\nhell\r\n4\r\no wi\r\n2\r\nre\r\n0\r\n\r\n"), "{out}");

    server.close().await;
}

#[async_std::test]
async fn test_handler_error_before_write() {
    let server = start().await;
    let out = exchange(&server, &[b"GET /stream/nope HTTP/1.1\r\n\r\n"]).await;

    assert!(out.starts_with("HTTP/1.1 400 Bad Request\r\n"), "{out}");
    assert!(out.ends_with("invalid line count: \"nope\""));

    server.close().await;
}

#[async_std::test]
async fn test_huge_malformed_line_gets_bounded_400() {
    let server = start().await;
    let line = format!("GET /{} HTTP/1.1 extra\r\n", "a".repeat(200_000));
    let out = exchange(&server, &[line.as_bytes()]).await;

    assert!(out.starts_with("HTTP/1.1 400 Bad Request\r\n"), "{}", &out[..out.len().min(200)]);
    assert!(out.contains("malformed request line"));
    assert!(out.len() < 512, "{} bytes", out.len());

    server.close().await;
}

#[async_std::test]
async fn test_in_flight_request_completes_after_close() {
    let server = start().await;
    let mut stream = TcpStream::connect(server.local_addr()).await.unwrap();
    stream.write_all(b"GET / HTT").await.unwrap();
    stream.flush().await.unwrap();

    // let the accept loop pick the connection up before the flag flips
    task::sleep(Duration::from_millis(200)).await;
    server.close().await;

    stream.write_all(b"P/1.1\r\n\r\n").await.unwrap();
    let mut response = Vec::new();
    stream.read_to_end(&mut response).await.unwrap();
    let out = String::from_utf8(response).unwrap();

    assert!(out.starts_with("HTTP/1.1 200 OK\r\n"), "{out}");
    assert!(out.ends_with("</html>"));
}

#[async_std::test]
async fn test_server_config_drives_responses() {
    let cfg = ServerConfig {
        port: 0,
        server_name: "edge/9".to_string(),
        compress_responses: false,
        ..ServerConfig::default()
    };
    let server = Server::serve(cfg, Router).await.unwrap();
    let out = exchange(&server, &[b"GET / HTTP/1.1\r\nAccept-Encoding: gzip\r\n\r\n"]).await;

    assert!(out.contains("server: edge/9\r\n"), "{out}");
    assert!(!out.contains("content-encoding"), "{out}");
    assert!(out.ends_with("</html>"));

    server.close().await;
}

#[async_std::test]
async fn test_closed_server_rejects_new_work() {
    let server = start().await;
    let addr = server.local_addr();
    server.close().await;

    // the listener is gone once the accept loop returned
    assert!(TcpStream::connect(addr).await.is_err());
}
