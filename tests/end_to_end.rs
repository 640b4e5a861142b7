//! Both services over real loopback sockets.

use std::net::SocketAddr;

use pretty_assertions::assert_eq;
use revproxy::{FileServer, Proxy, ProxyConfig, ServerConfig};
use tempfile::TempDir;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{TcpListener, TcpStream},
};

async fn start_backend(root: &TempDir) -> SocketAddr {
    let server = FileServer::bind(ServerConfig {
        listen: "127.0.0.1:0".parse().unwrap(),
        root: root.path().to_path_buf(),
        ..Default::default()
    })
    .await
    .unwrap();
    let addr = server.local_addr().unwrap();
    tokio::spawn(server.run());
    addr
}

async fn start_proxy(backend: SocketAddr) -> SocketAddr {
    let proxy = Proxy::bind(ProxyConfig {
        listen: "127.0.0.1:0".parse().unwrap(),
        backend,
        ..Default::default()
    })
    .await
    .unwrap();
    let addr = proxy.local_addr().unwrap();
    tokio::spawn(proxy.run());
    addr
}

async fn send(addr: SocketAddr, request: &[u8]) -> Vec<u8> {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(request).await.unwrap();

    let mut response = Vec::new();
    stream.read_to_end(&mut response).await.unwrap();
    response
}

fn upload_request(boundary: &str, filename: &str, content: &str) -> Vec<u8> {
    let body = format!(
        "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\nContent-Type: text/plain\r\n\r\n{content}\r\n--{boundary}--\r\n"
    );
    format!(
        "POST /upload HTTP/1.1\r\nHost: localhost\r\nContent-Type: multipart/form-data; boundary={boundary}\r\nContent-Length: {}\r\n\r\n{body}",
        body.len()
    )
    .into_bytes()
}

fn document_root() -> TempDir {
    let root = TempDir::new().unwrap();
    std::fs::write(root.path().join("index.html"), "<h1>hi</h1>\n").unwrap();
    root
}

#[tokio::test]
async fn get_index() {
    let root = document_root();
    let backend = start_backend(&root).await;

    let response = send(backend, b"GET /index.html HTTP/1.1\r\nHost: localhost\r\n\r\n").await;

    assert_eq!(
        String::from_utf8(response).unwrap(),
        "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: 12\r\n\r\n<h1>hi</h1>\n"
    );
}

#[tokio::test]
async fn traversal_is_forbidden() {
    let root = document_root();
    let backend = start_backend(&root).await;

    let response = send(backend, b"GET /../../etc/passwd HTTP/1.1\r\n\r\n").await;

    assert!(response.starts_with(b"HTTP/1.1 403 Forbidden\r\n"));
}

#[tokio::test]
async fn upload_then_download() {
    let root = document_root();
    let backend = start_backend(&root).await;

    let response = send(backend, &upload_request("X", "a.txt", "hello")).await;
    assert!(response.starts_with(b"HTTP/1.1 200 OK\r\n"));

    let response = send(backend, b"GET /a.txt HTTP/1.1\r\n\r\n").await;
    assert_eq!(
        String::from_utf8(response).unwrap(),
        "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: 5\r\n\r\nhello"
    );
}

#[tokio::test]
async fn upload_with_traversal_filename_is_refused() {
    let root = TempDir::new().unwrap();
    let www = root.path().join("www");
    std::fs::create_dir(&www).unwrap();

    let server = FileServer::bind(ServerConfig {
        listen: "127.0.0.1:0".parse().unwrap(),
        root: www,
        ..Default::default()
    })
    .await
    .unwrap();
    let backend = server.local_addr().unwrap();
    tokio::spawn(server.run());

    let response = send(backend, &upload_request("X", "../evil", "pwned")).await;

    assert!(response.starts_with(b"HTTP/1.1 403 Forbidden\r\n"));
    assert!(!root.path().join("evil").exists());
}

#[tokio::test]
async fn proxy_echoes_raw_bytes() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let echo = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = [0u8; 5];
        socket.read_exact(&mut buf).await.unwrap();
        socket.write_all(&buf).await.unwrap();
    });

    let proxy = start_proxy(echo).await;
    let mut client = TcpStream::connect(proxy).await.unwrap();
    client.write_all(&[0, 1, 2, 0xfe, 0xff]).await.unwrap();

    let mut echoed = [0u8; 5];
    client.read_exact(&mut echoed).await.unwrap();
    assert_eq!(echoed, [0, 1, 2, 0xfe, 0xff]);
}

#[tokio::test]
async fn proxy_in_front_of_backend() {
    let root = document_root();
    let backend = start_backend(&root).await;
    let proxy = start_proxy(backend).await;

    let direct = send(backend, b"GET /index.html HTTP/1.1\r\n\r\n").await;
    let proxied = send(proxy, b"GET /index.html HTTP/1.1\r\n\r\n").await;
    assert_eq!(proxied, direct);

    let response = send(proxy, &upload_request("boundary42", "b.txt", "via proxy")).await;
    assert!(response.starts_with(b"HTTP/1.1 200 OK\r\n"));
    assert_eq!(
        std::fs::read_to_string(root.path().join("b.txt")).unwrap(),
        "via proxy"
    );

    let listing = send(proxy, b"GET /list HTTP/1.1\r\n\r\n").await;
    assert!(listing.ends_with(b"\r\n\r\nb.txt\nindex.html\n"));
}

#[tokio::test]
async fn server_survives_bad_clients() {
    let root = document_root();
    let backend = start_backend(&root).await;

    // Connect and hang up without sending anything.
    drop(TcpStream::connect(backend).await.unwrap());

    // An unterminated request is answered once the client half-closes.
    let mut stream = TcpStream::connect(backend).await.unwrap();
    stream.write_all(b"NOT A REQUEST").await.unwrap();
    stream.shutdown().await.unwrap();
    let mut response = Vec::new();
    stream.read_to_end(&mut response).await.unwrap();
    assert!(response.starts_with(b"HTTP/1.1 400 Bad Request\r\n"));

    let response = send(backend, b"GET /index.html HTTP/1.1\r\n\r\n").await;
    assert!(response.starts_with(b"HTTP/1.1 200 OK\r\n"));
}
