//! Minimal HTTP/1.1 server for integration tests.
//!
//! Answers every request with the same status and body and counts the
//! requests it has seen, so tests can assert that no network access happened.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

/// A running test server. It lives until the test process exits.
pub struct TestServer {
    /// URL of the served archive, e.g. `http://127.0.0.1:12345/td_linux.tar.gz`.
    pub url: String,
    hits: Arc<AtomicUsize>,
}

impl TestServer {
    /// Number of requests received so far.
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

/// Serves `body` with `200 OK`.
pub fn serve(body: Vec<u8>) -> TestServer {
    serve_with_status(200, "OK", body)
}

/// Serves `body` with the given status line.
pub fn serve_with_status(code: u16, reason: &'static str, body: Vec<u8>) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().expect("local addr").port();
    let body = Arc::new(body);
    let hits = Arc::new(AtomicUsize::new(0));

    let server_hits = Arc::clone(&hits);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            server_hits.fetch_add(1, Ordering::SeqCst);
            let body = Arc::clone(&body);
            thread::spawn(move || handle(stream, code, reason, &body));
        }
    });

    TestServer {
        url: format!("http://127.0.0.1:{port}/td_linux.tar.gz"),
        hits,
    }
}

fn handle(mut stream: TcpStream, code: u16, reason: &str, body: &[u8]) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(5)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(5)));

    if !read_request_head(&mut stream) {
        return;
    }

    let head = format!(
        "HTTP/1.1 {code} {reason}\r\nContent-Length: {}\r\nContent-Type: application/gzip\r\nConnection: close\r\n\r\n",
        body.len()
    );
    let _ = stream.write_all(head.as_bytes());
    let _ = stream.write_all(body);
    let _ = stream.flush();
}

/// Reads until the blank line that ends the request head.
fn read_request_head(stream: &mut TcpStream) -> bool {
    let mut request = Vec::new();
    let mut buf = [0u8; 1024];
    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut buf) {
            Ok(0) | Err(_) => return false,
            Ok(n) => request.extend_from_slice(&buf[..n]),
        }
    }
    true
}
