//! Common test utilities for integration tests.
//!
//! This module provides shared helper functions and re-exports commonly used
//! types for testing the Humio client. All integration tests should use
//! these utilities to ensure consistency.
//!
//! # Invariants
//! - Fixtures are loaded from the `fixtures/` directory relative to the crate root
//! - Clients built here poll every 10ms so job tests finish quickly
//!
//! # What this does NOT handle
//! - Test-specific assertions or test logic

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::FutureExt;
use humio_client::endpoints::SleepFn;
use secrecy::SecretString;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

// Re-export test utilities from humio-client
#[allow(unused_imports)]
pub use humio_client::testing::{load_fixture, load_text_fixture};

// Re-export commonly used types for test convenience
#[allow(unused_imports)]
pub use humio_client::{ClientError, HumioClient, SearchRequest, endpoints};
#[allow(unused_imports)]
pub use humio_config::{SearchSettings, SearchStrategy};
#[allow(unused_imports)]
pub use reqwest::Client;
#[allow(unused_imports)]
pub use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TEST_TOKEN: &str = "test-token";

/// Search settings with a 10ms poll interval.
#[allow(dead_code)]
pub fn fast_settings() -> SearchSettings {
    SearchSettings {
        poll_interval: Duration::from_millis(10),
        request_timeout: Duration::from_secs(5),
        stream_timeout: Duration::from_secs(5),
        ..SearchSettings::default()
    }
}

/// Build a client against `base_url` whose retry waits are recorded, not slept.
#[allow(dead_code)]
pub fn test_client(base_url: &str, settings: SearchSettings) -> (HumioClient, RecordingSleep) {
    let sleep = RecordingSleep::default();
    let client = HumioClient::builder()
        .cluster_name("test")
        .base_url(base_url)
        .token(SecretString::new(TEST_TOKEN.to_string().into()))
        .search_settings(settings)
        .stream_sleep(sleep.hook())
        .build()
        .expect("test client should build");
    (client, sleep)
}

/// A plain client whose reads time out after `read_timeout`, as the
/// streaming endpoint expects.
#[allow(dead_code)]
pub fn stream_client(read_timeout: Duration) -> Client {
    Client::builder()
        .read_timeout(read_timeout)
        .build()
        .expect("stream client should build")
}

/// Sleep hook that records requested durations and returns immediately.
#[derive(Clone, Default)]
pub struct RecordingSleep {
    waits: Arc<Mutex<Vec<Duration>>>,
}

#[allow(dead_code)]
impl RecordingSleep {
    pub fn hook(&self) -> SleepFn {
        let waits = self.waits.clone();
        Arc::new(move |duration: Duration| {
            waits.lock().unwrap().push(duration);
            async {}.boxed()
        })
    }

    pub fn waits(&self) -> Vec<Duration> {
        self.waits.lock().unwrap().clone()
    }
}

/// Count requests the mock server received for a method and path.
#[allow(dead_code)]
pub async fn count_requests(server: &MockServer, http_method: &str, url_path: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.method.as_str() == http_method && r.url.path() == url_path)
        .count()
}

/// Wait up to five seconds for at least `expected` matching requests.
#[allow(dead_code)]
pub async fn wait_for_requests(
    server: &MockServer,
    http_method: &str,
    url_path: &str,
    expected: usize,
) -> usize {
    for _ in 0..200 {
        let count = count_requests(server, http_method, url_path).await;
        if count >= expected {
            return count;
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
    count_requests(server, http_method, url_path).await
}

/// What the flaky server does with one incoming connection.
#[allow(dead_code)]
#[derive(Debug, Clone, Copy)]
pub enum ConnectionFault {
    /// Read the request, then close without answering.
    Drop,
    /// Send headers announcing the full body, then close halfway through it.
    TruncateBody,
}

/// A raw TCP HTTP server that injects transport faults.
///
/// Connection `n` (0-based) gets `faults[n]`; connections past the fault list
/// receive a complete `200 OK` NDJSON response.
pub struct FlakyServer {
    pub url: String,
    connections: Arc<AtomicUsize>,
    handle: tokio::task::JoinHandle<()>,
}

#[allow(dead_code)]
impl FlakyServer {
    pub async fn start(faults: Vec<ConnectionFault>, body: String) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind test listener");
        let addr = listener.local_addr().expect("listener address");
        let connections = Arc::new(AtomicUsize::new(0));
        let counter = connections.clone();

        let handle = tokio::spawn(async move {
            while let Ok((mut stream, _)) = listener.accept().await {
                let n = counter.fetch_add(1, Ordering::SeqCst);
                read_request(&mut stream).await;
                match faults.get(n) {
                    Some(ConnectionFault::Drop) => drop(stream),
                    Some(ConnectionFault::TruncateBody) => {
                        let head = response_head(body.len());
                        let half = &body.as_bytes()[..body.len() / 2];
                        let _ = stream.write_all(head.as_bytes()).await;
                        let _ = stream.write_all(half).await;
                        let _ = stream.flush().await;
                        drop(stream);
                    }
                    None => {
                        let head = response_head(body.len());
                        let _ = stream.write_all(head.as_bytes()).await;
                        let _ = stream.write_all(body.as_bytes()).await;
                        let _ = stream.shutdown().await;
                    }
                }
            }
        });

        Self {
            url: format!("http://{}", addr),
            connections,
            handle,
        }
    }

    pub fn connections(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }
}

impl Drop for FlakyServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// A raw TCP HTTP server that answers with a chunked NDJSON body, sending
/// each chunk after its own delay.
pub struct ChunkedServer {
    pub url: String,
    handle: tokio::task::JoinHandle<()>,
}

#[allow(dead_code)]
impl ChunkedServer {
    pub async fn start(chunks: Vec<(Duration, String)>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind test listener");
        let addr = listener.local_addr().expect("listener address");

        let handle = tokio::spawn(async move {
            while let Ok((mut stream, _)) = listener.accept().await {
                read_request(&mut stream).await;
                let head = "HTTP/1.1 200 OK\r\nContent-Type: application/x-ndjson\r\nTransfer-Encoding: chunked\r\nConnection: close\r\n\r\n";
                if stream.write_all(head.as_bytes()).await.is_err() {
                    continue;
                }
                let _ = stream.flush().await;
                for (delay, chunk) in &chunks {
                    tokio::time::sleep(*delay).await;
                    let framed = format!("{:x}\r\n{}\r\n", chunk.len(), chunk);
                    if stream.write_all(framed.as_bytes()).await.is_err() {
                        break;
                    }
                    let _ = stream.flush().await;
                }
                let _ = stream.write_all(b"0\r\n\r\n").await;
                let _ = stream.shutdown().await;
            }
        });

        Self {
            url: format!("http://{}", addr),
            handle,
        }
    }
}

impl Drop for ChunkedServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn response_head(content_length: usize) -> String {
    format!(
        "HTTP/1.1 200 OK\r\nContent-Type: application/x-ndjson\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        content_length
    )
}

/// Read one HTTP request (headers plus `Content-Length` body).
async fn read_request(stream: &mut TcpStream) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            let headers = String::from_utf8_lossy(&buf[..end]).to_ascii_lowercase();
            let content_length = headers
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= end + 4 + content_length {
                return;
            }
        }
        match stream.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    }
}
