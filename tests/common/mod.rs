//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use sub_proxy::config::ProxyConfig;
use sub_proxy::http::HttpServer;
use sub_proxy::lifecycle::Shutdown;
use sub_proxy::render::Presenter;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

#[allow(dead_code)]
pub const CHROME_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// What the mock backend saw.
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// Request target, path plus query.
    pub path: String,
    pub headers: Vec<(String, String)>,
}

impl RecordedRequest {
    #[allow(dead_code)]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Scripted reply of the mock backend.
#[derive(Debug, Clone)]
pub struct MockResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
    pub delay: Duration,
}

impl MockResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
            delay: Duration::ZERO,
        }
    }

    #[allow(dead_code)]
    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((name.to_string(), value.into()));
        self
    }

    #[allow(dead_code)]
    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// Start a programmable mock backend on an ephemeral port.
///
/// Every request head is parsed, sent to the returned channel and answered
/// with whatever `f` returns.
pub async fn start_programmable_backend<F>(f: F) -> (SocketAddr, mpsc::UnboundedReceiver<RecordedRequest>)
where
    F: Fn(&RecordedRequest) -> MockResponse + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = mpsc::unbounded_channel();
    let f = Arc::new(f);

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let f = f.clone();
            let tx = tx.clone();
            tokio::spawn(async move {
                let Some(request) = read_request_head(&mut socket).await else {
                    return;
                };
                let response = f(&request);
                let _ = tx.send(request);

                tokio::time::sleep(response.delay).await;

                let mut head = format!("HTTP/1.1 {} Mock\r\n", response.status);
                for (name, value) in &response.headers {
                    head.push_str(&format!("{name}: {value}\r\n"));
                }
                head.push_str(&format!(
                    "Content-Length: {}\r\nConnection: close\r\n\r\n",
                    response.body.len()
                ));
                let _ = socket.write_all(head.as_bytes()).await;
                let _ = socket.write_all(response.body.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    (addr, rx)
}

/// Start a mock backend that always returns `status` and `body`.
#[allow(dead_code)]
pub async fn start_mock_backend(
    status: u16,
    body: &'static str,
) -> (SocketAddr, mpsc::UnboundedReceiver<RecordedRequest>) {
    start_programmable_backend(move |_| MockResponse::new(status, body)).await
}

/// Start a backend that reads the request and never answers.
///
/// For every connection, the time between the end of the request head and
/// the upstream socket closing is sent to the returned channel.
#[allow(dead_code)]
pub async fn start_silent_backend() -> (SocketAddr, mpsc::UnboundedReceiver<Duration>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let tx = tx.clone();
            tokio::spawn(async move {
                if read_request_head(&mut socket).await.is_none() {
                    return;
                }
                let started = std::time::Instant::now();
                let mut buf = [0u8; 256];
                loop {
                    match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => break,
                        Ok(_) => continue,
                    }
                }
                let _ = tx.send(started.elapsed());
            });
        }
    });

    (addr, rx)
}

async fn read_request_head(socket: &mut tokio::net::TcpStream) -> Option<RecordedRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let text = String::from_utf8_lossy(&buf);
    let mut lines = text.split("\r\n");
    let path = lines.next()?.split(' ').nth(1)?.to_string();
    let headers = lines
        .take_while(|line| !line.is_empty())
        .filter_map(|line| line.split_once(':'))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .collect();

    Some(RecordedRequest { path, headers })
}

/// Address that refuses connections.
#[allow(dead_code)]
pub async fn closed_port() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

/// Run the proxy on an ephemeral port.
pub async fn start_proxy(config: ProxyConfig) -> (SocketAddr, Shutdown) {
    let server = HttpServer::new(config).unwrap();
    spawn_server(server).await
}

/// Run the proxy with a custom presenter.
#[allow(dead_code)]
pub async fn start_proxy_with_presenter(
    config: ProxyConfig,
    presenter: Arc<dyn Presenter>,
) -> (SocketAddr, Shutdown) {
    let server = HttpServer::with_presenter(config, presenter).unwrap();
    spawn_server(server).await
}

async fn spawn_server(server: HttpServer) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    (addr, shutdown)
}

/// Client that talks to the proxy directly.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
