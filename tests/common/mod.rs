//! Shared utilities for integration and load testing.

#![allow(dead_code)]

use std::future::Future;
use std::io::{Cursor, Write};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use page_counter::config::ServiceConfig;
use page_counter::http::HttpServer;
use page_counter::lifecycle::Shutdown;

/// Response served by a programmable upstream.
#[derive(Clone)]
pub struct MockResponse {
    pub status: u16,
    pub body: Vec<u8>,
    pub delay: Duration,
    /// Send the body with chunked transfer encoding and no length.
    pub chunked: bool,
}

impl MockResponse {
    pub fn ok(body: Vec<u8>) -> Self {
        Self { status: 200, body, delay: Duration::ZERO, chunked: false }
    }

    pub fn status(status: u16) -> Self {
        Self { status, body: b"upstream says no".to_vec(), delay: Duration::ZERO, chunked: false }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn chunked(mut self) -> Self {
        self.chunked = true;
        self
    }
}

/// Start a mock upstream that always serves the same response.
pub async fn start_mock_backend(response: MockResponse) -> SocketAddr {
    start_programmable_backend(move || {
        let response = response.clone();
        async move { response }
    })
    .await
}

/// Start a programmable mock upstream on an ephemeral port.
pub async fn start_programmable_backend<F, Fut>(f: F) -> SocketAddr
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = MockResponse> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        let response = f().await;
                        serve_one(socket, response).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

async fn serve_one(mut socket: TcpStream, response: MockResponse) {
    // Drain the request head so closing the socket does not reset it.
    let mut head = Vec::new();
    let mut buf = [0u8; 1024];
    while !head.windows(4).any(|w| w == b"\r\n\r\n") {
        match socket.read(&mut buf).await {
            Ok(0) | Err(_) => return,
            Ok(n) => head.extend_from_slice(&buf[..n]),
        }
    }

    tokio::time::sleep(response.delay).await;

    let status_text = match response.status {
        200 => "200 OK",
        401 => "401 Unauthorized",
        403 => "403 Forbidden",
        404 => "404 Not Found",
        500 => "500 Internal Server Error",
        502 => "502 Bad Gateway",
        503 => "503 Service Unavailable",
        _ => "200 OK",
    };

    if response.chunked {
        let header = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/octet-stream\r\nTransfer-Encoding: chunked\r\nConnection: close\r\n\r\n",
            status_text
        );
        let _ = socket.write_all(header.as_bytes()).await;
        for chunk in response.body.chunks(512) {
            let _ = socket.write_all(format!("{:x}\r\n", chunk.len()).as_bytes()).await;
            let _ = socket.write_all(chunk).await;
            let _ = socket.write_all(b"\r\n").await;
        }
        let _ = socket.write_all(b"0\r\n\r\n").await;
    } else {
        let header = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/octet-stream\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            status_text,
            response.body.len()
        );
        let _ = socket.write_all(header.as_bytes()).await;
        let _ = socket.write_all(&response.body).await;
    }
    let _ = socket.shutdown().await;
}

/// An address nothing listens on.
pub async fn closed_port() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

/// Config suited to tests: short download timeout, no proxy lookups.
pub fn test_config() -> ServiceConfig {
    let mut config = ServiceConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.download.timeout_secs = 1;
    config.download.connect_timeout_secs = 1;
    config.download.use_system_proxy = false;
    config.timeouts.request_secs = 10;
    config
}

/// Start the API on an ephemeral port.
pub async fn start_server(config: ServiceConfig) -> (SocketAddr, Shutdown) {
    let server = HttpServer::new(config).unwrap();
    start_built_server(server).await
}

pub async fn start_built_server(server: HttpServer) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    (addr, shutdown)
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

/// POST a count request and return status plus JSON body.
pub async fn count(api: SocketAddr, body: serde_json::Value) -> (u16, serde_json::Value) {
    let res = client()
        .post(format!("http://{}/api/count-pages", api))
        .json(&body)
        .send()
        .await
        .expect("API unreachable");
    let status = res.status().as_u16();
    let json = res.json().await.expect("JSON body");
    (status, json)
}

fn package(parts: &[(&str, String)]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, content) in parts {
        writer.start_file(*name, SimpleFileOptions::default()).unwrap();
        writer.write_all(content.as_bytes()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

/// Minimal DOCX whose app properties report `pages`.
pub fn docx_with_pages(pages: u32) -> Vec<u8> {
    package(&[
        (
            "docProps/app.xml",
            format!(
                r#"<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties"><Pages>{}</Pages></Properties>"#,
                pages
            ),
        ),
        (
            "word/document.xml",
            r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body><w:p/></w:body></w:document>"#
                .to_string(),
        ),
    ])
}

/// Minimal PPTX with `slides` entries in the slide id list.
pub fn pptx_with_slides(slides: u32) -> Vec<u8> {
    let ids: String = (0..slides)
        .map(|i| format!(r#"<p:sldId id="{}" r:id="rId{}"/>"#, 256 + i, i + 2))
        .collect();
    package(&[(
        "ppt/presentation.xml",
        format!(
            r#"<p:presentation xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><p:sldIdLst>{}</p:sldIdLst></p:presentation>"#,
            ids
        ),
    )])
}
