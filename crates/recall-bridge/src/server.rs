// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! NDJSON TCP server for browser capture agents.
//!
//! Loopback-only by configuration. Each connection buffers bytes until a
//! newline, answers every request line with exactly one response line,
//! and is closed outright when the buffered request exceeds the size
//! guard.

use std::net::SocketAddr;
use std::sync::Arc;

use recall_config::BridgeConfig;
use recall_core::RecallError;
use serde_json::Value;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, info, warn};

use crate::processor::BridgeProcessor;
use crate::protocol::{BridgeRequest, BridgeResponse};

/// The running bridge server.
pub struct BridgeServer {
    listener: TcpListener,
    processor: Arc<BridgeProcessor>,
    max_request_bytes: usize,
}

impl BridgeServer {
    /// Bind to the configured address.
    pub async fn bind(
        config: &BridgeConfig,
        processor: BridgeProcessor,
    ) -> Result<Self, RecallError> {
        let addr = format!("{}:{}", config.host, config.port);
        let listener = TcpListener::bind(&addr).await.map_err(|e| {
            RecallError::Network {
                message: format!("failed to bind bridge to {addr}: {e}"),
                source: Some(Box::new(e)),
            }
        })?;
        info!(addr = %addr, "bridge listening");
        Ok(Self {
            listener,
            processor: Arc::new(processor),
            max_request_bytes: config.max_request_bytes,
        })
    }

    /// The bound address (useful when port 0 was configured).
    pub fn local_addr(&self) -> Result<SocketAddr, RecallError> {
        self.listener.local_addr().map_err(|e| RecallError::Network {
            message: format!("failed to read bridge address: {e}"),
            source: Some(Box::new(e)),
        })
    }

    /// Accept connections forever.
    pub async fn run(self) -> Result<(), RecallError> {
        loop {
            let (stream, peer) = self.listener.accept().await.map_err(|e| {
                RecallError::Network {
                    message: format!("bridge accept failed: {e}"),
                    source: Some(Box::new(e)),
                }
            })?;
            debug!(peer = %peer, "capture agent connected");
            let processor = Arc::clone(&self.processor);
            let max_request_bytes = self.max_request_bytes;
            tokio::spawn(async move {
                if let Err(e) = serve_connection(stream, processor, max_request_bytes).await {
                    debug!(peer = %peer, error = %e, "connection ended with error");
                }
            });
        }
    }
}

async fn serve_connection(
    mut stream: TcpStream,
    processor: Arc<BridgeProcessor>,
    max_request_bytes: usize,
) -> std::io::Result<()> {
    let mut buffer: Vec<u8> = Vec::new();
    let mut chunk = vec![0u8; 64 * 1024];

    loop {
        let read = stream.read(&mut chunk).await?;
        if read == 0 {
            return Ok(());
        }
        buffer.extend_from_slice(&chunk[..read]);

        if buffer.len() > max_request_bytes {
            warn!(
                buffered = buffer.len(),
                limit = max_request_bytes,
                "request over size guard, closing connection"
            );
            write_response(
                &mut stream,
                &BridgeResponse::rejection("unknown", "message_too_large"),
            )
            .await?;
            return Ok(());
        }

        while let Some(newline) = buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = buffer.drain(..=newline).collect();
            let line = String::from_utf8_lossy(&line[..line.len() - 1]).into_owned();
            if line.trim().is_empty() {
                continue;
            }
            let response = handle_line(&processor, &line).await;
            write_response(&mut stream, &response).await?;
        }
    }
}

/// Parse and process one request line. Infallible: every failure mode
/// maps to a rejection response.
async fn handle_line(processor: &BridgeProcessor, line: &str) -> BridgeResponse {
    // The id is recovered from the raw JSON when possible so even
    // malformed requests get a correlatable response.
    let Ok(value) = serde_json::from_str::<Value>(line) else {
        return BridgeResponse::rejection("unknown", "invalid_request");
    };
    let Some(id) = value.get("id").and_then(Value::as_str).map(String::from) else {
        return BridgeResponse::rejection("unknown", "invalid_request");
    };

    let request: BridgeRequest = match serde_json::from_value(value) {
        Ok(request) => request,
        Err(_) => return BridgeResponse::rejection(id, "invalid_request"),
    };

    match processor.handle(request).await {
        Ok(response) => response,
        Err(e) => {
            warn!(id = %id, error = %e, "request processing failed");
            BridgeResponse::rejection(id, "internal_error")
        }
    }
}

async fn write_response(stream: &mut TcpStream, response: &BridgeResponse) -> std::io::Result<()> {
    let mut payload = serde_json::to_vec(response).unwrap_or_else(|_| {
        br#"{"id":"unknown","ok":false,"reason":"internal_error"}"#.to_vec()
    });
    payload.push(b'\n');
    stream.write_all(&payload).await?;
    stream.flush().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use recall_config::RecallConfig;
    use recall_storage::Database;
    use recall_test_utils::MockAiProvider;
    use tokio::io::{AsyncBufReadExt, BufReader};

    async fn start_server(max_request_bytes: usize) -> SocketAddr {
        let db = Database::open_in_memory().await.unwrap();
        let mut config = RecallConfig::default();
        config.bridge.port = 0;
        config.bridge.max_request_bytes = max_request_bytes;
        config.fetch.min_content_length = 10;
        let config = Arc::new(config);

        let processor =
            BridgeProcessor::new(db, Arc::new(MockAiProvider::new()), Arc::clone(&config));
        let server = BridgeServer::bind(&config.bridge, processor).await.unwrap();
        let addr = server.local_addr().unwrap();
        tokio::spawn(server.run());
        addr
    }

    async fn roundtrip(stream: &mut TcpStream, line: &str) -> BridgeResponse {
        stream.write_all(line.as_bytes()).await.unwrap();
        stream.write_all(b"\n").await.unwrap();
        read_response(stream).await
    }

    async fn read_response(stream: &mut TcpStream) -> BridgeResponse {
        let mut reader = BufReader::new(stream);
        let mut line = String::new();
        reader.read_line(&mut line).await.unwrap();
        serde_json::from_str(&line).unwrap()
    }

    #[tokio::test]
    async fn valid_capture_gets_ok_response() {
        let addr = start_server(1024 * 1024).await;
        let mut stream = TcpStream::connect(addr).await.unwrap();

        let request = serde_json::json!({
            "id": "r1",
            "url": "https://example.com/article",
            "title": "An Article",
            "text": "Plenty of article text for the save path to work with."
        });
        let response = roundtrip(&mut stream, &request.to_string()).await;
        assert!(response.ok);
        assert_eq!(response.id, "r1");
        assert!(response.processed.unwrap().saved_id.is_some());
    }

    #[tokio::test]
    async fn malformed_json_gets_invalid_request() {
        let addr = start_server(1024 * 1024).await;
        let mut stream = TcpStream::connect(addr).await.unwrap();

        let response = roundtrip(&mut stream, "{not json at all").await;
        assert!(!response.ok);
        assert_eq!(response.id, "unknown");
        assert_eq!(response.reason.as_deref(), Some("invalid_request"));
    }

    #[tokio::test]
    async fn missing_id_gets_invalid_request_with_unknown_id() {
        let addr = start_server(1024 * 1024).await;
        let mut stream = TcpStream::connect(addr).await.unwrap();

        let response = roundtrip(&mut stream, r#"{"url":"https://example.com"}"#).await;
        assert_eq!(response.id, "unknown");
        assert_eq!(response.reason.as_deref(), Some("invalid_request"));
    }

    #[tokio::test]
    async fn oversized_request_closes_the_connection() {
        let addr = start_server(1024).await;
        let mut stream = TcpStream::connect(addr).await.unwrap();

        // 4 KiB without a newline blows the 1 KiB guard.
        let oversized = "x".repeat(4096);
        stream.write_all(oversized.as_bytes()).await.unwrap();

        let response = read_response(&mut stream).await;
        assert_eq!(response.reason.as_deref(), Some("message_too_large"));

        // The server closed its side; reads now return EOF.
        let mut rest = Vec::new();
        let read = stream.read_to_end(&mut rest).await.unwrap();
        assert_eq!(read, 0);
    }

    #[tokio::test]
    async fn multiple_requests_on_one_connection_each_get_a_response() {
        let addr = start_server(1024 * 1024).await;
        let mut stream = TcpStream::connect(addr).await.unwrap();

        let first = serde_json::json!({
            "id": "a",
            "url": "https://example.com/one",
            "text": "Content of the first page, long enough to save."
        });
        let second = serde_json::json!({
            "id": "b",
            "url": "https://example.com/two",
            "text": "Content of the second page, also long enough."
        });
        // Two lines in one write; both must be answered in order.
        let both = format!("{first}\n{second}\n");
        stream.write_all(both.as_bytes()).await.unwrap();

        let mut reader = BufReader::new(&mut stream);
        let mut line = String::new();
        reader.read_line(&mut line).await.unwrap();
        let response_a: BridgeResponse = serde_json::from_str(&line).unwrap();
        line.clear();
        reader.read_line(&mut line).await.unwrap();
        let response_b: BridgeResponse = serde_json::from_str(&line).unwrap();

        assert_eq!(response_a.id, "a");
        assert_eq!(response_b.id, "b");
        assert!(response_a.ok && response_b.ok);
    }

    #[tokio::test]
    async fn blank_lines_are_ignored() {
        let addr = start_server(1024 * 1024).await;
        let mut stream = TcpStream::connect(addr).await.unwrap();

        stream.write_all(b"\n  \n").await.unwrap();
        let request = serde_json::json!({
            "id": "after-blanks",
            "url": "https://example.com/page",
            "text": "Enough text to persist this page as a memory."
        });
        let response = roundtrip(&mut stream, &request.to_string()).await;
        assert_eq!(response.id, "after-blanks");
    }
}
