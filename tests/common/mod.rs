//! Shared utilities for integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use ldbws_proxy::projection::SourceNode;
use ldbws_proxy::upstream::{LiveBoards, UpstreamError, UpstreamRequest};

/// One request received by the mock SOAP backend.
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub head: String,
    pub body: String,
}

impl CapturedRequest {
    /// Header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<String> {
        self.head.lines().skip(1).find_map(|line| {
            let (key, value) = line.split_once(':')?;
            key.trim()
                .eq_ignore_ascii_case(name)
                .then(|| value.trim().to_string())
        })
    }
}

pub type Captured = Arc<Mutex<Vec<CapturedRequest>>>;

/// Start a mock SOAP backend on an ephemeral port that answers every
/// request with `status` and `body`, recording what it received.
pub async fn start_soap_backend(status: u16, body: impl Into<String>) -> (SocketAddr, Captured) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let body: Arc<str> = body.into().into();
    let captured: Captured = Arc::new(Mutex::new(Vec::new()));
    let seen = captured.clone();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((socket, _)) => {
                    let body = body.clone();
                    let seen = seen.clone();
                    tokio::spawn(async move {
                        handle_connection(socket, status, &body, &seen).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    (addr, captured)
}

async fn handle_connection(mut socket: TcpStream, status: u16, body: &str, seen: &Captured) {
    if let Some(request) = read_request(&mut socket).await {
        seen.lock().unwrap().push(request);
    }

    let status_text = match status {
        200 => "200 OK",
        500 => "500 Internal Server Error",
        503 => "503 Service Unavailable",
        _ => "200 OK",
    };
    let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: text/xml; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status_text,
        body.len(),
        body
    );
    let _ = socket.write_all(response.as_bytes()).await;
    let _ = socket.shutdown().await;
    tokio::time::sleep(Duration::from_millis(10)).await;
}

async fn read_request(socket: &mut TcpStream) -> Option<CapturedRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let head_end = loop {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..head_end]).to_string();
    let partial = CapturedRequest {
        head,
        body: String::new(),
    };
    let length: usize = partial
        .header("content-length")
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);

    while buf.len() < head_end + length {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let end = buf.len().min(head_end + length);
    Some(CapturedRequest {
        body: String::from_utf8_lossy(&buf[head_end..end]).to_string(),
        ..partial
    })
}

/// What a [`StubBoards`] answers with.
#[derive(Debug, Clone)]
pub enum Reply {
    Node(serde_json::Value),
    Fault(&'static str),
}

/// In-process upstream returning a canned reply and recording requests.
pub struct StubBoards {
    reply: Reply,
    pub seen: Mutex<Vec<UpstreamRequest>>,
}

impl StubBoards {
    pub fn new(reply: Reply) -> Arc<Self> {
        Arc::new(Self {
            reply,
            seen: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<UpstreamRequest> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl LiveBoards for StubBoards {
    async fn call(&self, request: &UpstreamRequest) -> Result<SourceNode, UpstreamError> {
        self.seen.lock().unwrap().push(request.clone());
        match &self.reply {
            Reply::Node(value) => Ok(SourceNode::from(value.clone())),
            Reply::Fault(message) => Err(UpstreamError::Fault {
                code: "soap:Server".into(),
                message: (*message).into(),
            }),
        }
    }
}

/// Wrap a `GetStationBoardResult` payload in a full response envelope.
pub fn board_envelope(operation: &str, result: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/"
    xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
  <soap:Body>
    <{operation}Response xmlns="http://thalesgroup.com/RTTI/2014-02-20/ldb/">
      <GetStationBoardResult xmlns:lt4="http://thalesgroup.com/RTTI/2014-02-20/ldb/types">
        {result}
      </GetStationBoardResult>
    </{operation}Response>
  </soap:Body>
</soap:Envelope>"#
    )
}

/// A SOAP fault envelope.
pub fn fault_envelope(message: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">
  <soap:Body>
    <soap:Fault>
      <faultcode>soap:Client</faultcode>
      <faultstring>{message}</faultstring>
    </soap:Fault>
  </soap:Body>
</soap:Envelope>"#
    )
}
