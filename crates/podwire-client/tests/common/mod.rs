//! In-process HTTP/1.1 responder for integration tests.
//!
//! Serves one canned reply on one connection, records the request line,
//! and reports when the client hangs up.

#![allow(dead_code, clippy::expect_used, clippy::unwrap_used)]

use std::time::Duration;

use podwire_client::Connection;
use podwire_common::config::ClientConfig;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;

/// Piece of a reply body.
#[derive(Debug, Clone)]
pub enum Chunk {
    /// Bytes written and flushed as one segment.
    Data(String),
    /// Pause before the next segment.
    Pause(Duration),
}

/// What the responder sends back.
#[derive(Debug, Clone)]
pub struct Reply {
    pub status: u16,
    pub body: Vec<Chunk>,
    /// Keep the socket open after the body until the client disconnects.
    pub hold_open: bool,
}

impl Reply {
    pub fn json(status: u16, body: &str) -> Self {
        Self {
            status,
            body: vec![Chunk::Data(body.to_string())],
            hold_open: false,
        }
    }

    pub fn stream(records: &[String], hold_open: bool) -> Self {
        Self {
            status: 200,
            body: records.iter().map(|r| Chunk::Data(format!("{r}\n"))).collect(),
            hold_open,
        }
    }
}

/// Request as seen by the responder.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub query: Vec<(String, String)>,
}

impl Recorded {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

pub struct TestServer {
    pub base_url: String,
    request: Option<oneshot::Receiver<Recorded>>,
    hung_up: Option<oneshot::Receiver<()>>,
}

impl TestServer {
    pub async fn start(reply: Reply) -> Self {
        Self::launch(Some(reply)).await
    }

    /// Reads the request and then never answers, not even with headers.
    pub async fn start_silent() -> Self {
        Self::launch(None).await
    }

    async fn launch(reply: Option<Reply>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");
        let (request_tx, request_rx) = oneshot::channel();
        let (hung_up_tx, hung_up_rx) = oneshot::channel();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.expect("accept");
            let recorded = read_request(&mut socket).await;
            let _ = request_tx.send(recorded);
            match reply {
                Some(reply) => {
                    write_reply(&mut socket, &reply).await;
                    if reply.hold_open {
                        wait_for_hang_up(&mut socket).await;
                    }
                }
                None => wait_for_hang_up(&mut socket).await,
            }
            let _ = hung_up_tx.send(());
        });

        Self {
            base_url: format!("http://{addr}"),
            request: Some(request_rx),
            hung_up: Some(hung_up_rx),
        }
    }

    pub fn connection(&self) -> Connection {
        Connection::new(ClientConfig {
            base_url: self.base_url.clone(),
            connect_timeout_secs: 2,
            ..ClientConfig::default()
        })
        .expect("valid config")
    }

    pub async fn request(&mut self) -> Recorded {
        let rx = self.request.take().expect("request already taken");
        tokio::time::timeout(Duration::from_secs(5), rx)
            .await
            .expect("request arrived")
            .expect("responder alive")
    }

    /// Resolves once the client has closed its side of the connection.
    pub async fn client_hung_up(&mut self) {
        let rx = self.hung_up.take().expect("already awaited");
        tokio::time::timeout(Duration::from_secs(5), rx)
            .await
            .expect("client released the connection")
            .expect("responder alive");
    }
}

/// Address on which nothing is listening.
pub async fn unused_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    format!("http://{addr}")
}

async fn read_request(socket: &mut TcpStream) -> Recorded {
    let mut head = Vec::new();
    let mut buf = [0_u8; 1024];
    while !head.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = socket.read(&mut buf).await.expect("read request");
        assert!(n > 0, "client closed before sending a request");
        head.extend_from_slice(&buf[..n]);
    }

    let head = String::from_utf8_lossy(&head);
    let line = head.lines().next().expect("request line");
    let mut parts = line.split_whitespace();
    let method = parts.next().expect("method").to_string();
    let target = parts.next().expect("target");
    let url = reqwest::Url::parse(&format!("http://test{target}")).expect("target url");

    Recorded {
        method,
        path: url.path().to_string(),
        query: url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect(),
    }
}

async fn write_reply(socket: &mut TcpStream, reply: &Reply) {
    let head = format!(
        "HTTP/1.1 {} X\r\nContent-Type: application/json\r\nConnection: close\r\n\r\n",
        reply.status
    );
    if socket.write_all(head.as_bytes()).await.is_err() {
        return;
    }
    for chunk in &reply.body {
        match chunk {
            Chunk::Data(data) => {
                if socket.write_all(data.as_bytes()).await.is_err() {
                    return;
                }
                let _ = socket.flush().await;
            }
            Chunk::Pause(d) => tokio::time::sleep(*d).await,
        }
    }
}

async fn wait_for_hang_up(socket: &mut TcpStream) {
    let mut buf = [0_u8; 256];
    loop {
        match socket.read(&mut buf).await {
            Ok(0) | Err(_) => return,
            Ok(_) => {}
        }
    }
}
