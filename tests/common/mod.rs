#![allow(dead_code)]

use fetchwrap::Logger;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Level {
    Log,
    Warn,
    Error,
}

/// Logger that keeps every record for later assertions.
#[derive(Default)]
pub struct RecordingLogger {
    records: Mutex<Vec<(Level, String)>>,
}

impl RecordingLogger {
    pub fn records(&self) -> Vec<(Level, String)> {
        self.records.lock().unwrap().clone()
    }

    pub fn count(&self, level: Level) -> usize {
        self.records().iter().filter(|(l, _)| *l == level).count()
    }

    fn push(&self, level: Level, message: &str) {
        self.records.lock().unwrap().push((level, message.to_string()));
    }
}

impl Logger for RecordingLogger {
    fn log(&self, message: &str) {
        self.push(Level::Log, message);
    }

    fn warn(&self, message: &str) {
        self.push(Level::Warn, message);
    }

    fn error(&self, message: &str) {
        self.push(Level::Error, message);
    }
}

/// One scripted reply: wait `delay`, then answer with `status` and `body`.
/// `None` keeps the connection open without answering.
#[derive(Debug, Clone)]
pub struct Reply {
    pub delay: Duration,
    pub status: Option<u16>,
    pub body: &'static str,
}

impl Reply {
    pub fn status(status: u16, body: &'static str) -> Self {
        Self {
            delay: Duration::ZERO,
            status: Some(status),
            body,
        }
    }

    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn hang() -> Self {
        Self {
            delay: Duration::ZERO,
            status: None,
            body: "",
        }
    }
}

/// Minimal HTTP/1.1 server answering connection `n` with `script[n]`
/// (the last entry repeats). Every reply closes the connection, so the
/// connection count equals the number of attempts.
pub struct ScriptedServer {
    pub url: String,
    connections: Arc<AtomicUsize>,
}

impl ScriptedServer {
    pub async fn start(script: Vec<Reply>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let connections = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&connections);

        tokio::spawn(async move {
            while let Ok((socket, _)) = listener.accept().await {
                let index = counter.fetch_add(1, Ordering::SeqCst);
                let reply = script
                    .get(index)
                    .or_else(|| script.last())
                    .cloned()
                    .unwrap_or_else(Reply::hang);
                tokio::spawn(serve(socket, reply));
            }
        });

        Self { url, connections }
    }

    pub fn connections(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }
}

async fn serve(mut socket: TcpStream, reply: Reply) {
    let mut head = Vec::new();
    let mut buf = [0u8; 1024];
    while !head.windows(4).any(|w| w == b"\r\n\r\n") {
        match socket.read(&mut buf).await {
            Ok(0) | Err(_) => return,
            Ok(n) => head.extend_from_slice(&buf[..n]),
        }
    }

    tokio::time::sleep(reply.delay).await;
    let Some(status) = reply.status else {
        // Hold the connection until the client gives up.
        while let Ok(n) = socket.read(&mut buf).await {
            if n == 0 {
                break;
            }
        }
        return;
    };

    let response = format!(
        "HTTP/1.1 {} Scripted\r\n\
         content-type: application/json\r\n\
         content-length: {}\r\n\
         connection: close\r\n\r\n{}",
        status,
        reply.body.len(),
        reply.body
    );
    let _ = socket.write_all(response.as_bytes()).await;
    let _ = socket.shutdown().await;
}
