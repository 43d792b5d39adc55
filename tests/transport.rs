use std::io::{self, Cursor, Read};

use anyhow::Result;
use jsondispatch::{
    BufferedResponse, CONTENT_TYPE, INVALID_REQUEST_BODY, ResponseSink, Server, ServerOptions,
    ServiceBuilder,
};
use serde_json::{Value, json};
use tokio::{
    io::{AsyncWriteExt, duplex},
    spawn,
};

struct Echo;

impl Echo {
    fn echo(&self, s: String) -> Result<String, String> {
        Ok(s)
    }
}

fn server(options: ServerOptions) -> Server {
    let server = Server::with_options(options);
    server
        .register(ServiceBuilder::new(Echo).method("Echo", Echo::echo))
        .unwrap();
    server
}

fn request(text: &str) -> String {
    json!({"id": 5, "method": "Echo.Echo", "params": [text]}).to_string()
}

#[tokio::test]
async fn handle_async_reads_whole_body() -> Result<()> {
    let s = server(ServerOptions::default());
    let (mut client, body) = duplex(16);
    let body_text = request(&"x".repeat(100));
    let writer = spawn(async move {
        client.write_all(body_text.as_bytes()).await?;
        client.shutdown().await
    });
    let mut response = BufferedResponse::new();
    s.handle_async(body, &mut response).await?;
    writer.await??;

    let r: Value = serde_json::from_slice(&response.body)?;
    assert_eq!(r["id"], 5);
    assert_eq!(r["result"], "x".repeat(100));
    assert_eq!(response.header("Content-Type"), Some(CONTENT_TYPE));
    Ok(())
}

#[tokio::test]
async fn handle_async_rejects_oversized_body() -> Result<()> {
    let s = server(ServerOptions {
        max_request_size: Some(32),
    });
    let body = request(&"x".repeat(100));
    let mut response = BufferedResponse::new();
    s.handle_async(body.as_bytes(), &mut response).await?;
    assert_eq!(response.body, INVALID_REQUEST_BODY.as_bytes());
    Ok(())
}

#[test]
fn handle_reads_from_reader() -> Result<()> {
    let s = server(ServerOptions::default());
    let mut response = BufferedResponse::new();
    s.handle(Cursor::new(request("hi")), &mut response)?;
    assert_eq!(response.body, br#"{"id":5,"result":"hi"}"#);
    Ok(())
}

#[test]
fn body_size_limit() -> Result<()> {
    let body = request("hello");
    let limited = server(ServerOptions {
        max_request_size: Some(body.len()),
    });
    let mut response = BufferedResponse::new();
    limited.handle(body.as_bytes(), &mut response)?;
    assert_eq!(response.body, br#"{"id":5,"result":"hello"}"#);

    let limited = server(ServerOptions {
        max_request_size: Some(body.len() - 1),
    });
    let mut response = BufferedResponse::new();
    limited.handle(body.as_bytes(), &mut response)?;
    assert_eq!(response.body, INVALID_REQUEST_BODY.as_bytes());

    let unlimited = server(ServerOptions {
        max_request_size: None,
    });
    let body = request(&"y".repeat(2 * 1024 * 1024));
    let mut response = BufferedResponse::new();
    unlimited.handle(body.as_bytes(), &mut response)?;
    let r: Value = serde_json::from_slice(&response.body)?;
    assert_eq!(r["result"].as_str().map(str::len), Some(2 * 1024 * 1024));
    Ok(())
}

#[test]
fn default_options() {
    assert_eq!(
        ServerOptions::default().max_request_size,
        Some(jsondispatch::DEFAULT_MAX_REQUEST_SIZE)
    );
}

struct FailingReader;
impl Read for FailingReader {
    fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
        Err(io::Error::other("connection reset"))
    }
}

#[test]
fn unreadable_body_is_invalid_request() -> Result<()> {
    let s = server(ServerOptions::default());
    let mut response = BufferedResponse::new();
    s.handle(FailingReader, &mut response)?;
    assert_eq!(response.body, INVALID_REQUEST_BODY.as_bytes());
    let r: Value = serde_json::from_slice(&response.body)?;
    assert_eq!(r["id"], Value::Null);
    assert_eq!(r["error"], "Invalid JSON-RPC.");
    Ok(())
}

struct ClosedSink;
impl ResponseSink for ClosedSink {
    fn set_header(&mut self, _: &str, _: &str) {}
    fn write(&mut self, _: &[u8]) -> io::Result<()> {
        Err(io::ErrorKind::BrokenPipe.into())
    }
}

#[test]
fn sink_errors_are_returned() {
    let s = server(ServerOptions::default());
    let e = s
        .handle_bytes(request("x").as_bytes(), &mut ClosedSink)
        .unwrap_err();
    assert_eq!(e.kind(), io::ErrorKind::BrokenPipe);
}

#[test]
fn sink_errors_are_returned_for_rejected_requests() {
    let s = server(ServerOptions::default());
    let e = s.handle_bytes(b"{", &mut ClosedSink).unwrap_err();
    assert_eq!(e.kind(), io::ErrorKind::BrokenPipe);
    let e = s.handle(FailingReader, &mut ClosedSink).unwrap_err();
    assert_eq!(e.kind(), io::ErrorKind::BrokenPipe);
}
