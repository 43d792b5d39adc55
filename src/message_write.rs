use std::io;

use super::{CONTENT_TYPE, INVALID_REQUEST_BODY, ResponseMessage};

/// The response half of the transport.
pub trait ResponseSink {
    fn set_header(&mut self, name: &str, value: &str);
    fn write(&mut self, body: &[u8]) -> io::Result<()>;
}

/// A [`ResponseSink`] that keeps the response in memory.
#[derive(Debug, Clone, Default)]
pub struct BufferedResponse {
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl BufferedResponse {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .rev()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

impl ResponseSink for BufferedResponse {
    fn set_header(&mut self, name: &str, value: &str) {
        self.headers.push((name.to_string(), value.to_string()));
    }
    fn write(&mut self, body: &[u8]) -> io::Result<()> {
        self.body.extend_from_slice(body);
        Ok(())
    }
}

pub(crate) fn encode_response(m: &ResponseMessage) -> Vec<u8> {
    match serde_json::to_vec(m) {
        Ok(body) => body,
        Err(_) => INVALID_REQUEST_BODY.as_bytes().to_vec(),
    }
}

pub(crate) fn write_body(sink: &mut impl ResponseSink, body: &[u8]) -> io::Result<()> {
    sink.set_header("Content-Type", CONTENT_TYPE);
    sink.write(body)
}
