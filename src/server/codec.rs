//! HTTP/1.1 Codec for Tokio
//!
//! Minimal request decoder and response encoder for the admin listener.

use crate::admin::{AdminRequest, AdminResponse};
use bytes::{BufMut, Bytes, BytesMut};
use std::io;
use tokio_util::codec::{Decoder, Encoder};

/// Largest accepted request head (request line + headers)
pub const MAX_HEAD_SIZE: usize = 8 * 1024;

/// Largest accepted request body
pub const MAX_BODY_SIZE: usize = 64 * 1024;

/// Decoded HTTP request
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: String,
    pub target: String,
    pub version: String,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
}

impl HttpRequest {
    /// Header value by case-insensitive name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// HTTP/1.1 defaults to keep-alive, HTTP/1.0 to close
    pub fn keep_alive(&self) -> bool {
        match self.header("connection") {
            Some(v) if v.eq_ignore_ascii_case("close") => false,
            Some(v) if v.eq_ignore_ascii_case("keep-alive") => true,
            _ => self.version == "HTTP/1.1",
        }
    }

    pub fn to_admin_request(&self) -> AdminRequest {
        let mut req = AdminRequest::from_target(&self.method, &self.target);
        for (key, value) in &self.headers {
            req = req.with_header(key, value);
        }
        req
    }
}

/// Response plus connection disposition
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub response: AdminResponse,
    pub keep_alive: bool,
}

impl HttpResponse {
    pub fn new(response: AdminResponse, keep_alive: bool) -> Self {
        Self {
            response,
            keep_alive,
        }
    }
}

fn reason_phrase(status: u16) -> &'static str {
    match status {
        200 => "OK",
        400 => "Bad Request",
        404 => "Not Found",
        405 => "Method Not Allowed",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}

fn invalid(msg: impl Into<String>) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, msg.into())
}

#[derive(Debug, Default)]
enum DecodeState {
    #[default]
    Head,
    Body(HttpRequest, usize),
}

/// Tokio codec for HTTP/1.1 requests and responses
#[derive(Debug, Default)]
pub struct HttpCodec {
    state: DecodeState,
}

impl HttpCodec {
    pub fn new() -> Self {
        Self::default()
    }
}

fn parse_head(head: &[u8]) -> io::Result<(HttpRequest, usize)> {
    let head = std::str::from_utf8(head).map_err(|_| invalid("request head is not UTF-8"))?;
    let mut lines = head.split("\r\n");

    let request_line = lines.next().unwrap_or_default();
    let mut parts = request_line.split_whitespace();
    let (method, target, version) = match (parts.next(), parts.next(), parts.next(), parts.next())
    {
        (Some(m), Some(t), Some(v), None) => (m, t, v),
        _ => return Err(invalid(format!("malformed request line: {:?}", request_line))),
    };

    if !version.starts_with("HTTP/1.") {
        return Err(invalid(format!("unsupported version: {}", version)));
    }
    if !target.starts_with('/') {
        return Err(invalid(format!("invalid request target: {}", target)));
    }

    let mut headers = Vec::new();
    for line in lines.filter(|l| !l.is_empty()) {
        let (name, value) = line
            .split_once(':')
            .ok_or_else(|| invalid(format!("malformed header: {:?}", line)))?;
        headers.push((name.trim().to_string(), value.trim().to_string()));
    }

    let request = HttpRequest {
        method: method.to_string(),
        target: target.to_string(),
        version: version.to_string(),
        headers,
        body: Bytes::new(),
    };

    let content_length = match request.header("content-length") {
        Some(v) => v
            .parse::<usize>()
            .map_err(|_| invalid(format!("invalid content-length: {}", v)))?,
        None => 0,
    };
    if content_length > MAX_BODY_SIZE {
        return Err(invalid(format!("body too large: {} bytes", content_length)));
    }

    Ok((request, content_length))
}

impl Decoder for HttpCodec {
    type Item = HttpRequest;
    type Error = io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        loop {
            match std::mem::take(&mut self.state) {
                DecodeState::Head => {
                    let Some(end) = src.windows(4).position(|w| w == b"\r\n\r\n") else {
                        if src.len() > MAX_HEAD_SIZE {
                            return Err(invalid("request head too large"));
                        }
                        return Ok(None);
                    };
                    if end > MAX_HEAD_SIZE {
                        return Err(invalid("request head too large"));
                    }

                    let head = src.split_to(end + 4);
                    let (request, content_length) = parse_head(&head[..end])?;
                    self.state = DecodeState::Body(request, content_length);
                }

                DecodeState::Body(mut request, content_length) => {
                    if src.len() < content_length {
                        self.state = DecodeState::Body(request, content_length);
                        return Ok(None);
                    }

                    request.body = src.split_to(content_length).freeze();
                    return Ok(Some(request));
                }
            }
        }
    }
}

impl Encoder<HttpResponse> for HttpCodec {
    type Error = io::Error;

    fn encode(&mut self, item: HttpResponse, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let resp = item.response;
        let head = format!(
            "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: {}\r\n\r\n",
            resp.status,
            reason_phrase(resp.status),
            resp.content_type,
            resp.body.len(),
            if item.keep_alive { "keep-alive" } else { "close" },
        );

        dst.reserve(head.len() + resp.body.len());
        dst.put_slice(head.as_bytes());
        dst.put_slice(resp.body.as_bytes());
        Ok(())
    }
}
