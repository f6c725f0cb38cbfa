//! Per-request context handed to pipeline handlers.
//!
//! The listener builds a [`StumpsHttpContext`] for each inbound request. The
//! request half is read-only; the response half is filled in by whichever
//! handler terminates the pipeline.

use super::header::{HeaderCollection, HttpHeader};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

/// Which stage produced the response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HttpResponseOrigin {
    /// No handler has written a response yet
    #[default]
    Unprocessed,
    /// Relayed from the real origin server
    RemoteServer,
    /// Replayed from a Stump
    Stump,
    /// Nothing matched and a 404 was returned
    NotFoundResponse,
    /// No stage produced a response and a 503 was returned
    ServiceUnavailable,
}

/// Inbound request as seen by handlers.
#[derive(Debug, Clone)]
pub struct StumpsHttpRequest {
    pub method: String,
    pub raw_url: String,
    pub protocol_version: String,
    /// Headers in arrival order; names may repeat
    pub headers: Vec<HttpHeader>,
    pub body: Bytes,
    pub local_addr: Option<SocketAddr>,
    pub remote_addr: Option<SocketAddr>,
}

impl Default for StumpsHttpRequest {
    fn default() -> Self {
        Self {
            method: "GET".to_string(),
            raw_url: "/".to_string(),
            protocol_version: "HTTP/1.1".to_string(),
            headers: Vec::new(),
            body: Bytes::new(),
            local_addr: None,
            remote_addr: None,
        }
    }
}

impl StumpsHttpRequest {
    pub fn new(method: impl Into<String>, raw_url: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            raw_url: raw_url.into(),
            ..Default::default()
        }
    }

    /// Builder-style helper used by tests and adapters.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push(HttpHeader::new(name, value));
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }
}

/// Mutable outbound response.
#[derive(Debug, Clone)]
pub struct StumpsHttpResponse {
    pub status_code: u16,
    pub status_description: String,
    /// Generic headers, excluding `content-type`
    pub headers: HeaderCollection,
    /// Transports treat content-type as a first-class field
    pub content_type: Option<String>,
    pub send_chunked: bool,
    pub origin: HttpResponseOrigin,
    body: Vec<u8>,
}

impl Default for StumpsHttpResponse {
    fn default() -> Self {
        Self {
            status_code: 200,
            status_description: "OK".to_string(),
            headers: HeaderCollection::new(),
            content_type: None,
            send_chunked: false,
            origin: HttpResponseOrigin::Unprocessed,
            body: Vec::new(),
        }
    }
}

impl StumpsHttpResponse {
    /// Writable body stream. Bytes written here are appended to the body.
    pub fn output_stream(&mut self) -> &mut Vec<u8> {
        &mut self.body
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Drop any body bytes written so far.
    pub fn clear_body(&mut self) {
        self.body.clear();
    }

    pub fn into_body(self) -> Vec<u8> {
        self.body
    }
}

/// Request/response pair for one pipeline run.
#[derive(Debug, Clone, Default)]
pub struct StumpsHttpContext {
    pub request: StumpsHttpRequest,
    pub response: StumpsHttpResponse,
}

impl StumpsHttpContext {
    pub fn new(request: StumpsHttpRequest) -> Self {
        Self {
            request,
            response: StumpsHttpResponse::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_request_keeps_repeated_headers_in_order() {
        let request = StumpsHttpRequest::new("POST", "/orders")
            .with_header("Content-Type", "application/json")
            .with_header("X-Trace", "1")
            .with_header("x-trace", "2");

        let traces: Vec<_> = request
            .headers
            .iter()
            .filter(|h| h.is_named("X-TRACE"))
            .map(|h| h.value.as_str())
            .collect();
        assert_eq!(traces, vec!["1", "2"]);
        assert_eq!(request.headers.len(), 3);
    }

    #[test]
    fn test_output_stream_appends() {
        let mut response = StumpsHttpResponse::default();
        response.output_stream().write_all(b"hel").unwrap();
        response.output_stream().write_all(b"lo").unwrap();
        assert_eq!(response.body(), b"hello");

        response.clear_body();
        assert!(response.body().is_empty());
    }

    #[test]
    fn test_response_defaults() {
        let response = StumpsHttpResponse::default();
        assert_eq!(response.status_code, 200);
        assert_eq!(response.origin, HttpResponseOrigin::Unprocessed);
        assert!(!response.send_chunked);
        assert!(response.content_type.is_none());
    }
}
