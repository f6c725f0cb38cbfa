//! Immutable snapshots of requests and responses.
//!
//! Bodies are stored decoded: if the live message carried a
//! `Content-Encoding` header the body is decompressed at capture time, and
//! compressed again when a recorded response is replayed.

use crate::encoding::{self, EncodingError};
use crate::http::{HttpHeader, StumpsHttpRequest, StumpsHttpResponse};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

const CONTENT_ENCODING: &str = "content-encoding";

/// Serialize bodies as base64 strings so binary payloads survive JSON.
mod body_base64 {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use bytes::Bytes;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(body: &Bytes, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(body))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Bytes, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map(Bytes::from)
            .map_err(serde::de::Error::custom)
    }
}

fn decode_body(headers: &[HttpHeader], body: &[u8]) -> Result<Bytes, EncodingError> {
    // Last occurrence wins, matching how the replay side builds its header map
    match headers.iter().rev().find(|h| h.is_named(CONTENT_ENCODING)) {
        Some(header) => Ok(Bytes::from(encoding::decode(body, &header.value)?)),
        None => Ok(Bytes::copy_from_slice(body)),
    }
}

/// Snapshot of an HTTP response, used as a Stump payload and in recordings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordedResponse {
    status_code: u16,
    status_description: String,
    #[serde(default)]
    headers: Vec<HttpHeader>,
    #[serde(default, with = "body_base64")]
    body: Bytes,
}

impl RecordedResponse {
    /// Build a response from already-decoded parts.
    pub fn new(
        status_code: u16,
        status_description: impl Into<String>,
        headers: Vec<HttpHeader>,
        body: impl Into<Bytes>,
    ) -> Self {
        Self {
            status_code,
            status_description: status_description.into(),
            headers,
            body: body.into(),
        }
    }

    /// Capture a live response. The content-type field and chunked flag are
    /// folded back into the header list.
    pub fn from_response(response: &StumpsHttpResponse) -> Result<Self, EncodingError> {
        let mut headers = response.headers.to_vec();
        if let Some(content_type) = response.content_type.as_deref() {
            headers.push(HttpHeader::new("Content-Type", content_type));
        }
        if response.send_chunked {
            headers.push(HttpHeader::new("Transfer-Encoding", "chunked"));
        }

        let body = decode_body(&headers, response.body())?;
        Ok(Self {
            status_code: response.status_code,
            status_description: response.status_description.clone(),
            headers,
            body,
        })
    }

    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    pub fn status_description(&self) -> &str {
        &self.status_description
    }

    pub fn headers(&self) -> &[HttpHeader] {
        &self.headers
    }

    /// Decoded body bytes.
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// First header with the given name (case-insensitive).
    pub fn find_header(&self, name: &str) -> Option<&HttpHeader> {
        self.headers.iter().find(|h| h.is_named(name))
    }

    /// Status codes outside the three-digit range cannot be written back.
    pub fn is_valid(&self) -> bool {
        (100..=999).contains(&self.status_code)
    }
}

/// Snapshot of an inbound request, taken when it was received.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordedRequest {
    method: String,
    protocol_version: String,
    raw_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    local_addr: Option<SocketAddr>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    remote_addr: Option<SocketAddr>,
    #[serde(default)]
    headers: Vec<HttpHeader>,
    #[serde(default, with = "body_base64")]
    body: Bytes,
}

impl RecordedRequest {
    pub fn from_request(request: &StumpsHttpRequest) -> Result<Self, EncodingError> {
        Ok(Self {
            method: request.method.clone(),
            protocol_version: request.protocol_version.clone(),
            raw_url: request.raw_url.clone(),
            local_addr: request.local_addr,
            remote_addr: request.remote_addr,
            headers: request.headers.clone(),
            body: decode_body(&request.headers, &request.body)?,
        })
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn protocol_version(&self) -> &str {
        &self.protocol_version
    }

    pub fn raw_url(&self) -> &str {
        &self.raw_url
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    pub fn remote_addr(&self) -> Option<SocketAddr> {
        self.remote_addr
    }

    pub fn headers(&self) -> &[HttpHeader] {
        &self.headers
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn find_header(&self, name: &str) -> Option<&HttpHeader> {
        self.headers.iter().find(|h| h.is_named(name))
    }
}

/// A captured request/response pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordedContext {
    pub request: RecordedRequest,
    pub response: RecordedResponse,
    pub recorded_at: DateTime<Utc>,
}

impl RecordedContext {
    pub fn new(request: RecordedRequest, response: RecordedResponse) -> Self {
        Self {
            request,
            response,
            recorded_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_from_response_decodes_body() {
        let mut live = StumpsHttpResponse::default();
        live.content_type = Some("text/plain".to_string());
        live.headers.set("Content-Encoding", "gzip");
        let compressed = encoding::encode(b"hello", "gzip").unwrap();
        live.output_stream().write_all(&compressed).unwrap();

        let recorded = RecordedResponse::from_response(&live).unwrap();
        assert_eq!(recorded.body(), &Bytes::from("hello"));
        assert_eq!(
            recorded.find_header("content-type").map(|h| h.value.as_str()),
            Some("text/plain")
        );
        assert!(recorded.find_header("content-encoding").is_some());
    }

    #[test]
    fn test_from_response_keeps_chunked_flag() {
        let mut live = StumpsHttpResponse::default();
        live.send_chunked = true;
        let recorded = RecordedResponse::from_response(&live).unwrap();
        assert_eq!(
            recorded.find_header("transfer-encoding").map(|h| h.value.as_str()),
            Some("chunked")
        );
    }

    #[test]
    fn test_from_response_unsupported_encoding() {
        let mut live = StumpsHttpResponse::default();
        live.headers.set("Content-Encoding", "br");
        live.output_stream().write_all(b"xx").unwrap();
        assert!(matches!(
            RecordedResponse::from_response(&live),
            Err(EncodingError::UnsupportedEncodingKind(_))
        ));
    }

    #[test]
    fn test_recorded_request_snapshot() {
        let addr: SocketAddr = "127.0.0.1:9000".parse().unwrap();
        let mut request = StumpsHttpRequest::new("PUT", "/items/1")
            .with_header("Content-Encoding", "deflate")
            .with_body(encoding::encode(b"payload", "deflate").unwrap());
        request.remote_addr = Some(addr);

        let recorded = RecordedRequest::from_request(&request).unwrap();
        assert_eq!(recorded.method(), "PUT");
        assert_eq!(recorded.raw_url(), "/items/1");
        assert_eq!(recorded.protocol_version(), "HTTP/1.1");
        assert_eq!(recorded.remote_addr(), Some(addr));
        assert_eq!(recorded.body(), &Bytes::from("payload"));
    }

    #[test]
    fn test_recorded_response_json_uses_base64_body() {
        let response = RecordedResponse::new(
            200,
            "OK",
            vec![HttpHeader::new("Content-Type", "application/octet-stream")],
            vec![0u8, 159, 146, 150],
        );

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["statusCode"], 200);
        assert_eq!(json["body"], "AJ+Slg==");

        let parsed: RecordedResponse = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, response);
    }

    #[test]
    fn test_is_valid() {
        assert!(RecordedResponse::new(204, "No Content", vec![], Bytes::new()).is_valid());
        assert!(!RecordedResponse::new(0, "", vec![], Bytes::new()).is_valid());
    }
}
