//! Content-Encoding codec.
//!
//! Recorded bodies are stored decoded. When a recorded response is replayed
//! the body is compressed again with the scheme named by its
//! `Content-Encoding` header.

use flate2::read::{DeflateDecoder, GzDecoder};
use flate2::write::{DeflateEncoder, GzEncoder};
use flate2::Compression;
use std::io::{Read, Write};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EncodingError {
    #[error("Unsupported content encoding: {0}")]
    UnsupportedEncodingKind(String),
    #[error("Failed to transcode body: {0}")]
    Io(#[from] std::io::Error),
}

/// Supported `Content-Encoding` schemes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentEncoding {
    Identity,
    Gzip,
    Deflate,
}

impl ContentEncoding {
    /// Resolve a `Content-Encoding` header value (case-insensitive).
    pub fn parse(scheme: &str) -> Result<Self, EncodingError> {
        let normalized = scheme.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "" | "identity" => Ok(Self::Identity),
            "gzip" | "x-gzip" => Ok(Self::Gzip),
            "deflate" => Ok(Self::Deflate),
            _ => Err(EncodingError::UnsupportedEncodingKind(scheme.to_string())),
        }
    }

    pub fn encode(&self, body: &[u8]) -> Result<Vec<u8>, EncodingError> {
        match self {
            Self::Identity => Ok(body.to_vec()),
            Self::Gzip => {
                let mut encoder =
                    GzEncoder::new(Vec::with_capacity(body.len()), Compression::default());
                encoder.write_all(body)?;
                Ok(encoder.finish()?)
            }
            Self::Deflate => {
                let mut encoder =
                    DeflateEncoder::new(Vec::with_capacity(body.len()), Compression::default());
                encoder.write_all(body)?;
                Ok(encoder.finish()?)
            }
        }
    }

    pub fn decode(&self, body: &[u8]) -> Result<Vec<u8>, EncodingError> {
        let mut decoded = Vec::with_capacity(body.len() * 2);
        match self {
            Self::Identity => return Ok(body.to_vec()),
            Self::Gzip => {
                GzDecoder::new(body).read_to_end(&mut decoded)?;
            }
            Self::Deflate => {
                DeflateDecoder::new(body).read_to_end(&mut decoded)?;
            }
        }
        Ok(decoded)
    }
}

/// Compress `body` using the scheme named by `scheme`.
pub fn encode(body: &[u8], scheme: &str) -> Result<Vec<u8>, EncodingError> {
    ContentEncoding::parse(scheme)?.encode(body)
}

/// Decompress `body` using the scheme named by `scheme`.
pub fn decode(body: &[u8], scheme: &str) -> Result<Vec<u8>, EncodingError> {
    ContentEncoding::parse(scheme)?.decode(body)
}
