//! Conversions between hyper messages and the handler context types.

use super::context::{StumpsHttpRequest, StumpsHttpResponse};
use super::header::HttpHeader;
use http_body_util::{BodyExt, Full};
use hyper::body::{Body, Bytes};
use hyper::ext::ReasonPhrase;
use hyper::header::{CONTENT_TYPE, TRANSFER_ENCODING};
use hyper::{Request, Response, StatusCode};
use std::net::SocketAddr;
use tracing::debug;

/// Read a hyper request, buffering its body, into a [`StumpsHttpRequest`].
pub async fn read_request<B>(
    req: Request<B>,
    local_addr: Option<SocketAddr>,
    remote_addr: Option<SocketAddr>,
) -> Result<StumpsHttpRequest, B::Error>
where
    B: Body<Data = Bytes>,
{
    let (parts, body) = req.into_parts();
    let body = body.collect().await?.to_bytes();

    let headers = parts
        .headers
        .iter()
        .map(|(name, value)| {
            HttpHeader::new(
                name.as_str(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect();

    Ok(StumpsHttpRequest {
        method: parts.method.as_str().to_string(),
        raw_url: parts.uri.to_string(),
        protocol_version: format!("{:?}", parts.version),
        headers,
        body,
        local_addr,
        remote_addr,
    })
}

/// Extension trait turning a populated response into a hyper response.
pub trait IntoHyperResponse {
    fn into_hyper(self) -> Result<Response<Full<Bytes>>, hyper::http::Error>;
}

impl IntoHyperResponse for StumpsHttpResponse {
    fn into_hyper(self) -> Result<Response<Full<Bytes>>, hyper::http::Error> {
        let status = StatusCode::from_u16(self.status_code)?;
        let mut builder = Response::builder().status(status);

        for header in self.headers.iter() {
            builder = builder.header(header.name.as_str(), header.value.as_str());
        }

        if let Some(content_type) = self.content_type.as_deref() {
            builder = builder.header(CONTENT_TYPE, content_type);
        }

        if self.send_chunked {
            builder = builder.header(TRANSFER_ENCODING, "chunked");
        }

        let description = self.status_description.as_str();
        if !description.is_empty() && status.canonical_reason() != Some(description) {
            match ReasonPhrase::try_from(description.to_string()) {
                Ok(reason) => builder = builder.extension(reason),
                Err(_) => debug!("Dropping invalid reason phrase {:?}", description),
            }
        }

        builder.body(Full::new(Bytes::from(self.into_body())))
    }
}
