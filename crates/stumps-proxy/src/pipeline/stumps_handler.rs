//! Pipeline stage that replays Stumps.

use super::{HandlerError, HttpHandler, ProcessHandlerResult};
use crate::encoding;
use crate::environment::ProxyEnvironment;
use crate::http::{HeaderCollection, HttpResponseOrigin, StumpsHttpContext, StumpsHttpResponse};
use crate::recording::RecordedResponse;
use std::io::Write;
use std::sync::Arc;
use tracing::debug;

/// Headers the transport either recomputes or models separately.
const STRIPPED_HEADERS: [&str; 4] = [
    "content-length",
    "content-type",
    "transfer-encoding",
    "keep-alive",
];

/// Write a recorded response onto the live response.
///
/// Status and description are copied verbatim. Recorded headers collapse
/// into one value per name (the last duplicate wins). `content-type` moves
/// to the dedicated field, `transfer-encoding: chunked` sets the chunked
/// flag, and the stripped headers are dropped. The body is compressed again
/// when the recorded headers name a `content-encoding`.
pub fn populate_response(
    response: &mut StumpsHttpResponse,
    recorded: &RecordedResponse,
) -> Result<(), HandlerError> {
    if !recorded.is_valid() {
        return Err(HandlerError::IllegalArgument(format!(
            "recorded response has invalid status code {}",
            recorded.status_code()
        )));
    }

    response.status_code = recorded.status_code();
    response.status_description = recorded.status_description().to_string();

    let mut headers: HeaderCollection = recorded.headers().iter().collect();
    response.headers.clear();

    response.content_type = headers.get("content-type").map(str::to_string);
    response.send_chunked = headers
        .get("transfer-encoding")
        .is_some_and(|v| v.eq_ignore_ascii_case("chunked"));

    for name in STRIPPED_HEADERS {
        headers.remove(name);
    }

    for header in headers.iter() {
        response.headers.set(header.name.clone(), header.value.clone());
    }

    match headers.get("content-encoding") {
        Some(scheme) => {
            let encoded = encoding::encode(recorded.body(), scheme)?;
            response.output_stream().write_all(&encoded)?;
        }
        None => response.output_stream().write_all(recorded.body())?,
    }

    Ok(())
}

/// Serves the first matching Stump unless the environment is recording.
pub struct StumpsHandler {
    environment: Arc<ProxyEnvironment>,
}

impl StumpsHandler {
    pub fn new(environment: Arc<ProxyEnvironment>) -> Self {
        Self { environment }
    }
}

impl HttpHandler for StumpsHandler {
    fn process_request(
        &self,
        context: &mut StumpsHttpContext,
    ) -> Result<ProcessHandlerResult, HandlerError> {
        // Recording sessions must see the origin's traffic unmodified
        if self.environment.record_traffic() {
            return Ok(ProcessHandlerResult::Continue);
        }

        let Some(stump) = self.environment.stumps().find_stump(&context.request) else {
            return Ok(ProcessHandlerResult::Continue);
        };

        populate_response(&mut context.response, stump.response())?;
        context.response.origin = HttpResponseOrigin::Stump;
        self.environment.increment_stumps_served();
        debug!(
            "Served Stump '{}' for {} {}",
            stump.id(),
            context.request.method,
            context.request.raw_url
        );

        Ok(ProcessHandlerResult::Terminate)
    }
}
