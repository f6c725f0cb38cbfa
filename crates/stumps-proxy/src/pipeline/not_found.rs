//! Terminal stage answering 404 for requests nothing else handled.

use super::{HandlerError, HttpHandler, ProcessHandlerResult};
use crate::http::{HttpResponseOrigin, StumpsHttpContext};
use tracing::debug;

#[derive(Debug, Default, Clone, Copy)]
pub struct NotFoundHandler;

impl HttpHandler for NotFoundHandler {
    fn process_request(
        &self,
        context: &mut StumpsHttpContext,
    ) -> Result<ProcessHandlerResult, HandlerError> {
        debug!(
            "No handler for {} {}, returning 404",
            context.request.method, context.request.raw_url
        );

        let response = &mut context.response;
        response.status_code = 404;
        response.status_description = "Not Found".to_string();
        response.headers.clear();
        response.content_type = None;
        response.send_chunked = false;
        response.clear_body();
        response.origin = HttpResponseOrigin::NotFoundResponse;

        Ok(ProcessHandlerResult::Terminate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::StumpsHttpRequest;

    #[test]
    fn test_not_found_terminates() {
        let mut context = StumpsHttpContext::new(StumpsHttpRequest::new("GET", "/missing"));
        context.response.headers.set("X-Stale", "1");

        let result = NotFoundHandler.process_request(&mut context).unwrap();

        assert_eq!(result, ProcessHandlerResult::Terminate);
        assert_eq!(context.response.status_code, 404);
        assert_eq!(context.response.origin, HttpResponseOrigin::NotFoundResponse);
        assert!(context.response.headers.is_empty());
    }
}
