//! Ordered handler chain.

use super::{HandlerError, HttpHandler, ProcessHandlerResult};
use crate::http::StumpsHttpContext;
use std::sync::Arc;
use tracing::trace;

/// Runs handlers in the order they were added, stopping at the first
/// `Terminate`.
///
/// A pipeline is itself a handler, so pipelines can be nested.
#[derive(Default, Clone)]
pub struct HttpPipeline {
    handlers: Vec<Arc<dyn HttpHandler>>,
}

impl HttpPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a handler to the end of the chain.
    pub fn add_handler(&mut self, handler: Arc<dyn HttpHandler>) {
        self.handlers.push(handler);
    }

    /// Builder-style variant of [`add_handler`](Self::add_handler).
    pub fn with_handler(mut self, handler: impl HttpHandler + 'static) -> Self {
        self.handlers.push(Arc::new(handler));
        self
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl HttpHandler for HttpPipeline {
    fn process_request(
        &self,
        context: &mut StumpsHttpContext,
    ) -> Result<ProcessHandlerResult, HandlerError> {
        for (index, handler) in self.handlers.iter().enumerate() {
            if handler.process_request(context)? == ProcessHandlerResult::Terminate {
                trace!("Pipeline terminated at handler #{}", index);
                return Ok(ProcessHandlerResult::Terminate);
            }
        }
        Ok(ProcessHandlerResult::Continue)
    }
}
