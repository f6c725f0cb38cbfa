//! Request pipeline.
//!
//! Every stage of request processing (Stump replay, forwarding, fallbacks)
//! is an [`HttpHandler`]. Handlers run in registration order and the first
//! one returning [`ProcessHandlerResult::Terminate`] ends the run.
//!
//! # Module Structure
//!
//! - `pipeline` - `HttpPipeline`, the ordered handler chain
//! - `stumps_handler` - Replays the first matching Stump
//! - `not_found` - Terminal 404 stage

mod not_found;
#[allow(clippy::module_inception)]
mod pipeline;
mod stumps_handler;


use crate::encoding::EncodingError;
use crate::http::StumpsHttpContext;
use thiserror::Error;

pub use not_found::NotFoundHandler;
pub use pipeline::HttpPipeline;
pub use stumps_handler::{populate_response, StumpsHandler};

/// Outcome of a single handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessHandlerResult {
    /// Let the next handler look at the request
    Continue,
    /// A response has been written; stop the pipeline
    Terminate,
}

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("Illegal argument: {0}")]
    IllegalArgument(String),
    #[error(transparent)]
    Encoding(#[from] EncodingError),
    #[error("Failed to write response body: {0}")]
    Io(#[from] std::io::Error),
}

/// A pipeline stage.
pub trait HttpHandler: Send + Sync {
    fn process_request(
        &self,
        context: &mut StumpsHttpContext,
    ) -> Result<ProcessHandlerResult, HandlerError>;
}
