//! HTTP context abstraction shared by the pipeline, the rule engine and the
//! listener.
//!
//! # Module Structure
//!
//! - `header` - `HttpHeader` and the case-insensitive `HeaderCollection`
//! - `context` - Request, response and per-request context types
//! - `hyper_ext` - Conversions to and from hyper messages

mod context;
mod header;
mod hyper_ext;

pub use context::{HttpResponseOrigin, StumpsHttpContext, StumpsHttpRequest, StumpsHttpResponse};
pub use header::{HeaderCollection, HttpHeader};
pub use hyper_ext::{read_request, IntoHyperResponse};
