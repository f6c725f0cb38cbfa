//! Recorded traffic.
//!
//! `RecordedResponse` is the payload replayed by Stumps. In record mode the
//! listener also captures every request/response pair into `Recordings` so
//! that Stumps can be authored from real traffic later.
//!
//! # Module Structure
//!
//! - `types` - Response, request and context snapshots
//! - `store` - Recording store implementation

mod store;
mod types;

pub use store::Recordings;
pub use types::{RecordedContext, RecordedRequest, RecordedResponse};
