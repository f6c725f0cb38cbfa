//! Stumps and the store that matches them against requests.
//!
//! # Module Structure
//!
//! - `types` - `Stump` and `StumpError`
//! - `store` - `StumpStore` with first-match lookup

mod store;
mod types;

pub use store::StumpStore;
pub use types::{Stump, StumpError};
