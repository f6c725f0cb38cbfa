//! Configuration entities and their persistence.
//!
//! The configuration document lists every proxy instance together with the
//! Stumps it serves. Compiled state lives in [`ProxyEnvironment`]; the
//! entities here are the serialized form.
//!
//! [`ProxyEnvironment`]: crate::environment::ProxyEnvironment

mod data_access;
mod entities;

use crate::stump::StumpError;
use std::path::PathBuf;
use thiserror::Error;

pub use data_access::{ConfigurationDataAccess, JsonFileDataAccess};
pub use entities::{
    ConfigurationEntity, ProxyEntity, StumpEntity, DATA_COMPATIBILITY_VERSION,
    DEFAULT_WEB_API_PORT,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to access {0}: {1}")]
    Io(PathBuf, #[source] std::io::Error),
    #[error("Invalid configuration JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid Stump: {0}")]
    Stump(#[from] StumpError),
}
