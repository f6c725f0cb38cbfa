// Library exports for the binary, integration tests and benchmarks

// ===== Request model and matching =====
pub mod encoding;
pub mod http;
pub mod predicate;
pub mod stump;

// ===== Proxy instance state and processing =====
pub mod environment;
pub mod pipeline;
pub mod recording;
pub mod server;

// ===== Persistence =====
pub mod config;

pub use environment::ProxyEnvironment;
pub use server::ProxyServer;
