pub mod config;
pub mod logging;

pub mod checksum;
pub mod downloader;
pub mod error;
pub mod fetch_head;
pub mod fetcher;
pub mod flight;
pub mod orchestrator;
pub mod probe;
pub mod resource;
pub mod storage;
pub mod transport;
pub mod validator;

#[cfg(test)]
pub(crate) mod test_support;

pub use checksum::Digest;
pub use error::{CacheError, NetworkError};
pub use orchestrator::{AssetConsumer, Orchestrator, ServeOrigin, Served};
pub use resource::Resource;
pub use validator::ValidationOutcome;
