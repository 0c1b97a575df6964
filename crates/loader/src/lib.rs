//! Network and cache plumbing for the story deck: metadata listing, image
//! bytes, the per-element fetch slots frontends drive once per frame, and
//! the startup configuration both frontends share.

pub mod cache;
pub mod config;
pub mod error;
pub mod loader;
pub mod task;
pub mod transport;

pub use cache::{CacheKey, ResponseCache};
pub use config::{AppConfig, ConfigError, LoaderConfig};
pub use error::LoaderError;
pub use loader::ResourceLoader;
pub use task::{FetchResult, FetchSlot, Fetcher, Inbox};
pub use transport::{HttpResponse, ReqwestTransport, Transport};
