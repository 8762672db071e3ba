//! Data engine: source resolution, retrieval, decoding, cleaning and caching.

pub mod cache;
pub mod decode;
pub mod loader;
pub mod sample;
pub mod source;

pub use cache::TableCache;
pub use loader::{LoadOutcome, Loader};
pub use source::{DataClient, DataSource};
