pub mod discover;
pub mod error;
pub mod fetcher;
pub mod normalize;
pub mod result;

pub use discover::Discoverer;
pub use error::ScanError;
pub use fetcher::{Fetcher, HttpFetcher};
pub use result::{LinkProbe, PageFetchResult};
