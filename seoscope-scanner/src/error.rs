use thiserror::Error;

/// Failures that stop discovery or client setup. Per-page fetch failures are
/// values on [`crate::PageFetchResult`], not errors.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("could not build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("invalid seed URL {0}")]
    InvalidUrl(String),

    #[error("bad selector: {0}")]
    Selector(String),
}

pub type Result<T> = std::result::Result<T, ScanError>;
