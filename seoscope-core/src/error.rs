use seoscope_scanner::ScanError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid seed URL '{0}': {1}")]
    InvalidSeed(String, String),

    #[error("Invalid retry policy: {0}")]
    InvalidRetryPolicy(String),
}

/// Raised by a single check. Never escapes page analysis.
#[derive(Error, Debug)]
pub enum CheckError {
    #[error("Selector error: {0}")]
    Selector(String),

    #[error("Invalid page URL: {0}")]
    InvalidUrl(String),

    #[error("{0}")]
    Other(String),
}

#[derive(Error, Debug)]
pub enum AuditError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Scanner error: {0}")]
    Scan(#[from] ScanError),
}

pub type Result<T> = std::result::Result<T, AuditError>;
