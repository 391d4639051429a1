//! Run configuration and its clamping rules.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

pub const DEFAULT_MAX_PAGES: usize = 25;
pub const MAX_PAGES_LIMIT: usize = 100;
pub const DEFAULT_MAX_CONCURRENCY: usize = 10;
pub const MAX_CONCURRENCY_LIMIT: usize = 50;

pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_INITIAL_WAIT_MS: u64 = 1000;
pub const DEFAULT_BACKOFF_SCALING: f64 = 2.0;

pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// One audit invocation. Build it with [`AuditRequest::new`] so the bounds
/// are clamped into range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRequest {
    pub url: String,
    pub max_pages: usize,
    pub max_concurrency: usize,
}

impl AuditRequest {
    pub fn new(url: impl Into<String>, max_pages: i64, max_concurrency: i64) -> Self {
        Self {
            url: url.into(),
            max_pages: clamp(max_pages, 1, MAX_PAGES_LIMIT),
            max_concurrency: clamp(max_concurrency, 1, MAX_CONCURRENCY_LIMIT),
        }
    }

    pub fn with_defaults(url: impl Into<String>) -> Self {
        Self::new(url, DEFAULT_MAX_PAGES as i64, DEFAULT_MAX_CONCURRENCY as i64)
    }

    /// Rejects seeds that are not absolute http(s) URLs with a host.
    pub fn validate(&self) -> Result<Url, ConfigError> {
        let parsed = Url::parse(&self.url)
            .map_err(|e| ConfigError::InvalidSeed(self.url.clone(), e.to_string()))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(ConfigError::InvalidSeed(
                self.url.clone(),
                format!("unsupported scheme '{}'", parsed.scheme()),
            ));
        }
        if parsed.host_str().is_none() {
            return Err(ConfigError::InvalidSeed(self.url.clone(), "missing host".to_string()));
        }
        Ok(parsed)
    }
}

fn clamp(value: i64, min: usize, max: usize) -> usize {
    value.clamp(min as i64, max as i64) as usize
}

/// Per-item retry schedule: `wait(attempt) = initial_wait_ms * backoff_scaling^attempt`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    pub initial_wait_ms: u64,
    pub backoff_scaling: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            initial_wait_ms: DEFAULT_INITIAL_WAIT_MS,
            backoff_scaling: DEFAULT_BACKOFF_SCALING,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, initial_wait_ms: u64, backoff_scaling: f64) -> Result<Self, ConfigError> {
        if !backoff_scaling.is_finite() || backoff_scaling < 0.0 {
            return Err(ConfigError::InvalidRetryPolicy(format!(
                "backoff scaling must be a non-negative number, got {}",
                backoff_scaling
            )));
        }
        Ok(Self {
            max_retries,
            initial_wait_ms,
            backoff_scaling,
        })
    }

    /// No retries at all.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            initial_wait_ms: 0,
            backoff_scaling: 1.0,
        }
    }

    pub fn wait(&self, attempt: u32) -> Duration {
        let millis = self.initial_wait_ms as f64 * self.backoff_scaling.powi(attempt as i32);
        // `as` saturates, so huge or NaN products cannot overflow.
        Duration::from_millis(millis as u64)
    }

    /// The delay before each retry, in order. Its length is `max_retries`.
    pub fn delays(&self) -> impl Iterator<Item = Duration> + Send + 'static {
        let policy = *self;
        (0..policy.max_retries).map(move |attempt| policy.wait(attempt))
    }
}

/// Thresholds used by the check set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckConfig {
    pub title_min_len: usize,
    pub title_max_len: usize,
    pub description_min_len: usize,
    pub description_max_len: usize,
    pub max_links_per_page: usize,
    pub link_check_concurrency: usize,
    pub max_redirects: usize,
    pub max_image_bytes: usize,
    pub max_image_dimension: u32,
    pub slow_load_ms: u64,
    pub very_slow_load_ms: u64,
    pub large_page_bytes: u64,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            title_min_len: 10,
            title_max_len: 60,
            description_min_len: 50,
            description_max_len: 160,
            max_links_per_page: 50,
            link_check_concurrency: 10,
            max_redirects: 2,
            max_image_bytes: 100 * 1024,
            max_image_dimension: 2500,
            slow_load_ms: 3000,
            very_slow_load_ms: 5000,
            large_page_bytes: 2 * 1024 * 1024,
        }
    }
}

/// Everything a run needs besides the request itself.
#[derive(Debug, Clone)]
pub struct AuditOptions {
    pub retry: RetryPolicy,
    pub checks: CheckConfig,
    pub timeout_secs: u64,
    pub use_sitemap: bool,
    pub show_progress_bars: bool,
}

impl Default for AuditOptions {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::default(),
            checks: CheckConfig::default(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            use_sitemap: true,
            show_progress_bars: false,
        }
    }
}
