use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Outcome of fetching one page.
///
/// Exactly one of `html` and `error` is set. Use [`PageFetchResult::success`]
/// and [`PageFetchResult::with_error`] to keep that invariant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageFetchResult {
    pub url: String,
    pub status_code: u16,
    pub html: Option<String>,
    /// Lower-cased header names; repeated headers joined with ", ".
    pub headers: HashMap<String, String>,
    pub load_time_ms: u64,
    pub content_length: u64,
    pub error: Option<String>,
}

impl PageFetchResult {
    pub fn success(
        url: String,
        status_code: u16,
        html: String,
        headers: HashMap<String, String>,
        load_time_ms: u64,
    ) -> Self {
        let content_length = html.len() as u64;
        Self {
            url,
            status_code,
            html: Some(html),
            headers,
            load_time_ms,
            content_length,
            error: None,
        }
    }

    pub fn with_error(url: String, error: String) -> Self {
        Self {
            url,
            status_code: 0,
            html: None,
            headers: HashMap::new(),
            load_time_ms: 0,
            content_length: 0,
            error: Some(error),
        }
    }

    pub fn with_status(mut self, status_code: u16) -> Self {
        self.status_code = status_code;
        self
    }

    pub fn with_load_time(mut self, load_time_ms: u64) -> Self {
        self.load_time_ms = load_time_ms;
        self
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }
}

/// Result of a lightweight existence check on a link.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkProbe {
    pub url: String,
    /// Status of the last response in the chain, if any response came back.
    pub status_code: Option<u16>,
    /// Number of redirect hops followed before the final response.
    pub redirects: usize,
    pub final_url: String,
    pub error: Option<String>,
}

impl LinkProbe {
    pub fn new(url: String, status_code: u16, redirects: usize, final_url: String) -> Self {
        Self {
            url,
            status_code: Some(status_code),
            redirects,
            final_url,
            error: None,
        }
    }

    pub fn with_error(url: String, redirects: usize, error: String) -> Self {
        Self {
            final_url: url.clone(),
            url,
            status_code: None,
            redirects,
            error: Some(error),
        }
    }

    pub fn is_broken(&self) -> bool {
        self.error.is_some() || self.status_code.is_none_or(|code| code >= 400)
    }
}
