use super::{Check, PageSnapshot};
use crate::config::CheckConfig;
use crate::error::CheckError;
use crate::model::{Category, Issue, Severity};
use async_trait::async_trait;
use std::sync::Arc;

const CACHING_HEADERS: [&str; 4] = ["cache-control", "expires", "etag", "last-modified"];

/// Load time, page weight and caching headers.
pub struct PerformanceCheck {
    config: Arc<CheckConfig>,
}

impl PerformanceCheck {
    pub fn new(config: Arc<CheckConfig>) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Check for PerformanceCheck {
    fn category(&self) -> Category {
        Category::Performance
    }

    async fn run(&self, page: &PageSnapshot) -> Result<Vec<Issue>, CheckError> {
        Ok(check_performance(page, &self.config))
    }
}

pub fn check_performance(page: &PageSnapshot, config: &CheckConfig) -> Vec<Issue> {
    let url = page.url.as_str();
    let mut issues = Vec::new();

    if page.load_time_ms > config.very_slow_load_ms {
        issues.push(
            Issue::new(Category::Performance, Severity::Error, "Very slow page load", url)
                .with_value(format!("{}ms", page.load_time_ms)),
        );
    } else if page.load_time_ms > config.slow_load_ms {
        issues.push(
            Issue::new(Category::Performance, Severity::Warning, "Slow page load", url)
                .with_value(format!("{}ms", page.load_time_ms)),
        );
    }

    if page.content_length > config.large_page_bytes {
        issues.push(
            Issue::new(Category::Performance, Severity::Warning, "Large page size", url)
                .with_value(format!("{} bytes", page.content_length)),
        );
    }

    if CACHING_HEADERS.iter().all(|name| page.header(name).is_none()) {
        issues.push(Issue::new(
            Category::Performance,
            Severity::Warning,
            "No caching headers",
            url,
        ));
    }

    if let Some(cache_control) = page.header("cache-control")
        && cache_control.to_ascii_lowercase().contains("no-store")
    {
        issues.push(
            Issue::new(Category::Performance, Severity::Info, "Caching disabled by no-store", url)
                .with_value(cache_control.to_string()),
        );
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn page(load_time_ms: u64, content_length: u64, headers: &[(&str, &str)]) -> PageSnapshot {
        PageSnapshot {
            url: "https://example.com/".to_string(),
            status_code: 200,
            html: String::new(),
            headers: headers
                .iter()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect::<HashMap<_, _>>(),
            load_time_ms,
            content_length,
        }
    }

    #[test]
    fn test_fast_cached_page_is_clean() {
        let issues = check_performance(
            &page(120, 4096, &[("cache-control", "max-age=300")]),
            &CheckConfig::default(),
        );
        assert!(issues.is_empty());
    }

    #[test]
    fn test_load_time_thresholds() {
        let config = CheckConfig::default();
        let slow = check_performance(&page(3500, 10, &[("etag", "\"a\"")]), &config);
        assert_eq!(slow.len(), 1);
        assert_eq!(slow[0].severity, Severity::Warning);

        let very_slow = check_performance(&page(6000, 10, &[("etag", "\"a\"")]), &config);
        assert_eq!(very_slow.len(), 1);
        assert_eq!(very_slow[0].severity, Severity::Error);
        assert_eq!(very_slow[0].value.as_deref(), Some("6000ms"));
    }

    #[test]
    fn test_size_and_caching_headers() {
        let config = CheckConfig::default();
        let issues = check_performance(&page(10, 3 * 1024 * 1024, &[]), &config);
        let messages: Vec<&str> = issues.iter().map(|issue| issue.message.as_str()).collect();
        assert_eq!(messages, vec!["Large page size", "No caching headers"]);

        let no_store = check_performance(&page(10, 10, &[("cache-control", "no-store")]), &config);
        assert_eq!(no_store.len(), 1);
        assert_eq!(no_store[0].severity, Severity::Info);
    }
}
