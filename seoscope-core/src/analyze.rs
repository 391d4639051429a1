use crate::checks::{CheckSet, PageSnapshot};
use crate::model::PageResult;
use seoscope_scanner::Fetcher;
use std::sync::Arc;
use tracing::debug;

/// Fetches one page and runs the check set over it.
#[derive(Clone)]
pub struct PageAnalyzer {
    fetcher: Arc<dyn Fetcher>,
    checks: Arc<CheckSet>,
}

impl PageAnalyzer {
    pub fn new(fetcher: Arc<dyn Fetcher>, checks: Arc<CheckSet>) -> Self {
        Self { fetcher, checks }
    }

    /// A failed fetch comes back as a result with `error` set and no issues.
    pub async fn analyze(&self, url: &str) -> PageResult {
        let fetched = self.fetcher.fetch(url).await;
        let status_code = fetched.status_code;
        let load_time_ms = fetched.load_time_ms;
        let fetch_error = fetched.error.clone();

        let Some(page) = PageSnapshot::from_fetch(fetched) else {
            let error = fetch_error.unwrap_or_else(|| "empty response".to_string());
            debug!("Fetch failed for {}: {}", url, error);
            let mut result = PageResult::with_error(url.to_string(), error);
            result.status_code = status_code;
            result.load_time_ms = load_time_ms;
            return result;
        };

        let issues = self.checks.analyze(&page).await;
        debug!("{} issues on {}", issues.total(), url);

        PageResult {
            url: url.to_string(),
            status_code: page.status_code,
            issues,
            load_time_ms: page.load_time_ms,
            content_length: page.content_length,
            error: None,
            attempts: 1,
        }
    }

    /// Executor worker view: a fetch failure is an `Err` so it gets retried.
    pub async fn analyze_or_fail(&self, url: String) -> Result<PageResult, String> {
        let result = self.analyze(&url).await;
        match result.error {
            Some(error) => Err(error),
            None => Ok(result),
        }
    }
}
