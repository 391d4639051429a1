//! The SEO check set.
//!
//! Each check looks at one fetched page and reports issues for its own
//! category. Checks share nothing, so the set runs them concurrently; a check
//! that errors or panics contributes no issues and leaves the others intact.

pub mod headings;
pub mod images;
pub mod links;
pub mod meta_tags;
pub mod performance;

use crate::config::CheckConfig;
use crate::error::CheckError;
use crate::model::{Category, CategoryMap, Issue};
use async_trait::async_trait;
use futures::FutureExt;
use futures::future::join_all;
use scraper::Selector;
use seoscope_scanner::{Fetcher, PageFetchResult};
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::warn;

pub use headings::HeadingsCheck;
pub use images::ImagesCheck;
pub use links::LinksCheck;
pub use meta_tags::MetaTagsCheck;
pub use performance::PerformanceCheck;

/// A successfully fetched page, as the checks see it.
#[derive(Debug, Clone, Default)]
pub struct PageSnapshot {
    pub url: String,
    pub status_code: u16,
    pub html: String,
    pub headers: HashMap<String, String>,
    pub load_time_ms: u64,
    pub content_length: u64,
}

impl PageSnapshot {
    /// `None` when the fetch failed.
    pub fn from_fetch(fetched: PageFetchResult) -> Option<Self> {
        let html = fetched.html?;
        Some(Self {
            url: fetched.url,
            status_code: fetched.status_code,
            html,
            headers: fetched.headers,
            load_time_ms: fetched.load_time_ms,
            content_length: fetched.content_length,
        })
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }
}

#[async_trait]
pub trait Check: Send + Sync {
    fn category(&self) -> Category;

    async fn run(&self, page: &PageSnapshot) -> Result<Vec<Issue>, CheckError>;
}

pub struct CheckSet {
    checks: Vec<Arc<dyn Check>>,
}

impl CheckSet {
    /// The five standard checks.
    pub fn standard(fetcher: Arc<dyn Fetcher>, config: CheckConfig) -> Self {
        let config = Arc::new(config);
        Self::with_checks(vec![
            Arc::new(MetaTagsCheck::new(config.clone())),
            Arc::new(LinksCheck::new(fetcher, config.clone())),
            Arc::new(HeadingsCheck::new()),
            Arc::new(ImagesCheck::new(config.clone())),
            Arc::new(PerformanceCheck::new(config)),
        ])
    }

    pub fn with_checks(checks: Vec<Arc<dyn Check>>) -> Self {
        Self { checks }
    }

    pub fn len(&self) -> usize {
        self.checks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }

    pub async fn analyze(&self, page: &PageSnapshot) -> CategoryMap<Vec<Issue>> {
        let runs = self.checks.iter().map(|check| async move {
            let category = check.category();
            let outcome = AssertUnwindSafe(check.run(page)).catch_unwind().await;
            let issues = match outcome {
                Ok(Ok(issues)) => issues,
                Ok(Err(e)) => {
                    warn!("{} check failed on {}: {}", category, page.url, e);
                    Vec::new()
                }
                Err(_) => {
                    warn!("{} check panicked on {}", category, page.url);
                    Vec::new()
                }
            };
            (category, issues)
        });

        let mut issues: CategoryMap<Vec<Issue>> = CategoryMap::default();
        for (category, found) in join_all(runs).await {
            issues.get_mut(category).extend(found);
        }
        issues
    }
}

pub(crate) fn selector(css: &str) -> Result<Selector, CheckError> {
    Selector::parse(css).map_err(|e| CheckError::Selector(format!("{}: {:?}", css, e)))
}

/// Text with runs of whitespace collapsed to single spaces.
pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
