use super::{Check, PageSnapshot, selector};
use crate::config::CheckConfig;
use crate::error::CheckError;
use crate::model::{Category, Issue, Severity};
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use scraper::Html;
use seoscope_scanner::normalize::{is_same_host, resolve_url};
use seoscope_scanner::{Fetcher, LinkProbe};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;
use url::Url;

/// Probes every outgoing anchor on the page.
pub struct LinksCheck {
    fetcher: Arc<dyn Fetcher>,
    config: Arc<CheckConfig>,
}

impl LinksCheck {
    pub fn new(fetcher: Arc<dyn Fetcher>, config: Arc<CheckConfig>) -> Self {
        Self { fetcher, config }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageLink {
    pub url: String,
    pub internal: bool,
}

impl PageLink {
    fn scope(&self) -> &'static str {
        if self.internal { "internal" } else { "external" }
    }
}

#[async_trait]
impl Check for LinksCheck {
    fn category(&self) -> Category {
        Category::Links
    }

    async fn run(&self, page: &PageSnapshot) -> Result<Vec<Issue>, CheckError> {
        let links = extract_links(page, self.config.max_links_per_page)?;
        debug!("Probing {} links on {}", links.len(), page.url);

        let probes: Vec<(PageLink, LinkProbe)> = stream::iter(links)
            .map(|link| {
                let fetcher = self.fetcher.clone();
                async move {
                    let probe = fetcher.probe(&link.url).await;
                    (link, probe)
                }
            })
            .buffered(self.config.link_check_concurrency.max(1))
            .collect()
            .await;

        Ok(probes
            .iter()
            .filter_map(|(link, probe)| link_issue(&page.url, link, probe, self.config.max_redirects))
            .collect())
    }
}

/// Distinct http(s) anchor targets in document order, at most `limit` of them.
pub fn extract_links(page: &PageSnapshot, limit: usize) -> Result<Vec<PageLink>, CheckError> {
    let base = Url::parse(&page.url).map_err(|e| CheckError::InvalidUrl(format!("{}: {}", page.url, e)))?;
    let host = base.host_str().unwrap_or_default().to_string();
    let document = Html::parse_document(&page.html);

    let mut seen = HashSet::new();
    let mut links = Vec::new();
    for element in document.select(&selector("a[href]")?) {
        if links.len() >= limit {
            break;
        }
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        let Some(resolved) = resolve_url(&base, href) else {
            continue;
        };
        if seen.insert(resolved.clone()) {
            let internal = is_same_host(&resolved, &host);
            links.push(PageLink {
                url: resolved,
                internal,
            });
        }
    }
    Ok(links)
}

fn link_issue(page_url: &str, link: &PageLink, probe: &LinkProbe, max_redirects: usize) -> Option<Issue> {
    if probe.is_broken() {
        let reason = match (&probe.error, probe.status_code) {
            (Some(error), _) => error.clone(),
            (None, Some(status)) => format!("HTTP {}", status),
            (None, None) => "no response".to_string(),
        };
        return Some(
            Issue::new(Category::Links, Severity::Error, "Broken link", page_url)
                .with_link(link.url.clone())
                .with_value(format!("{}: {}", link.scope(), reason)),
        );
    }

    if probe.redirects > max_redirects {
        return Some(
            Issue::new(Category::Links, Severity::Warning, "Long redirect chain", page_url)
                .with_link(link.url.clone())
                .with_value(format!("{}: {} redirects", link.scope(), probe.redirects)),
        );
    }

    None
}
