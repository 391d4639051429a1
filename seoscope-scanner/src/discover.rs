use crate::error::{Result, ScanError};
use crate::fetcher::Fetcher;
use crate::normalize::{is_asset, is_same_host, normalize_url, resolve_url};
use scraper::{Html, Selector};
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use tracing::{debug, info, warn};
use url::Url;

const MAX_CHILD_SITEMAPS: usize = 5;

pub type DiscoveryCallback = Arc<dyn Fn(String) + Send + Sync>;

/// Ordered, deduplicated set of discovered pages, bounded by `limit`.
struct PageSet {
    order: Vec<String>,
    seen: HashSet<String>,
    limit: usize,
}

impl PageSet {
    fn new(limit: usize) -> Self {
        Self {
            order: Vec::new(),
            seen: HashSet::new(),
            limit,
        }
    }

    fn is_full(&self) -> bool {
        self.order.len() >= self.limit
    }

    fn insert(&mut self, url: String) -> bool {
        if self.is_full() || self.seen.contains(&url) {
            return false;
        }
        self.seen.insert(url.clone());
        self.order.push(url);
        true
    }

    fn len(&self) -> usize {
        self.order.len()
    }
}

/// Produces the list of pages to audit for a seed URL.
///
/// A sitemap at `/sitemap.xml` is tried first. When it is missing or lists
/// nothing on the seed host, same-host links are followed breadth-first from
/// the seed until `max_pages` URLs are known or the frontier runs dry. A seed
/// that does not answer yields no pages at all.
pub struct Discoverer {
    fetcher: Arc<dyn Fetcher>,
    max_pages: usize,
    use_sitemap: bool,
    progress_callback: Option<DiscoveryCallback>,
}

impl Discoverer {
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            fetcher,
            max_pages: 25,
            use_sitemap: true,
            progress_callback: None,
        }
    }

    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages;
        self
    }

    pub fn with_sitemap(mut self, use_sitemap: bool) -> Self {
        self.use_sitemap = use_sitemap;
        self
    }

    pub fn with_progress_callback(mut self, callback: DiscoveryCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    pub async fn discover(&self, seed: &str) -> Result<Vec<String>> {
        let seed_url = Url::parse(seed)
            .map_err(|e| ScanError::InvalidUrl(format!("{}: {}", seed, e)))?;
        let normalized_seed = normalize_url(seed_url.as_str())
            .ok_or_else(|| ScanError::InvalidUrl(format!("{}: not an http(s) URL", seed)))?;
        let host = seed_url
            .host_str()
            .ok_or_else(|| ScanError::InvalidUrl(format!("{}: URL has no host", seed)))?
            .to_string();

        if self.max_pages == 0 {
            return Ok(Vec::new());
        }

        info!("Discovering up to {} pages from {}", self.max_pages, normalized_seed);

        let fetched = self.fetcher.fetch(&normalized_seed).await;
        let Some(seed_html) = fetched.html else {
            warn!(
                "Seed {} is unreachable: {}",
                normalized_seed,
                fetched.error.unwrap_or_default()
            );
            return Ok(Vec::new());
        };

        let mut pages = PageSet::new(self.max_pages);
        pages.insert(normalized_seed.clone());

        if self.use_sitemap {
            for entry in self.sitemap_urls(&seed_url).await {
                if pages.is_full() {
                    break;
                }
                if is_same_host(&entry, &host) && pages.insert(entry.clone()) {
                    self.report(&entry);
                }
            }

            if pages.len() > 1 {
                info!("Sitemap provided {} pages", pages.len());
                return Ok(pages.order);
            }
            debug!("No usable sitemap for {}, following links", host);
        }

        self.follow_links(normalized_seed, seed_html, &host, pages).await
    }

    /// Breadth-first expansion from the already fetched seed.
    async fn follow_links(
        &self,
        seed: String,
        seed_html: String,
        host: &str,
        mut pages: PageSet,
    ) -> Result<Vec<String>> {
        let mut frontier = VecDeque::new();
        self.expand(&seed_html, &seed, host, &mut pages, &mut frontier)?;

        while !pages.is_full()
            && let Some(url) = frontier.pop_front()
        {
            let fetched = self.fetcher.fetch(&url).await;
            let Some(html) = fetched.html else {
                debug!("Not expanding unreachable page {} during discovery", url);
                continue;
            };
            self.expand(&html, &url, host, &mut pages, &mut frontier)?;
        }

        info!("Link following discovered {} pages", pages.len());
        Ok(pages.order)
    }

    fn expand(
        &self,
        html: &str,
        url: &str,
        host: &str,
        pages: &mut PageSet,
        frontier: &mut VecDeque<String>,
    ) -> Result<()> {
        for link in extract_same_host_links(html, url, host)? {
            if pages.is_full() {
                break;
            }
            if pages.insert(link.clone()) {
                self.report(&link);
                frontier.push_back(link);
            }
        }
        Ok(())
    }

    async fn sitemap_urls(&self, seed: &Url) -> Vec<String> {
        let Ok(sitemap) = seed.join("/sitemap.xml") else {
            return Vec::new();
        };

        let fetched = self.fetcher.fetch(sitemap.as_str()).await;
        let Some(body) = fetched.html else {
            debug!("No sitemap at {}", sitemap);
            return Vec::new();
        };

        let parsed = match parse_sitemap(&body) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!("Ignoring unreadable sitemap {}: {}", sitemap, e);
                return Vec::new();
            }
        };

        let host = seed.host_str().unwrap_or_default();
        let mut entries = parsed.pages;
        for child in parsed
            .children
            .into_iter()
            .filter(|child| is_same_host(child, host))
            .take(MAX_CHILD_SITEMAPS)
        {
            let fetched = self.fetcher.fetch(&child).await;
            if let Some(body) = fetched.html
                && let Ok(nested) = parse_sitemap(&body)
            {
                entries.extend(nested.pages);
            }
        }
        entries
    }

    fn report(&self, url: &str) {
        if let Some(ref callback) = self.progress_callback {
            callback(url.to_string());
        }
    }
}

#[derive(Debug, Default, PartialEq)]
pub struct Sitemap {
    /// Normalized page URLs from a `<urlset>`.
    pub pages: Vec<String>,
    /// Child sitemap URLs from a `<sitemapindex>`.
    pub children: Vec<String>,
}

pub fn parse_sitemap(xml: &str) -> Result<Sitemap> {
    let document = Html::parse_document(xml);
    let index = selector("sitemapindex")?;
    let loc = selector("loc")?;

    let locations = document
        .select(&loc)
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|location| !location.is_empty());

    let mut sitemap = Sitemap::default();
    if document.select(&index).next().is_some() {
        sitemap.children = locations.collect();
    } else {
        sitemap.pages = locations.filter_map(|location| normalize_url(&location)).collect();
    }
    Ok(sitemap)
}

/// Extracts followable same-host page links from an HTML document.
pub fn extract_same_host_links(html: &str, page_url: &str, host: &str) -> Result<Vec<String>> {
    let base = Url::parse(page_url).map_err(|e| ScanError::InvalidUrl(e.to_string()))?;
    let document = Html::parse_document(html);
    let anchors = selector("a[href]")?;

    let mut links = Vec::new();
    for element in document.select(&anchors) {
        if let Some(href) = element.value().attr("href")
            && let Some(absolute) = resolve_url(&base, href)
            && is_same_host(&absolute, host)
            && !is_asset(&absolute)
        {
            links.push(absolute);
        }
    }
    Ok(links)
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| ScanError::Selector(format!("{}: {:?}", css, e)))
}
