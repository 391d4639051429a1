// In-memory fetcher shared by the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use seoscope_scanner::{Fetcher, LinkProbe, PageFetchResult};
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Clone)]
pub struct FakePage {
    pub html: String,
    pub headers: HashMap<String, String>,
    pub load_time_ms: u64,
    /// Fetches that fail before the page starts answering. `u32::MAX` never answers.
    pub failures: u32,
}

impl FakePage {
    pub fn new(html: impl Into<String>) -> Self {
        let mut headers = HashMap::new();
        headers.insert("cache-control".to_string(), "max-age=600".to_string());
        Self {
            html: html.into(),
            headers,
            load_time_ms: 40,
            failures: 0,
        }
    }

    pub fn failing(mut self, failures: u32) -> Self {
        self.failures = failures;
        self
    }

    pub fn broken() -> Self {
        Self::new("").failing(u32::MAX)
    }
}

#[derive(Default)]
pub struct FakeFetcher {
    pages: HashMap<String, FakePage>,
    probes: HashMap<String, LinkProbe>,
    fetches: Mutex<HashMap<String, u32>>,
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: &str, page: FakePage) -> Self {
        self.pages.insert(url.to_string(), page);
        self
    }

    pub fn with_probe(mut self, probe: LinkProbe) -> Self {
        self.probes.insert(probe.url.clone(), probe);
        self
    }

    pub fn fetch_count(&self, url: &str) -> u32 {
        self.fetches.lock().unwrap().get(url).copied().unwrap_or(0)
    }
}

#[async_trait]
impl Fetcher for FakeFetcher {
    async fn fetch(&self, url: &str) -> PageFetchResult {
        let call = {
            let mut fetches = self.fetches.lock().unwrap();
            let count = fetches.entry(url.to_string()).or_insert(0);
            *count += 1;
            *count
        };

        match self.pages.get(url) {
            Some(page) if call > page.failures => PageFetchResult::success(
                url.to_string(),
                200,
                page.html.clone(),
                page.headers.clone(),
                page.load_time_ms,
            ),
            Some(_) => PageFetchResult::with_error(url.to_string(), "HTTP 503".to_string()).with_status(503),
            None => PageFetchResult::with_error(url.to_string(), "HTTP 404".to_string()).with_status(404),
        }
    }

    async fn probe(&self, url: &str) -> LinkProbe {
        self.probes
            .get(url)
            .cloned()
            .unwrap_or_else(|| LinkProbe::new(url.to_string(), 200, 0, url.to_string()))
    }
}

/// A page that passes every check. `links` are hrefs placed in the body.
pub fn clean_page(url: &str, title: &str, links: &[&str]) -> String {
    let anchors: String = links
        .iter()
        .map(|href| format!(r#"<a href="{}">{}</a>"#, href, href))
        .collect();
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
  <title>{title}</title>
  <meta name="description" content="A tidy test page that exists only to satisfy every single check.">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <link rel="canonical" href="{url}">
  <meta property="og:title" content="{title}">
  <meta property="og:description" content="A tidy test page">
  <meta property="og:image" content="https://cdn.example.org/og.png">
</head>
<body>
  <h1>{title}</h1>
  <h2>Section</h2>
  <img src="/logo.png" alt="Logo" width="120" height="40">
  <nav>{anchors}</nav>
</body>
</html>"#
    )
}
