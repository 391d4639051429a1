// Tests for the SEO check set

mod common;

use async_trait::async_trait;
use common::{FakeFetcher, clean_page};
use seoscope_core::checks::meta_tags::check_meta_tags;
use seoscope_core::checks::{Check, CheckSet, LinksCheck, PageSnapshot};
use seoscope_core::config::CheckConfig;
use seoscope_core::error::CheckError;
use seoscope_core::model::{Category, Issue, Severity};
use seoscope_scanner::LinkProbe;
use std::collections::HashMap;
use std::sync::Arc;

const PAGE_URL: &str = "http://site.test/";

fn snapshot(html: &str) -> PageSnapshot {
    let mut headers = HashMap::new();
    headers.insert("cache-control".to_string(), "max-age=600".to_string());
    PageSnapshot {
        url: PAGE_URL.to_string(),
        status_code: 200,
        content_length: html.len() as u64,
        html: html.to_string(),
        headers,
        load_time_ms: 30,
    }
}

fn messages(issues: &[Issue]) -> Vec<&str> {
    issues.iter().map(|issue| issue.message.as_str()).collect()
}

// ============================================================================
// Meta tags
// ============================================================================

#[test]
fn test_meta_tags_clean_page() {
    let html = clean_page(PAGE_URL, "Example Home Page", &[]);
    let issues = check_meta_tags(&snapshot(&html), &CheckConfig::default()).unwrap();
    assert!(issues.is_empty(), "unexpected issues: {:?}", issues);
}

#[test]
fn test_meta_tags_missing_everything() {
    let issues = check_meta_tags(&snapshot("<html><body>hi</body></html>"), &CheckConfig::default()).unwrap();
    let found = messages(&issues);

    assert!(found.contains(&"Missing page title"));
    assert!(found.contains(&"Missing meta description"));
    assert!(found.contains(&"Missing canonical link"));
    assert!(found.contains(&"Missing viewport meta tag"));
    assert_eq!(
        issues.iter().filter(|issue| issue.severity == Severity::Info).count(),
        3
    );
    assert_eq!(
        issues.iter().find(|i| i.message == "Missing page title").unwrap().severity,
        Severity::Error
    );
}

#[test]
fn test_meta_tags_title_length() {
    let short = clean_page(PAGE_URL, "Hi", &[]);
    let issues = check_meta_tags(&snapshot(&short), &CheckConfig::default()).unwrap();
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].severity, Severity::Warning);
    assert_eq!(issues[0].value.as_deref(), Some("2"));

    let long = clean_page(PAGE_URL, &"Long title ".repeat(8), &[]);
    let issues = check_meta_tags(&snapshot(&long), &CheckConfig::default()).unwrap();
    assert_eq!(issues.len(), 1);
    assert!(issues[0].message.starts_with("Title is too long"));
}

#[test]
fn test_meta_tags_duplicates() {
    let html = r#"<html><head>
        <title>Example Home Page</title><title>Example Home Page</title>
        <meta name="description" content="one">
        <meta name="description" content="two">
        <link rel="canonical" href="/a"><link rel="canonical" href="/b">
        <meta name="viewport" content="width=device-width">
        <meta property="og:title" content="x">
        <meta property="og:description" content="x">
        <meta property="og:image" content="x">
    </head></html>"#;
    let issues = check_meta_tags(&snapshot(html), &CheckConfig::default()).unwrap();
    let found = messages(&issues);

    assert!(found.contains(&"Duplicate title tags"));
    assert!(found.contains(&"Duplicate meta descriptions"));
    assert!(found.contains(&"Multiple canonical links"));
}

#[test]
fn test_meta_tags_empty_values() {
    let html = r#"<html><head>
        <title>   </title>
        <meta name="description" content="">
        <link rel="canonical" href="">
    </head></html>"#;
    let issues = check_meta_tags(&snapshot(html), &CheckConfig::default()).unwrap();
    let found = messages(&issues);

    assert!(found.contains(&"Page title is empty"));
    assert!(found.contains(&"Meta description is empty"));
    assert!(found.contains(&"Canonical link has an empty href"));
}

#[test]
fn test_meta_tags_duplicate_canonical_after_empty_href() {
    let html = r#"<html><head>
        <title>Example Home Page</title>
        <link rel="canonical" href=""><link rel="canonical" href="/b">
    </head></html>"#;
    let issues = check_meta_tags(&snapshot(html), &CheckConfig::default()).unwrap();
    let found = messages(&issues);

    assert!(found.contains(&"Canonical link has an empty href"));
    let duplicate = issues
        .iter()
        .find(|issue| issue.message == "Multiple canonical links")
        .unwrap();
    assert_eq!(duplicate.value.as_deref(), Some("2"));
    assert_eq!(duplicate.link.as_deref(), Some("/b"));
}

// ============================================================================
// Links
// ============================================================================

#[tokio::test]
async fn test_links_check_reports_broken_and_redirected_links() {
    let fetcher = FakeFetcher::new()
        .with_probe(LinkProbe::new("http://site.test/gone".to_string(), 404, 0, "http://site.test/gone".to_string()))
        .with_probe(LinkProbe::new(
            "https://other.org/hop".to_string(),
            200,
            3,
            "https://other.org/final".to_string(),
        ))
        .with_probe(LinkProbe::with_error(
            "https://down.org/".to_string(),
            0,
            "Connection failed: refused".to_string(),
        ));

    let html = clean_page(
        PAGE_URL,
        "Example Home Page",
        &["/ok", "/gone", "https://other.org/hop", "https://down.org/"],
    );
    let check = LinksCheck::new(Arc::new(fetcher), Arc::new(CheckConfig::default()));
    let issues = check.run(&snapshot(&html)).await.unwrap();

    assert_eq!(issues.len(), 3);
    assert_eq!(issues[0].link.as_deref(), Some("http://site.test/gone"));
    assert_eq!(issues[0].severity, Severity::Error);
    assert_eq!(issues[0].value.as_deref(), Some("internal: HTTP 404"));

    assert_eq!(issues[1].severity, Severity::Warning);
    assert_eq!(issues[1].value.as_deref(), Some("external: 3 redirects"));

    assert_eq!(issues[2].severity, Severity::Error);
    assert_eq!(issues[2].value.as_deref(), Some("external: Connection failed: refused"));
}

#[tokio::test]
async fn test_links_check_caps_probed_links() {
    let hrefs: Vec<String> = (0..30).map(|i| format!("/missing-{}", i)).collect();
    let refs: Vec<&str> = hrefs.iter().map(String::as_str).collect();
    let html = clean_page(PAGE_URL, "Example Home Page", &refs);

    let mut fetcher = FakeFetcher::new();
    for href in &hrefs {
        let url = format!("http://site.test{}", href);
        fetcher = fetcher.with_probe(LinkProbe::new(url.clone(), 404, 0, url));
    }
    let config = CheckConfig {
        max_links_per_page: 10,
        ..Default::default()
    };

    let check = LinksCheck::new(Arc::new(fetcher), Arc::new(config));
    let issues = check.run(&snapshot(&html)).await.unwrap();
    assert_eq!(issues.len(), 10);
}

// ============================================================================
// Check set
// ============================================================================

struct FailingCheck;

#[async_trait]
impl Check for FailingCheck {
    fn category(&self) -> Category {
        Category::Images
    }

    async fn run(&self, _page: &PageSnapshot) -> Result<Vec<Issue>, CheckError> {
        Err(CheckError::Other("image decoder unavailable".to_string()))
    }
}

struct PanickingCheck;

#[async_trait]
impl Check for PanickingCheck {
    fn category(&self) -> Category {
        Category::Performance
    }

    async fn run(&self, _page: &PageSnapshot) -> Result<Vec<Issue>, CheckError> {
        panic!("check exploded");
    }
}

struct FixedCheck;

#[async_trait]
impl Check for FixedCheck {
    fn category(&self) -> Category {
        Category::Headings
    }

    async fn run(&self, page: &PageSnapshot) -> Result<Vec<Issue>, CheckError> {
        Ok(vec![Issue::new(Category::Headings, Severity::Warning, "fixed", &page.url)])
    }
}

#[tokio::test]
async fn test_failing_check_degrades_to_no_issues() {
    let set = CheckSet::with_checks(vec![Arc::new(FailingCheck), Arc::new(PanickingCheck), Arc::new(FixedCheck)]);
    let issues = set.analyze(&snapshot("<html></html>")).await;

    assert!(issues.images.is_empty());
    assert!(issues.performance.is_empty());
    assert_eq!(issues.headings.len(), 1);
    assert_eq!(issues.total(), 1);
}

#[tokio::test]
async fn test_standard_set_on_clean_page() {
    let set = CheckSet::standard(Arc::new(FakeFetcher::new()), CheckConfig::default());
    assert_eq!(set.len(), 5);

    let html = clean_page(PAGE_URL, "Example Home Page", &["/about", "https://other.org/"]);
    let issues = set.analyze(&snapshot(&html)).await;
    assert_eq!(issues.total(), 0, "unexpected issues: {:?}", issues);
}

#[tokio::test]
async fn test_standard_set_buckets_by_category() {
    let set = CheckSet::standard(Arc::new(FakeFetcher::new()), CheckConfig::default());
    let mut page = snapshot("<html><body><h2>No top</h2><img src=\"/x.png\"></body></html>");
    page.headers.clear();

    let issues = set.analyze(&page).await;
    for (category, bucket) in issues.iter() {
        assert!(bucket.iter().all(|issue| issue.category == category));
    }
    assert!(!issues.meta_tags.is_empty());
    assert!(!issues.headings.is_empty());
    assert!(!issues.images.is_empty());
    assert_eq!(messages(&issues.performance), vec!["No caching headers"]);
    assert!(issues.links.is_empty());
}
