// Tests for page discovery against a mock site

use seoscope_scanner::{Discoverer, HttpFetcher, ScanError};
use std::sync::Arc;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

async fn mount_html(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html")
                .set_body_string(body),
        )
        .mount(server)
        .await;
}

fn discoverer() -> Discoverer {
    Discoverer::new(Arc::new(HttpFetcher::with_timeout(5).unwrap()))
}

// ============================================================================
// Sitemap Discovery Tests
// ============================================================================

#[tokio::test]
async fn test_sitemap_takes_precedence() {
    let server = MockServer::start().await;
    let uri = server.uri();

    let sitemap = format!(
        r#"<?xml version="1.0"?>
        <urlset>
          <url><loc>{uri}/</loc></url>
          <url><loc>{uri}/pricing</loc></url>
          <url><loc>{uri}/docs/</loc></url>
          <url><loc>https://elsewhere.example/</loc></url>
        </urlset>"#
    );
    mount_html(&server, "/sitemap.xml", sitemap).await;
    // Link following would find /linked, which the sitemap path never fetches.
    mount_html(&server, "/", format!(r#"<a href="{uri}/linked">x</a>"#)).await;

    let pages = discoverer().discover(&uri).await.unwrap();

    assert_eq!(
        pages,
        vec![
            format!("{uri}/"),
            format!("{uri}/pricing"),
            format!("{uri}/docs"),
        ]
    );
}

#[tokio::test]
async fn test_sitemap_respects_max_pages() {
    let server = MockServer::start().await;
    let uri = server.uri();

    let mut sitemap = String::from("<urlset>");
    for i in 0..20 {
        sitemap.push_str(&format!("<url><loc>{uri}/page{i}</loc></url>"));
    }
    sitemap.push_str("</urlset>");
    mount_html(&server, "/sitemap.xml", sitemap).await;
    mount_html(&server, "/", "<p>home</p>".to_string()).await;

    let pages = discoverer().with_max_pages(5).discover(&uri).await.unwrap();

    assert_eq!(pages.len(), 5);
    assert_eq!(pages[0], format!("{uri}/"));
}

#[tokio::test]
async fn test_sitemap_index_is_followed() {
    let server = MockServer::start().await;
    let uri = server.uri();

    mount_html(
        &server,
        "/sitemap.xml",
        format!("<sitemapindex><sitemap><loc>{uri}/sitemap-blog.xml</loc></sitemap></sitemapindex>"),
    )
    .await;
    mount_html(
        &server,
        "/sitemap-blog.xml",
        format!("<urlset><url><loc>{uri}/blog/first</loc></url></urlset>"),
    )
    .await;
    mount_html(&server, "/", "<p>home</p>".to_string()).await;

    let pages = discoverer().discover(&uri).await.unwrap();

    assert_eq!(pages, vec![format!("{uri}/"), format!("{uri}/blog/first")]);
}

// ============================================================================
// Link Following Tests
// ============================================================================

#[tokio::test]
async fn test_falls_back_to_link_following() {
    let server = MockServer::start().await;
    let uri = server.uri();

    mount_html(
        &server,
        "/",
        format!(
            r#"<html><body>
                <a href="/page1">One</a>
                <a href="{uri}/page2#intro">Two</a>
                <a href="/page1/">One again</a>
                <a href="https://external.example/">External</a>
            </body></html>"#
        ),
    )
    .await;
    mount_html(&server, "/page1", r#"<a href="/page3">Three</a>"#.to_string()).await;
    mount_html(&server, "/page2", "<p>leaf</p>".to_string()).await;
    mount_html(&server, "/page3", "<p>leaf</p>".to_string()).await;

    let pages = discoverer().discover(&uri).await.unwrap();

    assert_eq!(
        pages,
        vec![
            format!("{uri}/"),
            format!("{uri}/page1"),
            format!("{uri}/page2"),
            format!("{uri}/page3"),
        ]
    );
}

#[tokio::test]
async fn test_link_following_stops_at_max_pages() {
    let server = MockServer::start().await;
    let uri = server.uri();

    let mut root = String::from("<html><body>");
    for i in 1..=10 {
        root.push_str(&format!(r#"<a href="/p{i}">p{i}</a>"#));
    }
    root.push_str("</body></html>");
    mount_html(&server, "/", root).await;

    let pages = discoverer().with_max_pages(3).discover(&uri).await.unwrap();

    assert_eq!(
        pages,
        vec![format!("{uri}/"), format!("{uri}/p1"), format!("{uri}/p2")]
    );
}

#[tokio::test]
async fn test_unreachable_subpage_is_not_expanded() {
    let server = MockServer::start().await;
    let uri = server.uri();

    mount_html(
        &server,
        "/",
        r#"<a href="/broken">b</a><a href="/ok">o</a>"#.to_string(),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    mount_html(&server, "/ok", r#"<a href="/deeper">d</a>"#.to_string()).await;

    let pages = discoverer().discover(&uri).await.unwrap();

    // /broken stays listed; only its links are lost.
    assert!(pages.contains(&format!("{uri}/broken")));
    assert!(pages.contains(&format!("{uri}/deeper")));
    assert_eq!(pages.len(), 4);
}

// ============================================================================
// Edge Case Tests
// ============================================================================

#[tokio::test]
async fn test_unreachable_seed_yields_no_pages() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let pages = discoverer().discover(&server.uri()).await.unwrap();

    assert!(pages.is_empty());
}

#[tokio::test]
async fn test_unreachable_seed_ignores_live_sitemap() {
    let server = MockServer::start().await;
    let uri = server.uri();

    mount_html(
        &server,
        "/sitemap.xml",
        format!("<urlset><url><loc>{uri}/a</loc></url></urlset>"),
    )
    .await;
    mount_html(&server, "/a", "<p>a</p>".to_string()).await;
    Mock::given(method("GET"))
        .and(path("/dead"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let pages = discoverer().discover(&format!("{uri}/dead")).await.unwrap();

    assert!(pages.is_empty(), "unexpected pages: {:?}", pages);
}

#[tokio::test]
async fn test_zero_max_pages_yields_no_pages() {
    let server = MockServer::start().await;
    mount_html(&server, "/", "<p>hello</p>".to_string()).await;

    let pages = discoverer().with_max_pages(0).discover(&server.uri()).await.unwrap();

    assert!(pages.is_empty());
}

#[tokio::test]
async fn test_invalid_seed_is_an_error() {
    let result = discoverer().discover("not a url").await;
    assert!(matches!(result, Err(ScanError::InvalidUrl(_))));

    let result = discoverer().discover("ftp://example.com/").await;
    assert!(matches!(result, Err(ScanError::InvalidUrl(_))));
}

#[tokio::test]
async fn test_sitemap_can_be_disabled() {
    let server = MockServer::start().await;
    let uri = server.uri();

    mount_html(
        &server,
        "/sitemap.xml",
        format!("<urlset><url><loc>{uri}/from-sitemap</loc></url></urlset>"),
    )
    .await;
    mount_html(&server, "/", r#"<a href="/from-links">x</a>"#.to_string()).await;

    let pages = discoverer()
        .with_sitemap(false)
        .discover(&uri)
        .await
        .unwrap();

    assert_eq!(pages, vec![format!("{uri}/"), format!("{uri}/from-links")]);
}
