use super::{Check, PageSnapshot, collapse_whitespace, selector};
use crate::config::CheckConfig;
use crate::error::CheckError;
use crate::model::{Category, Issue, Severity};
use async_trait::async_trait;
use scraper::Html;
use std::sync::Arc;

const OPEN_GRAPH_TAGS: [&str; 3] = ["og:title", "og:description", "og:image"];

/// Title, meta description, canonical link, viewport and Open Graph tags.
pub struct MetaTagsCheck {
    config: Arc<CheckConfig>,
}

impl MetaTagsCheck {
    pub fn new(config: Arc<CheckConfig>) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Check for MetaTagsCheck {
    fn category(&self) -> Category {
        Category::MetaTags
    }

    async fn run(&self, page: &PageSnapshot) -> Result<Vec<Issue>, CheckError> {
        check_meta_tags(page, &self.config)
    }
}

fn issue(severity: Severity, message: impl Into<String>, url: &str) -> Issue {
    Issue::new(Category::MetaTags, severity, message, url)
}

pub fn check_meta_tags(page: &PageSnapshot, config: &CheckConfig) -> Result<Vec<Issue>, CheckError> {
    let document = Html::parse_document(&page.html);
    let url = page.url.as_str();
    let mut issues = Vec::new();

    // Title
    let titles: Vec<String> = document
        .select(&selector("title")?)
        .map(|element| collapse_whitespace(&element.text().collect::<String>()))
        .collect();

    match titles.first() {
        None => issues.push(issue(Severity::Error, "Missing page title", url)),
        Some(title) if title.is_empty() => {
            issues.push(issue(Severity::Error, "Page title is empty", url))
        }
        Some(title) => {
            let length = title.chars().count();
            if length < config.title_min_len {
                issues.push(
                    issue(
                        Severity::Warning,
                        format!("Title is too short (under {} characters)", config.title_min_len),
                        url,
                    )
                    .with_value(length.to_string()),
                );
            } else if length > config.title_max_len {
                issues.push(
                    issue(
                        Severity::Warning,
                        format!("Title is too long (over {} characters)", config.title_max_len),
                        url,
                    )
                    .with_value(length.to_string()),
                );
            }
        }
    }
    if titles.len() > 1 {
        issues.push(
            issue(Severity::Warning, "Duplicate title tags", url).with_value(titles.len().to_string()),
        );
    }

    // Meta description
    let descriptions: Vec<String> = document
        .select(&selector(r#"meta[name="description"]"#)?)
        .map(|element| collapse_whitespace(element.value().attr("content").unwrap_or_default()))
        .collect();

    match descriptions.first() {
        None => issues.push(issue(Severity::Warning, "Missing meta description", url)),
        Some(description) if description.is_empty() => {
            issues.push(issue(Severity::Warning, "Meta description is empty", url))
        }
        Some(description) => {
            let length = description.chars().count();
            if length < config.description_min_len {
                issues.push(
                    issue(
                        Severity::Warning,
                        format!(
                            "Meta description is too short (under {} characters)",
                            config.description_min_len
                        ),
                        url,
                    )
                    .with_value(length.to_string()),
                );
            } else if length > config.description_max_len {
                issues.push(
                    issue(
                        Severity::Warning,
                        format!(
                            "Meta description is too long (over {} characters)",
                            config.description_max_len
                        ),
                        url,
                    )
                    .with_value(length.to_string()),
                );
            }
        }
    }
    if descriptions.len() > 1 {
        issues.push(
            issue(Severity::Warning, "Duplicate meta descriptions", url)
                .with_value(descriptions.len().to_string()),
        );
    }

    // Canonical
    let canonicals: Vec<String> = document
        .select(&selector(r#"link[rel="canonical"]"#)?)
        .map(|element| element.value().attr("href").unwrap_or_default().trim().to_string())
        .collect();

    match canonicals.first() {
        None => issues.push(issue(Severity::Warning, "Missing canonical link", url)),
        Some(href) if href.is_empty() => {
            issues.push(issue(Severity::Warning, "Canonical link has an empty href", url))
        }
        Some(_) => {}
    }
    if canonicals.len() > 1 {
        let mut duplicate = issue(Severity::Warning, "Multiple canonical links", url)
            .with_value(canonicals.len().to_string());
        if let Some(href) = canonicals.iter().find(|href| !href.is_empty()) {
            duplicate = duplicate.with_link(href.clone());
        }
        issues.push(duplicate);
    }

    // Viewport
    if document
        .select(&selector(r#"meta[name="viewport"]"#)?)
        .next()
        .is_none()
    {
        issues.push(issue(Severity::Warning, "Missing viewport meta tag", url));
    }

    // Open Graph
    let og_selector = selector("meta[property]")?;
    let present: Vec<String> = document
        .select(&og_selector)
        .filter(|element| {
            element
                .value()
                .attr("content")
                .is_some_and(|content| !content.trim().is_empty())
        })
        .filter_map(|element| element.value().attr("property"))
        .map(|property| property.trim().to_ascii_lowercase())
        .collect();

    for tag in OPEN_GRAPH_TAGS {
        if !present.iter().any(|property| property == tag) {
            issues.push(issue(Severity::Info, format!("Missing Open Graph tag {}", tag), url).with_value(tag));
        }
    }

    Ok(issues)
}
