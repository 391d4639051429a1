use super::{Check, PageSnapshot, collapse_whitespace, selector};
use crate::error::CheckError;
use crate::model::{Category, Issue, Severity};
use async_trait::async_trait;
use scraper::Html;

/// Heading outline: a single h1 and no skipped levels.
#[derive(Debug, Default)]
pub struct HeadingsCheck;

impl HeadingsCheck {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Check for HeadingsCheck {
    fn category(&self) -> Category {
        Category::Headings
    }

    async fn run(&self, page: &PageSnapshot) -> Result<Vec<Issue>, CheckError> {
        check_headings(page)
    }
}

/// `(level, text)` for every heading in document order.
pub fn heading_outline(html: &str) -> Result<Vec<(u8, String)>, CheckError> {
    let document = Html::parse_document(html);
    let outline = document
        .select(&selector("h1, h2, h3, h4, h5, h6")?)
        .filter_map(|element| {
            let level = element.value().name().strip_prefix('h')?.parse::<u8>().ok()?;
            Some((level, collapse_whitespace(&element.text().collect::<String>())))
        })
        .collect();
    Ok(outline)
}

pub fn check_headings(page: &PageSnapshot) -> Result<Vec<Issue>, CheckError> {
    let outline = heading_outline(&page.html)?;
    let url = page.url.as_str();
    let mut issues = Vec::new();

    let h1_count = outline.iter().filter(|(level, _)| *level == 1).count();
    if h1_count == 0 {
        issues.push(Issue::new(Category::Headings, Severity::Error, "Missing H1 heading", url));
    } else if h1_count > 1 {
        issues.push(
            Issue::new(Category::Headings, Severity::Warning, "Multiple H1 headings", url)
                .with_value(h1_count.to_string()),
        );
    }

    for pair in outline.windows(2) {
        let (previous, _) = pair[0];
        let (current, _) = pair[1];
        if current > previous + 1 {
            issues.push(
                Issue::new(Category::Headings, Severity::Warning, "Skipped heading level", url)
                    .with_value(format!("h{} -> h{}", previous, current)),
            );
        }
    }

    for (level, text) in &outline {
        if text.is_empty() {
            issues.push(
                Issue::new(Category::Headings, Severity::Warning, "Empty heading", url)
                    .with_value(format!("h{}", level)),
            );
        }
    }

    Ok(issues)
}
