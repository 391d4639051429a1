use super::{Check, PageSnapshot, selector};
use crate::config::CheckConfig;
use crate::error::CheckError;
use crate::model::{Category, Issue, Severity};
use async_trait::async_trait;
use scraper::Html;
use std::sync::Arc;

pub struct ImagesCheck {
    config: Arc<CheckConfig>,
}

impl ImagesCheck {
    pub fn new(config: Arc<CheckConfig>) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Check for ImagesCheck {
    fn category(&self) -> Category {
        Category::Images
    }

    async fn run(&self, page: &PageSnapshot) -> Result<Vec<Issue>, CheckError> {
        check_images(page, &self.config)
    }
}

/// Decoded size of an inline `data:` URI payload, if `src` is one.
pub fn inline_payload_bytes(src: &str) -> Option<usize> {
    let rest = src.trim().strip_prefix("data:")?;
    let (meta, payload) = rest.split_once(',')?;
    if meta.ends_with(";base64") {
        let payload = payload.trim_end_matches('=');
        Some(payload.len() * 3 / 4)
    } else {
        Some(payload.len())
    }
}

fn short_src(src: &str) -> String {
    if src.starts_with("data:") {
        let prefix: String = src.chars().take(32).collect();
        format!("{}...", prefix)
    } else {
        src.to_string()
    }
}

pub fn check_images(page: &PageSnapshot, config: &CheckConfig) -> Result<Vec<Issue>, CheckError> {
    let document = Html::parse_document(&page.html);
    let url = page.url.as_str();
    let mut issues = Vec::new();

    for element in document.select(&selector("img")?) {
        let attrs = element.value();
        let src = attrs.attr("src").unwrap_or_default();
        let link = short_src(src);

        match attrs.attr("alt") {
            None => issues.push(
                Issue::new(Category::Images, Severity::Warning, "Image missing alt attribute", url)
                    .with_link(link.clone()),
            ),
            Some(alt) if alt.trim().is_empty() => issues.push(
                Issue::new(Category::Images, Severity::Warning, "Image has empty alt text", url)
                    .with_link(link.clone()),
            ),
            Some(_) => {}
        }

        if let Some(bytes) = inline_payload_bytes(src)
            && bytes > config.max_image_bytes
        {
            issues.push(
                Issue::new(Category::Images, Severity::Warning, "Inline image is too large", url)
                    .with_link(link.clone())
                    .with_value(format!("{} bytes", bytes)),
            );
        }

        for dimension in ["width", "height"] {
            if let Some(declared) = attrs.attr(dimension)
                && let Ok(pixels) = declared.trim().trim_end_matches("px").parse::<u32>()
                && pixels > config.max_image_dimension
            {
                issues.push(
                    Issue::new(
                        Category::Images,
                        Severity::Info,
                        format!("Image {} exceeds {}px", dimension, config.max_image_dimension),
                        url,
                    )
                    .with_link(link.clone())
                    .with_value(pixels.to_string()),
                );
            }
        }
    }

    Ok(issues)
}
