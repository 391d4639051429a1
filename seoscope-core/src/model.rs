use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The five fixed analysis dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    MetaTags,
    Links,
    Headings,
    Images,
    Performance,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::MetaTags,
        Category::Links,
        Category::Headings,
        Category::Images,
        Category::Performance,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::MetaTags => "meta_tags",
            Category::Links => "links",
            Category::Headings => "headings",
            Category::Images => "images",
            Category::Performance => "performance",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Category::MetaTags => "Meta Tags",
            Category::Links => "Links",
            Category::Headings => "Headings",
            Category::Images => "Images",
            Category::Performance => "Performance",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One value per category. Every category is always present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryMap<T> {
    pub meta_tags: T,
    pub links: T,
    pub headings: T,
    pub images: T,
    pub performance: T,
}

impl<T> CategoryMap<T> {
    pub fn get(&self, category: Category) -> &T {
        match category {
            Category::MetaTags => &self.meta_tags,
            Category::Links => &self.links,
            Category::Headings => &self.headings,
            Category::Images => &self.images,
            Category::Performance => &self.performance,
        }
    }

    pub fn get_mut(&mut self, category: Category) -> &mut T {
        match category {
            Category::MetaTags => &mut self.meta_tags,
            Category::Links => &mut self.links,
            Category::Headings => &mut self.headings,
            Category::Images => &mut self.images,
            Category::Performance => &mut self.performance,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, &T)> {
        Category::ALL.into_iter().map(move |category| (category, self.get(category)))
    }
}

impl CategoryMap<Vec<Issue>> {
    pub fn total(&self) -> usize {
        self.iter().map(|(_, issues)| issues.len()).sum()
    }

    pub fn counts(&self) -> CategoryMap<usize> {
        let mut counts: CategoryMap<usize> = CategoryMap::default();
        for (category, issues) in self.iter() {
            *counts.get_mut(category) = issues.len();
        }
        counts
    }
}

impl CategoryMap<usize> {
    pub fn total(&self) -> usize {
        self.iter().map(|(_, count)| *count).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub category: Category,
    pub severity: Severity,
    pub message: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl Issue {
    pub fn new(category: Category, severity: Severity, message: impl Into<String>, url: &str) -> Self {
        Self {
            category,
            severity,
            message: message.into(),
            url: url.to_string(),
            value: None,
            link: None,
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResult {
    pub url: String,
    pub status_code: u16,
    pub issues: CategoryMap<Vec<Issue>>,
    pub load_time_ms: u64,
    pub content_length: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Worker invocations it took to produce this result.
    pub attempts: u32,
}

impl PageResult {
    pub fn new(url: String) -> Self {
        Self {
            url,
            status_code: 0,
            issues: CategoryMap::default(),
            load_time_ms: 0,
            content_length: 0,
            error: None,
            attempts: 1,
        }
    }

    /// A page whose fetch failed. Carries no issues.
    pub fn with_error(url: String, error: String) -> Self {
        Self {
            error: Some(error),
            ..Self::new(url)
        }
    }

    pub fn issue_count(&self) -> usize {
        self.issues.total()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailedPage {
    pub url: String,
    pub error: String,
    pub attempts: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditResult {
    pub url: String,
    pub pages_analyzed: usize,
    pub failed_pages: Vec<FailedPage>,
    pub total_issues: usize,
    pub issues_by_category: CategoryMap<usize>,
    pub results: Vec<PageResult>,
}

impl AuditResult {
    pub fn empty(url: String) -> Self {
        Self {
            url,
            pages_analyzed: 0,
            failed_pages: Vec::new(),
            total_issues: 0,
            issues_by_category: CategoryMap::default(),
            results: Vec::new(),
        }
    }

    pub fn severity_count(&self, severity: Severity) -> usize {
        self.results
            .iter()
            .flat_map(|page| page.issues.iter())
            .flat_map(|(_, issues)| issues.iter())
            .filter(|issue| issue.severity == severity)
            .count()
    }
}

/// Run-level lifecycle. `Aggregated` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunPhase {
    Pending,
    Discovering,
    Analyzing,
    Aggregated,
}

impl RunPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunPhase::Pending => "pending",
            RunPhase::Discovering => "discovering",
            RunPhase::Analyzing => "analyzing",
            RunPhase::Aggregated => "aggregated",
        }
    }
}
