//! Folds settled page units into the run-level [`AuditResult`].

use crate::executor::{BatchOutcome, Failed, Succeeded};
use crate::model::{AuditResult, CategoryMap, FailedPage, PageResult};

/// Fold state. Pages can be added in any order and accumulators merged in
/// any grouping; [`AuditAccumulator::finish`] gives the same result.
#[derive(Debug, Clone, Default)]
pub struct AuditAccumulator {
    results: Vec<PageResult>,
    failed_pages: Vec<FailedPage>,
    issues_by_category: CategoryMap<usize>,
}

impl AuditAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_page(&mut self, page: PageResult) {
        for (category, issues) in page.issues.iter() {
            *self.issues_by_category.get_mut(category) += issues.len();
        }
        self.results.push(page);
    }

    pub fn add_failure(&mut self, failure: FailedPage) {
        self.failed_pages.push(failure);
    }

    pub fn add_succeeded(&mut self, settled: Succeeded<String, PageResult>) {
        let mut page = settled.value;
        page.attempts = settled.attempts;
        self.add_page(page);
    }

    pub fn add_failed(&mut self, settled: Failed<String>) {
        self.add_failure(FailedPage {
            url: settled.item,
            error: settled.error,
            attempts: settled.attempts,
        });
    }

    pub fn merge(mut self, other: AuditAccumulator) -> Self {
        for (category, count) in other.issues_by_category.iter() {
            *self.issues_by_category.get_mut(category) += *count;
        }
        self.results.extend(other.results);
        self.failed_pages.extend(other.failed_pages);
        self
    }

    pub fn pages_seen(&self) -> usize {
        self.results.len() + self.failed_pages.len()
    }

    pub fn finish(mut self, seed: &str) -> AuditResult {
        self.results.sort_by(|a, b| a.url.cmp(&b.url));
        self.failed_pages.sort_by(|a, b| a.url.cmp(&b.url));

        AuditResult {
            url: seed.to_string(),
            pages_analyzed: self.results.len(),
            failed_pages: self.failed_pages,
            total_issues: self.issues_by_category.total(),
            issues_by_category: self.issues_by_category,
            results: self.results,
        }
    }
}

/// Collapses a settled batch into the run result.
pub fn aggregate(seed: &str, outcome: BatchOutcome<String, PageResult>) -> AuditResult {
    let mut accumulator = AuditAccumulator::new();
    for settled in outcome.succeeded {
        accumulator.add_succeeded(settled);
    }
    for settled in outcome.failed {
        accumulator.add_failed(settled);
    }
    accumulator.finish(seed)
}
