use crate::aggregate::aggregate;
use crate::analyze::PageAnalyzer;
use crate::checks::CheckSet;
use crate::config::{AuditOptions, AuditRequest};
use crate::error::Result;
use crate::executor::{Executor, ProgressCallback};
use crate::model::{AuditResult, RunPhase};
use indicatif::{ProgressBar, ProgressStyle};
use seoscope_scanner::discover::DiscoveryCallback;
use seoscope_scanner::{Discoverer, Fetcher, HttpFetcher};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::info;

/// Called on every run phase transition.
pub type PhaseCallback = Arc<dyn Fn(RunPhase) + Send + Sync>;

/// Drives one audit: discovery, then bounded analysis, then aggregation.
pub struct Auditor {
    fetcher: Arc<dyn Fetcher>,
    options: AuditOptions,
    phase_callback: Option<PhaseCallback>,
}

impl Auditor {
    pub fn new(fetcher: Arc<dyn Fetcher>, options: AuditOptions) -> Self {
        Self {
            fetcher,
            options,
            phase_callback: None,
        }
    }

    pub fn with_phase_callback(mut self, callback: PhaseCallback) -> Self {
        self.phase_callback = Some(callback);
        self
    }

    fn enter(&self, phase: RunPhase) {
        info!("Audit phase: {}", phase.as_str());
        if let Some(ref callback) = self.phase_callback {
            callback(phase);
        }
    }

    pub async fn run(&self, request: &AuditRequest) -> Result<AuditResult> {
        self.enter(RunPhase::Pending);
        let seed = request.validate()?;

        self.enter(RunPhase::Discovering);
        let spinner = self.spinner("Discovering pages...");
        let mut discoverer = Discoverer::new(self.fetcher.clone())
            .with_max_pages(request.max_pages)
            .with_sitemap(self.options.use_sitemap);
        if let Some(ref pb) = spinner {
            let pb = pb.clone();
            let found = Arc::new(AtomicUsize::new(1));
            let callback: DiscoveryCallback = Arc::new(move |_url: String| {
                let count = found.fetch_add(1, Ordering::Relaxed) + 1;
                pb.set_message(format!("Discovering pages... {} found", count));
            });
            discoverer = discoverer.with_progress_callback(callback);
        }
        let pages = discoverer.discover(seed.as_str()).await?;
        if let Some(ref pb) = spinner {
            pb.finish_with_message(format!("Discovered {} pages", pages.len()));
        }
        info!("Discovered {} pages for {}", pages.len(), request.url);

        self.enter(RunPhase::Analyzing);
        let checks = Arc::new(CheckSet::standard(
            self.fetcher.clone(),
            self.options.checks.clone(),
        ));
        let analyzer = PageAnalyzer::new(self.fetcher.clone(), checks);

        let mut executor = Executor::new(request.max_concurrency).with_retry(self.options.retry);
        let bar = self.progress_bar(pages.len() as u64);
        if let Some(ref pb) = bar {
            let pb = pb.clone();
            let callback: ProgressCallback = Arc::new(move |completed, _total| {
                pb.set_position(completed as u64);
            });
            executor = executor.with_progress_callback(callback);
        }

        let outcome = executor
            .run(pages, move |url: String| {
                let analyzer = analyzer.clone();
                async move { analyzer.analyze_or_fail(url).await }
            })
            .await;
        if let Some(ref pb) = bar {
            pb.finish_with_message("Analysis complete");
        }

        let result = aggregate(&request.url, outcome);
        self.enter(RunPhase::Aggregated);
        info!(
            "Audit of {} finished: {} pages analyzed, {} failed, {} issues",
            result.url,
            result.pages_analyzed,
            result.failed_pages.len(),
            result.total_issues
        );
        Ok(result)
    }

    fn spinner(&self, message: &str) -> Option<ProgressBar> {
        if !self.options.show_progress_bars {
            return None;
        }
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
            pb.set_style(style);
        }
        pb.enable_steady_tick(std::time::Duration::from_millis(120));
        pb.set_message(message.to_string());
        Some(pb)
    }

    fn progress_bar(&self, total: u64) -> Option<ProgressBar> {
        if !self.options.show_progress_bars {
            return None;
        }
        let pb = ProgressBar::new(total);
        if let Ok(style) =
            ProgressStyle::default_bar().template("{bar:40.cyan/blue} {pos}/{len} pages analyzed {msg}")
        {
            pb.set_style(style.progress_chars("#>-"));
        }
        Some(pb)
    }
}

/// Runs an audit against the live network.
///
/// The fetcher's request limit matches `max_concurrency`, so page fetches and
/// link probes together never exceed it.
pub async fn execute_audit(request: AuditRequest, options: AuditOptions) -> Result<AuditResult> {
    let fetcher = HttpFetcher::with_timeout(options.timeout_secs)?
        .with_request_limit(request.max_concurrency);
    Auditor::new(Arc::new(fetcher), options).run(&request).await
}
