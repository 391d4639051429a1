// Report rendering for a finished audit

use crate::model::{AuditResult, Issue, Severity};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;

const HEAVY_RULE: &str =
    "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n";
const LIGHT_RULE: &str =
    "────────────────────────────────────────────────────────────────────────────────\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportFormat {
    Text,
    Json,
    Markdown,
}

impl ReportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Some(ReportFormat::Text),
            "json" => Some(ReportFormat::Json),
            "markdown" | "md" => Some(ReportFormat::Markdown),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Text => "txt",
            ReportFormat::Json => "json",
            ReportFormat::Markdown => "md",
        }
    }
}

pub fn render_report(result: &AuditResult, format: ReportFormat) -> Result<String, serde_json::Error> {
    match format {
        ReportFormat::Text => Ok(generate_text_report(result)),
        ReportFormat::Json => generate_json_report(result),
        ReportFormat::Markdown => Ok(generate_markdown_report(result)),
    }
}

fn severity_tag(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "[ERROR]",
        Severity::Warning => "[WARNING]",
        Severity::Info => "[INFO]",
    }
}

fn describe_issue(issue: &Issue) -> String {
    let mut line = issue.message.clone();
    if let Some(ref value) = issue.value {
        line.push_str(&format!(" ({})", value));
    }
    if let Some(ref link) = issue.link {
        line.push_str(&format!(" -> {}", link));
    }
    line
}

pub fn generate_text_report(result: &AuditResult) -> String {
    let mut report = String::new();

    report.push_str(HEAVY_RULE);
    report.push_str("                           SEOSCOPE AUDIT REPORT\n");
    report.push_str(HEAVY_RULE);
    report.push('\n');

    report.push_str(&format!("Site:           {}\n", result.url));
    report.push_str(&format!("Pages Analyzed: {}\n", result.pages_analyzed));
    report.push_str(&format!("Pages Failed:   {}\n", result.failed_pages.len()));
    report.push('\n');

    report.push_str(HEAVY_RULE);
    report.push_str("SUMMARY\n");
    report.push_str(HEAVY_RULE);
    report.push('\n');

    report.push_str(&format!("Total Issues: {}\n\n", result.total_issues));
    for (category, count) in result.issues_by_category.iter() {
        report.push_str(&format!("  {:<14} {}\n", category.label(), count));
    }
    report.push('\n');

    let errors = result.severity_count(Severity::Error);
    let warnings = result.severity_count(Severity::Warning);
    let infos = result.severity_count(Severity::Info);
    if errors > 0 {
        report.push_str(&format!("  [ERROR]   {}  (Fix first)\n", errors));
    }
    if warnings > 0 {
        report.push_str(&format!("  [WARNING] {}  (Should be addressed)\n", warnings));
    }
    if infos > 0 {
        report.push_str(&format!("  [INFO]    {}  (Informational)\n", infos));
    }
    report.push('\n');

    if !result.results.is_empty() {
        report.push_str(HEAVY_RULE);
        report.push_str("PAGES\n");
        report.push_str(HEAVY_RULE);
        report.push('\n');

        for page in &result.results {
            report.push_str(&format!(
                "{}  [{}] {}ms, {} bytes\n",
                page.url, page.status_code, page.load_time_ms, page.content_length
            ));
            if page.issue_count() == 0 {
                report.push_str("  No issues\n");
            }
            for (category, issues) in page.issues.iter() {
                if issues.is_empty() {
                    continue;
                }
                report.push_str(&format!("\n  {}\n", category.label()));
                for issue in issues {
                    let text = format!("{} {}", severity_tag(issue.severity), describe_issue(issue));
                    report.push_str(&wrap_text(&text, 80, "    "));
                }
            }
            report.push('\n');
            report.push_str(LIGHT_RULE);
            report.push('\n');
        }
    }

    if !result.failed_pages.is_empty() {
        report.push_str(HEAVY_RULE);
        report.push_str("FAILED PAGES\n");
        report.push_str(HEAVY_RULE);
        report.push('\n');

        for failed in &result.failed_pages {
            report.push_str(&format!("{}  ({} attempts)\n", failed.url, failed.attempts));
            report.push_str(&wrap_text(&failed.error, 80, "  "));
            report.push('\n');
        }
    }

    report.push_str(HEAVY_RULE);
    report.push_str("                              End of Report\n");
    report.push_str(HEAVY_RULE);
    report.push_str("\nGenerated by seoscope\n\n");

    report
}

pub fn generate_json_report(result: &AuditResult) -> Result<String, serde_json::Error> {
    let json_report = serde_json::json!({
        "report": {
            "metadata": {
                "generator": "seoscope",
                "version": env!("CARGO_PKG_VERSION"),
                "generated_at": chrono::Utc::now().to_rfc3339(),
                "format": "json"
            },
            "summary": {
                "severity_breakdown": {
                    "error": result.severity_count(Severity::Error),
                    "warning": result.severity_count(Severity::Warning),
                    "info": result.severity_count(Severity::Info)
                }
            },
            "audit": result
        }
    });

    serde_json::to_string_pretty(&json_report)
}

pub fn generate_markdown_report(result: &AuditResult) -> String {
    let mut report = String::new();

    report.push_str(&format!("# SEO Audit: {}\n\n", result.url));
    report.push_str(&format!(
        "_Generated by seoscope {} at {}_\n\n",
        env!("CARGO_PKG_VERSION"),
        chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    ));

    report.push_str("## Summary\n\n");
    report.push_str("| Metric | Value |\n|---|---|\n");
    report.push_str(&format!("| Pages analyzed | {} |\n", result.pages_analyzed));
    report.push_str(&format!("| Pages failed | {} |\n", result.failed_pages.len()));
    report.push_str(&format!("| Total issues | {} |\n", result.total_issues));
    for (category, count) in result.issues_by_category.iter() {
        report.push_str(&format!("| {} | {} |\n", category.label(), count));
    }
    report.push('\n');

    if !result.results.is_empty() {
        report.push_str("## Pages\n\n");
        for page in &result.results {
            report.push_str(&format!("### {}\n\n", page.url));
            report.push_str(&format!(
                "Status {}, {} ms, {} bytes\n\n",
                page.status_code, page.load_time_ms, page.content_length
            ));
            if page.issue_count() == 0 {
                report.push_str("No issues.\n\n");
                continue;
            }
            report.push_str("| Category | Severity | Issue |\n|---|---|---|\n");
            for (category, issues) in page.issues.iter() {
                for issue in issues {
                    report.push_str(&format!(
                        "| {} | {} | {} |\n",
                        category.label(),
                        issue.severity,
                        escape_cell(&describe_issue(issue))
                    ));
                }
            }
            report.push('\n');
        }
    }

    if !result.failed_pages.is_empty() {
        report.push_str("## Failed Pages\n\n");
        for failed in &result.failed_pages {
            report.push_str(&format!(
                "- `{}`: {} ({} attempts)\n",
                failed.url, failed.error, failed.attempts
            ));
        }
        report.push('\n');
    }

    report
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}

pub fn save_report(content: &str, path: &Path) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}

pub fn wrap_text(text: &str, width: usize, indent: &str) -> String {
    let mut result = String::new();
    let mut current_line = String::new();
    let available = width.saturating_sub(indent.len()).max(1);

    for word in text.split_whitespace() {
        if !current_line.is_empty() && current_line.len() + word.len() + 1 > available {
            result.push_str(indent);
            result.push_str(&current_line);
            result.push('\n');
            current_line.clear();
        }

        if !current_line.is_empty() {
            current_line.push(' ');
        }
        current_line.push_str(word);
    }

    if !current_line.is_empty() {
        result.push_str(indent);
        result.push_str(&current_line);
        result.push('\n');
    }

    result
}
