use anyhow::{Context, Result, anyhow};
use clap::ArgMatches;
use colored::Colorize;
use seoscope_core::config::{DEFAULT_MAX_CONCURRENCY, DEFAULT_MAX_PAGES, DEFAULT_TIMEOUT_SECS};
use seoscope_core::report::{ReportFormat, render_report, save_report};
use seoscope_core::{AuditOptions, AuditRequest, AuditResult, RetryPolicy, Severity, execute_audit};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use url::Url;

/// Installs the global subscriber. `RUST_LOG` wins over `verbose`.
pub fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Parse a seed as a URL, adding http:// when no scheme was given
pub fn parse_url_line(line: &str) -> Option<String> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    if let Ok(url) = Url::parse(line)
        && (url.scheme() == "http" || url.scheme() == "https")
    {
        return Some(line.to_string());
    }

    // An explicit foreign scheme is left for request validation to reject.
    if line.contains("://") {
        return Some(line.to_string());
    }

    let with_scheme = format!("http://{}", line);
    if Url::parse(&with_scheme).is_ok_and(|url| url.host_str().is_some()) {
        return Some(with_scheme);
    }

    None
}

pub fn expand_output_path(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).as_ref())
}

/// Everything `audit` needs, pulled out of the parsed arguments.
#[derive(Debug, Clone)]
pub struct AuditArgs {
    pub request: AuditRequest,
    pub options: AuditOptions,
    pub format: ReportFormat,
    pub output: Option<PathBuf>,
}

impl AuditArgs {
    pub fn from_matches(sub_matches: &ArgMatches) -> Result<Self> {
        let raw_url = sub_matches
            .get_one::<String>("url")
            .ok_or_else(|| anyhow!("--url is required"))?;
        let url = parse_url_line(raw_url).ok_or_else(|| anyhow!("Invalid URL '{}'", raw_url))?;

        let max_pages = sub_matches
            .get_one::<i64>("max-pages")
            .copied()
            .unwrap_or(DEFAULT_MAX_PAGES as i64);
        let concurrency = sub_matches
            .get_one::<i64>("concurrency")
            .copied()
            .unwrap_or(DEFAULT_MAX_CONCURRENCY as i64);
        let request = AuditRequest::new(url, max_pages, concurrency);
        request.validate()?;

        let defaults = RetryPolicy::default();
        let retry = RetryPolicy::new(
            sub_matches
                .get_one::<u32>("retries")
                .copied()
                .unwrap_or(defaults.max_retries),
            sub_matches
                .get_one::<u64>("retry-wait-ms")
                .copied()
                .unwrap_or(defaults.initial_wait_ms),
            sub_matches
                .get_one::<f64>("backoff")
                .copied()
                .unwrap_or(defaults.backoff_scaling),
        )?;

        let format_name = sub_matches
            .get_one::<String>("format")
            .map(String::as_str)
            .unwrap_or("text");
        let format = ReportFormat::from_str(format_name)
            .ok_or_else(|| anyhow!("Unsupported report format '{}'", format_name))?;

        let options = AuditOptions {
            retry,
            timeout_secs: sub_matches
                .get_one::<u64>("timeout")
                .copied()
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
            use_sitemap: !sub_matches.get_flag("no-sitemap"),
            // Progress bars only accompany text reports.
            show_progress_bars: !sub_matches.get_flag("no-progress") && format == ReportFormat::Text,
            ..Default::default()
        };

        Ok(Self {
            request,
            options,
            format,
            output: sub_matches
                .get_one::<String>("output")
                .map(|raw| expand_output_path(raw)),
        })
    }
}

/// The banner goes to stdout, so it is left out whenever stdout carries a
/// json or markdown report.
pub fn shows_banner(matches: &ArgMatches) -> bool {
    if matches.get_flag("quiet") {
        return false;
    }
    match matches.subcommand() {
        Some(("audit", sub_matches)) => {
            let to_file = sub_matches.get_one::<String>("output").is_some();
            let format = sub_matches
                .get_one::<String>("format")
                .and_then(|name| ReportFormat::from_str(name))
                .unwrap_or(ReportFormat::Text);
            to_file || format == ReportFormat::Text
        }
        _ => true,
    }
}

pub fn print_banner() {
    println!(
        "{} {}",
        "seoscope".bright_cyan().bold(),
        env!("CARGO_PKG_VERSION").bright_black()
    );
    println!("{}", "bounded, retrying SEO audits".bright_black());
    println!();
}

fn print_divider() {
    println!("{}", "═".repeat(60).bright_blue().bold());
}

fn print_configuration(args: &AuditArgs) {
    print_divider();
    println!("{}", "  SEO AUDIT".bright_white().bold());
    print_divider();
    println!("{} Site: {}", "→".blue(), args.request.url.bright_white());
    println!("{} Max pages: {}", "→".blue(), args.request.max_pages);
    println!("{} Concurrency: {}", "→".blue(), args.request.max_concurrency);
    println!(
        "{} Retries: {} (first wait {}ms, x{})",
        "→".blue(),
        args.options.retry.max_retries,
        args.options.retry.initial_wait_ms,
        args.options.retry.backoff_scaling
    );
    println!(
        "{} Discovery: {}",
        "→".blue(),
        if args.options.use_sitemap {
            "sitemap, then links"
        } else {
            "links only"
        }
    );
    println!();
}

fn print_summary(result: &AuditResult) {
    println!(
        "{} Audit complete: {} pages analyzed, {} failed",
        "✓".green().bold(),
        result.pages_analyzed,
        result.failed_pages.len()
    );
    println!(
        "  {} errors, {} warnings, {} info ({} issues)",
        result.severity_count(Severity::Error).to_string().red().bold(),
        result.severity_count(Severity::Warning).to_string().yellow().bold(),
        result.severity_count(Severity::Info).to_string().blue(),
        result.total_issues
    );
}

pub async fn handle_audit(sub_matches: &ArgMatches, quiet: bool) -> Result<()> {
    let args = AuditArgs::from_matches(sub_matches)?;
    debug!("Audit arguments: {:?}", args);

    let chatty = !quiet && (args.output.is_some() || args.format == ReportFormat::Text);
    if chatty {
        print_configuration(&args);
    }

    let result = execute_audit(args.request.clone(), args.options.clone())
        .await
        .with_context(|| format!("Audit of {} failed", args.request.url))?;

    let report = render_report(&result, args.format).context("Failed to render report")?;

    match args.output {
        Some(ref path) => {
            save_report(&report, path)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            if chatty {
                print_summary(&result);
                println!("{} Report saved to {}", "✓".green().bold(), path.display());
            }
        }
        None => {
            print!("{}", report);
            if chatty {
                print_summary(&result);
            }
        }
    }

    Ok(())
}
