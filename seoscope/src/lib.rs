pub mod commands;
pub mod handlers;

pub use handlers::{AuditArgs, expand_output_path, parse_url_line};

// Re-export the audit entry points from seoscope-core
pub use seoscope_core::{AuditOptions, AuditRequest, AuditResult, execute_audit};

pub const CLAP_STYLING: clap::builder::styling::Styles = clap::builder::styling::Styles::styled()
    .header(clap_cargo::style::HEADER)
    .usage(clap_cargo::style::USAGE)
    .literal(clap_cargo::style::LITERAL)
    .placeholder(clap_cargo::style::PLACEHOLDER)
    .error(clap_cargo::style::ERROR)
    .valid(clap_cargo::style::VALID)
    .invalid(clap_cargo::style::INVALID);
