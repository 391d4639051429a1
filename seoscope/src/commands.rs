use crate::CLAP_STYLING;
use clap::{arg, command};

pub fn command_argument_builder() -> clap::Command {
    clap::Command::new("seoscope")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("seoscope")
        .styles(CLAP_STYLING)
        .arg(
            arg!(-q --"quiet" "Suppress banner and non-essential output")
                .required(false)
                .global(true),
        )
        .arg(
            arg!(-v --"verbose" "Enable debug logging (RUST_LOG takes precedence)")
                .required(false)
                .global(true),
        )
        .subcommand_required(false)
        .subcommand(
            command!("audit")
                .about(
                    "Discover the pages of a site and audit each one for meta tag, link, heading, \
                image and performance issues.",
                )
                .arg(
                    arg!(-u --"url" <URL>)
                        .required(true)
                        .help("The site to audit. http:// is assumed when no scheme is given"),
                )
                .arg(
                    arg!(-p --"max-pages" <MAX_PAGES>)
                        .required(false)
                        .help("Maximum number of pages to audit (clamped to 1-100)")
                        .value_parser(clap::value_parser!(i64))
                        .allow_negative_numbers(true)
                        .default_value("25"),
                )
                .arg(
                    arg!(-c --"concurrency" <CONCURRENCY>)
                        .required(false)
                        .help("Pages analyzed at once, also the cap on open requests (clamped to 1-50)")
                        .value_parser(clap::value_parser!(i64))
                        .allow_negative_numbers(true)
                        .default_value("10"),
                )
                .arg(
                    arg!(--"retries" <N>)
                        .required(false)
                        .help("Retries per page after the first attempt")
                        .value_parser(clap::value_parser!(u32))
                        .default_value("3"),
                )
                .arg(
                    arg!(--"retry-wait-ms" <MS>)
                        .required(false)
                        .help("Wait before the first retry, in milliseconds")
                        .value_parser(clap::value_parser!(u64))
                        .default_value("1000"),
                )
                .arg(
                    arg!(--"backoff" <FACTOR>)
                        .required(false)
                        .help("Multiplier applied to the wait after every retry")
                        .value_parser(clap::value_parser!(f64))
                        .default_value("2.0"),
                )
                .arg(
                    arg!(--"timeout" <SECONDS>)
                        .required(false)
                        .help("Request timeout in seconds")
                        .value_parser(clap::value_parser!(u64))
                        .default_value("10"),
                )
                .arg(
                    arg!(--"no-sitemap")
                        .required(false)
                        .help("Skip /sitemap.xml and discover pages by following links")
                        .action(clap::ArgAction::SetTrue),
                )
                .arg(
                    arg!(-f --"format" <FORMAT>)
                        .required(false)
                        .help("Report format: text, json, markdown")
                        .value_parser(["text", "json", "markdown", "md"])
                        .default_value("text"),
                )
                .arg(
                    arg!(-o --"output" <PATH>)
                        .required(false)
                        .help("Save report to file (default: display to screen)"),
                )
                .arg(
                    arg!(--"no-progress")
                        .required(false)
                        .help("Hide progress bars")
                        .action(clap::ArgAction::SetTrue),
                ),
        )
}
