use colored::Colorize;
use seoscope::commands::command_argument_builder;
use seoscope::handlers::{handle_audit, init_logging, print_banner, shows_banner};

#[tokio::main]
async fn main() {
    let chosen_command = command_argument_builder().get_matches();
    let quiet = chosen_command.get_flag("quiet");
    let verbose = chosen_command.get_flag("verbose");

    init_logging(verbose);

    if shows_banner(&chosen_command) {
        print_banner();
    }

    match chosen_command.subcommand() {
        Some(("audit", primary_command)) => {
            if let Err(e) = handle_audit(primary_command, quiet).await {
                eprintln!("{} {:#}", "✗".red().bold(), e);
                std::process::exit(1);
            }
        }
        // No subcommand provided, just show the banner
        None => {}
        _ => unreachable!("clap should ensure we don't get here"),
    }
}
