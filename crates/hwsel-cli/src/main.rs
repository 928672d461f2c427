//! hwsel CLI - Select the hardware acceleration engine that fits this machine

mod cli;
mod commands;
mod context;
mod error;
mod output;
mod settings;
mod store;

use clap::Parser;
use cli::Cli;
use colored::Colorize;
pub use error::CliError;
use tracing_subscriber::EnvFilter;

/// Exit status when no engine qualifies for this machine.
const EXIT_NO_COMPATIBLE_ENGINE: i32 = 2;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries documents
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match commands::run(cli) {
        Err(err) if err.is_no_compatible_engine() => {
            eprintln!("{} No compatible engine found for this machine.", "✘".red());
            eprintln!("  Run `hwsel list-engines` to see which requirements are not met.");
            std::process::exit(EXIT_NO_COMPATIBLE_ENGINE);
        }
        result => Ok(result?),
    }
}
