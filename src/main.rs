//! Reclaim — disk space analyser and file organizer.
//!
//! Thin binary entry point. All logic lives in the `reclaim-core`
//! and `reclaim-cli` crates.

use clap::Parser;

fn main() -> anyhow::Result<()> {
    let cli = reclaim_cli::Cli::parse();

    // Logs go to stderr so JSON on stdout stays clean.
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("Reclaim starting");

    reclaim_cli::run(cli)
}
