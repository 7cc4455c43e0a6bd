//! jobwatch CLI: one scrape-diff-notify run per invocation.
//!
//! Meant to be started by cron or a systemd timer. Fetches the job listing
//! page, alerts the operator's Telegram chat about postings it has not seen
//! before, and remembers them.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli)?;
    commands::run(cli).await
}
