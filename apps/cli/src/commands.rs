//! CLI command definitions, routing, and tracing setup.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use jobwatch_core::{PipelineDeps, RecordOutcome, RunOptions, RunSummary, run_once};
use jobwatch_notify::TelegramNotifier;
use jobwatch_scrape::{JobTable, PageFetcher};
use jobwatch_shared::{AppConfig, RunConfig, init_config, load_config, load_config_from};
use jobwatch_storage::AlertStore;
use tracing::{info, warn};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// jobwatch: alert a Telegram chat about new job postings.
#[derive(Parser)]
#[command(
    name = "jobwatch",
    version,
    about = "Scrape a job listing page and send new postings to a Telegram chat.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Config file (defaults to ~/.jobwatch/jobwatch.toml).
    #[arg(long, global = true, env = "JOBWATCH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override the listing page URL.
    #[arg(long, global = true, env = "JOBWATCH_URL")]
    pub url: Option<String>,

    /// Override the database path.
    #[arg(long, global = true, env = "JOBWATCH_DB")]
    pub db: Option<String>,

    /// Override the destination chat id.
    #[arg(long, global = true, env = "JOBWATCH_CHAT_ID", allow_hyphen_values = true)]
    pub chat_id: Option<String>,

    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Append logs to this file instead of stdout.
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Fetch the listing once and alert about new postings.
    Run {
        /// Report new postings without sending or storing them.
        #[arg(long)]
        dry_run: bool,
    },

    /// Show postings already sent, newest first.
    History {
        /// Maximum number of postings to show.
        #[arg(short, long, default_value = "20")]
        limit: u32,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) -> Result<()> {
    use tracing_subscriber::fmt::writer::BoxMakeWriter;
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "jobwatch=info",
        1 => "jobwatch=debug",
        _ => "jobwatch=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    let (writer, ansi) = match &cli.log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| eyre!("cannot open log file {}: {e}", path.display()))?;
            (BoxMakeWriter::new(Mutex::new(file)), false)
        }
        None => (BoxMakeWriter::new(std::io::stdout), true),
    };

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_writer(writer)
                .with_ansi(ansi)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(writer)
                .init();
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match &cli.command {
        Command::Run { dry_run } => cmd_run(&cli, *dry_run).await,
        Command::History { limit } => cmd_history(&cli, *limit).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(&cli),
        },
    }
}

/// Load the config file and apply command-line overrides.
fn load_app_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = match &cli.config {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };

    if let Some(url) = &cli.url {
        config.source.url = url.clone();
    }
    if let Some(db) = &cli.db {
        config.storage.db_path = db.clone();
    }
    if let Some(chat_id) = &cli.chat_id {
        config.telegram.chat_id = chat_id.clone();
    }
    Ok(config)
}

async fn cmd_run(cli: &Cli, dry_run: bool) -> Result<()> {
    // Everything below is fatal at startup, before the pipeline runs.
    let config = RunConfig::resolve(&load_app_config(cli)?)?;
    let table = JobTable::new(&config.table_selector)?;
    let fetcher = PageFetcher::new(config.timeout)?;
    let notifier =
        TelegramNotifier::new(config.api_base.clone(), config.bot_token.clone(), config.timeout)?;
    let store = AlertStore::open(&config.db_path).await?;

    info!(
        url = %config.source_url,
        db = %config.db_path.display(),
        dry_run,
        "checking for new job postings"
    );

    let deps = PipelineDeps {
        fetcher: &fetcher,
        table: &table,
        store: &store,
        notifier: &notifier,
    };

    // A failed run has already been logged and reported to the chat; the
    // process still exits successfully so the scheduler simply tries again.
    match run_once(&config, &RunOptions { dry_run }, &deps).await {
        Ok(summary) => print_summary(&summary, dry_run),
        Err(e) => {
            warn!(error = %e, "run did not complete");
            println!();
            println!("  Run failed: {e}");
            println!();
        }
    }

    Ok(())
}

fn print_summary(summary: &RunSummary, dry_run: bool) {
    println!();
    if dry_run {
        println!("  Dry run complete.");
        println!("  New:        {}", summary.would_notify());
    } else {
        println!("  Run complete.");
        println!("  Notified:   {}", summary.notified());
    }
    println!("  Seen:       {}", summary.already_seen());
    println!("  Errors:     {}", summary.errors());
    println!("  Postings:   {}", summary.records.len());
    println!("  Time:       {:.1}s", summary.elapsed.as_secs_f64());

    for record in &summary.records {
        let marker = match &record.outcome {
            RecordOutcome::Notified => "sent",
            RecordOutcome::WouldNotify => "new",
            RecordOutcome::AlreadySeen => continue,
            RecordOutcome::StorageSkipped { .. } => "skipped",
            RecordOutcome::DeliveryFailed { .. } => "failed",
            RecordOutcome::NotifiedNotPersisted { .. } => "sent, not stored",
        };
        println!("    [{marker}] {} ({})", record.job.title, record.job.document_link);
    }
    println!();
}

async fn cmd_history(cli: &Cli, limit: u32) -> Result<()> {
    let config = load_app_config(cli)?;
    let db_path = PathBuf::from(&config.storage.db_path);
    if !db_path.exists() {
        return Err(eyre!(
            "no database at '{}': run `jobwatch run` first",
            db_path.display()
        ));
    }

    let store = AlertStore::open(&db_path).await?;
    let alerts = store.list_recent(limit).await?;

    if alerts.is_empty() {
        println!("No job alerts sent yet.");
        return Ok(());
    }

    for alert in &alerts {
        let sent_at = alert
            .notified_at
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "----------------".to_string());
        println!(
            "{}  {}  |  {}  |  last date: {}",
            sent_at,
            alert.job.title,
            alert.job.department_name,
            alert.job.last_date,
        );
        println!("    {}", alert.job.document_link);
    }
    println!();
    println!("  {} of {} stored alerts", alerts.len(), store.count().await?);

    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Created config file: {}", path.display());
    println!("Set telegram.chat_id there and export the bot token before running.");
    Ok(())
}

fn cmd_config_show(cli: &Cli) -> Result<()> {
    let config = load_app_config(cli)?;
    let rendered = toml::to_string_pretty(&config).map_err(|e| eyre!("{e}"))?;
    println!("{rendered}");

    let token_env = &config.telegram.bot_token_env;
    let token_state = match std::env::var(token_env) {
        Ok(v) if !v.trim().is_empty() => "set",
        _ => "NOT SET",
    };
    println!("# {token_env}: {token_state}");

    if let Err(e) = RunConfig::resolve(&config) {
        println!("# not runnable yet: {e}");
    }
    Ok(())
}
