//! CLI command definitions, routing, and tracing setup.

use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use askbase_core::pipeline::{AskConfig, IngestConfig, IngestReport, ProgressReporter};
use askbase_core::{AnswerGenerator, CompletionClient, ContextBudget};
use askbase_shared::{
    AppConfig, CrawlConfig, init_config, load_config, validate_api_key,
};
use askbase_snapshot::SnapshotStore;

use crate::chat;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// askbase — answer questions grounded in a snapshot of configured sources.
#[derive(Parser)]
#[command(
    name = "askbase",
    version,
    about = "Crawl a fixed set of sources into a snapshot and answer questions grounded in it.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
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
    /// Crawl all configured sources and replace the snapshot.
    Ingest,

    /// Ask a single question against the current snapshot.
    Ask {
        /// The question to answer.
        question: String,
    },

    /// Interactive chat session against the current snapshot.
    Chat,

    /// Show snapshot status (record count, per-source sizes).
    Status,

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
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "askbase=info",
        1 => "askbase=debug",
        _ => "askbase=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt().with_env_filter(env_filter).with_target(false).init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Ingest => cmd_ingest().await,
        Command::Ask { question } => cmd_ask(&question).await,
        Command::Chat => cmd_chat().await,
        Command::Status => cmd_status().await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show().await,
        },
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_ingest() -> Result<()> {
    let config = load_config()?;

    let ingest_config = IngestConfig {
        sources: config.sources.urls.clone(),
        crawl: CrawlConfig::from(&config),
        snapshot_path: config.snapshot.resolved_path()?,
    };

    info!(
        sources = ingest_config.sources.len(),
        snapshot = %ingest_config.snapshot_path.display(),
        "starting ingest run"
    );

    let reporter = CliProgress::new();
    let report = askbase_core::pipeline::ingest(&ingest_config, &reporter).await?;

    // Per-source failures are not fatal: the command exits 0 as long as the
    // snapshot itself was written.
    println!();
    println!("  Snapshot written!");
    println!("  Fetched: {}", report.fetched);
    println!("  Failed:  {}", report.failures.len());
    println!("  Path:    {}", report.snapshot_path.display());
    println!("  Time:    {:.1}s", report.elapsed.as_secs_f64());
    for (source, cause) in &report.failures {
        println!("    ! {source}: {cause}");
    }
    println!();

    Ok(())
}

async fn cmd_ask(question: &str) -> Result<()> {
    let config = load_config()?;
    validate_api_key(&config)?;

    let (ask_config, generator) = build_ask_context(&config)?;
    let answer = askbase_core::pipeline::ask(question, &ask_config, &generator).await?;

    println!("{answer}");
    Ok(())
}

async fn cmd_chat() -> Result<()> {
    let config = load_config()?;
    validate_api_key(&config)?;

    let (ask_config, generator) = build_ask_context(&config)?;
    chat::run(&ask_config, &generator).await
}

async fn cmd_status() -> Result<()> {
    let config = load_config()?;
    let path = config.snapshot.resolved_path()?;
    let records = SnapshotStore::new(&path).read();

    if records.is_empty() {
        println!("Snapshot empty or missing at {}", path.display());
        println!("Run `askbase ingest` to build it.");
        return Ok(());
    }

    println!("Snapshot: {} ({} records)", path.display(), records.len());
    for record in &records {
        println!("  {:>8} chars  {}", record.content.chars().count(), record.source);
    }
    Ok(())
}

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

/// Build the query-path pieces shared by `ask` and `chat`.
fn build_ask_context(config: &AppConfig) -> Result<(AskConfig, AnswerGenerator)> {
    let ask_config = AskConfig {
        snapshot_path: config.snapshot.resolved_path()?,
        budget: ContextBudget {
            per_record_cap: config.context.per_record_cap,
            total_budget: config.context.total_budget,
        },
    };

    let client = CompletionClient::new(&config.completion)?;
    let generator = AnswerGenerator::new(client, config.completion.temperature);

    Ok((ask_config, generator))
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// Ingest progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap()
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn done(&self, _report: &IngestReport) {
        self.spinner.finish_and_clear();
    }
}
