//! CLI command definitions, routing, and tracing setup.

use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use skillscout_core::pipeline::{self, ProgressReporter};
use skillscout_shared::{AppConfig, CrawlConfig, EnrichConfig, init_config, load_config};
use skillscout_storage::Store;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// skillscout — index, enrich, and categorize marketplace skills.
#[derive(Parser)]
#[command(
    name = "skillscout",
    version,
    about = "Crawl the skills marketplace into a local JSON index with descriptions and categories.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Data directory holding the JSON files and markdown cache.
    #[arg(long, global = true)]
    pub data_dir: Option<String>,

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
    /// Crawl all leaderboards and rebuild the skill index.
    Crawl,

    /// Fetch and extract descriptions for the top indexed skills.
    Enrich {
        /// How many top-installed items to consider.
        #[arg(long)]
        top_n: Option<usize>,

        /// Worker pool size.
        #[arg(long)]
        concurrency: Option<usize>,
    },

    /// Assign a category to every indexed skill.
    Categorize,

    /// Run crawl, enrich, and categorize in sequence.
    Run {
        /// How many top-installed items to enrich.
        #[arg(long)]
        top_n: Option<usize>,

        /// Enrichment worker pool size.
        #[arg(long)]
        concurrency: Option<usize>,
    },

    /// Show a summary of the persisted index files.
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
        0 => "skillscout=info",
        1 => "skillscout=debug",
        _ => "skillscout=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Crawl => cmd_crawl(cli.data_dir.as_deref()).await,
        Command::Enrich { top_n, concurrency } => {
            cmd_enrich(cli.data_dir.as_deref(), top_n, concurrency).await
        }
        Command::Categorize => cmd_categorize(cli.data_dir.as_deref()),
        Command::Run { top_n, concurrency } => {
            cmd_run(cli.data_dir.as_deref(), top_n, concurrency).await
        }
        Command::Status => cmd_status(cli.data_dir.as_deref()),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(),
        },
    }
}

/// Open the store at the flag-, config-, or default-selected data dir.
fn open_store(config: &AppConfig, data_dir: Option<&str>) -> Result<Store> {
    let dir = data_dir.unwrap_or(&config.defaults.data_dir);
    Ok(Store::open(dir)?)
}

/// Build the enrichment config with CLI flag overrides applied.
fn enrich_config(
    config: &AppConfig,
    top_n: Option<usize>,
    concurrency: Option<usize>,
) -> EnrichConfig {
    let mut enrich = EnrichConfig::from(config);
    if let Some(n) = top_n {
        enrich.top_n = n;
    }
    if let Some(k) = concurrency {
        enrich.concurrency = k;
    }
    enrich
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_crawl(data_dir: Option<&str>) -> Result<()> {
    let config = load_config()?;
    let store = open_store(&config, data_dir)?;
    let crawl_config = CrawlConfig::from(&config);

    info!(base_url = %crawl_config.base_url, "crawling leaderboards");

    let reporter = CliProgress::new();
    let result = pipeline::run_crawl(&crawl_config, &store, &reporter).await?;
    reporter.finish();

    println!();
    println!("  Crawl complete!");
    println!("  Skills:   {}", result.skills);
    println!("  Pages:    {}", result.pages_fetched);
    println!("  New ids:  {}", result.new_ids);
    println!("  Time:     {:.1}s", result.elapsed.as_secs_f64());
    println!();

    Ok(())
}

async fn cmd_enrich(
    data_dir: Option<&str>,
    top_n: Option<usize>,
    concurrency: Option<usize>,
) -> Result<()> {
    let config = load_config()?;
    let store = open_store(&config, data_dir)?;
    let enrich = enrich_config(&config, top_n, concurrency);

    info!(top_n = enrich.top_n, concurrency = enrich.concurrency, "enriching index");

    let reporter = CliProgress::new();
    let result = pipeline::run_enrich(&enrich, &store, &reporter).await?;
    reporter.finish();

    println!();
    println!("  Enrichment complete!");
    println!("  Considered:  {}", result.considered);
    println!("  Enriched:    {}", result.enriched);
    println!("  Cache hits:  {}", result.cache_hits);
    println!("  Failed:      {}", result.failed);
    println!("  Time:        {:.1}s", result.duration.as_secs_f64());
    println!();

    Ok(())
}

fn cmd_categorize(data_dir: Option<&str>) -> Result<()> {
    let config = load_config()?;
    let store = open_store(&config, data_dir)?;

    let reporter = CliProgress::new();
    let result = pipeline::run_categorize(&store, &reporter)?;
    reporter.finish();

    println!();
    println!("  Categorization complete!");
    println!("  Skills:         {}", result.skills);
    println!("  Uncategorized:  {}", result.uncategorized);
    println!();

    Ok(())
}

async fn cmd_run(
    data_dir: Option<&str>,
    top_n: Option<usize>,
    concurrency: Option<usize>,
) -> Result<()> {
    let config = load_config()?;
    let store = open_store(&config, data_dir)?;
    let crawl_config = CrawlConfig::from(&config);
    let enrich = enrich_config(&config, top_n, concurrency);

    let reporter = CliProgress::new();
    let result = pipeline::run_all(&crawl_config, &enrich, &store, &reporter).await?;
    reporter.finish();

    println!();
    println!("  Pipeline complete!");
    println!("  Skills:         {}", result.crawl.skills);
    println!("  Enriched:       {}", result.enrich.enriched);
    println!("  Cache hits:     {}", result.enrich.cache_hits);
    println!("  Uncategorized:  {}", result.categorize.uncategorized);
    println!();

    Ok(())
}

fn cmd_status(data_dir: Option<&str>) -> Result<()> {
    let config = load_config()?;
    let store = open_store(&config, data_dir)?;

    let report = pipeline::status(&store)?;

    println!();
    println!("  Skills:         {}", report.skills);
    println!("  Described:      {}", report.described);
    println!("  Updated:        {}", report.updated_at.to_rfc3339());
    println!("  Source update:  {}", report.source_updated_at.to_rfc3339());
    if !report.category_totals.is_empty() {
        println!();
        println!("  Categories:");
        for (name, total) in &report.category_totals {
            println!("    {name:<20} {total}");
        }
    }
    println!();

    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config written to {}", path.display());
    Ok(())
}

fn cmd_config_show() -> Result<()> {
    let config = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
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

    fn finish(&self) {
        self.spinner.finish_and_clear();
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }
}
