use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use chrono::{Local, NaiveTime};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use order_ingestor::providers::OrderSource;
use order_ingestor::providers::woo_rest::{FetchSettings, RetrySettings, WooProvider};

use ledger_sync::calendar::history_window_start;
use ledger_sync::config::load_config;
use ledger_sync::ledger::LedgerStore;
use ledger_sync::locale::Labels;
use ledger_sync::mailmerge::merge_fields_for_status;
use ledger_sync::project::ProjectionContext;
use ledger_sync::schema::Schema;
use ledger_sync::sync::reconcile_orders;

#[derive(Parser)]
#[command(version, about = "Order ledger sync CLI")]
struct Cli {
    /// Path to the config file (orders.toml)
    #[arg(short, long)]
    config: String,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Fetch recent orders and reconcile them into the ledger
    Sync {
        /// Reconcile in memory and report, but do not save the ledger
        #[arg(long)]
        dry_run: bool,
    },

    /// Print the mail-merge hand-off mapping for rows in one status
    MergeFields {
        /// Status label to select; defaults to the "processing" label
        #[arg(long)]
        status: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Cmd::Sync { dry_run } => run_sync(Path::new(&cli.config), dry_run).await,
        Cmd::MergeFields { status } => print_merge_fields(Path::new(&cli.config), status),
    }
}

/// Emits the flat field → value mappings the external templating
/// collaborator consumes, one object per matching row.
fn print_merge_fields(config_path: &Path, status: Option<String>) -> Result<()> {
    let config = load_config(config_path)?;
    let labels = Labels::for_lang(config.sync.lang);
    let store = LedgerStore::load(
        &config.sync.ledger_path,
        Schema::new(&config.styles),
        labels.clone(),
    )?;

    let status_label = status.unwrap_or_else(|| labels.status_label("processing"));
    let mappings = merge_fields_for_status(&store, &status_label);
    println!("{}", serde_json::to_string_pretty(&mappings)?);
    Ok(())
}

async fn run_sync(config_path: &Path, dry_run: bool) -> Result<()> {
    // Config and credentials fail fast, before any network or file I/O.
    let config = load_config(config_path)?;
    let provider = WooProvider::from_env(
        &config.api.url,
        RetrySettings::new(
            config.api.retry_attempts,
            Duration::from_secs(config.api.timeout_secs),
            Duration::from_secs(config.api.timeout_step_secs),
        ),
        FetchSettings {
            per_page: config.api.per_page,
            max_pages: config.api.max_pages,
        },
    )?;

    let today = Local::now().date_naive();
    let window_start = history_window_start(today, config.sync.history_days)?;
    info!(%window_start, "fetching orders");
    let fetched = provider
        .fetch_since(window_start.and_time(NaiveTime::MIN))
        .await?;

    let excluded = &config.sync.excluded_statuses;
    let orders: Vec<_> = fetched
        .into_iter()
        .filter(|order| !excluded.iter().any(|status| *status == order.status))
        .collect();
    if orders.is_empty() {
        info!("no orders to reconcile");
        return Ok(());
    }

    let schema = Schema::new(&config.styles);
    let labels = Labels::for_lang(config.sync.lang);
    let mut store = LedgerStore::load(&config.sync.ledger_path, schema.clone(), labels.clone())?;
    let ctx = ProjectionContext {
        schema: &schema,
        labels: &labels,
    };
    let report = reconcile_orders(&mut store, &orders, &ctx);

    if dry_run {
        info!(%report, "dry run: ledger not saved");
    } else {
        store.save(&config.sync.ledger_path)?;
        info!(%report, path = %config.sync.ledger_path.display(), "sync complete");
    }
    Ok(())
}
