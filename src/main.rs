use anyhow::{bail, Context, Result};
use bdx_delta::{
    export_snapshot, ingest_file, ingest_pair, ChangeReport, ClientConfig, SnapshotRegistry,
    VERSION,
};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Feed file extension the registry scans for comparisons
const FEED_EXT: &str = "xml";

#[derive(Parser, Debug)]
#[command(name = "bdx-delta")]
#[command(about = "Ingest BDX builder feeds and report changes between snapshots")]
#[command(version)]
struct Args {
    /// Client configuration file (TOML)
    #[arg(short, long, env = "BDX_CONFIG")]
    config: Option<PathBuf>,

    /// Client key, overrides the config file
    #[arg(long, env = "BDX_CLIENT")]
    client: Option<String>,

    /// Root data directory, overrides the config file
    #[arg(long, env = "BDX_DATA_DIR")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compare the newest feed against an older generation
    Compare {
        /// Generation to compare against (1 = second-newest date)
        #[arg(short, long, default_value_t = 1)]
        generation: usize,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Ingest one feed and write dated CSV extracts
    Export {
        /// Feed file to ingest
        feed: PathBuf,

        /// Extract date (defaults to today)
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Output directory (defaults to the client directory)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bdx_delta=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;
    info!(client = %config.client_key, version = VERSION, "bdx-delta starting");

    match args.command {
        Command::Compare { generation, json } => run_compare(&config, generation, json),
        Command::Export { feed, date, out } => run_export(&config, feed, date, out),
    }
}

fn load_config(args: &Args) -> Result<ClientConfig> {
    let mut config = match (&args.config, &args.client) {
        (Some(path), _) => ClientConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        (None, Some(client)) => ClientConfig::new(client.clone()),
        (None, None) => bail!("either --config or --client is required"),
    };

    if let Some(client) = &args.client {
        config.client_key = client.clone();
    }
    if let Some(data_dir) = &args.data_dir {
        config.data_dir = data_dir.clone();
    }
    config.validate().context("Invalid client configuration")?;
    Ok(config)
}

fn run_compare(config: &ClientConfig, generation: usize, json: bool) -> Result<()> {
    let dir = config.client_dir();
    let registry = SnapshotRegistry::scan(&dir, FEED_EXT, &config.client_key)
        .with_context(|| format!("Failed to scan {}", dir.display()))?;

    let latest = registry.latest().context("No feed extracts found")?;
    let Some(current) = latest.get(&config.feed_kind) else {
        bail!("newest generation has no '{}' extract", config.feed_kind);
    };

    let previous = match registry.previous(generation) {
        Ok(files) => files.get(&config.feed_kind).map(|record| record.path.clone()),
        Err(err) if err.is_not_found() => {
            warn!(generation, "No older generation; every plan is reported without a baseline");
            None
        }
        Err(err) => return Err(err.into()),
    };

    let options = config.ingest_options();
    let (current, previous) = ingest_pair(&current.path, previous.as_deref(), &options)
        .context("Failed to ingest feeds")?;

    let report = ChangeReport::compare(&current, previous.as_ref());
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to encode report")?
        );
    } else {
        println!("{}", report);
    }
    Ok(())
}

fn run_export(
    config: &ClientConfig,
    feed: PathBuf,
    date: Option<NaiveDate>,
    out: Option<PathBuf>,
) -> Result<()> {
    let options = config.ingest_options();
    let snapshot = ingest_file(&feed, &options)
        .with_context(|| format!("Failed to ingest {}", feed.display()))?;

    let date = date.unwrap_or_else(|| chrono::Local::now().date_naive());
    let dir = out.unwrap_or_else(|| config.client_dir());
    let written = export_snapshot(&snapshot, &dir, &config.client_key, date)
        .with_context(|| format!("Failed to export to {}", dir.display()))?;

    println!("{}", snapshot.summary());
    for path in written {
        println!("  {}", path.display());
    }
    Ok(())
}
