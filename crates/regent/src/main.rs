use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use regent_agents::RunOptions;
use regent_models::RegentConfig;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "regent", about = "Temporal multi-agent market regime orchestrator")]
struct Cli {
    /// Start date (YYYY-MM-DD)
    start_date: String,

    /// End date (YYYY-MM-DD), defaults to start_date
    end_date: Option<String>,

    /// Skip Saturday and Sunday
    #[arg(long)]
    skip_weekends: bool,

    /// Skip dates with no input folder
    #[arg(long)]
    skip_missing: bool,

    /// Path to configuration file
    #[arg(short, long, default_value = "config/regent.toml")]
    config: String,
}

fn parse_date(label: &str, value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .with_context(|| format!("invalid {label}: {value} (expected YYYY-MM-DD)"))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing (respects RUST_LOG env var)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Validate dates before touching anything else.
    let start = parse_date("start_date", &cli.start_date)?;
    let end = match &cli.end_date {
        Some(value) => parse_date("end_date", value)?,
        None => start,
    };
    if end < start {
        bail!("end_date {end} is before start_date {start}");
    }

    // Load config; a missing file falls back to the built-in defaults.
    let config = match std::fs::read_to_string(&cli.config) {
        Ok(content) => toml::from_str::<RegentConfig>(&content)
            .with_context(|| format!("failed to parse config: {}", cli.config))?,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            info!(path = %cli.config, "config file not found, using defaults");
            RegentConfig::default()
        }
        Err(e) => return Err(e).with_context(|| format!("failed to read config: {}", cli.config)),
    };

    let options = RunOptions {
        skip_weekends: cli.skip_weekends,
        skip_missing: cli.skip_missing,
    };

    info!(%start, %end, skip_weekends = cli.skip_weekends, skip_missing = cli.skip_missing, "starting run");

    let mut orchestrator =
        regent::build_orchestrator(&config, options).context("failed to build orchestrator")?;
    let summary = orchestrator.run_range(start, end).await;

    println!("{summary}");

    Ok(())
}
