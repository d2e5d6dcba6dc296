//! Company monitor binary

use clap::{Parser, Subcommand};
use company_monitor::{Config, MonitorAggregator, MonitorError, Result, Roster, server};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "company_monitor", version, about = "Company health and news monitor")]
struct Cli {
    /// JSON roster file; defaults to the built-in roster
    #[arg(long, env = "ROSTER_PATH", global = true)]
    roster: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve reports over HTTP (default)
    Serve {
        #[arg(long, env = "BIND_ADDRESS")]
        bind: Option<String>,
    },
    /// Run a single aggregation and print the report
    Report {
        #[arg(long)]
        pretty: bool,
    },
}

#[actix_web::main]
async fn main() -> Result<()> {
    initialize_tracing();

    let cli = Cli::parse();

    info!("Starting company monitor v{}", env!("CARGO_PKG_VERSION"));

    let mut config = Config::from_env();
    if let Some(path) = cli.roster {
        config.roster_path = Some(path);
    }
    if let Some(Command::Serve { bind: Some(bind) }) = &cli.command {
        config.bind_address = bind.clone();
    }

    if let Err(e) = config.validate() {
        error!("Configuration validation failed: {}", e);
        std::process::exit(1);
    }

    let roster = match load_roster(&config) {
        Ok(roster) => roster,
        Err(e) => {
            error!("Failed to load roster: {}", e);
            std::process::exit(1);
        }
    };

    info!(
        "Monitor configuration - Companies: {}, Feed: {}, Health timeout: {}ms, News timeout: {}ms",
        roster.len(),
        config.news_feed_url,
        config.health_timeout.as_millis(),
        config.news_timeout.as_millis()
    );

    let aggregator = MonitorAggregator::new(&config, roster)?;

    match cli.command.unwrap_or(Command::Serve { bind: None }) {
        Command::Serve { .. } => server::serve(config, aggregator).await?,
        Command::Report { pretty } => {
            let report = aggregator.run().await?;
            let rendered = if pretty {
                serde_json::to_string_pretty(&report)?
            } else {
                serde_json::to_string(&report)?
            };
            println!("{}", rendered);
        }
    }

    Ok(())
}

fn load_roster(config: &Config) -> Result<Roster> {
    let roster = match &config.roster_path {
        Some(path) => Roster::from_file(path).map_err(|e| {
            MonitorError::Roster(format!("{}: {}", path.display(), e))
        })?,
        None => Roster::builtin(),
    };
    roster.validate()?;
    Ok(roster)
}

/// Initialize structured logging
fn initialize_tracing() {
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .json();

    let filter_layer = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(&log_level))
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();
}
