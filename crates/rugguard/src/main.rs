//! RUGGUARD bot - answers trigger replies with a trust report on the original author.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use rugguard::config::{DEFAULT_QUERY, DEFAULT_TRUSTED_FILE};
use rugguard::twitter::API_BASE_URL;
use rugguard::{
    BotConfig, BotContext, Clock, Credentials, HttpTwitterClient, MonitorLoop, SystemClock,
};

/// RUGGUARD bot - monitor trigger replies and post trust reports.
#[derive(Parser)]
#[command(name = "rugguard")]
#[command(about = "Reply monitor that posts trust reports about original authors")]
#[command(version)]
struct Cli {
    /// Search query for trigger replies.
    #[arg(long, env = "RUGGUARD_QUERY", default_value = DEFAULT_QUERY)]
    query: String,

    /// Trusted-account list, one handle per line (re-read on every check).
    #[arg(long, env = "RUGGUARD_TRUSTED_FILE", default_value = DEFAULT_TRUSTED_FILE)]
    trusted_file: PathBuf,

    /// Twitter API base URL.
    #[arg(long, env = "TWITTER_API_BASE_URL", default_value = API_BASE_URL)]
    api_base_url: String,

    /// Log output format.
    #[arg(long, value_enum, default_value = "text")]
    log_format: LogFormat,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // A missing .env file is fine; credentials may come from the real environment.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_format);

    let credentials = Credentials::from_env();
    tracing::debug!("Loaded credentials from environment");

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let client = HttpTwitterClient::new(&credentials, clock.clone())
        .context("Failed to build Twitter client")?
        .with_base_url(cli.api_base_url);

    let config = BotConfig {
        query: cli.query,
        trusted_file: cli.trusted_file,
        ..BotConfig::default()
    };
    info!(
        query = %config.query,
        trusted_file = %config.trusted_file.display(),
        "Starting monitor"
    );

    let mut monitor = MonitorLoop::new(BotContext::new(Arc::new(client), clock, config));

    tokio::select! {
        () = monitor.run() => {}
        () = async { tokio::signal::ctrl_c().await.ok(); } => {
            info!("Received SIGINT, shutting down");
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool, format: LogFormat) {
    let default_filter = if verbose {
        "rugguard=debug,info"
    } else {
        "rugguard=info,warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let (text, json) = match format {
        LogFormat::Text => (Some(fmt::layer()), None),
        LogFormat::Json => (None, Some(fmt::layer().json())),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(text)
        .with(json)
        .init();
}
