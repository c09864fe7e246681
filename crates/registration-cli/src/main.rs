//! Registration CLI - Entry point.

use anyhow::Context;
use clap::Parser;
use registration_cli::{build_client, execute, AppResult, Cli, Config, Preferences};
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> AppResult<()> {
    // Load configuration
    let mut config = Config::load().context("Failed to load configuration")?;
    if let Some(base_url) = cli.base_url {
        config.server.base_url = base_url;
    }

    init_logging(&config.log.level);

    debug!(
        base_url = %config.server.base_url,
        preferences = ?config.preferences.path,
        "Configuration loaded"
    );

    let client = build_client(&config.server)?;
    let preferences = Preferences::open(&config.preferences.path);

    let output = execute(cli.command, &client, &preferences).await?;
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
