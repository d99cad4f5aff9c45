use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tracing::{error, info};

mod args;
mod auth;
mod cfg;
mod error;
mod job;
mod sheets;
mod token;
mod transform;

use args::Args;
use cfg::Cfg;

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_logging(&args.log_level);

    if let Err(e) = run(args).await {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    info!("Starting cell_bump");

    let cfg = Cfg::load(args).context("Unable to load configuration")?;
    let column = cfg.validate()?;

    let hub = auth::obtain_client(&cfg, Arc::new(auth::ConsolePrompt))
        .await
        .context("Unable to retrieve Sheets client")?;
    let backend = sheets::GoogleSheets::new(hub, cfg.scope.clone());

    let today = chrono::Local::now().date_naive();
    let target = job::run_job(&cfg, column, today, &backend).await?;

    info!("cell_bump completed: {} = {}", target.range, target.value);
    Ok(())
}

fn init_logging(level: &str) {
    let filter = match level {
        "debug" => tracing::Level::DEBUG,
        "info" => tracing::Level::INFO,
        "warn" => tracing::Level::WARN,
        "error" => tracing::Level::ERROR,
        _ => tracing::Level::INFO,
    };

    tracing_subscriber::fmt()
        .with_max_level(filter)
        .with_writer(std::io::stderr)
        .init();
}
