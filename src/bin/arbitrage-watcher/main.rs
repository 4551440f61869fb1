pub mod cli;

use std::fs::{self, File};
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use triangular_arbitrage::config::MarketConfig;
use triangular_arbitrage::dex::{AdapterSet, WsNodeClient};
use triangular_arbitrage::errors::Result;
use triangular_arbitrage::{EngineBuilder, Pipeline, RegistryBuilder};

/// Stdout logging, plus `<log_dir>/<timestamp>.log` when a directory is given.
fn init_logging(log_dir: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("triangular_arbitrage=info,arbitrage_watcher=info"));

    let file_layer = match log_dir {
        Some(dir) => {
            fs::create_dir_all(dir)?;
            let name = format!("{}.log", chrono::Utc::now().format("%Y-%m-%dT%H-%M-%S"));
            let file = File::create(dir.join(name))?;
            Some(fmt::layer().with_ansi(false).with_target(false).with_writer(Arc::new(file)))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .compact()
                .with_file(false)
                .with_line_number(false)
                .with_target(false),
        )
        .with(file_layer)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let args = cli::parse_cli_args();
    let config = args.watcher_config()?;
    init_logging(config.log_dir.as_deref())?;

    tracing::info!(node = %config.node_name, "Starting triangular arbitrage watcher");

    let markets = MarketConfig::load(&config.markets_path)?;
    let registries = RegistryBuilder::from_markets(&markets)?.build()?;
    let engine = EngineBuilder::from_config(registries.clone(), &config).build()?;

    let client = WsNodeClient::connect(&config.node_url).await?;
    tracing::info!(node = %config.node_name, url = %client.url(), "Connected to node");

    let running = Pipeline::new(Arc::new(client), AdapterSet::with_defaults(), registries, engine)
        .with_subscribe_delay(config.subscribe_delay)
        .start()
        .await?;

    let report = running
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for Ctrl-C");
                std::future::pending::<()>().await;
            }
        })
        .await?;

    tracing::info!(
        events = report.engine.events_received,
        discarded = report.engine.events_discarded,
        opportunities = report.engine.opportunities,
        "Watcher stopped"
    );
    Ok(())
}
