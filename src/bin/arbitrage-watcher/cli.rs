use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use triangular_arbitrage::config::{WatcherConfig, DEFAULT_MARKETS_PATH, DEFAULT_NODE_NAME, DEFAULT_SUBSCRIBE_DELAY_MS};
use triangular_arbitrage::errors::Result;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    #[clap(long, env = "ARB_NODE_URL", help = "WebSocket endpoint of the node (ws:// or wss://)")]
    pub node_url: String,

    #[clap(long, env = "ARB_NODE_NAME", default_value = DEFAULT_NODE_NAME, help = "Label for the node in logs")]
    pub node_name: String,

    #[clap(long, env = "ARB_MARKETS_PATH", default_value = DEFAULT_MARKETS_PATH, help = "JSON file with the tokens and pools to watch")]
    pub markets: PathBuf,

    #[clap(long, env = "ARB_MIN_PROFIT_BPS", default_value_t = 0, help = "Minimum profit in BPS a cycle must exceed to be reported")]
    pub min_profit_bps: u32,

    #[clap(long, env = "ARB_SUBSCRIBE_DELAY_MS", default_value_t = DEFAULT_SUBSCRIBE_DELAY_MS, help = "Delay between pool subscriptions at startup")]
    pub subscribe_delay_ms: u64,

    #[clap(long, env = "ARB_LOG_DIR", help = "Also write logs to <LOG_DIR>/<timestamp>.log")]
    pub log_dir: Option<PathBuf>,
}

impl Args {
    /// Validated watcher configuration from the parsed arguments
    pub fn watcher_config(&self) -> Result<WatcherConfig> {
        let config = WatcherConfig::new(&self.node_url, &self.markets)?
            .with_node_name(&self.node_name)
            .with_min_profit_bps(self.min_profit_bps)
            .with_subscribe_delay(Duration::from_millis(self.subscribe_delay_ms))
            .with_log_dir(self.log_dir.clone());
        config.validate()?;
        Ok(config)
    }
}

pub fn parse_cli_args() -> Args {
    Args::parse()
}
