//! Real-time push server.
//!
//! Holds WebSocket sessions per client id and delivers messages published
//! through any instance sharing the same Redis channel.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin dengon-server
//! cargo run --bin dengon-server -- --port 3000 --redis-url redis://127.0.0.1:6379
//! ```

use std::time::Duration;

use clap::Parser;
use dengon_server::{
    bootstrap::{Instance, connect_bus},
    config::ServerConfig,
    infrastructure::relay::DEFAULT_CHANNEL,
};
use dengon_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "dengon-server")]
#[command(about = "WebSocket push server with cross-instance relay", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "8080")]
    port: u16,

    /// Redis URL of the relay bus (omit to run a single instance)
    #[arg(long, env = "DENGON_REDIS_URL")]
    redis_url: Option<String>,

    /// Relay channel shared by all instances
    #[arg(long, default_value = DEFAULT_CHANNEL)]
    channel: String,

    /// Close sessions that stay silent for this many seconds
    #[arg(long, default_value = "600")]
    idle_timeout_secs: u64,

    /// Default log level (overridden by RUST_LOG)
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl From<Args> for ServerConfig {
    fn from(args: Args) -> Self {
        Self {
            host: args.host,
            port: args.port,
            redis_url: args.redis_url,
            channel: args.channel,
            idle_timeout: Duration::from_secs(args.idle_timeout_secs),
        }
    }
}

async fn run(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let bus = connect_bus(&config).await?;
    let instance = Instance::new(bus, &config);

    // Subscribe before serving so our own publishes come back to us
    let subscriber = instance.subscriber.start().await?;

    let result = instance.server.run(&config.bind_addr()).await;
    subscriber.shutdown().await;
    result
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), &args.log_level);

    let config = ServerConfig::from(args);
    tracing::debug!("Starting with {:?}", config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
