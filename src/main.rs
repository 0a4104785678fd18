use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing::info;

use taskd::{config::TaskdConfig, rest, AppContext};

#[derive(Parser)]
#[command(
    name = "taskd",
    about = "Per-client to-do HTTP service with subtasks, stats, and due-date notifications",
    version
)]
struct Args {
    /// HTTP server port
    #[arg(long, env = "TASKD_PORT")]
    port: Option<u16>,

    /// Data directory searched for config.toml
    #[arg(long, env = "TASKD_DATA_DIR")]
    data_dir: Option<std::path::PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "TASKD_LOG")]
    log: Option<String>,

    /// Bind address (default: 127.0.0.1; use 0.0.0.0 for LAN access)
    #[arg(long, env = "TASKD_BIND")]
    bind_address: Option<String>,

    /// Shared secret required in the x-api-key header on mutating routes
    #[arg(long, env = "TASKD_API_KEY")]
    api_key: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = TaskdConfig::new(
        args.port,
        args.data_dir,
        args.log,
        args.bind_address,
        args.api_key,
    );
    setup_logging(&config.log, &config.log_format);

    info!(
        port = config.port,
        bind = %config.bind_address,
        "starting taskd"
    );

    let ctx = Arc::new(AppContext::new(config));
    rest::start_rest_server(ctx).await
}

/// Initialise the global tracing subscriber.
///
/// `log_format` may be `"pretty"` (default, human-readable compact format) or
/// `"json"` (structured JSON for log aggregators).
fn setup_logging(log_level: &str, log_format: &str) {
    if log_format == "json" {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(log_level)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(log_level)
            .compact()
            .init();
    }
}
