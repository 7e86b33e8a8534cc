//! Fantasy Wrapped dashboard server

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use dashboard_service::{build_state, create_routes, initialize_logging, load_config, spawn_session_pruner};

#[derive(Parser, Debug)]
#[command(name = "fantasy-wrapped", version, about = "Season-in-review dashboard for a Yahoo fantasy league")]
struct Args {
    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Listen port, overriding the configuration
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();

    let mut config = load_config(args.config.as_deref()).context("Failed to load configuration")?;
    if let Some(port) = args.port {
        config.server.port = port;
    }

    initialize_logging(&config.logging)?;
    info!("Starting Fantasy Wrapped v{}", env!("CARGO_PKG_VERSION"));

    let state = build_state(&config)?;
    spawn_session_pruner(state.sessions.clone(), config.session.prune_interval_secs);

    let addr = config.server.socket_addr()?;
    info!("Dashboard listening on http://{}", addr);

    let routes = create_routes(state);
    warp::serve(routes).run(addr).await;

    Ok(())
}
