//! netrd-explorer server
//!
//! Serves the explorer page and its JSON API.
//!
//! Usage:
//!   netrd-explorer [OPTIONS]

use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use netrd_explorer::{
    ExplorerConfig, load_config, load_config_file,
    web::{AppState, ServerConfig, start_server},
};

/// netrd-explorer - Generate, simulate, reconstruct and compare networks
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Address to bind (default: 127.0.0.1, or [server].host)
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on (default: 5000, or [server].port)
    #[arg(short, long)]
    port: Option<u16>,

    /// Config file path (default: search for .netrd-explorer.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Open the explorer in a browser once the server is up
    #[arg(long)]
    open: bool,

    /// Seed for requests that do not pass one
    #[arg(long)]
    seed: Option<u64>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "netrd_explorer=debug,tower_http=debug"
    } else {
        "netrd_explorer=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(true).init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        error!("{}", e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    // An explicit --config must load; discovery falls back to defaults
    let config: ExplorerConfig = match &cli.config {
        Some(path) => load_config_file(path)?,
        None => load_config(&std::env::current_dir()?)?,
    };

    // CLI args override config, which overrides defaults
    let server_config = ServerConfig {
        host: cli.host.unwrap_or(config.server.host),
        port: cli.port.unwrap_or(config.server.port),
        open_browser: cli.open || config.server.open_browser,
    };
    let state = AppState {
        limits: config.limits,
        default_seed: cli.seed.or(config.defaults.seed),
    };

    if cli.verbose {
        info!(
            max_generation_attempts = state.limits.max_generation_attempts,
            max_time_steps = state.limits.max_time_steps,
            max_nodes = state.limits.max_nodes,
            seed = ?state.default_seed,
            "limits"
        );
    }

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(start_server(state, server_config))
        .map_err(|e| -> Box<dyn std::error::Error> { e })?;

    Ok(())
}
