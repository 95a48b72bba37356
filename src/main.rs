// src/main.rs

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use std::path::{Path, PathBuf};
use tapdrift::Config;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

/// Environment variable naming the configuration file
const CONFIG_ENV: &str = "TAPDRIFT_CONFIG";

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing subscriber for logging
    let (filter, dotenv) = load_env(None, cli.verbose);
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match dotenv {
        Ok(path) => debug!("Loaded {}", path.display()),
        Err(e) if e.not_found() => {}
        Err(e) => warn!("Ignoring .env: {}", e),
    }

    let config_path = cli
        .config
        .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from));
    let mut config = Config::load(config_path.as_deref())?;
    if let Some(cache_dir) = cli.cache_dir {
        config.cache_dir = cache_dir;
    }

    match cli.command {
        Commands::Check { json, no_sync } => commands::cmd_check(&config, json, no_sync),
        Commands::Update {
            name,
            apply,
            no_sync,
        } => commands::cmd_update(&config, &name, apply, no_sync),
        Commands::List { limit, no_sync } => commands::cmd_list(&config, limit, no_sync),
    }
}

/// Load `.env` (or `env_file`), then build the log filter from the result
///
/// Variables already set in the environment win over the file. `RUST_LOG`
/// from the file applies; otherwise `-v` selects debug over info.
fn load_env(
    env_file: Option<&Path>,
    verbose: bool,
) -> (EnvFilter, std::result::Result<PathBuf, dotenvy::Error>) {
    let loaded = match env_file {
        Some(path) => dotenvy::from_path(path).map(|()| path.to_path_buf()),
        None => dotenvy::dotenv(),
    };

    let default_filter = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    (filter, loaded)
}
