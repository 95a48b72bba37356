// src/cli.rs
//! CLI definitions for tapdrift
//!
//! This module contains all command-line interface definitions using clap.
//! The actual command implementations are in the `commands` module.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "tapdrift")]
#[command(version)]
#[command(about = "Detect version drift between a private Homebrew tap and upstream", long_about = None)]
pub struct Cli {
    /// TOML configuration file (defaults to $TAPDRIFT_CONFIG, then built-in settings)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Local mirror directory of the private tap
    #[arg(long, global = true)]
    pub cache_dir: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compare every private formula with upstream
    Check {
        /// Print the report as JSON
        #[arg(long)]
        json: bool,

        /// Use the existing mirror without fetching
        #[arg(long)]
        no_sync: bool,
    },

    /// Refresh one private formula from upstream (dry run unless --apply)
    Update {
        /// Private formula name, e.g. gov-abseil
        name: String,

        /// Overwrite the formula in the local mirror
        #[arg(long)]
        apply: bool,

        /// Use the existing mirror without fetching
        #[arg(long)]
        no_sync: bool,
    },

    /// List private formulae and their versions
    List {
        /// Show at most this many formulae
        #[arg(short, long)]
        limit: Option<usize>,

        /// Use the existing mirror without fetching
        #[arg(long)]
        no_sync: bool,
    },
}
