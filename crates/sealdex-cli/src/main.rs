//! Sealdex command-line interface
//!
//! Owner, store operator and data user tooling for searchable encrypted
//! document sets with split key custody.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sealdex_core::SealdexConfig;
use std::path::PathBuf;

mod commands;

use commands::{
    build::{self, BuildArgs},
    fetch::{self, FetchArgs},
    search::{self, SearchArgs},
    serve::{self, ServeArgs},
};

#[derive(Parser)]
#[command(name = "sealdex")]
#[command(about = "Sealdex - searchable encryption with split key custody", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file path (TOML or JSON)
    #[arg(short, long, global = true, default_value = "sealdex.toml")]
    config: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the encrypted index and split its keys
    Build(BuildArgs),
    /// Serve the encrypted index over TCP
    Serve(ServeArgs),
    /// Search for a keyword with a data user's share
    Search(SearchArgs),
    /// Open one stored document with a data user's share
    Fetch(FetchArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_writer(std::io::stderr)
        .init();

    let config = SealdexConfig::load(&cli.config)
        .with_context(|| format!("loading config {}", cli.config.display()))?;

    match cli.command {
        Commands::Build(args) => build::run(args, &config).await?,
        Commands::Serve(args) => serve::run(args, &config).await?,
        Commands::Search(args) => search::run(args, &config).await?,
        Commands::Fetch(args) => fetch::run(args, &config).await?,
    }
    Ok(())
}
