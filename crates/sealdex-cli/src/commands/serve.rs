//! `sealdex serve`

use anyhow::Result;
use clap::Args;
use sealdex_core::SealdexConfig;
use sealdex_search::{IndexStore, IndexStoreServer};
use std::path::PathBuf;
use tracing::warn;

/// Serve options
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Directory holding index.bin and docs/; defaults to the output directory
    #[arg(short, long)]
    pub dir: Option<PathBuf>,

    /// Listen address; defaults to the configured store address
    #[arg(short, long)]
    pub addr: Option<String>,
}

/// Load the index and serve it until Ctrl-C
pub async fn run(args: ServeArgs, config: &SealdexConfig) -> Result<()> {
    let dir = args.dir.unwrap_or_else(|| config.index.output_dir.clone());
    let addr = args.addr.unwrap_or_else(|| config.service.store_addr.clone());

    let store = IndexStore::load(&dir).await;
    let server = IndexStoreServer::bind(&addr, store)
        .await?
        .with_idle_timeout(config.service.idle_timeout());
    println!("Index store listening on {}", server.local_addr()?);

    server
        .serve_until(async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                warn!(error = %err, "failed to listen for Ctrl-C");
            }
        })
        .await?;
    Ok(())
}
