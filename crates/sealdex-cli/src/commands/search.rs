//! `sealdex search`

use anyhow::{Context, Result};
use clap::Args;
use sealdex_core::SealdexConfig;
use sealdex_search::{encode_base64, SearchRequest};
use sealdex_sharing::INDEX_KEY_SECRET;

use super::ShareArgs;

/// Search options
#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Keyword to search for (case-insensitive)
    pub keyword: String,

    #[command(flatten)]
    pub shares: ShareArgs,
}

/// Run one search and print the ranked results as JSON
pub async fn run(args: SearchArgs, config: &SealdexConfig) -> Result<()> {
    let (user, coordinator) = args.shares.open(config)?;
    let group = args.shares.group_for(&user);
    let share = user
        .share(INDEX_KEY_SECRET, group)
        .with_context(|| format!("no index key share for group {group} in this bundle"))?;

    let request = SearchRequest {
        participant: user.participant().value(),
        share_base64: encode_base64(share.value()),
        secret_index: INDEX_KEY_SECRET,
        group_index: group,
        keyword: args.keyword,
    };
    let results = coordinator.search(&request).await?;
    println!("{}", serde_json::to_string_pretty(&results)?);
    Ok(())
}
