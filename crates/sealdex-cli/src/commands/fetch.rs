//! `sealdex fetch`

use anyhow::{bail, Context, Result};
use clap::Args;
use sealdex_core::SealdexConfig;
use sealdex_search::{encode_base64, FetchRequest};
use sealdex_sharing::FILE_KEY_SECRET;

use super::ShareArgs;

/// Fetch options
#[derive(Args, Debug)]
pub struct FetchArgs {
    /// Document id from a search result
    pub doc_id: u64,

    #[command(flatten)]
    pub shares: ShareArgs,
}

/// Decrypt one stored document and print it
pub async fn run(args: FetchArgs, config: &SealdexConfig) -> Result<()> {
    let (user, coordinator) = args.shares.open(config)?;
    let group = args.shares.group_for(&user);
    let share = user
        .share(FILE_KEY_SECRET, group)
        .with_context(|| format!("no file key share for group {group} in this bundle"))?;

    let request = FetchRequest {
        participant: user.participant().value(),
        share_base64: encode_base64(share.value()),
        group_index: group,
        doc_id: args.doc_id,
    };
    match coordinator.fetch_document(&request).await? {
        Some(text) => println!("{text}"),
        None => bail!("document {} is not stored", args.doc_id),
    }
    Ok(())
}
