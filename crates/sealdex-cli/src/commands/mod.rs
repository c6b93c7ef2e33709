//! CLI command handlers

pub mod build;
pub mod fetch;
pub mod search;
pub mod serve;

use anyhow::{Context, Result};
use clap::Args;
use sealdex_core::SealdexConfig;
use sealdex_search::{SearchCoordinator, TcpIndexStoreClient};
use sealdex_sharing::{load_custodian_bundle, load_participant_bundle, ParticipantShareBundle};
use std::path::PathBuf;

/// Share directory under the output directory
pub const SHARES_DIR: &str = "shares";

/// Where the caller's shares and the custodian bundle live
#[derive(Args, Debug, Clone)]
pub struct ShareArgs {
    /// Data user's share bundle (shares_user_<id>.bin)
    #[arg(long)]
    pub shares: PathBuf,

    /// Custodian bundle; defaults to <output_dir>/shares/shares_custodian.bin
    #[arg(long)]
    pub custodian: Option<PathBuf>,

    /// Access group to reconstruct through; defaults to the user's own group
    #[arg(long)]
    pub group: Option<usize>,
}

impl ShareArgs {
    /// Load the user's bundle and build a coordinator around the custodian bundle
    pub fn open(
        &self,
        config: &SealdexConfig,
    ) -> Result<(ParticipantShareBundle, SearchCoordinator<TcpIndexStoreClient>)> {
        let user = load_participant_bundle(&self.shares)
            .with_context(|| format!("loading {}", self.shares.display()))?;

        let custodian_path = self.custodian.clone().unwrap_or_else(|| {
            config
                .index
                .output_dir
                .join(SHARES_DIR)
                .join(sealdex_sharing::CUSTODIAN_FILE)
        });
        let custodian = load_custodian_bundle(&custodian_path)
            .with_context(|| format!("loading {}", custodian_path.display()))?;

        let client = TcpIndexStoreClient::new(
            config.service.store_addr.clone(),
            config.service.request_timeout(),
        );
        let coordinator = SearchCoordinator::new(
            custodian,
            client,
            config.index.key_bytes,
            config.service.request_timeout(),
        );
        Ok((user, coordinator))
    }

    /// Group to use for `user`
    pub fn group_for(&self, user: &ParticipantShareBundle) -> usize {
        self.group
            .unwrap_or_else(|| sealdex_sharing::default_group_for(user.participant()))
    }
}
