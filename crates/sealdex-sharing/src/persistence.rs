//! Share bundle files
//!
//! Each data user gets `shares_user_<id>.bin`; the custodian gets
//! `shares_custodian.bin`, which also carries the dealer's public parameters so
//! it can reconstruct without the dealer that ran setup. Files are bincode, written
//! through a temp file and renamed into place.

use std::fs;
use std::path::{Path, PathBuf};

use sealdex_core::{ParticipantId, Result, Roster, SealdexError};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, info};

use crate::contract::{GroupShareDealer, ShareContract};
use crate::table::{ParticipantShareBundle, SecretShareTable};

/// File name of the custodian bundle
pub const CUSTODIAN_FILE: &str = "shares_custodian.bin";

/// What the custodian keeps: its shares plus the dealer parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustodianBundle {
    /// Prime and access structures; never secrets
    pub dealer: GroupShareDealer,
    /// The custodian's own shares
    pub shares: ParticipantShareBundle,
}

/// File name of a data user's bundle
pub fn user_file_name(participant: ParticipantId) -> String {
    format!("shares_user_{}.bin", participant.value())
}

/// Split a share table into one bundle per data user and the custodian bundle
pub fn distribute(
    dealer: &GroupShareDealer,
    table: &SecretShareTable,
) -> Result<(Vec<ParticipantShareBundle>, CustodianBundle)> {
    let roster = Roster::new(dealer.participant_count().saturating_sub(1))?;
    let users = roster.data_users().map(|user| table.bundle_for(user)).collect();
    let custodian = CustodianBundle {
        dealer: dealer.clone(),
        shares: table.bundle_for(roster.custodian()),
    };
    Ok((users, custodian))
}

/// Write every bundle into `dir`, returning the paths written
pub fn save_share_bundles(
    dir: &Path,
    users: &[ParticipantShareBundle],
    custodian: &CustodianBundle,
) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;
    let mut written = Vec::with_capacity(users.len() + 1);
    for bundle in users {
        let path = dir.join(user_file_name(bundle.participant()));
        write_bincode(&path, bundle)?;
        written.push(path);
    }
    let path = dir.join(CUSTODIAN_FILE);
    write_bincode(&path, custodian)?;
    written.push(path);
    info!(files = written.len(), dir = %dir.display(), "share bundles saved");
    Ok(written)
}

/// Read a data user's bundle
pub fn load_participant_bundle(path: &Path) -> Result<ParticipantShareBundle> {
    read_bincode(path)
}

/// Read the custodian bundle
pub fn load_custodian_bundle(path: &Path) -> Result<CustodianBundle> {
    read_bincode(path)
}

fn write_bincode<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let bytes = bincode::serialize(value)?;
    let temp_path = path.with_extension("tmp");
    fs::write(&temp_path, &bytes).map_err(|e| {
        SealdexError::storage(format!("Failed to write {}: {e}", temp_path.display()))
    })?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&temp_path, fs::Permissions::from_mode(0o600))?;
    }
    fs::rename(&temp_path, path).map_err(|e| {
        SealdexError::storage(format!("Failed to rename temp file: {e}"))
    })?;
    debug!(path = %path.display(), bytes = bytes.len(), "bundle written");
    Ok(())
}

fn read_bincode<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let bytes = fs::read(path)
        .map_err(|e| SealdexError::storage(format!("Failed to read {}: {e}", path.display())))?;
    Ok(bincode::deserialize(&bytes)?)
}
