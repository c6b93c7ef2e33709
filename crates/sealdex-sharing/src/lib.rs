//! # Sealdex Sharing - Key Custody
//!
//! Splits the index and file keys across data users and a custodian:
//!
//! - **Contract**: the [`ShareContract`] seam and the additive [`GroupShareDealer`]
//! - **Policy**: default and custom access structures, dealer setup
//! - **Validator**: bounds-checked reconstruction in front of the contract
//! - **Persistence**: per-participant share bundle files

#![forbid(unsafe_code)]
#![allow(clippy::result_large_err)]

/// Sharing contract and dealer
pub mod contract;
/// Share bundle files
pub mod persistence;
/// Access policy construction
pub mod policy;
/// Share table layout
pub mod table;
/// Bounds-checked reconstruction
pub mod validator;

pub use contract::{AccessGroup, AccessStructure, GroupShareDealer, PseudoShare, ShareContract};
pub use persistence::{
    distribute, load_custodian_bundle, load_participant_bundle, save_share_bundles,
    user_file_name, CustodianBundle, CUSTODIAN_FILE,
};
pub use policy::{
    default_access_structure, default_group_for, setup_key_custody, setup_secret_sharing,
    DEFAULT_DATA_USERS, FILE_KEY_SECRET, INDEX_KEY_SECRET,
};
pub use table::{ParticipantShareBundle, SecretShareTable};
pub use validator::combine_secret_from_shares;

/// Parse a hex-encoded field prime
pub fn parse_prime(hex_digits: &str) -> sealdex_core::Result<num_bigint::BigUint> {
    num_bigint::BigUint::parse_bytes(hex_digits.trim().as_bytes(), 16).ok_or_else(|| {
        sealdex_core::SealdexError::configuration(format!("invalid prime hex: {hex_digits}"))
    })
}
