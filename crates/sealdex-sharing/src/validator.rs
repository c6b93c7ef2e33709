//! Bounds-checked reconstruction
//!
//! Indices are checked against the table's own dimensions before the contract
//! sees anything, so an out-of-range request never reaches the sharing scheme.
//! Share contents are not inspected here.

use num_bigint::BigUint;
use sealdex_core::{Result, SealdexError, ShareDimension};

use crate::contract::ShareContract;
use crate::table::SecretShareTable;

/// Reconstruct `secret_index` from the shares of group `group_index`
pub fn combine_secret_from_shares<C>(
    contract: &C,
    shares: &SecretShareTable,
    secret_index: usize,
    group_index: usize,
) -> Result<BigUint>
where
    C: ShareContract + ?Sized,
{
    let secret_count = shares.secret_count();
    if secret_index >= secret_count {
        return Err(SealdexError::out_of_range(
            ShareDimension::Secret,
            secret_index,
            secret_count,
        ));
    }

    let group_count = shares.group_count(secret_index).unwrap_or(0);
    let group = match shares.group(secret_index, group_index) {
        Some(group) => group,
        None => {
            return Err(SealdexError::out_of_range(
                ShareDimension::Group,
                group_index,
                group_count,
            ))
        }
    };

    contract
        .combine(secret_index, group_index, group)
        .map_err(SealdexError::reconstruction)
}
