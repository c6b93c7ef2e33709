//! Access policy construction
//!
//! Participants are numbered 1..=n for data users and n+1 for the custodian. The
//! first secret always gets the default policy, "any one data user AND the
//! custodian". Every further secret takes a caller-supplied access structure.

use num_bigint::BigUint;
use sealdex_core::{ParticipantId, Result, Roster, SealdexError, ShareError};
use sealdex_crypto::{Effects, SymmetricKey};
use tracing::{debug, info};

use crate::contract::{AccessGroup, AccessStructure, GroupShareDealer, ShareContract};
use crate::table::SecretShareTable;

/// Data users assumed when none are configured
pub const DEFAULT_DATA_USERS: u16 = 10;

/// Secret position of the index key in a key custody setup
pub const INDEX_KEY_SECRET: usize = 0;

/// Secret position of the file key in a key custody setup
pub const FILE_KEY_SECRET: usize = 1;

/// One group `{user_i, custodian}` per data user, in user order
pub fn default_access_structure(roster: &Roster) -> AccessStructure {
    let custodian = roster.custodian();
    AccessStructure::new(
        roster
            .data_users()
            .map(|user| AccessGroup::new(vec![user, custodian]))
            .collect(),
    )
}

/// Configure the dealer and split `secrets`
///
/// `custom_structures[i]` governs `secrets[i + 1]`. Every check runs before any
/// share is generated.
pub fn setup_secret_sharing(
    prime: BigUint,
    secrets: &[BigUint],
    data_users: u16,
    custom_structures: &[AccessStructure],
    effects: &Effects,
) -> Result<(GroupShareDealer, SecretShareTable)> {
    if secrets.is_empty() {
        return Err(SealdexError::configuration("Secrets list cannot be empty"));
    }
    if custom_structures.len() != secrets.len() - 1 {
        return Err(SealdexError::configuration(format!(
            "Custom access structures must match the secrets after the first: expected {}, got {}",
            secrets.len() - 1,
            custom_structures.len()
        )));
    }
    let roster = Roster::new(data_users)?;

    let mut structures = Vec::with_capacity(secrets.len());
    structures.push(default_access_structure(&roster));
    structures.extend(custom_structures.iter().cloned());

    let dealer = GroupShareDealer::new(prime, roster.participant_count(), structures)?;
    let table = dealer
        .split(secrets, effects)
        .map_err(|err| match err {
            ShareError::SecretTooLarge { secret_index } => SealdexError::configuration(format!(
                "secret {secret_index} does not fit below the field prime"
            )),
            other => SealdexError::reconstruction(other),
        })?;

    info!(
        secrets = secrets.len(),
        participants = roster.participant_count(),
        "secret sharing configured"
    );
    Ok((dealer, table))
}

/// Share the index key and file key of one index build
///
/// Both keys get the default policy, so any single data user together with the
/// custodian can search and fetch.
pub fn setup_key_custody(
    prime: BigUint,
    index_key: &SymmetricKey,
    file_key: &SymmetricKey,
    data_users: u16,
    effects: &Effects,
) -> Result<(GroupShareDealer, SecretShareTable)> {
    let roster = Roster::new(data_users)?;
    let secrets = [
        BigUint::from_bytes_be(index_key.as_bytes()),
        BigUint::from_bytes_be(file_key.as_bytes()),
    ];
    debug!(data_users, "sharing index and file keys");
    setup_secret_sharing(
        prime,
        &secrets,
        data_users,
        &[default_access_structure(&roster)],
        effects,
    )
}

/// Group position of `{participant, custodian}` under the default policy
pub fn default_group_for(participant: ParticipantId) -> usize {
    usize::from(participant.value().saturating_sub(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_default_policy_three_users() {
        let (dealer, table) =
            setup_secret_sharing(BigUint::from(97u8), &[BigUint::from(12u8)], 3, &[], &Effects::test())
                .unwrap();
        assert_eq!(dealer.participant_count(), 4);
        assert_eq!(
            dealer.access_structures()[0].to_ids(),
            vec![vec![1, 4], vec![2, 4], vec![3, 4]]
        );
        assert_eq!(table.group_count(0), Some(3));
    }

    #[test]
    fn test_default_user_count() {
        let (dealer, _) = setup_secret_sharing(
            BigUint::from(11u8),
            &[BigUint::from(9u8)],
            DEFAULT_DATA_USERS,
            &[],
            &Effects::test(),
        )
        .unwrap();
        assert_eq!(dealer.participant_count(), 11);
        let ids = dealer.access_structures()[0].to_ids();
        assert_eq!(ids.len(), 10);
        assert_eq!(ids[9], vec![10, 11]);
    }

    #[test]
    fn test_custom_structures_follow_default() {
        let custom = AccessStructure::from_ids(&[&[1, 2], &[3, 4]]).unwrap();
        let (dealer, _) = setup_secret_sharing(
            BigUint::from(101u8),
            &[BigUint::from(10u8), BigUint::from(20u8)],
            5,
            &[custom.clone()],
            &Effects::test(),
        )
        .unwrap();
        assert_eq!(dealer.participant_count(), 6);
        assert_eq!(
            dealer.access_structures()[0].to_ids(),
            vec![vec![1, 6], vec![2, 6], vec![3, 6], vec![4, 6], vec![5, 6]]
        );
        assert_eq!(dealer.access_structures()[1], custom);
    }

    #[test]
    fn test_empty_secrets() {
        let err = setup_secret_sharing(BigUint::from(11u8), &[], 3, &[], &Effects::test())
            .unwrap_err();
        assert_matches!(err, SealdexError::Configuration { .. });
        assert!(err.to_string().contains("cannot be empty"));
    }

    #[test]
    fn test_structure_count_mismatch() {
        let custom = AccessStructure::from_ids(&[&[1, 2]]).unwrap();
        let secrets = [1u8, 2, 3].map(BigUint::from);
        let err = setup_secret_sharing(BigUint::from(11u8), &secrets, 3, &[custom], &Effects::test())
            .unwrap_err();
        assert_matches!(err, SealdexError::Configuration { .. });
    }

    #[test]
    fn test_unknown_participant_in_custom_group() {
        let custom = AccessStructure::from_ids(&[&[1, 9]]).unwrap();
        let secrets = [1u8, 2].map(BigUint::from);
        let err = setup_secret_sharing(BigUint::from(11u8), &secrets, 3, &[custom], &Effects::test())
            .unwrap_err();
        assert_matches!(err, SealdexError::Configuration { .. });
    }

    #[test]
    fn test_zero_data_users() {
        let err = setup_secret_sharing(BigUint::from(11u8), &[BigUint::from(1u8)], 0, &[], &Effects::test())
            .unwrap_err();
        assert_matches!(err, SealdexError::Configuration { .. });
    }

    #[test]
    fn test_secret_above_prime_is_configuration_error() {
        let err = setup_secret_sharing(BigUint::from(11u8), &[BigUint::from(11u8)], 2, &[], &Effects::test())
            .unwrap_err();
        assert_matches!(err, SealdexError::Configuration { .. });
    }

    #[test]
    fn test_key_custody_uses_default_groups() {
        let effects = Effects::test();
        let index_key = SymmetricKey::generate(16, &effects).unwrap();
        let file_key = SymmetricKey::generate(16, &effects).unwrap();
        let prime = BigUint::from(1u8) << 255usize;
        let (dealer, table) =
            setup_key_custody(prime, &index_key, &file_key, 4, &effects).unwrap();
        assert_eq!(dealer.access_structures().len(), 2);
        assert_eq!(
            dealer.access_structures()[FILE_KEY_SECRET],
            dealer.access_structures()[INDEX_KEY_SECRET]
        );
        let user = ParticipantId::new(3).unwrap();
        let group = default_group_for(user);
        let shares = table.group(FILE_KEY_SECRET, group).unwrap();
        assert_eq!(shares[0].participant(), user);
        let secret = dealer.combine(FILE_KEY_SECRET, group, shares).unwrap();
        assert_eq!(secret, BigUint::from_bytes_be(file_key.as_bytes()));
    }
}
