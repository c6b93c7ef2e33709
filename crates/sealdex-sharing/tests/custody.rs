//! Key custody from setup through reconstruction

use num_bigint::BigUint;
use proptest::prelude::*;
use sealdex_core::{ParticipantId, SealdexError, ShareDimension};
use sealdex_crypto::{Effects, SymmetricKey};
use sealdex_sharing::{
    combine_secret_from_shares, default_group_for, distribute, load_custodian_bundle,
    load_participant_bundle, parse_prime, save_share_bundles, setup_key_custody,
    setup_secret_sharing, user_file_name, AccessStructure, ParticipantShareBundle,
    SecretShareTable, ShareContract, CUSTODIAN_FILE, FILE_KEY_SECRET, INDEX_KEY_SECRET,
};

const PRIME_HEX: &str = "7fffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffed";

#[test]
fn user_and_custodian_recover_both_keys_from_files() {
    let effects = Effects::for_test("user_and_custodian_recover_both_keys_from_files");
    let index_key = SymmetricKey::generate(16, &effects).unwrap();
    let file_key = SymmetricKey::generate(16, &effects).unwrap();
    let prime = parse_prime(PRIME_HEX).unwrap();
    let (dealer, table) = setup_key_custody(prime, &index_key, &file_key, 5, &effects).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let (users, custodian) = distribute(&dealer, &table).unwrap();
    save_share_bundles(dir.path(), &users, &custodian).unwrap();

    let user_id = ParticipantId::new(4).unwrap();
    let user = load_participant_bundle(&dir.path().join(user_file_name(user_id))).unwrap();
    let custodian = load_custodian_bundle(&dir.path().join(CUSTODIAN_FILE)).unwrap();

    let group = default_group_for(user_id);
    let assembled = SecretShareTable::assemble(
        custodian.dealer.access_structures(),
        &[&custodian.shares, &user],
    );
    for (secret, key) in [(INDEX_KEY_SECRET, &index_key), (FILE_KEY_SECRET, &file_key)] {
        let value = combine_secret_from_shares(&custodian.dealer, &assembled, secret, group).unwrap();
        let restored = SymmetricKey::from_secret_bytes(&value.to_bytes_be(), 16).unwrap();
        assert_eq!(&restored, key);
    }
}

#[test]
fn user_alone_cannot_reconstruct() {
    let effects = Effects::for_test("user_alone_cannot_reconstruct");
    let (dealer, table) = setup_secret_sharing(
        parse_prime(PRIME_HEX).unwrap(),
        &[BigUint::from(4242u32)],
        3,
        &[],
        &effects,
    )
    .unwrap();
    let user = table.bundle_for(ParticipantId::new(2).unwrap());
    let assembled = SecretShareTable::assemble(dealer.access_structures(), &[&user]);
    let err = combine_secret_from_shares(&dealer, &assembled, 0, 1).unwrap_err();
    assert!(matches!(err, SealdexError::Reconstruction { .. }));
}

#[test]
fn share_from_wrong_group_is_rejected() {
    let effects = Effects::for_test("share_from_wrong_group_is_rejected");
    let (dealer, table) = setup_secret_sharing(
        parse_prime(PRIME_HEX).unwrap(),
        &[BigUint::from(99u8)],
        3,
        &[],
        &effects,
    )
    .unwrap();
    let custodian = table.bundle_for(ParticipantId::new(4).unwrap());
    // User 1 presents its group-0 share while asking for group 2.
    let user = table.bundle_for(ParticipantId::new(1).unwrap());
    let value = user.share(0, 0).unwrap().value().to_vec();
    let forged = ParticipantShareBundle::single(user.participant(), 0, 2, value);
    let assembled = SecretShareTable::assemble(dealer.access_structures(), &[&custodian, &forged]);
    let err = combine_secret_from_shares(&dealer, &assembled, 0, 2).unwrap_err();
    assert!(matches!(err, SealdexError::Reconstruction { .. }));
}

#[test]
fn custom_secret_uses_its_own_groups() {
    let effects = Effects::for_test("custom_secret_uses_its_own_groups");
    let custom = AccessStructure::from_ids(&[&[1, 3, 6], &[5, 6]]).unwrap();
    let secrets = [BigUint::from(313u32), BigUint::from(501u32)];
    let (dealer, table) = setup_secret_sharing(
        parse_prime(PRIME_HEX).unwrap(),
        &secrets,
        5,
        &[custom],
        &effects,
    )
    .unwrap();
    assert_eq!(combine_secret_from_shares(&dealer, &table, 1, 0).unwrap(), secrets[1]);
    assert_eq!(combine_secret_from_shares(&dealer, &table, 1, 1).unwrap(), secrets[1]);
    let err = combine_secret_from_shares(&dealer, &table, 1, 2).unwrap_err();
    assert!(matches!(
        err,
        SealdexError::OutOfRange { dimension: ShareDimension::Group, index: 2, len: 2 }
    ));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn any_key_survives_any_default_group(bytes in proptest::collection::vec(any::<u8>(), 32), user in 1u16..=6) {
        let effects = Effects::deterministic(u64::from(user));
        let key = SymmetricKey::from_bytes(bytes).unwrap();
        let secret = BigUint::from_bytes_be(key.as_bytes());
        prop_assume!(secret < parse_prime(PRIME_HEX).unwrap());
        let (dealer, table) = setup_secret_sharing(
            parse_prime(PRIME_HEX).unwrap(),
            &[secret],
            6,
            &[],
            &effects,
        )
        .unwrap();
        let participant = ParticipantId::new(user).unwrap();
        let value = combine_secret_from_shares(&dealer, &table, 0, default_group_for(participant)).unwrap();
        let restored = SymmetricKey::from_secret_bytes(&value.to_bytes_be(), 32).unwrap();
        prop_assert_eq!(restored, key);
    }
}
