// Secret → group → participant share layout

use std::collections::BTreeMap;

use sealdex_core::ParticipantId;
use serde::{Deserialize, Serialize};

use crate::contract::{AccessStructure, PseudoShare};

/// Shares arranged as `[secret][group][member]`
///
/// Group positions match the access structure the shares were dealt under.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretShareTable {
    secrets: Vec<Vec<Vec<PseudoShare>>>,
}

impl SecretShareTable {
    /// Wrap a nested share layout
    pub fn new(secrets: Vec<Vec<Vec<PseudoShare>>>) -> Self {
        Self { secrets }
    }

    /// Rebuild a table from per-participant bundles
    ///
    /// Every declared group gets the shares of whichever of its members appear in
    /// `bundles`, in member order. Groups nobody holds a share for stay empty.
    pub fn assemble(structures: &[AccessStructure], bundles: &[&ParticipantShareBundle]) -> Self {
        let secrets = structures
            .iter()
            .enumerate()
            .map(|(secret_index, structure)| {
                structure
                    .groups()
                    .iter()
                    .enumerate()
                    .map(|(group_index, group)| {
                        group
                            .members()
                            .iter()
                            .filter_map(|member| {
                                bundles
                                    .iter()
                                    .find(|h| h.participant == *member)
                                    .and_then(|h| h.share(secret_index, group_index))
                            })
                            .collect()
                    })
                    .collect()
            })
            .collect();
        Self { secrets }
    }

    /// Number of secrets
    pub fn secret_count(&self) -> usize {
        self.secrets.len()
    }

    /// Number of groups for one secret
    pub fn group_count(&self, secret_index: usize) -> Option<usize> {
        self.secrets.get(secret_index).map(Vec::len)
    }

    /// Shares of one group
    pub fn group(&self, secret_index: usize, group_index: usize) -> Option<&[PseudoShare]> {
        self.secrets
            .get(secret_index)
            .and_then(|groups| groups.get(group_index))
            .map(Vec::as_slice)
    }

    /// Everything one participant holds across all secrets and groups
    pub fn bundle_for(&self, participant: ParticipantId) -> ParticipantShareBundle {
        let mut shares = BTreeMap::new();
        for (secret_index, groups) in self.secrets.iter().enumerate() {
            for (group_index, group) in groups.iter().enumerate() {
                if let Some(share) = group.iter().find(|s| s.participant() == participant) {
                    shares.insert((secret_index, group_index), share.value().to_vec());
                }
            }
        }
        ParticipantShareBundle {
            participant,
            shares,
        }
    }
}

/// Shares held by one participant, keyed by `(secret, group)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantShareBundle {
    participant: ParticipantId,
    shares: BTreeMap<(usize, usize), Vec<u8>>,
}

impl ParticipantShareBundle {
    /// Empty bundle
    pub fn new(participant: ParticipantId) -> Self {
        Self {
            participant,
            shares: BTreeMap::new(),
        }
    }

    /// Bundle with the single share a requester presents
    pub fn single(
        participant: ParticipantId,
        secret_index: usize,
        group_index: usize,
        value: Vec<u8>,
    ) -> Self {
        let mut bundle = Self::new(participant);
        bundle.insert(secret_index, group_index, value);
        bundle
    }

    /// Insert a share at `(secret, group)`
    pub fn insert(&mut self, secret_index: usize, group_index: usize, value: Vec<u8>) {
        self.shares.insert((secret_index, group_index), value);
    }

    /// Holder
    pub fn participant(&self) -> ParticipantId {
        self.participant
    }

    /// Share at a position, if held
    pub fn share(&self, secret_index: usize, group_index: usize) -> Option<PseudoShare> {
        self.shares
            .get(&(secret_index, group_index))
            .map(|value| PseudoShare::new(self.participant, value.clone()))
    }

    /// Positions held
    pub fn positions(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.shares.keys().copied()
    }

    /// Number of shares held
    pub fn len(&self) -> usize {
        self.shares.len()
    }

    /// Whether nothing is held
    pub fn is_empty(&self) -> bool {
        self.shares.is_empty()
    }
}

impl Drop for ParticipantShareBundle {
    fn drop(&mut self) {
        use zeroize::Zeroize;
        for value in self.shares.values_mut() {
            value.zeroize();
        }
    }
}
