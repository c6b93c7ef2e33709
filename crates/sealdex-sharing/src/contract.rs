//! Multi-secret sharing contract and its dealer
//!
//! The contract: `split` produces one pseudo-share per member of every declared
//! group of every secret, and `combine(secret, group, shares)` reconstructs the
//! secret exactly when fed all shares of that group. Inputs outside the contract
//! are rejected with a [`ShareError`], never silently combined.
//!
//! [`GroupShareDealer`] fulfils the contract with per-group additive sharing over
//! GF(p): all members but the last draw uniform field elements and the last
//! member's share closes the sum to the secret. Any strict subset of a group sees
//! only uniformly random values.

use num_bigint::BigUint;
use num_traits::Zero;
use sealdex_core::{ParticipantId, Result, SealdexError, ShareError};
use sealdex_crypto::Effects;
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::table::SecretShareTable;

/// Participants whose joint shares reconstruct a secret (logical AND)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessGroup {
    members: Vec<ParticipantId>,
}

impl AccessGroup {
    /// Create a group; members keep the given order
    pub fn new(members: Vec<ParticipantId>) -> Self {
        Self { members }
    }

    /// Create a group from raw ids
    pub fn from_ids(ids: &[u16]) -> Result<Self> {
        let members = ids
            .iter()
            .map(|id| ParticipantId::new(*id))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { members })
    }

    /// Members in declaration order
    pub fn members(&self) -> &[ParticipantId] {
        &self.members
    }

    /// Whether `participant` belongs to the group
    pub fn contains(&self, participant: ParticipantId) -> bool {
        self.members.contains(&participant)
    }

    /// Number of members
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the group has no members
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Authorized groups for one secret (logical OR across groups)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessStructure {
    groups: Vec<AccessGroup>,
}

impl AccessStructure {
    /// Create from groups
    pub fn new(groups: Vec<AccessGroup>) -> Self {
        Self { groups }
    }

    /// Create from nested raw ids, e.g. `[[1, 4], [2, 4]]`
    pub fn from_ids(groups: &[&[u16]]) -> Result<Self> {
        let groups = groups
            .iter()
            .map(|ids| AccessGroup::from_ids(ids))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { groups })
    }

    /// Groups in declaration order
    pub fn groups(&self) -> &[AccessGroup] {
        &self.groups
    }

    /// Group at a position
    pub fn group(&self, index: usize) -> Option<&AccessGroup> {
        self.groups.get(index)
    }

    /// Groups as raw id lists
    pub fn to_ids(&self) -> Vec<Vec<u16>> {
        self.groups
            .iter()
            .map(|g| g.members.iter().map(|m| m.value()).collect())
            .collect()
    }
}

/// One participant's fragment of one secret for one group
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct PseudoShare {
    #[zeroize(skip)]
    participant: ParticipantId,
    #[serde(with = "serde_bytes")]
    value: Vec<u8>,
}

impl PseudoShare {
    /// Wrap an opaque share value
    pub fn new(participant: ParticipantId, value: Vec<u8>) -> Self {
        Self { participant, value }
    }

    /// Holder of the share
    pub fn participant(&self) -> ParticipantId {
        self.participant
    }

    /// Opaque share bytes
    pub fn value(&self) -> &[u8] {
        &self.value
    }
}

impl std::fmt::Debug for PseudoShare {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PseudoShare")
            .field("participant", &self.participant)
            .field("len", &self.value.len())
            .finish()
    }
}

/// Multi-secret sharing scheme under per-secret access structures
pub trait ShareContract {
    /// Field prime
    fn prime(&self) -> &BigUint;

    /// Total participants (data users plus custodian)
    fn participant_count(&self) -> u16;

    /// One access structure per secret
    fn access_structures(&self) -> &[AccessStructure];

    /// Split `secrets` into a share table shaped like the access structures
    fn split(
        &self,
        secrets: &[BigUint],
        effects: &Effects,
    ) -> std::result::Result<SecretShareTable, ShareError>;

    /// Reconstruct one secret from all shares of one declared group
    fn combine(
        &self,
        secret_index: usize,
        group_index: usize,
        shares: &[PseudoShare],
    ) -> std::result::Result<BigUint, ShareError>;
}

/// Dealer for per-group additive sharing
///
/// Holds only public parameters, so it can be persisted alongside the
/// custodian's shares.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupShareDealer {
    prime: BigUint,
    participant_count: u16,
    access_structures: Vec<AccessStructure>,
}

impl GroupShareDealer {
    /// Create a dealer, validating every group against the participant range
    pub fn new(
        prime: BigUint,
        participant_count: u16,
        access_structures: Vec<AccessStructure>,
    ) -> Result<Self> {
        if prime <= BigUint::from(2u8) {
            return Err(SealdexError::configuration("prime must be greater than 2"));
        }
        for (secret_index, structure) in access_structures.iter().enumerate() {
            if structure.groups.is_empty() {
                return Err(SealdexError::configuration(format!(
                    "secret {secret_index} has no access groups"
                )));
            }
            for (group_index, group) in structure.groups.iter().enumerate() {
                validate_group(group, participant_count).map_err(|reason| {
                    SealdexError::configuration(format!(
                        "group {group_index} of secret {secret_index}: {reason}"
                    ))
                })?;
            }
        }
        Ok(Self {
            prime,
            participant_count,
            access_structures,
        })
    }

    fn random_element(&self, effects: &Effects) -> BigUint {
        // 128 extra bits make the modular bias negligible.
        let len = (self.prime.bits() as usize).div_ceil(8) + 16;
        let mut bytes = vec![0u8; len];
        effects.fill_random(&mut bytes);
        let element = BigUint::from_bytes_be(&bytes) % &self.prime;
        bytes.zeroize();
        element
    }

    fn declared_group(
        &self,
        secret_index: usize,
        group_index: usize,
    ) -> std::result::Result<&AccessGroup, ShareError> {
        self.access_structures
            .get(secret_index)
            .and_then(|s| s.group(group_index))
            .ok_or_else(|| {
                ShareError::Rejected(format!(
                    "no group {group_index} declared for secret {secret_index}"
                ))
            })
    }
}

fn validate_group(group: &AccessGroup, participant_count: u16) -> std::result::Result<(), String> {
    if group.is_empty() {
        return Err("group is empty".to_string());
    }
    for (position, member) in group.members.iter().enumerate() {
        if member.value() == 0 || member.value() > participant_count {
            return Err(format!(
                "participant {member} is outside 1..={participant_count}"
            ));
        }
        if group.members[..position].contains(member) {
            return Err(format!("participant {member} listed twice"));
        }
    }
    Ok(())
}

impl ShareContract for GroupShareDealer {
    fn prime(&self) -> &BigUint {
        &self.prime
    }

    fn participant_count(&self) -> u16 {
        self.participant_count
    }

    fn access_structures(&self) -> &[AccessStructure] {
        &self.access_structures
    }

    fn split(
        &self,
        secrets: &[BigUint],
        effects: &Effects,
    ) -> std::result::Result<SecretShareTable, ShareError> {
        if secrets.len() != self.access_structures.len() {
            return Err(ShareError::Rejected(format!(
                "{} secrets for {} access structures",
                secrets.len(),
                self.access_structures.len()
            )));
        }
        let mut table = Vec::with_capacity(secrets.len());
        for (secret_index, (secret, structure)) in
            secrets.iter().zip(&self.access_structures).enumerate()
        {
            if secret >= &self.prime {
                return Err(ShareError::SecretTooLarge { secret_index });
            }
            let mut groups = Vec::with_capacity(structure.groups.len());
            for group in &structure.groups {
                let (last, rest) = match group.members.split_last() {
                    Some(split) => split,
                    None => return Err(ShareError::Rejected("empty access group".to_string())),
                };
                let mut shares = Vec::with_capacity(group.len());
                let mut sum = BigUint::zero();
                for member in rest {
                    let element = self.random_element(effects);
                    sum = (sum + &element) % &self.prime;
                    shares.push(PseudoShare::new(*member, element.to_bytes_be()));
                }
                let closing = (secret + &self.prime - &sum) % &self.prime;
                shares.push(PseudoShare::new(*last, closing.to_bytes_be()));
                groups.push(shares);
            }
            table.push(groups);
        }
        Ok(SecretShareTable::new(table))
    }

    fn combine(
        &self,
        secret_index: usize,
        group_index: usize,
        shares: &[PseudoShare],
    ) -> std::result::Result<BigUint, ShareError> {
        let group = self.declared_group(secret_index, group_index)?;
        if shares.len() != group.len() {
            return Err(ShareError::ShareCount {
                secret_index,
                group_index,
                expected: group.len(),
                actual: shares.len(),
            });
        }

        let mut seen = Vec::with_capacity(shares.len());
        let mut sum = BigUint::zero();
        for share in shares {
            let participant = share.participant();
            if !group.contains(participant) || seen.contains(&participant) {
                return Err(ShareError::ForeignShare {
                    participant: participant.value(),
                });
            }
            seen.push(participant);

            let element = BigUint::from_bytes_be(share.value());
            if element >= self.prime {
                return Err(ShareError::MalformedShare);
            }
            sum = (sum + element) % &self.prime;
        }
        Ok(sum)
    }
}
