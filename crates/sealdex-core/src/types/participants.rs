//! Participant identity types.
//!
//! These types describe "who holds shares" under an access policy: data users
//! numbered `1..=n`, followed by a single custodian with id `n + 1`.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{Result, SealdexError};

/// One-based participant identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(u16);

impl ParticipantId {
    /// Create a participant id, rejecting zero
    pub fn new(value: u16) -> Result<Self> {
        if value == 0 {
            return Err(SealdexError::configuration(
                "participant ids start at 1",
            ));
        }
        Ok(Self(value))
    }

    /// Create a participant id without validation.
    ///
    /// The caller must ensure `value >= 1`.
    pub const fn new_unchecked(value: u16) -> Self {
        Self(value)
    }

    /// Get the raw id
    pub const fn value(self) -> u16 {
        self.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<ParticipantId> for u16 {
    fn from(id: ParticipantId) -> u16 {
        id.0
    }
}

/// Role a participant plays in the access policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParticipantRole {
    /// Party issuing queries
    DataUser,
    /// Trusted-hardware party required for the primary secret
    Custodian,
}

/// Participant roster: `data_users` users followed by one custodian
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roster {
    data_users: u16,
}

impl Roster {
    /// Create a roster with `data_users` users and one custodian
    pub fn new(data_users: u16) -> Result<Self> {
        if data_users == 0 {
            return Err(SealdexError::configuration(
                "at least one data user is required",
            ));
        }
        if data_users == u16::MAX {
            return Err(SealdexError::configuration(
                "too many data users to number the custodian",
            ));
        }
        Ok(Self { data_users })
    }

    /// Number of data users
    pub fn data_user_count(&self) -> u16 {
        self.data_users
    }

    /// Total participants including the custodian
    pub fn participant_count(&self) -> u16 {
        self.data_users + 1
    }

    /// Custodian id (`n + 1`)
    pub fn custodian(&self) -> ParticipantId {
        ParticipantId(self.data_users + 1)
    }

    /// Data user ids in ascending order
    pub fn data_users(&self) -> impl Iterator<Item = ParticipantId> {
        (1..=self.data_users).map(ParticipantId)
    }

    /// Whether `id` names a participant of this roster
    pub fn contains(&self, id: ParticipantId) -> bool {
        id.0 >= 1 && id.0 <= self.participant_count()
    }

    /// Role of a participant in this roster
    pub fn role(&self, id: ParticipantId) -> Option<ParticipantRole> {
        if id == self.custodian() {
            Some(ParticipantRole::Custodian)
        } else if self.contains(id) {
            Some(ParticipantRole::DataUser)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roster_numbering() {
        let roster = Roster::new(3).unwrap();
        assert_eq!(roster.participant_count(), 4);
        assert_eq!(roster.custodian().value(), 4);
        let users: Vec<u16> = roster.data_users().map(ParticipantId::value).collect();
        assert_eq!(users, vec![1, 2, 3]);
    }

    #[test]
    fn test_roles() {
        let roster = Roster::new(2).unwrap();
        assert_eq!(
            roster.role(ParticipantId::new_unchecked(1)),
            Some(ParticipantRole::DataUser)
        );
        assert_eq!(
            roster.role(ParticipantId::new_unchecked(3)),
            Some(ParticipantRole::Custodian)
        );
        assert_eq!(roster.role(ParticipantId::new_unchecked(4)), None);
    }

    #[test]
    fn test_zero_rejected() {
        assert!(ParticipantId::new(0).is_err());
        assert!(Roster::new(0).is_err());
    }
}
