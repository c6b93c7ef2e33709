//! Shared domain types

pub mod index;
pub mod participants;

pub use index::{DocumentId, EncryptedDocument, EncryptedIndex, IndexEntry, Posting, RankedResult, Token};
pub use participants::{ParticipantId, ParticipantRole, Roster};
