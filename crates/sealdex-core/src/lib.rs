//! # Sealdex Core - Foundation
//!
//! Shared vocabulary for every Sealdex crate:
//!
//! - **Errors**: one taxonomy for configuration, bounds, reconstruction, integrity
//!   and transport failures
//! - **Participants**: data users and the custodian of an access policy
//! - **Index model**: tokens, postings and sealed documents as the store sees them
//! - **Configuration**: file + environment layered settings
//!
//! This crate performs no cryptography and no I/O beyond reading config files.

#![forbid(unsafe_code)]

/// Layered configuration
pub mod config;

/// Unified error types
pub mod errors;

/// Participant and index types
pub mod types;

pub use config::{IndexConfig, SealdexConfig, ServiceConfig, SharingConfig};
pub use errors::{Result, SealdexError, ShareDimension, ShareError};
pub use types::{
    DocumentId, EncryptedDocument, EncryptedIndex, IndexEntry, ParticipantId, ParticipantRole,
    Posting, RankedResult, Roster, Token,
};
