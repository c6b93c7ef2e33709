//! Cryptographic primitives for Sealdex
//!
//! - **Keyword cipher**: deterministic AES-ECB used for index tokens and postings
//! - **Content sealing**: AES-GCM with 16-byte nonces for document bodies
//! - **Key material**: zeroizing AES keys and their integer encoding for sharing
//! - **Effects**: injectable randomness so tests are reproducible

#![allow(clippy::result_large_err)]

/// AES-GCM sealing for document bodies
pub mod content;
/// Injectable randomness
pub mod effects;
/// Deterministic keyword encryption
pub mod keyword;
/// Symmetric key material
pub mod keys;

pub use content::{open, open_text, seal, HEADER_LEN, NONCE_LEN, TAG_LEN};
pub use effects::Effects;
pub use keys::{SymmetricKey, SUPPORTED_KEY_LENGTHS};
pub use keyword::{decrypt_keyword, derive_token, encrypt_keyword};
