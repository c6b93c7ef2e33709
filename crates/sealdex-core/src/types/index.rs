//! Encrypted index data model
//!
//! Everything in this module is ciphertext or an identifier. The index store only
//! ever sees these types; plaintext keywords and counts never reach it.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Document identifier, assigned in corpus order starting at zero
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(pub u64);

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Deterministic ciphertext of a keyword, used as the index lookup key
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Token(#[serde(with = "serde_bytes")] pub Vec<u8>);

impl Token {
    /// Raw token bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Token({})", hex::encode(&self.0))
    }
}

/// One postings entry: encrypted term frequency and encrypted document id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    /// Deterministic ciphertext of the decimal term frequency
    #[serde(with = "serde_bytes")]
    pub encrypted_count: Vec<u8>,
    /// Deterministic ciphertext of the decimal document id
    #[serde(with = "serde_bytes")]
    pub encrypted_doc_id: Vec<u8>,
}

impl Posting {
    /// Create a posting
    pub fn new(encrypted_count: Vec<u8>, encrypted_doc_id: Vec<u8>) -> Self {
        Self {
            encrypted_count,
            encrypted_doc_id,
        }
    }
}

/// Tagged index record: one token and its postings in document-processing order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    /// Lookup token
    pub token: Token,
    /// Postings for the token
    pub postings: Vec<Posting>,
}

/// Encrypted inverted index as persisted
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedIndex {
    /// Index records, one per keyword
    pub entries: Vec<IndexEntry>,
}

impl EncryptedIndex {
    /// Number of keywords indexed
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index holds no keywords
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Postings for a token, by linear scan
    pub fn get(&self, token: &Token) -> Option<&[Posting]> {
        self.entries
            .iter()
            .find(|entry| &entry.token == token)
            .map(|entry| entry.postings.as_slice())
    }

    /// Convert into a lookup table
    pub fn into_lookup(self) -> HashMap<Token, Vec<Posting>> {
        self.entries
            .into_iter()
            .map(|entry| (entry.token, entry.postings))
            .collect()
    }
}

/// Document body sealed under the file key: nonce ∥ tag ∥ ciphertext
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedDocument {
    /// Document identifier
    pub id: DocumentId,
    /// Sealed blob
    #[serde(with = "serde_bytes")]
    pub blob: Vec<u8>,
}

/// Decrypted, ranked search hit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedResult {
    /// Occurrences of the keyword in the document
    pub term_frequency: u64,
    /// Matching document
    pub document_id: DocumentId,
}
