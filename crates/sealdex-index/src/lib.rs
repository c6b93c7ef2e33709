//! # Sealdex Index - Encrypted Index Construction
//!
//! Turns a plaintext corpus into an encrypted inverted index and a set of sealed
//! documents:
//!
//! - **Sources**: JSON and newline-delimited JSON corpora, in-memory corpora
//! - **Tokenizer**: lowercased `\b[\w-]+\b` word counts
//! - **Builder**: parallel per-document work, sequential keyword selection
//! - **Persistence**: keyword list, bincode index and per-document blobs

#![forbid(unsafe_code)]
#![allow(clippy::result_large_err)]

/// Index construction
pub mod builder;
/// On-disk layout
pub mod persist;
/// Corpus sources
pub mod source;
/// Word extraction
pub mod tokenizer;

pub use builder::{select_keywords, BuiltIndex, DocumentDigest, IndexBuilder};
pub use persist::{
    persist, read_index, read_keywords, PersistReport, DOCS_DIR, INDEX_FILE, KEYWORDS_FILE,
};
pub use source::{Document, DocumentSource, InMemorySource, JsonFileSource};
pub use tokenizer::{Tokenizer, WORD_PATTERN};
