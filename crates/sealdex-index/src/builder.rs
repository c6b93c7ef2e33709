//! Encrypted index construction
//!
//! Two independent per-document passes run on the rayon pool: the first
//! tokenizes and seals each document, the second encrypts its postings once the
//! keyword set is known. Everything between them is a sequential fold over
//! immutable per-document digests.

use std::collections::{BTreeMap, BTreeSet};

use rayon::prelude::*;
use sealdex_core::{
    DocumentId, EncryptedDocument, EncryptedIndex, IndexEntry, Posting, Result, SealdexError,
};
use sealdex_crypto::{derive_token, encrypt_keyword, seal, Effects, SymmetricKey};
use tracing::{debug, info};

use crate::source::{Document, DocumentSource};
use crate::tokenizer::Tokenizer;

/// Result of tokenizing and sealing one document
#[derive(Debug, Clone)]
pub struct DocumentDigest {
    /// Position in the corpus
    pub id: DocumentId,
    /// Lowercased word counts
    pub term_counts: BTreeMap<String, u64>,
    /// Sealed `title + " " + text`
    pub ciphertext: Vec<u8>,
}

/// Output of one build
#[derive(Debug, Clone)]
pub struct BuiltIndex {
    /// Selected plaintext keywords
    pub keywords: BTreeSet<String>,
    /// Token → postings
    pub index: EncryptedIndex,
    /// Sealed documents in id order
    pub documents: Vec<EncryptedDocument>,
}

/// Builds an encrypted inverted index from a corpus
pub struct IndexBuilder {
    index_key: SymmetricKey,
    file_key: SymmetricKey,
    threshold: u64,
    tokenizer: Tokenizer,
    effects: Effects,
    pool: Option<rayon::ThreadPool>,
}

impl IndexBuilder {
    /// Create a builder using the global rayon pool
    pub fn new(
        index_key: SymmetricKey,
        file_key: SymmetricKey,
        threshold: u64,
        effects: Effects,
    ) -> Result<Self> {
        Ok(Self {
            index_key,
            file_key,
            threshold,
            tokenizer: Tokenizer::new()?,
            effects,
            pool: None,
        })
    }

    /// Run on a dedicated pool of `threads` workers; 0 keeps the global pool
    pub fn with_worker_threads(mut self, threads: usize) -> Result<Self> {
        if threads > 0 {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .thread_name(|i| format!("sealdex-index-{i}"))
                .build()
                .map_err(|e| {
                    SealdexError::configuration(format!("Failed to build worker pool: {e}"))
                })?;
            self.pool = Some(pool);
        }
        Ok(self)
    }

    /// Keyword selection threshold
    pub fn threshold(&self) -> u64 {
        self.threshold
    }

    /// Load a corpus from `source` and build its index
    pub fn build_from(&self, source: &dyn DocumentSource) -> Result<BuiltIndex> {
        let documents = source.load()?;
        self.build(&documents)
    }

    /// Build the index for `documents`, ids assigned by position
    pub fn build(&self, documents: &[Document]) -> Result<BuiltIndex> {
        match &self.pool {
            Some(pool) => pool.install(|| self.build_inner(documents)),
            None => self.build_inner(documents),
        }
    }

    fn build_inner(&self, documents: &[Document]) -> Result<BuiltIndex> {
        let digests = documents
            .par_iter()
            .enumerate()
            .map(|(position, document)| self.digest(position, document))
            .collect::<Result<Vec<_>>>()?;
        debug!(documents = digests.len(), "documents digested");

        let keywords = select_keywords(&digests, self.threshold);

        let per_document = digests
            .par_iter()
            .map(|digest| self.encrypt_postings(digest, &keywords))
            .collect::<Result<Vec<_>>>()?;

        let index = self.assemble(&keywords, per_document)?;
        let documents = digests
            .into_iter()
            .map(|digest| EncryptedDocument {
                id: digest.id,
                blob: digest.ciphertext,
            })
            .collect::<Vec<_>>();

        info!(
            documents = documents.len(),
            keywords = keywords.len(),
            threshold = self.threshold,
            "index built"
        );
        Ok(BuiltIndex {
            keywords,
            index,
            documents,
        })
    }

    fn digest(&self, position: usize, document: &Document) -> Result<DocumentDigest> {
        let content = document.content();
        let term_counts = self.tokenizer.term_counts(&content);
        let ciphertext = seal(&self.file_key, content.as_bytes(), &self.effects)?;
        Ok(DocumentDigest {
            id: DocumentId(position as u64),
            term_counts,
            ciphertext,
        })
    }

    fn encrypt_postings(
        &self,
        digest: &DocumentDigest,
        keywords: &BTreeSet<String>,
    ) -> Result<Vec<(String, Posting)>> {
        let encrypted_doc_id = encrypt_keyword(&self.index_key, &digest.id.to_string())?;
        digest
            .term_counts
            .iter()
            .filter(|(word, _)| keywords.contains(*word))
            .map(|(word, count)| {
                let encrypted_count = encrypt_keyword(&self.index_key, &count.to_string())?;
                Ok((
                    word.clone(),
                    Posting::new(encrypted_count, encrypted_doc_id.clone()),
                ))
            })
            .collect()
    }

    // Per-document postings arrive in document order, which fixes posting order.
    fn assemble(
        &self,
        keywords: &BTreeSet<String>,
        per_document: Vec<Vec<(String, Posting)>>,
    ) -> Result<EncryptedIndex> {
        let mut postings: BTreeMap<&str, Vec<Posting>> =
            keywords.iter().map(|k| (k.as_str(), Vec::new())).collect();
        for document in per_document {
            for (word, posting) in document {
                if let Some(list) = postings.get_mut(word.as_str()) {
                    list.push(posting);
                }
            }
        }

        let entries = postings
            .into_par_iter()
            .map(|(word, postings)| {
                Ok(IndexEntry {
                    token: derive_token(&self.index_key, word)?,
                    postings,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(EncryptedIndex { entries })
    }
}

/// Words whose corpus-wide count is strictly greater than `threshold`
pub fn select_keywords(digests: &[DocumentDigest], threshold: u64) -> BTreeSet<String> {
    let mut totals: BTreeMap<&str, u64> = BTreeMap::new();
    for digest in digests {
        for (word, count) in &digest.term_counts {
            *totals.entry(word.as_str()).or_insert(0) += count;
        }
    }
    totals
        .into_iter()
        .filter(|(_, total)| *total > threshold)
        .map(|(word, _)| word.to_string())
        .collect()
}
