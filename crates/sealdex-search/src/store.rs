//! Index store service
//!
//! Holds the encrypted index as an immutable token → postings map and serves
//! sealed document blobs from the document directory. It never holds a key and
//! never decrypts anything.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use sealdex_core::{DocumentId, EncryptedIndex, Posting, Result, SealdexError, Token};
use sealdex_index::{read_index, DOCS_DIR, INDEX_FILE};
use tracing::{debug, info, warn};

use crate::protocol::{decode_base64, StoreRequest, StoreResponse};

/// Read-only encrypted index
#[derive(Debug, Clone, Default)]
pub struct IndexStore {
    postings: Arc<HashMap<Token, Vec<Posting>>>,
    docs_dir: Option<PathBuf>,
}

impl IndexStore {
    /// Store over an in-memory index, without documents
    pub fn from_index(index: EncryptedIndex) -> Self {
        Self {
            postings: Arc::new(index.into_lookup()),
            docs_dir: None,
        }
    }

    /// Serve documents from `docs_dir`
    pub fn with_docs_dir(mut self, docs_dir: impl Into<PathBuf>) -> Self {
        self.docs_dir = Some(docs_dir.into());
        self
    }

    /// Load the index persisted under `dir`
    ///
    /// A missing or unreadable index file yields an empty store; every lookup
    /// then returns no postings.
    pub async fn load(dir: &Path) -> Self {
        let index_path = dir.join(INDEX_FILE);
        let index = match read_index(&index_path).await {
            Ok(index) => index,
            Err(err) => {
                warn!(path = %index_path.display(), error = %err, "index unavailable, serving an empty store");
                EncryptedIndex::default()
            }
        };
        info!(keywords = index.len(), "index store loaded");
        Self::from_index(index).with_docs_dir(dir.join(DOCS_DIR))
    }

    /// Number of tokens indexed
    pub fn len(&self) -> usize {
        self.postings.len()
    }

    /// Whether the store is empty
    pub fn is_empty(&self) -> bool {
        self.postings.is_empty()
    }

    /// Postings for `token`; empty when unknown
    pub fn lookup(&self, token: &Token) -> Vec<Posting> {
        self.postings.get(token).cloned().unwrap_or_default()
    }

    /// Sealed blob of document `id`, if stored
    pub async fn document(&self, id: DocumentId) -> Result<Option<Vec<u8>>> {
        let Some(dir) = &self.docs_dir else {
            return Ok(None);
        };
        match tokio::fs::read(dir.join(id.to_string())).await {
            Ok(blob) => Ok(Some(blob)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(SealdexError::storage(format!(
                "Failed to read document {id}: {e}"
            ))),
        }
    }

    /// Answer one wire request
    pub async fn handle(&self, request: StoreRequest) -> StoreResponse {
        match request {
            StoreRequest::Lookup { token_base64 } => {
                match decode_base64("token_base64", &token_base64) {
                    Ok(bytes) => {
                        let postings = self.lookup(&Token(bytes));
                        debug!(postings = postings.len(), "lookup served");
                        StoreResponse::postings(&postings)
                    }
                    Err(err) => StoreResponse::Error {
                        error: err.to_string(),
                    },
                }
            }
            StoreRequest::Document { doc_id } => match self.document(DocumentId(doc_id)).await {
                Ok(blob) => {
                    debug!(doc_id, found = blob.is_some(), "document served");
                    StoreResponse::document(blob.as_deref())
                }
                Err(err) => StoreResponse::Error {
                    error: err.to_string(),
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sealdex_core::IndexEntry;

    fn index() -> EncryptedIndex {
        EncryptedIndex {
            entries: vec![IndexEntry {
                token: Token(vec![9; 16]),
                postings: vec![Posting::new(vec![1; 16], vec![2; 16])],
            }],
        }
    }

    #[test]
    fn test_lookup_hit_and_miss() {
        let store = IndexStore::from_index(index());
        assert_eq!(store.lookup(&Token(vec![9; 16])).len(), 1);
        assert!(store.lookup(&Token(vec![8; 16])).is_empty());
    }

    #[tokio::test]
    async fn test_missing_index_gives_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = IndexStore::load(dir.path()).await;
        assert!(store.is_empty());
        assert!(store.lookup(&Token(vec![9; 16])).is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_index_gives_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(INDEX_FILE), b"\xff\xff\xff not bincode").unwrap();
        let store = IndexStore::load(dir.path()).await;
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_document_lookup() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("4"), b"sealed").unwrap();
        let store = IndexStore::from_index(index()).with_docs_dir(dir.path());
        assert_eq!(store.document(DocumentId(4)).await.unwrap(), Some(b"sealed".to_vec()));
        assert_eq!(store.document(DocumentId(5)).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_handle_rejects_bad_token_encoding() {
        let store = IndexStore::from_index(index());
        let response = store
            .handle(StoreRequest::Lookup {
                token_base64: "not base64!".into(),
            })
            .await;
        assert!(matches!(response, StoreResponse::Error { .. }));
    }
}
