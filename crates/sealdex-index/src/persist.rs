//! On-disk index layout
//!
//! ```text
//! <dir>/keywords.txt   space-separated plaintext keywords (owner-side only)
//! <dir>/index.bin      bincode EncryptedIndex
//! <dir>/docs/<id>      one sealed blob per document, named by decimal id
//! ```
//!
//! The document directory is replaced on every build. Document writes run on a
//! bounded task set and [`persist`] returns only once every write has joined.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use sealdex_core::{EncryptedIndex, Result, SealdexError};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info};

use crate::builder::BuiltIndex;

/// Keyword list file name
pub const KEYWORDS_FILE: &str = "keywords.txt";
/// Index file name
pub const INDEX_FILE: &str = "index.bin";
/// Document directory name
pub const DOCS_DIR: &str = "docs";

/// Paths produced by [`persist`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistReport {
    /// Keyword list
    pub keywords_path: PathBuf,
    /// Serialized index
    pub index_path: PathBuf,
    /// Document directory
    pub docs_dir: PathBuf,
    /// Documents written
    pub documents_written: usize,
}

/// Write a built index under `dir`
pub async fn persist(
    built: &BuiltIndex,
    dir: &Path,
    write_concurrency: usize,
) -> Result<PersistReport> {
    if write_concurrency == 0 {
        return Err(SealdexError::configuration(
            "write_concurrency must be greater than zero",
        ));
    }
    tokio::fs::create_dir_all(dir).await?;

    let keywords_path = dir.join(KEYWORDS_FILE);
    let keywords = built
        .keywords
        .iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(" ");
    tokio::fs::write(&keywords_path, keywords).await?;

    let index_path = dir.join(INDEX_FILE);
    let index_bytes = bincode::serialize(&built.index)?;
    tokio::fs::write(&index_path, &index_bytes).await?;
    debug!(bytes = index_bytes.len(), "index written");

    let docs_dir = dir.join(DOCS_DIR);
    if tokio::fs::try_exists(&docs_dir).await? {
        tokio::fs::remove_dir_all(&docs_dir).await?;
    }
    tokio::fs::create_dir_all(&docs_dir).await?;

    let permits = Arc::new(Semaphore::new(write_concurrency));
    let mut writes = JoinSet::new();
    for document in &built.documents {
        let permit = permits
            .clone()
            .acquire_owned()
            .await
            .map_err(|e| SealdexError::storage(format!("write limiter closed: {e}")))?;
        let path = docs_dir.join(document.id.to_string());
        let blob = document.blob.clone();
        writes.spawn(async move {
            let result = tokio::fs::write(&path, blob).await;
            drop(permit);
            result.map_err(|e| {
                SealdexError::storage(format!("Failed to write {}: {e}", path.display()))
            })
        });
    }

    let mut documents_written = 0;
    while let Some(joined) = writes.join_next().await {
        joined.map_err(|e| SealdexError::storage(format!("document write task failed: {e}")))??;
        documents_written += 1;
    }

    info!(
        dir = %dir.display(),
        documents = documents_written,
        keywords = built.keywords.len(),
        "index persisted"
    );
    Ok(PersistReport {
        keywords_path,
        index_path,
        docs_dir,
        documents_written,
    })
}

/// Read a persisted index
pub async fn read_index(path: &Path) -> Result<EncryptedIndex> {
    let bytes = tokio::fs::read(path).await.map_err(|e| {
        SealdexError::storage(format!("Failed to read {}: {e}", path.display()))
    })?;
    Ok(bincode::deserialize(&bytes)?)
}

/// Read a keyword list written by [`persist`]
pub async fn read_keywords(path: &Path) -> Result<Vec<String>> {
    let raw = tokio::fs::read_to_string(path).await?;
    Ok(raw.split_whitespace().map(str::to_string).collect())
}
