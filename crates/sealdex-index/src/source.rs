//! Corpus sources
//!
//! A source yields documents in corpus order; position in that order becomes
//! the document id.

use std::path::{Path, PathBuf};

use sealdex_core::{Result, SealdexError};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// One corpus record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Document title
    pub title: String,
    /// Document body
    pub text: String,
}

impl Document {
    /// Create a document
    pub fn new(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            text: text.into(),
        }
    }

    /// Text that is both tokenized and sealed: `title + " " + text`
    pub fn content(&self) -> String {
        format!("{} {}", self.title, self.text)
    }
}

/// Anything that can produce a corpus
pub trait DocumentSource {
    /// Load documents in corpus order
    fn load(&self) -> Result<Vec<Document>>;
}

/// Documents already in memory
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    documents: Vec<Document>,
}

impl InMemorySource {
    /// Wrap a document list
    pub fn new(documents: Vec<Document>) -> Self {
        Self { documents }
    }
}

impl DocumentSource for InMemorySource {
    fn load(&self) -> Result<Vec<Document>> {
        Ok(self.documents.clone())
    }
}

/// JSON corpus file
///
/// A file whose first non-blank character is `[` is a JSON array of
/// `{title, text}` objects; elements that are not documents are skipped, while
/// an array that fails to parse is an error. Anything else is read as
/// newline-delimited JSON, skipping blank and malformed lines.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
    limit: Option<usize>,
}

impl JsonFileSource {
    /// Read every document in `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            limit: None,
        }
    }

    /// Keep only the first `limit` documents
    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    /// Corpus path
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DocumentSource for JsonFileSource {
    fn load(&self) -> Result<Vec<Document>> {
        let raw = std::fs::read_to_string(&self.path).map_err(|e| {
            SealdexError::storage(format!(
                "Failed to read corpus {}: {e}",
                self.path.display()
            ))
        })?;

        let mut documents = if raw.trim_start().starts_with('[') {
            parse_array(&raw)?
        } else {
            debug!(path = %self.path.display(), "corpus is not a JSON array, reading line by line");
            parse_lines(&raw)
        };

        if let Some(limit) = self.limit {
            documents.truncate(limit);
        }
        Ok(documents)
    }
}

// A syntactically broken array is an error; a well-formed array only loses
// the elements that are not documents.
fn parse_array(raw: &str) -> Result<Vec<Document>> {
    let values: Vec<serde_json::Value> = serde_json::from_str(raw)?;
    Ok(values
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| match serde_json::from_value::<Document>(value) {
            Ok(document) => Some(document),
            Err(err) => {
                warn!(element = index, error = %err, "skipping malformed corpus element");
                None
            }
        })
        .collect())
}

fn parse_lines(raw: &str) -> Vec<Document> {
    raw.lines()
        .enumerate()
        .filter_map(|(index, line)| {
            let line = line.trim();
            if line.is_empty() {
                return None;
            }
            match serde_json::from_str::<Document>(line) {
                Ok(document) => Some(document),
                Err(err) => {
                    warn!(line = index + 1, error = %err, "skipping malformed corpus line");
                    None
                }
            }
        })
        .collect()
}
