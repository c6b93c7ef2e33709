//! Wire protocol
//!
//! Messages are JSON. Every binary field travels as standard base64. On TCP each
//! message is one frame: a big-endian `u32` length followed by that many bytes.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use sealdex_core::{DocumentId, Posting, Result, SealdexError, Token};
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Largest frame either side accepts
pub const MAX_FRAME_LEN: usize = 64 * 1024 * 1024;

/// Data user's search request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Requesting data user
    pub participant: u16,
    /// The user's pseudo-share for `(secret_index, group_index)`
    pub share_base64: String,
    /// Secret to reconstruct (the index key)
    pub secret_index: usize,
    /// Access group the user reconstructs through
    pub group_index: usize,
    /// Keyword to search; case-insensitive
    pub keyword: String,
}

/// Data user's request for one document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchRequest {
    /// Requesting data user
    pub participant: u16,
    /// The user's pseudo-share of the file key for `group_index`
    pub share_base64: String,
    /// Access group the user reconstructs through
    pub group_index: usize,
    /// Document to open
    pub doc_id: u64,
}

/// Coordinator → store request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum StoreRequest {
    /// Postings for a token
    Lookup {
        /// Token bytes
        token_base64: String,
    },
    /// Sealed document blob
    Document {
        /// Document id
        doc_id: u64,
    },
}

impl StoreRequest {
    /// Lookup request for `token`
    pub fn lookup(token: &Token) -> Self {
        StoreRequest::Lookup {
            token_base64: STANDARD.encode(token.as_bytes()),
        }
    }

    /// Document request for `id`
    pub fn document(id: DocumentId) -> Self {
        StoreRequest::Document { doc_id: id.0 }
    }
}

/// One posting on the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WirePosting {
    /// Encrypted term frequency
    pub count_base64: String,
    /// Encrypted document id
    pub doc_id_base64: String,
}

impl From<&Posting> for WirePosting {
    fn from(posting: &Posting) -> Self {
        Self {
            count_base64: STANDARD.encode(&posting.encrypted_count),
            doc_id_base64: STANDARD.encode(&posting.encrypted_doc_id),
        }
    }
}

impl TryFrom<&WirePosting> for Posting {
    type Error = SealdexError;

    fn try_from(wire: &WirePosting) -> Result<Self> {
        Ok(Posting::new(
            decode_base64("count_base64", &wire.count_base64)?,
            decode_base64("doc_id_base64", &wire.doc_id_base64)?,
        ))
    }
}

/// Store → coordinator response
///
/// Untagged; variant order matters when decoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StoreResponse {
    /// The store could not serve the request
    Error {
        /// Reason
        error: String,
    },
    /// Lookup reply; empty when the token is unknown
    Postings {
        /// Postings in index order
        postings: Vec<WirePosting>,
    },
    /// Document reply; null when the id is unknown
    Document {
        /// Sealed blob
        blob_base64: Option<String>,
    },
}

impl StoreResponse {
    /// Lookup reply for `postings`
    pub fn postings(postings: &[Posting]) -> Self {
        StoreResponse::Postings {
            postings: postings.iter().map(WirePosting::from).collect(),
        }
    }

    /// Document reply for `blob`
    pub fn document(blob: Option<&[u8]>) -> Self {
        StoreResponse::Document {
            blob_base64: blob.map(|b| STANDARD.encode(b)),
        }
    }

    /// Decode a lookup reply
    pub fn into_postings(self) -> Result<Vec<Posting>> {
        match self {
            StoreResponse::Postings { postings } => {
                postings.iter().map(Posting::try_from).collect()
            }
            StoreResponse::Error { error } => Err(SealdexError::transport(error)),
            StoreResponse::Document { .. } => Err(SealdexError::transport(
                "expected postings, store sent a document",
            )),
        }
    }

    /// Decode a document reply
    pub fn into_document(self) -> Result<Option<Vec<u8>>> {
        match self {
            StoreResponse::Document { blob_base64 } => blob_base64
                .map(|b| decode_base64("blob_base64", &b))
                .transpose(),
            StoreResponse::Error { error } => Err(SealdexError::transport(error)),
            StoreResponse::Postings { .. } => Err(SealdexError::transport(
                "expected a document, store sent postings",
            )),
        }
    }
}

/// Decode a standard base64 field
pub fn decode_base64(field: &str, value: &str) -> Result<Vec<u8>> {
    STANDARD
        .decode(value)
        .map_err(|e| SealdexError::serialization(format!("{field} is not valid base64: {e}")))
}

/// Encode bytes as standard base64
pub fn encode_base64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Write one length-prefixed JSON frame
pub async fn write_frame<W, T>(writer: &mut W, message: &T) -> Result<()>
where
    W: AsyncWrite + Unpin,
    T: Serialize,
{
    let body = serde_json::to_vec(message)?;
    if body.len() > MAX_FRAME_LEN {
        return Err(SealdexError::transport(format!(
            "Message too large: {} > {MAX_FRAME_LEN}",
            body.len()
        )));
    }
    let len = u32::try_from(body.len())
        .map_err(|_| SealdexError::transport("frame length overflows u32"))?;
    writer
        .write_all(&len.to_be_bytes())
        .await
        .map_err(|e| SealdexError::transport(format!("frame write failed: {e}")))?;
    writer
        .write_all(&body)
        .await
        .map_err(|e| SealdexError::transport(format!("frame write failed: {e}")))?;
    writer
        .flush()
        .await
        .map_err(|e| SealdexError::transport(format!("frame flush failed: {e}")))?;
    Ok(())
}

/// Read one length-prefixed JSON frame; `None` on clean end of stream
pub async fn read_frame<R, T>(reader: &mut R) -> Result<Option<T>>
where
    R: AsyncRead + Unpin,
    T: for<'de> Deserialize<'de>,
{
    let mut len_bytes = [0u8; 4];
    match reader.read_exact(&mut len_bytes).await {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(SealdexError::transport(format!("frame read failed: {e}"))),
    }

    let len = u32::from_be_bytes(len_bytes) as usize;
    if len > MAX_FRAME_LEN {
        return Err(SealdexError::transport(format!(
            "Message too large: {len} > {MAX_FRAME_LEN}"
        )));
    }
    let mut body = vec![0u8; len];
    reader
        .read_exact(&mut body)
        .await
        .map_err(|e| SealdexError::transport(format!("frame read failed: {e}")))?;
    Ok(Some(serde_json::from_slice(&body)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_json_shape() {
        let json = serde_json::to_value(StoreRequest::lookup(&Token(vec![1, 2, 3]))).unwrap();
        assert_eq!(json, serde_json::json!({"op": "lookup", "token_base64": "AQID"}));
        let json = serde_json::to_value(StoreRequest::document(DocumentId(7))).unwrap();
        assert_eq!(json, serde_json::json!({"op": "document", "doc_id": 7}));
    }

    #[test]
    fn test_response_variants_decode() {
        let postings: StoreResponse = serde_json::from_str(
            r#"{"postings":[{"count_base64":"AA==","doc_id_base64":"AQ=="}]}"#,
        )
        .unwrap();
        assert_eq!(
            postings.into_postings().unwrap(),
            vec![Posting::new(vec![0], vec![1])]
        );

        let missing: StoreResponse = serde_json::from_str(r#"{"blob_base64":null}"#).unwrap();
        assert_eq!(missing.into_document().unwrap(), None);

        let error: StoreResponse = serde_json::from_str(r#"{"error":"boom"}"#).unwrap();
        assert!(error.into_postings().unwrap_err().is_transport());
    }

    #[test]
    fn test_bad_base64_is_serialization_error() {
        let response = StoreResponse::Postings {
            postings: vec![WirePosting {
                count_base64: "***".into(),
                doc_id_base64: "AA==".into(),
            }],
        };
        assert!(matches!(
            response.into_postings(),
            Err(SealdexError::Serialization { .. })
        ));
    }

    #[tokio::test]
    async fn test_frame_round_trip_and_eof() {
        let (mut client, mut server) = tokio::io::duplex(1024);
        write_frame(&mut client, &StoreRequest::document(DocumentId(3)))
            .await
            .unwrap();
        drop(client);
        let first: Option<StoreRequest> = read_frame(&mut server).await.unwrap();
        assert_eq!(first, Some(StoreRequest::Document { doc_id: 3 }));
        let second: Option<StoreRequest> = read_frame(&mut server).await.unwrap();
        assert_eq!(second, None);
    }

    #[tokio::test]
    async fn test_oversized_frame_rejected() {
        let (mut client, mut server) = tokio::io::duplex(64);
        tokio::io::AsyncWriteExt::write_all(&mut client, &u32::MAX.to_be_bytes())
            .await
            .unwrap();
        let result: Result<Option<StoreRequest>> = read_frame(&mut server).await;
        assert!(result.unwrap_err().is_transport());
    }
}
