// Decrypt-and-rank over postings

use sealdex_core::{DocumentId, Posting, RankedResult, Result, SealdexError};
use sealdex_crypto::{decrypt_keyword, SymmetricKey};

/// Decrypt every posting and order by term frequency, highest first
///
/// Ties keep index order. A single undecryptable or non-numeric posting fails
/// the whole ranking; no partial result is returned.
pub fn rank(index_key: &SymmetricKey, postings: &[Posting]) -> Result<Vec<RankedResult>> {
    let mut results = postings
        .iter()
        .map(|posting| {
            Ok(RankedResult {
                term_frequency: decrypt_number(index_key, &posting.encrypted_count, "count")?,
                document_id: DocumentId(decrypt_number(
                    index_key,
                    &posting.encrypted_doc_id,
                    "document id",
                )?),
            })
        })
        .collect::<Result<Vec<_>>>()?;
    results.sort_by(|a, b| b.term_frequency.cmp(&a.term_frequency));
    Ok(results)
}

fn decrypt_number(key: &SymmetricKey, ciphertext: &[u8], what: &str) -> Result<u64> {
    let text = decrypt_keyword(key, ciphertext)?;
    text.parse::<u64>()
        .map_err(|e| SealdexError::ranking(format!("posting {what} is not a decimal integer: {e}")))
}
