//! Deterministic keyword encryption
//!
//! AES in ECB mode over PKCS#7-padded UTF-8. Equal plaintexts under one key give
//! equal ciphertexts, which is what lets the index store answer equality lookups
//! on tokens it cannot read. The same property leaks which entries repeat, for
//! keywords, counts and document ids alike. Do not replace this with a randomized
//! mode: tokens derived at query time would stop matching the index.

use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyInit};
use sealdex_core::{Result, SealdexError, Token};

use crate::SymmetricKey;

type Aes128EcbEnc = ecb::Encryptor<aes::Aes128>;
type Aes128EcbDec = ecb::Decryptor<aes::Aes128>;
type Aes256EcbEnc = ecb::Encryptor<aes::Aes256>;
type Aes256EcbDec = ecb::Decryptor<aes::Aes256>;

/// Deterministically encrypt a string under `key`
pub fn encrypt_keyword(key: &SymmetricKey, plaintext: &str) -> Result<Vec<u8>> {
    let bytes = plaintext.as_bytes();
    let ciphertext = match key.len() {
        16 => Aes128EcbEnc::new_from_slice(key.as_bytes())
            .map_err(|e| SealdexError::crypto(format!("AES-128 ECB init failed: {e}")))?
            .encrypt_padded_vec_mut::<Pkcs7>(bytes),
        32 => Aes256EcbEnc::new_from_slice(key.as_bytes())
            .map_err(|e| SealdexError::crypto(format!("AES-256 ECB init failed: {e}")))?
            .encrypt_padded_vec_mut::<Pkcs7>(bytes),
        other => {
            return Err(SealdexError::crypto(format!(
                "unsupported index key length {other}"
            )))
        }
    };
    Ok(ciphertext)
}

/// Invert [`encrypt_keyword`]
///
/// Bad block length, bad padding and non-UTF-8 plaintext are integrity errors.
pub fn decrypt_keyword(key: &SymmetricKey, ciphertext: &[u8]) -> Result<String> {
    let decrypted = match key.len() {
        16 => Aes128EcbDec::new_from_slice(key.as_bytes())
            .map_err(|e| SealdexError::crypto(format!("AES-128 ECB init failed: {e}")))?
            .decrypt_padded_vec_mut::<Pkcs7>(ciphertext),
        32 => Aes256EcbDec::new_from_slice(key.as_bytes())
            .map_err(|e| SealdexError::crypto(format!("AES-256 ECB init failed: {e}")))?
            .decrypt_padded_vec_mut::<Pkcs7>(ciphertext),
        other => {
            return Err(SealdexError::crypto(format!(
                "unsupported index key length {other}"
            )))
        }
    }
    .map_err(|e| SealdexError::integrity(format!("keyword decryption failed: {e}")))?;

    String::from_utf8(decrypted)
        .map_err(|e| SealdexError::integrity(format!("keyword is not UTF-8: {e}")))
}

/// Lookup token for a normalized keyword
pub fn derive_token(key: &SymmetricKey, keyword: &str) -> Result<Token> {
    encrypt_keyword(key, keyword).map(Token)
}
