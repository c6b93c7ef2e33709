// Authenticated encryption for stored document bodies

use aes_gcm::aead::consts::U16;
use aes_gcm::aead::generic_array::GenericArray;
use aes_gcm::aead::{AeadCore, AeadInPlace, KeyInit};
use aes_gcm::AesGcm;
use sealdex_core::{Result, SealdexError};
use zeroize::Zeroize;

use crate::{Effects, SymmetricKey};

/// Nonce length in bytes
pub const NONCE_LEN: usize = 16;
/// Authentication tag length in bytes
pub const TAG_LEN: usize = 16;
/// Bytes preceding the ciphertext in a sealed blob
pub const HEADER_LEN: usize = NONCE_LEN + TAG_LEN;

type Aes128Gcm16 = AesGcm<aes::Aes128, U16>;
type Aes256Gcm16 = AesGcm<aes::Aes256, U16>;

/// Encrypt `plaintext` under `key` with a fresh random nonce
///
/// Output layout: nonce (16) ∥ tag (16) ∥ ciphertext.
pub fn seal(key: &SymmetricKey, plaintext: &[u8], effects: &Effects) -> Result<Vec<u8>> {
    let nonce: [u8; NONCE_LEN] = effects.random_bytes();
    match key.len() {
        16 => seal_with::<Aes128Gcm16>(key.as_bytes(), &nonce, plaintext),
        32 => seal_with::<Aes256Gcm16>(key.as_bytes(), &nonce, plaintext),
        other => Err(SealdexError::crypto(format!(
            "unsupported file key length {other}"
        ))),
    }
}

/// Decrypt a sealed blob, verifying its tag
///
/// Fails closed: any truncation or mismatch yields an integrity error and no
/// plaintext.
pub fn open(key: &SymmetricKey, blob: &[u8]) -> Result<Vec<u8>> {
    if blob.len() < HEADER_LEN {
        return Err(SealdexError::integrity(format!(
            "sealed blob is {} bytes, shorter than its {HEADER_LEN}-byte header",
            blob.len()
        )));
    }
    match key.len() {
        16 => open_with::<Aes128Gcm16>(key.as_bytes(), blob),
        32 => open_with::<Aes256Gcm16>(key.as_bytes(), blob),
        other => Err(SealdexError::crypto(format!(
            "unsupported file key length {other}"
        ))),
    }
}

/// Decrypt a sealed blob holding UTF-8 text
pub fn open_text(key: &SymmetricKey, blob: &[u8]) -> Result<String> {
    let plaintext = open(key, blob)?;
    String::from_utf8(plaintext).map_err(|e| {
        let mut bytes = e.into_bytes();
        bytes.zeroize();
        SealdexError::integrity("document is not UTF-8")
    })
}

fn seal_with<C>(key: &[u8], nonce: &[u8; NONCE_LEN], plaintext: &[u8]) -> Result<Vec<u8>>
where
    C: KeyInit + AeadInPlace + AeadCore<NonceSize = U16, TagSize = U16>,
{
    let cipher = C::new_from_slice(key)
        .map_err(|e| SealdexError::crypto(format!("Failed to create cipher: {e}")))?;

    let mut buffer = plaintext.to_vec();
    let tag = cipher
        .encrypt_in_place_detached(GenericArray::from_slice(nonce), b"", &mut buffer)
        .map_err(|e| SealdexError::crypto(format!("Encryption failed: {e}")))?;

    let mut sealed = Vec::with_capacity(HEADER_LEN + buffer.len());
    sealed.extend_from_slice(nonce);
    sealed.extend_from_slice(tag.as_slice());
    sealed.extend_from_slice(&buffer);
    buffer.zeroize();
    Ok(sealed)
}

fn open_with<C>(key: &[u8], blob: &[u8]) -> Result<Vec<u8>>
where
    C: KeyInit + AeadInPlace + AeadCore<NonceSize = U16, TagSize = U16>,
{
    let cipher = C::new_from_slice(key)
        .map_err(|e| SealdexError::crypto(format!("Failed to create cipher: {e}")))?;

    let (nonce, rest) = blob.split_at(NONCE_LEN);
    let (tag, ciphertext) = rest.split_at(TAG_LEN);

    let mut buffer = ciphertext.to_vec();
    match cipher.decrypt_in_place_detached(
        GenericArray::from_slice(nonce),
        b"",
        &mut buffer,
        GenericArray::from_slice(tag),
    ) {
        Ok(()) => Ok(buffer),
        Err(_) => {
            buffer.zeroize();
            Err(SealdexError::integrity("authentication tag mismatch"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(len: usize) -> SymmetricKey {
        SymmetricKey::from_bytes(vec![0x11; len]).unwrap()
    }

    #[test]
    fn test_roundtrip_empty_and_text() {
        let effects = Effects::test();
        for len in [16, 32] {
            let key = key(len);
            for text in ["", "Cloud Computing Cloud computing is the delivery of computing services."] {
                let blob = seal(&key, text.as_bytes(), &effects).unwrap();
                assert_eq!(blob.len(), HEADER_LEN + text.len());
                assert_eq!(open_text(&key, &blob).unwrap(), text);
            }
        }
    }

    #[test]
    fn test_fresh_nonce_per_call() {
        let effects = Effects::test();
        let key = key(16);
        let a = seal(&key, b"same", &effects).unwrap();
        let b = seal(&key, b"same", &effects).unwrap();
        assert_ne!(a[..NONCE_LEN], b[..NONCE_LEN]);
        assert_ne!(a, b);
    }

    #[test]
    fn test_every_single_byte_mutation_fails_closed() {
        let effects = Effects::test();
        let key = key(16);
        let blob = seal(&key, b"security in computing systems", &effects).unwrap();
        for position in 0..blob.len() {
            let mut tampered = blob.clone();
            tampered[position] ^= 0x01;
            let err = open(&key, &tampered).unwrap_err();
            assert!(
                matches!(err, SealdexError::Integrity { .. }),
                "mutation at byte {position} was not rejected"
            );
        }
    }

    #[test]
    fn test_truncated_blob() {
        let err = open(&key(16), &[0u8; HEADER_LEN - 1]).unwrap_err();
        assert!(matches!(err, SealdexError::Integrity { .. }));
    }

    #[test]
    fn test_wrong_key() {
        let effects = Effects::test();
        let blob = seal(&key(16), b"payload", &effects).unwrap();
        let other = SymmetricKey::from_bytes(vec![0x12; 16]).unwrap();
        assert!(matches!(
            open(&other, &blob),
            Err(SealdexError::Integrity { .. })
        ));
    }
}
