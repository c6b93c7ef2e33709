//! Symmetric key material
//!
//! Index and file keys are AES keys of 16 or 32 bytes. When a key is shared it
//! travels as a big-endian integer, so leading zero bytes are dropped on the way
//! out and restored by [`SymmetricKey::from_secret_bytes`] on the way back.

use sealdex_core::{Result, SealdexError};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::Effects;

/// Supported key lengths in bytes
pub const SUPPORTED_KEY_LENGTHS: [usize; 2] = [16, 32];

/// AES key, zeroized on drop
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SymmetricKey {
    bytes: Vec<u8>,
}

impl SymmetricKey {
    /// Generate a fresh random key of `len` bytes
    pub fn generate(len: usize, effects: &Effects) -> Result<Self> {
        check_length(len)?;
        let mut bytes = vec![0u8; len];
        effects.fill_random(&mut bytes);
        Ok(Self { bytes })
    }

    /// Wrap existing key bytes
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        if let Err(err) = check_length(bytes.len()) {
            let mut bytes = bytes;
            bytes.zeroize();
            return Err(err);
        }
        Ok(Self { bytes })
    }

    /// Restore a key from its big-endian integer encoding
    ///
    /// Fails if the integer needs more than `len` bytes.
    pub fn from_secret_bytes(secret: &[u8], len: usize) -> Result<Self> {
        check_length(len)?;
        let significant = match secret.iter().position(|b| *b != 0) {
            Some(first) => &secret[first..],
            None => &[],
        };
        if significant.len() > len {
            return Err(SealdexError::crypto(format!(
                "reconstructed secret does not fit in a {len}-byte key"
            )));
        }
        let mut bytes = vec![0u8; len];
        bytes[len - significant.len()..].copy_from_slice(significant);
        Ok(Self { bytes })
    }

    /// Key bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Key length in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Always false; keys are 16 or 32 bytes
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl std::fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SymmetricKey({} bytes)", self.bytes.len())
    }
}

fn check_length(len: usize) -> Result<()> {
    if SUPPORTED_KEY_LENGTHS.contains(&len) {
        Ok(())
    } else {
        Err(SealdexError::crypto(format!(
            "unsupported key length {len}, expected 16 or 32 bytes"
        )))
    }
}
