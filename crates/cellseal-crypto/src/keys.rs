//! Key material held by a box: the primary cipher key and auth secrets.

use rand::{rngs::OsRng, RngCore};
use zeroize::{Zeroize, Zeroizing};

use crate::error::{KeyError, SealError};
use crate::KEY_SIZE;

/// The 256-bit AES key. Zeroized on drop.
#[derive(Clone)]
pub struct PrimaryKey {
    bytes: [u8; KEY_SIZE],
}

impl PrimaryKey {
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self { bytes }
    }

    /// Accept exactly 32 bytes of key material.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, KeyError> {
        if bytes.len() != KEY_SIZE {
            return Err(KeyError::InvalidPrimaryKeyLength {
                expected: KEY_SIZE,
                actual: bytes.len(),
            });
        }
        let mut key = [0u8; KEY_SIZE];
        key.copy_from_slice(bytes);
        Ok(Self::from_bytes(key))
    }

    /// Accept key material of any length the way the historical cipher
    /// binding did: NUL-pad short keys, truncate long ones.
    ///
    /// Only for reading data sealed under such keys. Short keys carry less
    /// than 256 bits of entropy.
    pub fn from_legacy_slice(bytes: &[u8]) -> Self {
        if bytes.len() != KEY_SIZE {
            tracing::warn!(
                len = bytes.len(),
                expected = KEY_SIZE,
                "primary key is not 32 bytes; padding/truncating for legacy compatibility"
            );
        }
        let mut key = [0u8; KEY_SIZE];
        let n = bytes.len().min(KEY_SIZE);
        key[..n].copy_from_slice(&bytes[..n]);
        Self::from_bytes(key)
    }

    /// Generate a random key from the OS random source.
    pub fn generate() -> Result<Self, SealError> {
        let mut key = [0u8; KEY_SIZE];
        OsRng
            .try_fill_bytes(&mut key)
            .map_err(|e| SealError::RandomSource(e.to_string()))?;
        Ok(Self::from_bytes(key))
    }

    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.bytes
    }
}

impl Drop for PrimaryKey {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

impl std::fmt::Debug for PrimaryKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrimaryKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// Secret the MAC key is derived from. Zeroized on drop.
#[derive(Clone)]
pub struct AuthSecret(Zeroizing<Vec<u8>>);

impl AuthSecret {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(Zeroizing::new(bytes.into()))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&[u8]> for AuthSecret {
    fn from(bytes: &[u8]) -> Self {
        Self::new(bytes.to_vec())
    }
}

impl From<&str> for AuthSecret {
    fn from(s: &str) -> Self {
        Self::new(s.as_bytes().to_vec())
    }
}

impl From<String> for AuthSecret {
    fn from(s: String) -> Self {
        Self::new(s.into_bytes())
    }
}

impl std::fmt::Debug for AuthSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSecret")
            .field("len", &self.0.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_slice_rejects_wrong_length() {
        let err = PrimaryKey::from_slice(&[7u8; 31]).unwrap_err();
        assert_eq!(
            err,
            KeyError::InvalidPrimaryKeyLength {
                expected: 32,
                actual: 31
            }
        );
        assert!(PrimaryKey::from_slice(&[7u8; 33]).is_err());
        assert!(PrimaryKey::from_slice(&[7u8; 32]).is_ok());
    }

    #[test]
    fn test_legacy_pads_short_keys_with_nul() {
        let key = PrimaryKey::from_legacy_slice(b"short");
        assert_eq!(&key.as_bytes()[..5], b"short");
        assert!(key.as_bytes()[5..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_legacy_truncates_long_keys() {
        let long: Vec<u8> = (0u8..40).collect();
        let key = PrimaryKey::from_legacy_slice(&long);
        assert_eq!(key.as_bytes().as_slice(), &long[..32]);
    }

    #[test]
    fn test_legacy_exact_length_is_unchanged() {
        let strict = PrimaryKey::from_slice(&[9u8; 32]).unwrap();
        let legacy = PrimaryKey::from_legacy_slice(&[9u8; 32]);
        assert_eq!(strict.as_bytes(), legacy.as_bytes());
    }

    #[test]
    fn test_generated_keys_differ() {
        let k1 = PrimaryKey::generate().unwrap();
        let k2 = PrimaryKey::generate().unwrap();
        assert_ne!(k1.as_bytes(), k2.as_bytes(), "random keys must differ");
    }

    #[test]
    fn test_debug_is_redacted() {
        let key = PrimaryKey::from_bytes([0x41; 32]);
        let debug = format!("{key:?}");
        assert!(debug.contains("REDACTED"));
        assert!(!debug.contains("65"));

        let secret = AuthSecret::from("hunter2");
        let debug = format!("{secret:?}");
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("len: 7"));
    }
}
