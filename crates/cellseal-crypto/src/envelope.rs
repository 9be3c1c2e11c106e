//! Envelope wire format.
//!
//! ```text
//! offset  len  field
//! 0       64   HMAC-SHA-512 tag
//! 64      16   CTR nonce
//! 80      N    ciphertext (N == plaintext length)
//! ```
//!
//! Stored as standard padded base64 of the concatenation.

use base64::{engine::general_purpose::STANDARD, Engine};

use crate::error::MalformedEnvelope;
use crate::{HEADER_SIZE, MAC_SIZE, NONCE_SIZE};

/// A decoded envelope. Never mutated after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    mac: [u8; MAC_SIZE],
    nonce: [u8; NONCE_SIZE],
    ciphertext: Vec<u8>,
}

impl Envelope {
    pub fn assemble(mac: [u8; MAC_SIZE], nonce: [u8; NONCE_SIZE], ciphertext: Vec<u8>) -> Self {
        Self {
            mac,
            nonce,
            ciphertext,
        }
    }

    /// Split raw envelope bytes into their fields.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, MalformedEnvelope> {
        if bytes.len() < HEADER_SIZE {
            return Err(MalformedEnvelope::TooShort { len: bytes.len() });
        }

        let (mac_bytes, rest) = bytes.split_at(MAC_SIZE);
        let (nonce_bytes, ciphertext) = rest.split_at(NONCE_SIZE);

        let mut mac = [0u8; MAC_SIZE];
        mac.copy_from_slice(mac_bytes);
        let mut nonce = [0u8; NONCE_SIZE];
        nonce.copy_from_slice(nonce_bytes);

        Ok(Self::assemble(mac, nonce, ciphertext.to_vec()))
    }

    pub fn from_base64(encoded: &str) -> Result<Self, MalformedEnvelope> {
        let bytes = STANDARD
            .decode(encoded.trim())
            .map_err(|_| MalformedEnvelope::Base64)?;
        Self::from_bytes(&bytes)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.encoded_len());
        out.extend_from_slice(&self.mac);
        out.extend_from_slice(&self.nonce);
        out.extend_from_slice(&self.ciphertext);
        out
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.to_bytes())
    }

    pub fn mac(&self) -> &[u8; MAC_SIZE] {
        &self.mac
    }

    pub fn nonce(&self) -> &[u8; NONCE_SIZE] {
        &self.nonce
    }

    pub fn ciphertext(&self) -> &[u8] {
        &self.ciphertext
    }

    /// Total encoded length in bytes (always >= 80).
    pub fn encoded_len(&self) -> usize {
        HEADER_SIZE + self.ciphertext.len()
    }

    /// True when the envelope seals an empty plaintext.
    pub fn has_empty_ciphertext(&self) -> bool {
        self.ciphertext.is_empty()
    }
}
