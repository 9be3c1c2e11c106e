//! AES-256-CTR keystream.
//!
//! The 16-byte nonce is the initial counter block, incremented as one
//! 128-bit big-endian integer per block. This matches OpenSSL's
//! `aes-256-ctr`, which produced the existing stored envelopes.

use ctr::cipher::{KeyIvInit, StreamCipher};

use crate::keys::PrimaryKey;
use crate::NONCE_SIZE;

type Aes256Ctr = ctr::Ctr128BE<aes::Aes256>;

/// XOR the keystream for `(key, nonce)` into `buf` in place.
///
/// Encryption and decryption are the same operation.
pub fn apply_keystream(key: &PrimaryKey, nonce: &[u8; NONCE_SIZE], buf: &mut [u8]) {
    let mut cipher = Aes256Ctr::new(key.as_bytes().into(), nonce.into());
    cipher.apply_keystream(buf);
}
