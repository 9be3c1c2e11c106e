//! cellseal-crypto: tamper-evident envelopes for sensitive column values
//!
//! Construction: AES-256-CTR, then HMAC-SHA-512 over `nonce || ciphertext`
//! (encrypt-then-MAC). The MAC is verified in constant time before any
//! decryption happens.
//!
//! Envelope layout (base64, standard alphabet, padded):
//! ```text
//! [64 bytes: HMAC-SHA-512][16 bytes: CTR nonce][N bytes: ciphertext]
//! ```
//!
//! Key material:
//! ```text
//! Primary key (256-bit)  ── AES-256-CTR key, fixed for the box's lifetime
//! Auth secret            ── per call, or held by the box (redefinable)
//!   └── MAC key          ── legacy: hex(RIPEMD-128(secret)), or HKDF-SHA-512
//! ```

pub mod auth;
pub mod cipher;
pub mod crypto_box;
pub mod envelope;
pub mod error;
pub mod keys;
pub mod mac;
pub mod password;

#[cfg(test)]
mod proptests;

pub use auth::{AuthKeySource, HeldSecret, PerCallSecret};
pub use crypto_box::{CryptoBox, CryptoBoxBuilder};
pub use envelope::Envelope;
pub use error::{KeyError, MalformedEnvelope, OpenError, OpenErrorKind, SealError};
pub use keys::{AuthSecret, PrimaryKey};
pub use mac::{MacKey, MacKeyDerivation};
pub use password::hash_password;

/// Size of the primary (AES-256) key in bytes
pub const KEY_SIZE: usize = 32;

/// Size of the CTR nonce / initial counter block in bytes
pub const NONCE_SIZE: usize = 16;

/// Size of an HMAC-SHA-512 tag in bytes
pub const MAC_SIZE: usize = 64;

/// Fixed prefix of every envelope: MAC followed by nonce
pub const HEADER_SIZE: usize = MAC_SIZE + NONCE_SIZE;

/// Length of a legacy MAC key: hex text of a 128-bit RIPEMD digest
pub const LEGACY_MAC_KEY_SIZE: usize = 32;
