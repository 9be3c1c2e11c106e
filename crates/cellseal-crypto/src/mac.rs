//! MAC key derivation and HMAC-SHA-512 tagging.
//!
//! Two derivations exist and are never mixed on one box:
//!
//! - `Legacy`: the MAC key is the lowercase hex text of RIPEMD-128(secret),
//!   i.e. 32 ASCII bytes carrying 128 bits of entropy. Existing envelopes
//!   were sealed this way and only verify under it.
//! - `HkdfSha512`: 64-byte key from HKDF-SHA-512 with a fixed info label.
//!   For deployments with no legacy data.

use hkdf::Hkdf;
use hmac::{Hmac, Mac};
use ripemd::{Digest, Ripemd128};
use sha2::Sha512;
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use crate::error::KeyError;
use crate::keys::AuthSecret;
use crate::{MAC_SIZE, NONCE_SIZE};

type HmacSha512 = Hmac<Sha512>;

/// HKDF info label for the non-legacy derivation.
const HKDF_MAC_INFO: &[u8] = b"cellseal/v2/mac";

/// How the HMAC key is derived from an auth secret.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MacKeyDerivation {
    #[default]
    Legacy,
    HkdfSha512,
}

/// Derived HMAC key. Zeroized on drop.
pub struct MacKey(Zeroizing<Vec<u8>>);

impl MacKey {
    pub fn derive(secret: &AuthSecret, derivation: MacKeyDerivation) -> Result<Self, KeyError> {
        match derivation {
            MacKeyDerivation::Legacy => {
                let digest = Ripemd128::digest(secret.as_bytes());
                Ok(Self(Zeroizing::new(hex::encode(digest).into_bytes())))
            }
            MacKeyDerivation::HkdfSha512 => {
                let hkdf = Hkdf::<Sha512>::new(None, secret.as_bytes());
                let mut okm = Zeroizing::new(vec![0u8; MAC_SIZE]);
                hkdf.expand(HKDF_MAC_INFO, &mut okm)
                    .map_err(|e| KeyError::Derivation(format!("HKDF expand failed: {e}")))?;
                Ok(Self(okm))
            }
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Debug for MacKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MacKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// HMAC-SHA-512 over `nonce || ciphertext`.
pub fn compute(
    key: &MacKey,
    nonce: &[u8; NONCE_SIZE],
    ciphertext: &[u8],
) -> Result<[u8; MAC_SIZE], KeyError> {
    let mut mac = HmacSha512::new_from_slice(key.as_bytes())
        .map_err(|e| KeyError::Derivation(format!("HMAC key rejected: {e}")))?;
    mac.update(nonce);
    mac.update(ciphertext);

    let mut tag = [0u8; MAC_SIZE];
    tag.copy_from_slice(&mac.finalize().into_bytes());
    Ok(tag)
}

/// Constant-time tag comparison.
pub fn verify(expected: &[u8; MAC_SIZE], received: &[u8; MAC_SIZE]) -> bool {
    expected[..].ct_eq(&received[..]).into()
}
