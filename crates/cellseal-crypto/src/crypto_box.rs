//! CryptoBox: seal and open envelopes under one primary key and one
//! auth-key strategy.

use rand::{rngs::OsRng, RngCore};
use tracing::debug;

use crate::auth::{AuthKeySource, HeldSecret, PerCallSecret};
use crate::cipher;
use crate::envelope::Envelope;
use crate::error::{KeyError, MalformedEnvelope, OpenError, SealError};
use crate::keys::{AuthSecret, PrimaryKey};
use crate::mac::{self, MacKey, MacKeyDerivation};
use crate::NONCE_SIZE;

/// Authenticated-encryption helper for opaque column values.
///
/// Key material is fixed at construction, except that a box built with
/// [`CryptoBoxBuilder::held`] may have its auth secret replaced through
/// [`CryptoBox::redefine`]. Calls share no mutable per-call state, so one box
/// can serve many threads.
#[derive(Debug)]
pub struct CryptoBox {
    primary: PrimaryKey,
    derivation: MacKeyDerivation,
    allow_empty_auth_secret: bool,
    auth: Box<dyn AuthKeySource>,
}

/// Builder for [`CryptoBox`]. Defaults: per-call secret, legacy MAC key
/// derivation, empty secrets rejected.
#[derive(Debug)]
pub struct CryptoBoxBuilder {
    primary: PrimaryKey,
    derivation: MacKeyDerivation,
    allow_empty_auth_secret: bool,
    auth: Box<dyn AuthKeySource>,
}

impl CryptoBoxBuilder {
    /// Take the auth secret from each call.
    pub fn per_call(mut self) -> Self {
        self.auth = Box::new(PerCallSecret);
        self
    }

    /// Hold `secret` in the box; calls must not supply their own.
    pub fn held(mut self, secret: impl Into<AuthSecret>) -> Self {
        self.auth = Box::new(HeldSecret::new(secret.into()));
        self
    }

    /// Use a custom auth-key strategy.
    pub fn auth_source(mut self, source: impl AuthKeySource + 'static) -> Self {
        self.auth = Box::new(source);
        self
    }

    pub fn derivation(mut self, derivation: MacKeyDerivation) -> Self {
        self.derivation = derivation;
        self
    }

    /// Accept an empty auth secret ("no authentication context" mode).
    pub fn allow_empty_auth_secret(mut self, allow: bool) -> Self {
        self.allow_empty_auth_secret = allow;
        self
    }

    pub fn build(self) -> CryptoBox {
        debug!(
            auth_mode = self.auth.mode(),
            derivation = ?self.derivation,
            allow_empty_auth_secret = self.allow_empty_auth_secret,
            "crypto box ready"
        );
        CryptoBox {
            primary: self.primary,
            derivation: self.derivation,
            allow_empty_auth_secret: self.allow_empty_auth_secret,
            auth: self.auth,
        }
    }
}

impl CryptoBox {
    pub fn builder(primary: PrimaryKey) -> CryptoBoxBuilder {
        CryptoBoxBuilder {
            primary,
            derivation: MacKeyDerivation::default(),
            allow_empty_auth_secret: false,
            auth: Box::new(PerCallSecret),
        }
    }

    /// Per-call box with the legacy MAC key derivation.
    pub fn new(primary: PrimaryKey) -> Self {
        Self::builder(primary).build()
    }

    pub fn auth_mode(&self) -> &'static str {
        self.auth.mode()
    }

    pub fn derivation(&self) -> MacKeyDerivation {
        self.derivation
    }

    /// Encrypt `plaintext` into a base64 envelope.
    ///
    /// `auth_secret` must be `Some` for a per-call box and `None` for a held
    /// one. Fails only on key resolution or when the OS random source cannot
    /// supply a nonce.
    pub fn encrypt(&self, plaintext: &[u8], auth_secret: Option<&[u8]>) -> Result<String, SealError> {
        let mac_key = self.mac_key(auth_secret)?;

        let mut nonce = [0u8; NONCE_SIZE];
        OsRng
            .try_fill_bytes(&mut nonce)
            .map_err(|e| SealError::RandomSource(e.to_string()))?;

        self.seal(&mac_key, nonce, plaintext)
    }

    fn seal(
        &self,
        mac_key: &MacKey,
        nonce: [u8; NONCE_SIZE],
        plaintext: &[u8],
    ) -> Result<String, SealError> {
        let mut ciphertext = plaintext.to_vec();
        cipher::apply_keystream(&self.primary, &nonce, &mut ciphertext);

        let tag = mac::compute(mac_key, &nonce, &ciphertext)?;
        let envelope = Envelope::assemble(tag, nonce, ciphertext);

        debug!(
            plaintext_len = plaintext.len(),
            envelope_len = envelope.encoded_len(),
            "sealed envelope"
        );
        Ok(envelope.to_base64())
    }

    /// Verify and decrypt a base64 envelope.
    ///
    /// The MAC is checked in constant time before the ciphertext is touched;
    /// on mismatch nothing is decrypted.
    pub fn decrypt(&self, envelope: &str, auth_secret: Option<&[u8]>) -> Result<Vec<u8>, OpenError> {
        // Both rejection paths log at the same level so the log stream does
        // not reveal which check failed.
        let envelope = Envelope::from_base64(envelope).map_err(|reason| {
            debug!(%reason, "envelope rejected");
            OpenError::Malformed(reason)
        })?;

        let mac_key = self.mac_key(auth_secret).map_err(OpenError::Key)?;
        let expected = mac::compute(&mac_key, envelope.nonce(), envelope.ciphertext())
            .map_err(OpenError::Key)?;

        if !mac::verify(&expected, envelope.mac()) {
            debug!(
                envelope_len = envelope.encoded_len(),
                auth_mode = self.auth.mode(),
                "envelope rejected: MAC mismatch"
            );
            return Err(OpenError::Authentication);
        }

        let mut plaintext = envelope.ciphertext().to_vec();
        cipher::apply_keystream(&self.primary, envelope.nonce(), &mut plaintext);
        Ok(plaintext)
    }

    pub fn encrypt_str(&self, plaintext: &str, auth_secret: Option<&[u8]>) -> Result<String, SealError> {
        self.encrypt(plaintext.as_bytes(), auth_secret)
    }

    /// Decrypt to a string; non-UTF-8 plaintext is reported as malformed.
    pub fn decrypt_string(&self, envelope: &str, auth_secret: Option<&[u8]>) -> Result<String, OpenError> {
        let plaintext = self.decrypt(envelope, auth_secret)?;
        String::from_utf8(plaintext).map_err(|_| OpenError::Malformed(MalformedEnvelope::NotUtf8))
    }

    /// Replace the held auth secret. Concurrent calls see either the old or
    /// the new secret. Per-call boxes return [`KeyError::NotRedefinable`].
    pub fn redefine(&self, secret: impl Into<AuthSecret>) -> Result<(), KeyError> {
        let secret = secret.into();
        self.check_not_empty(&secret)?;
        self.auth.redefine(secret)?;
        debug!(auth_mode = self.auth.mode(), "auth secret redefined");
        Ok(())
    }

    fn mac_key(&self, supplied: Option<&[u8]>) -> Result<MacKey, KeyError> {
        let secret = self.auth.resolve(supplied)?;
        self.check_not_empty(&secret)?;
        MacKey::derive(&secret, self.derivation)
    }

    fn check_not_empty(&self, secret: &AuthSecret) -> Result<(), KeyError> {
        if secret.is_empty() && !self.allow_empty_auth_secret {
            return Err(KeyError::EmptyAuthSecret);
        }
        Ok(())
    }
}
