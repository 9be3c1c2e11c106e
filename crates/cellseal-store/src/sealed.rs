//! Seal values on write, open them on read.

use std::sync::Arc;

use cellseal_crypto::CryptoBox;

use crate::{ColumnStore, StoreResult};

/// Wraps a [`ColumnStore`] so every value passes through a shared box.
///
/// `auth_secret` follows the box's mode: `Some` for per-call boxes, `None`
/// for held ones.
pub struct SealedStore<S> {
    inner: S,
    crypto: Arc<CryptoBox>,
}

impl<S: ColumnStore> SealedStore<S> {
    pub fn new(inner: S, crypto: Arc<CryptoBox>) -> Self {
        Self { inner, crypto }
    }

    pub fn put_sealed(
        &mut self,
        key: &str,
        plaintext: &[u8],
        auth_secret: Option<&[u8]>,
    ) -> StoreResult<()> {
        let envelope = self.crypto.encrypt(plaintext, auth_secret)?;
        self.inner.put(key, envelope)
    }

    /// `Ok(None)` when the key is absent. A stored value that fails to open
    /// is `Err(StoreError::Open(_))`, never an empty plaintext.
    pub fn get_opened(&self, key: &str, auth_secret: Option<&[u8]>) -> StoreResult<Option<Vec<u8>>> {
        let Some(envelope) = self.inner.get(key)? else {
            return Ok(None);
        };
        match self.crypto.decrypt(&envelope, auth_secret) {
            Ok(plaintext) => Ok(Some(plaintext)),
            Err(e) => {
                tracing::debug!(key, kind = ?e.kind(), "stored value failed to open");
                Err(e.into())
            }
        }
    }

    pub fn remove(&mut self, key: &str) -> StoreResult<bool> {
        self.inner.remove(key)
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn inner_mut(&mut self) -> &mut S {
        &mut self.inner
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}
