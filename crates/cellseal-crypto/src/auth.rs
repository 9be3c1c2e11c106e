//! Auth-key strategies: where a box finds the secret its MAC key is
//! derived from.
//!
//! The strategy is fixed when the box is built. `PerCallSecret` takes the
//! secret from each encrypt/decrypt call; `HeldSecret` owns one and allows a
//! single writer to replace it while readers keep working.

use std::sync::RwLock;

use crate::error::KeyError;
use crate::keys::AuthSecret;

/// Resolves the auth secret for one encrypt/decrypt call.
pub trait AuthKeySource: Send + Sync + std::fmt::Debug {
    /// `supplied` is the secret passed to the call, if any.
    fn resolve(&self, supplied: Option<&[u8]>) -> Result<AuthSecret, KeyError>;

    /// Replace a held secret. Strategies without state refuse.
    fn redefine(&self, _secret: AuthSecret) -> Result<(), KeyError> {
        Err(KeyError::NotRedefinable)
    }

    /// Short name for logs.
    fn mode(&self) -> &'static str;
}

/// Secret passed by the caller on every call (e.g. a hashed user password).
#[derive(Debug, Default, Clone, Copy)]
pub struct PerCallSecret;

impl AuthKeySource for PerCallSecret {
    fn resolve(&self, supplied: Option<&[u8]>) -> Result<AuthSecret, KeyError> {
        supplied
            .map(AuthSecret::from)
            .ok_or(KeyError::MissingAuthSecret)
    }

    fn mode(&self) -> &'static str {
        "per-call"
    }
}

/// Application-wide secret owned by the box.
#[derive(Debug)]
pub struct HeldSecret {
    secret: RwLock<AuthSecret>,
}

impl HeldSecret {
    pub fn new(secret: AuthSecret) -> Self {
        Self {
            secret: RwLock::new(secret),
        }
    }
}

impl AuthKeySource for HeldSecret {
    fn resolve(&self, supplied: Option<&[u8]>) -> Result<AuthSecret, KeyError> {
        if supplied.is_some() {
            return Err(KeyError::UnexpectedAuthSecret);
        }
        // A writer cannot leave a torn secret behind; recover from poisoning.
        let guard = self.secret.read().unwrap_or_else(|e| e.into_inner());
        Ok(guard.clone())
    }

    fn redefine(&self, secret: AuthSecret) -> Result<(), KeyError> {
        let mut guard = self.secret.write().unwrap_or_else(|e| e.into_inner());
        *guard = secret;
        Ok(())
    }

    fn mode(&self) -> &'static str {
        "held"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_per_call_requires_secret() {
        let source = PerCallSecret;
        assert_eq!(source.resolve(None).unwrap_err(), KeyError::MissingAuthSecret);
        assert_eq!(source.resolve(Some(b"abc")).unwrap().as_bytes(), b"abc");
    }

    #[test]
    fn test_per_call_cannot_redefine() {
        let source = PerCallSecret;
        assert_eq!(
            source.redefine(AuthSecret::from("x")).unwrap_err(),
            KeyError::NotRedefinable
        );
    }

    #[test]
    fn test_held_rejects_supplied_secret() {
        let source = HeldSecret::new(AuthSecret::from("app-wide"));
        assert_eq!(
            source.resolve(Some(b"other")).unwrap_err(),
            KeyError::UnexpectedAuthSecret
        );
        assert_eq!(source.resolve(None).unwrap().as_bytes(), b"app-wide");
    }

    #[test]
    fn test_held_redefine() {
        let source = HeldSecret::new(AuthSecret::from("old"));
        source.redefine(AuthSecret::from("new")).unwrap();
        assert_eq!(source.resolve(None).unwrap().as_bytes(), b"new");
    }

    #[test]
    fn test_modes() {
        assert_eq!(PerCallSecret.mode(), "per-call");
        assert_eq!(HeldSecret::new(AuthSecret::from("s")).mode(), "held");
    }
}
