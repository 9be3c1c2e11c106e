//! Error types for sealing and opening envelopes.
//!
//! `OpenError` renders every verification failure as the same
//! "decryption failed" message. The precise reason is only reachable
//! through [`OpenError::kind`] and [`OpenError::malformed_reason`], for
//! logs and tests.

use thiserror::Error;

/// Errors resolving or validating key material.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyError {
    /// Primary key has the wrong length.
    #[error("invalid primary key length: expected {expected}, got {actual}")]
    InvalidPrimaryKeyLength {
        /// Expected key length.
        expected: usize,
        /// Actual key length.
        actual: usize,
    },

    /// The box needs a per-call auth secret and none was given.
    #[error("an auth secret must be supplied for this call")]
    MissingAuthSecret,

    /// The box holds its own auth secret and a per-call one was given.
    #[error("this box holds its auth secret; a per-call secret is not accepted")]
    UnexpectedAuthSecret,

    /// Empty auth secret without the "no authentication context" mode.
    #[error("empty auth secret rejected")]
    EmptyAuthSecret,

    /// Runtime replacement requested on a per-call box.
    #[error("auth secret is supplied per call and cannot be redefined")]
    NotRedefinable,

    /// MAC key derivation failed.
    #[error("MAC key derivation failed: {0}")]
    Derivation(String),
}

/// Errors producing an envelope.
#[derive(Error, Debug)]
pub enum SealError {
    /// The OS random source could not supply a nonce. Fatal for the call.
    #[error("secure random source unavailable: {0}")]
    RandomSource(String),

    /// Auth key resolution failed.
    #[error(transparent)]
    Key(#[from] KeyError),
}

/// Why an envelope could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MalformedEnvelope {
    /// Not valid standard base64.
    Base64,
    /// Decoded to fewer bytes than the MAC + nonce header.
    TooShort {
        /// Decoded length.
        len: usize,
    },
    /// Authenticated plaintext requested as text was not UTF-8.
    NotUtf8,
}

impl std::fmt::Display for MalformedEnvelope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Base64 => write!(f, "invalid base64"),
            Self::TooShort { len } => write!(
                f,
                "decoded envelope is {len} bytes (minimum {})",
                crate::HEADER_SIZE
            ),
            Self::NotUtf8 => write!(f, "plaintext is not valid UTF-8"),
        }
    }
}

/// Coarse classification of [`OpenError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenErrorKind {
    /// Input could not be decoded into an envelope.
    Malformed,
    /// MAC mismatch.
    Authentication,
    /// Auth key could not be resolved.
    Key,
}

/// Errors opening an envelope. No plaintext is ever attached.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum OpenError {
    /// Stored value is corrupt; decryption was not attempted.
    #[error("decryption failed")]
    Malformed(MalformedEnvelope),

    /// MAC mismatch; decryption was not attempted.
    #[error("decryption failed")]
    Authentication,

    /// Key configuration problem, not an envelope problem.
    #[error("decryption failed: {0}")]
    Key(KeyError),
}

impl OpenError {
    pub fn kind(&self) -> OpenErrorKind {
        match self {
            Self::Malformed(_) => OpenErrorKind::Malformed,
            Self::Authentication => OpenErrorKind::Authentication,
            Self::Key(_) => OpenErrorKind::Key,
        }
    }

    pub fn malformed_reason(&self) -> Option<&MalformedEnvelope> {
        match self {
            Self::Malformed(reason) => Some(reason),
            _ => None,
        }
    }

    pub fn is_authentication(&self) -> bool {
        matches!(self, Self::Authentication)
    }
}
