//! cellseal-store: opaque string storage for sealed column values
//!
//! Backends store and return envelopes verbatim; they know nothing about
//! their structure. `SealedStore` seals on write and opens on read.
//!
//!   - `MemoryStore`: HashMap, for tests and short-lived processes
//!   - `JsonFileStore`: whole map in memory, flushed atomically via temp+rename

pub mod json_file;
pub mod memory;
pub mod sealed;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;
pub use sealed::SealedStore;

use cellseal_crypto::{OpenError, SealError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid key '{0}': use letters, digits, '_', '.', ':' or '-'")]
    InvalidKey(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error(transparent)]
    Seal(#[from] SealError),

    #[error(transparent)]
    Open(#[from] OpenError),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// A store of opaque string values addressed by key.
pub trait ColumnStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>>;
    fn put(&mut self, key: &str, value: String) -> StoreResult<()>;
    /// Returns whether a value was present.
    fn remove(&mut self, key: &str) -> StoreResult<bool>;
}

/// Keys are non-empty and limited to `[A-Za-z0-9_.:-]`, so a key can be
/// spliced into a table/column path without escaping.
pub fn validate_key(key: &str) -> StoreResult<()> {
    let ok = !key.is_empty()
        && key
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'_' | b'.' | b':' | b'-'));
    if ok {
        Ok(())
    } else {
        Err(StoreError::InvalidKey(key.to_string()))
    }
}
