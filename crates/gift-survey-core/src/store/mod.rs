//! Storage abstraction for participant records.
//!
//! The [`Store`] trait is the whole persistence capability the core needs:
//! get, set, delete and list over [`ParticipantRecord`]s keyed by storage
//! key. Backends (JSON file, remote document store, in-memory) are
//! interchangeable, and [`FallbackStore`] chains two of them.
//!
//! Every call is blocking and returns an explicit `Result<_, StoreError>`;
//! callers decide what a failure means rather than unwinding through it.
//!
//! # Operations
//!
//! | Method | Purpose |
//! |--------|---------|
//! | [`get`](Store::get) | Read one record; `Ok(None)` when absent |
//! | [`set`](Store::set) | Write one record as a whole-record replacement |
//! | [`delete`](Store::delete) | Remove one record; deleting an absent key succeeds |
//! | [`list`](Store::list) | Every `(key, record)` pair, sorted by key |

pub mod fallback;
pub mod memory;

use thiserror::Error;

use crate::models::ParticipantRecord;

pub use fallback::FallbackStore;
pub use memory::InMemoryStore;

/// Failure reported by a storage backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend could not be reached (network, DNS, timeout).
    #[error("backend unavailable: {0}")]
    Unavailable(String),
    /// Credentials were missing or refused.
    #[error("backend refused credentials: {0}")]
    Unauthorized(String),
    /// The backend answered with an unexpected status.
    #[error("backend rejected request with status {status}: {body}")]
    Rejected { status: u16, body: String },
    /// Stored or received data could not be decoded.
    #[error("malformed data: {0}")]
    Malformed(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Malformed(e.to_string())
    }
}

/// A participant record backend.
pub trait Store: Send + Sync {
    /// Short backend name used in logs and status output.
    fn name(&self) -> &str;

    fn get(&self, key: &str) -> Result<Option<ParticipantRecord>, StoreError>;

    fn set(&self, key: &str, record: &ParticipantRecord) -> Result<(), StoreError>;

    fn delete(&self, key: &str) -> Result<(), StoreError>;

    fn list(&self) -> Result<Vec<(String, ParticipantRecord)>, StoreError>;
}
