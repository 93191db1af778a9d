//! Storage traits and error types

use crate::storage::PlaceRecord;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Named FIFO lists backed by durable storage.
///
/// Every call crosses a storage boundary and may fail independently;
/// callers must not assume atomicity across a check-then-act pair
/// beyond what the backend itself guarantees.
pub trait DurableQueue {
    /// Appends a value at the tail of the named queue
    fn push(&mut self, queue: &str, value: &str) -> StorageResult<()>;

    /// Removes and returns the head of the named queue, or `None`
    /// when the queue is empty
    fn pop_front(&mut self, queue: &str) -> StorageResult<Option<String>>;

    /// Number of values currently in the named queue
    fn len(&self, queue: &str) -> StorageResult<u64>;
}

/// Persisted results of completed scrapes, keyed by place id.
pub trait ResultStore {
    /// Whether a record for this place id already exists
    fn exists(&self, place_id: &str) -> StorageResult<bool>;

    /// Inserts a record; returns `false` when the id was already
    /// present (the first record is kept)
    fn insert(&mut self, record: &PlaceRecord) -> StorageResult<bool>;

    /// Number of stored records
    fn count(&self) -> StorageResult<u64>;
}
