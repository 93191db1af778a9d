//! SQLite storage implementation
//!
//! Backs both the durable queues and the result store with a single
//! database file. WAL mode keeps queue pushes from the drain path and
//! reads from stats mode from blocking each other.

use crate::storage::schema::initialize_schema;
use crate::storage::traits::{DurableQueue, ResultStore, StorageResult};
use crate::storage::PlaceRecord;
use crate::SweepError;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

/// SQLite-backed durable queue and result store
pub struct SqliteBackend {
    conn: Connection,
}

impl SqliteBackend {
    /// Opens (or creates) the database at the given path
    pub fn new(path: &Path) -> Result<Self, SweepError> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory backend (for tests and dry runs)
    pub fn new_in_memory() -> Result<Self, SweepError> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

impl DurableQueue for SqliteBackend {
    fn push(&mut self, queue: &str, value: &str) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO queue_items (queue, value, enqueued_at) VALUES (?1, ?2, ?3)",
            params![queue, value, now],
        )?;
        Ok(())
    }

    fn pop_front(&mut self, queue: &str) -> StorageResult<Option<String>> {
        let head: Option<(i64, String)> = self
            .conn
            .query_row(
                "SELECT id, value FROM queue_items WHERE queue = ?1 ORDER BY id LIMIT 1",
                params![queue],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        match head {
            Some((id, value)) => {
                self.conn
                    .execute("DELETE FROM queue_items WHERE id = ?1", params![id])?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    fn len(&self, queue: &str) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM queue_items WHERE queue = ?1",
            params![queue],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }
}

impl ResultStore for SqliteBackend {
    fn exists(&self, place_id: &str) -> StorageResult<bool> {
        let found: Option<i64> = self
            .conn
            .query_row(
                "SELECT 1 FROM places WHERE place_id = ?1",
                params![place_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn insert(&mut self, record: &PlaceRecord) -> StorageResult<bool> {
        let changed = self.conn.execute(
            "INSERT OR IGNORE INTO places (place_id, url, title, payload, scraped_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                record.place_id,
                record.url,
                record.title,
                record.payload,
                record.scraped_at
            ],
        )?;
        Ok(changed > 0)
    }

    fn count(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM places", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_record(place_id: &str) -> PlaceRecord {
        PlaceRecord::new(
            place_id.to_string(),
            format!("https://www.google.com/maps/place/{}/", place_id),
            Some("Test Place".to_string()),
            "{}".to_string(),
        )
    }

    #[test]
    fn test_queue_is_fifo() {
        let mut backend = SqliteBackend::new_in_memory().unwrap();

        backend.push("q", "first").unwrap();
        backend.push("q", "second").unwrap();
        backend.push("q", "third").unwrap();

        assert_eq!(backend.pop_front("q").unwrap(), Some("first".to_string()));
        assert_eq!(backend.pop_front("q").unwrap(), Some("second".to_string()));
        assert_eq!(backend.pop_front("q").unwrap(), Some("third".to_string()));
        assert_eq!(backend.pop_front("q").unwrap(), None);
    }

    #[test]
    fn test_queue_len() {
        let mut backend = SqliteBackend::new_in_memory().unwrap();

        assert_eq!(backend.len("q").unwrap(), 0);
        backend.push("q", "a").unwrap();
        backend.push("q", "b").unwrap();
        assert_eq!(backend.len("q").unwrap(), 2);

        backend.pop_front("q").unwrap();
        assert_eq!(backend.len("q").unwrap(), 1);
    }

    #[test]
    fn test_queues_are_isolated() {
        let mut backend = SqliteBackend::new_in_memory().unwrap();

        backend.push("tasks", "job").unwrap();
        backend.push("errors", "failed-job").unwrap();

        assert_eq!(backend.len("tasks").unwrap(), 1);
        assert_eq!(backend.len("errors").unwrap(), 1);
        assert_eq!(
            backend.pop_front("tasks").unwrap(),
            Some("job".to_string())
        );
        assert_eq!(backend.pop_front("tasks").unwrap(), None);
        assert_eq!(backend.len("errors").unwrap(), 1);
    }

    #[test]
    fn test_retry_goes_to_the_tail() {
        let mut backend = SqliteBackend::new_in_memory().unwrap();

        backend.push("q", "a").unwrap();
        backend.push("q", "b").unwrap();

        let popped = backend.pop_front("q").unwrap().unwrap();
        backend.push("q", &popped).unwrap();

        assert_eq!(backend.pop_front("q").unwrap(), Some("b".to_string()));
        assert_eq!(backend.pop_front("q").unwrap(), Some("a".to_string()));
    }

    #[test]
    fn test_insert_is_idempotent() {
        let mut backend = SqliteBackend::new_in_memory().unwrap();
        let record = create_test_record("0x1:0x2");

        assert!(backend.insert(&record).unwrap());
        assert!(!backend.insert(&record).unwrap());
        assert_eq!(backend.count().unwrap(), 1);
    }

    #[test]
    fn test_exists() {
        let mut backend = SqliteBackend::new_in_memory().unwrap();

        assert!(!backend.exists("0x1:0x2").unwrap());
        backend.insert(&create_test_record("0x1:0x2")).unwrap();
        assert!(backend.exists("0x1:0x2").unwrap());
        assert!(!backend.exists("0x3:0x4").unwrap());
    }
}
