//! Durable storage: task queues and the place result store
//!
//! Two trait seams over one SQLite file: [`DurableQueue`] (named FIFO
//! lists: the main task queue and the dead-letter queue) and
//! [`ResultStore`] (scraped place records keyed by place id). The
//! queues survive process restarts; the shutdown drain writes
//! recovered work back through `DurableQueue::push`.

mod schema;
mod sqlite;
mod traits;

pub use schema::initialize_schema;
pub use sqlite::SqliteBackend;
pub use traits::{DurableQueue, ResultStore, StorageError, StorageResult};

use chrono::Utc;

/// Row stored for a successfully scraped place
#[derive(Debug, Clone)]
pub struct PlaceRecord {
    /// Deterministic id derived from the place URL
    pub place_id: String,

    /// The URL the record was scraped from
    pub url: String,

    /// Page title, when one was found
    pub title: Option<String>,

    /// JSON blob of whatever the processor extracted; opaque to the
    /// orchestrator
    pub payload: String,

    /// RFC3339 timestamp of the scrape
    pub scraped_at: String,
}

impl PlaceRecord {
    /// Creates a record stamped with the current time
    pub fn new(place_id: String, url: String, title: Option<String>, payload: String) -> Self {
        Self {
            place_id,
            url,
            title,
            payload,
            scraped_at: Utc::now().to_rfc3339(),
        }
    }
}
