//! SQLite schema initialization

use rusqlite::Connection;

/// Creates tables and indexes if they do not exist
pub fn initialize_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS queue_items (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            queue TEXT NOT NULL,
            value TEXT NOT NULL,
            enqueued_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_queue_items_queue
            ON queue_items (queue, id);

        CREATE TABLE IF NOT EXISTS places (
            place_id TEXT PRIMARY KEY,
            url TEXT NOT NULL,
            title TEXT,
            payload TEXT NOT NULL,
            scraped_at TEXT NOT NULL
        );
        ",
    )
}
