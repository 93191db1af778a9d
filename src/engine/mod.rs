//! Scrape engine boundary
//!
//! The engine is an opaque worker: the orchestrator submits a URL
//! under a slot id and later receives a [`CompletionEvent`] on a
//! channel. The engine also exposes its pending window (jobs accepted
//! but not yet started) so the shutdown drain can flush it back to
//! durable storage, and a graceful teardown.

pub mod pool;
pub mod processor;

pub use pool::WorkerPool;
pub use processor::{build_http_client, HttpPlaceProcessor, PlaceProcessor};

use async_trait::async_trait;
use thiserror::Error;

/// Completion report for a submitted job
#[derive(Debug, Clone)]
pub struct CompletionEvent {
    /// Slot id assigned at submission
    pub slot: u64,

    /// The URL that was processed
    pub url: String,

    /// Whether processing succeeded
    pub success: bool,

    /// Failure message when `success` is false
    pub error_message: Option<String>,
}

/// Errors the engine boundary can report at submission time
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("engine is no longer accepting work")]
    ShutDown,
}

/// Boundary the orchestrator drives.
///
/// Submission is fire-and-forget; results arrive asynchronously on
/// the completion channel wired at construction.
#[async_trait]
pub trait ScrapeEngine: Send + Sync {
    /// Hands a URL to the engine under the given slot id
    async fn submit(&self, slot: u64, url: &str) -> Result<(), EngineError>;

    /// Jobs accepted but not yet picked up by a worker
    fn pending_window(&self) -> Vec<(u64, String)>;

    /// Stops intake and gives running jobs a grace period
    async fn teardown(&self);
}
