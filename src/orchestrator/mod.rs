//! Orchestration core
//!
//! Wires the durable queue, result store, in-flight tracker, engine,
//! completion consumer, and shutdown coordinator into the resilient
//! dispatch loop. The loop runs until a termination signal drains it;
//! no failure path is allowed to end it.

pub mod completion;
pub mod dispatch;
pub mod shutdown;

pub use shutdown::ShutdownCoordinator;

use crate::config::Config;
use crate::engine::{build_http_client, HttpPlaceProcessor, ScrapeEngine, WorkerPool};
use crate::storage::SqliteBackend;
use crate::tracker::InFlightTracker;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

/// Process-wide completion counters.
///
/// Telemetry only: reset on restart, never persisted, and never used
/// for correctness decisions.
#[derive(Debug, Default)]
pub struct Counters {
    success: AtomicU64,
    failure: AtomicU64,
}

impl Counters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_success(&self) {
        self.success.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        self.failure.fetch_add(1, Ordering::Relaxed);
    }

    pub fn successes(&self) -> u64 {
        self.success.load(Ordering::Relaxed)
    }

    pub fn failures(&self) -> u64 {
        self.failure.load(Ordering::Relaxed)
    }
}

/// Runs the orchestrator until a termination signal drains it.
///
/// Opens the durable backend, builds the HTTP processor and the worker
/// pool, starts the completion consumer and the signal listener, then
/// drives the dispatch loop on the current task.
pub async fn run_orchestrator(config: Config) -> crate::Result<()> {
    let config = Arc::new(config);

    let backend = SqliteBackend::new(Path::new(&config.queue.database_path))?;
    let backend = Arc::new(Mutex::new(backend));

    let client = build_http_client(&config.http)?;
    let processor = Arc::new(HttpPlaceProcessor::new(client, Arc::clone(&backend)));

    let (completions_tx, completions_rx) = mpsc::unbounded_channel();
    let engine: Arc<dyn ScrapeEngine> = Arc::new(WorkerPool::new(
        config.engine.clone(),
        processor,
        completions_tx,
    ));

    let tracker = Arc::new(InFlightTracker::new());
    let counters = Arc::new(Counters::new());

    let consumer = tokio::spawn(completion::run_completions(
        completions_rx,
        Arc::clone(&tracker),
        Arc::clone(&counters),
        Arc::clone(&backend),
        Arc::clone(&config),
    ));

    let coordinator = Arc::new(ShutdownCoordinator::new(
        Arc::clone(&backend),
        Arc::clone(&tracker),
        Arc::clone(&engine),
        Arc::clone(&config),
    ));
    tokio::spawn(shutdown::run_signal_listener(Arc::clone(&coordinator)));

    tracing::info!(
        "Orchestrator started: task queue {}, backpressure ceiling {}, concurrency {}..{}",
        config.queue.task_queue,
        config.orchestrator.backpressure_ceiling,
        config.engine.min_concurrency,
        config.engine.max_concurrency
    );

    dispatch::run_dispatch(
        Arc::clone(&config),
        backend,
        tracker,
        counters,
        engine,
        coordinator,
    )
    .await?;

    consumer.abort();
    Ok(())
}
