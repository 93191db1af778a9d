//! Steady-state dispatch loop
//!
//! Pops place URLs from the durable task queue and feeds them to the
//! engine, with backpressure against the in-flight ceiling, idempotent
//! skip against the result store, and per-iteration error routing.
//! The loop never terminates on its own; only the shutdown coordinator
//! ends it.

use crate::classify::{classify_failure, FailureKind};
use crate::config::Config;
use crate::engine::ScrapeEngine;
use crate::orchestrator::{Counters, ShutdownCoordinator};
use crate::storage::{DurableQueue, ResultStore};
use crate::tracker::InFlightTracker;
use crate::url::{derive_place_id, is_place_url, normalize_place_url};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Pause after an iteration-level failure before the next pop
const ERROR_BACKOFF: Duration = Duration::from_millis(400);

/// Runs the dispatch loop until the coordinator latches.
///
/// Per iteration:
/// 1. sleep while the in-flight count is at the backpressure ceiling;
/// 2. pop one URL, sleeping longer when the queue is empty;
/// 3. discard URLs that can never succeed (malformed, off-target);
/// 4. skip URLs whose place id already exists in the result store;
/// 5. normalize, track, and submit the rest;
/// 6. pace submissions with a short fixed sleep.
///
/// Every failure is converted into a counter increment plus a queue
/// placement; nothing propagates out of the loop.
pub async fn run_dispatch<B>(
    config: Arc<Config>,
    backend: Arc<Mutex<B>>,
    tracker: Arc<InFlightTracker>,
    counters: Arc<Counters>,
    engine: Arc<dyn ScrapeEngine>,
    coordinator: Arc<ShutdownCoordinator<B>>,
) -> crate::Result<()>
where
    B: DurableQueue + ResultStore + Send + 'static,
{
    let opts = &config.orchestrator;
    let busy_wait = Duration::from_millis(opts.busy_wait_ms);
    let empty_wait = Duration::from_millis(opts.empty_queue_wait_ms);
    let dispatch_interval = Duration::from_millis(opts.dispatch_interval_ms);

    loop {
        if coordinator.is_draining() {
            tracing::info!("Shutdown latched, dispatch loop stopping");
            return Ok(());
        }

        // Backpressure: no pops while the engine is saturated
        let in_flight = tracker.active_count();
        if in_flight >= opts.backpressure_ceiling {
            tracing::debug!(
                "{} jobs in flight (ceiling {}), waiting",
                in_flight,
                opts.backpressure_ceiling
            );
            tokio::time::sleep(busy_wait).await;
            continue;
        }

        let popped = {
            let mut backend = backend.lock().unwrap();
            backend.pop_front(&config.queue.task_queue)
        };

        let url = match popped {
            Ok(Some(url)) => url,
            Ok(None) => {
                tracing::debug!("Task queue is empty, sleeping {:?}", empty_wait);
                tokio::time::sleep(empty_wait).await;
                continue;
            }
            Err(e) => {
                // Pop itself failed; there is no URL in hand to route
                counters.record_failure();
                tracing::error!("Failed to pop from task queue: {}", e);
                tokio::time::sleep(ERROR_BACKOFF).await;
                continue;
            }
        };

        if let Err(e) = dispatch_url(&url, &config, &backend, &tracker, engine.as_ref()).await {
            counters.record_failure();
            route_failed_dispatch(&url, &e.to_string(), &config, &backend);
            tokio::time::sleep(ERROR_BACKOFF).await;
            continue;
        }

        tokio::time::sleep(dispatch_interval).await;
    }
}

/// One dispatch step for a popped URL.
///
/// Malformed and off-target URLs are logged and discarded; they can
/// never succeed, so this is the single place a popped item is
/// intentionally not re-enqueued. URLs whose place id already exists
/// in the result store are skipped. Everything else is normalized,
/// recorded in the in-flight tracker, and submitted to the engine.
pub async fn dispatch_url<B>(
    url: &str,
    config: &Config,
    backend: &Arc<Mutex<B>>,
    tracker: &InFlightTracker,
    engine: &dyn ScrapeEngine,
) -> crate::Result<()>
where
    B: DurableQueue + ResultStore + Send + 'static,
{
    if !is_place_url(url, &config.target.place_url_marker) {
        tracing::error!("Illegal address {}, discarding", url);
        return Ok(());
    }

    let place_id = match derive_place_id(url) {
        Ok(id) => id,
        Err(e) => {
            tracing::error!("Cannot derive place id from {}: {}, discarding", url, e);
            return Ok(());
        }
    };

    let already_stored = {
        let backend = backend.lock().unwrap();
        backend.exists(&place_id)?
    };
    if already_stored {
        tracing::info!("Already processed {}, bypassing", url);
        return Ok(());
    }

    let normalized = normalize_place_url(url, &config.target.fixed_query);
    let slot = tracker.reserve_slot();
    tracker.insert(slot, &normalized);

    if let Err(e) = engine.submit(slot, &normalized).await {
        // The engine never owned the job; untrack it so the caller can
        // route the URL back to a queue
        tracker.remove(slot);
        return Err(e.into());
    }

    tracing::info!("New url added {}", normalized);
    Ok(())
}

/// Routes a failed dispatch back into durable storage: transient
/// failures to the task queue tail, permanent ones to the dead-letter
/// queue. A push failure is logged; the URL then survives only in the
/// log line.
fn route_failed_dispatch<B: DurableQueue>(
    url: &str,
    message: &str,
    config: &Config,
    backend: &Arc<Mutex<B>>,
) {
    let (queue, label) = match classify_failure(message) {
        FailureKind::Transient => (&config.queue.task_queue, "task queue"),
        FailureKind::Permanent => (&config.queue.dead_letter_queue, "dead-letter queue"),
    };

    tracing::error!("Dispatch of {} failed ({}), routing to {}", url, message, label);

    let mut backend = backend.lock().unwrap();
    if let Err(e) = backend.push(queue, url) {
        tracing::error!("Failed to push {} to {}: {}", url, label, e);
    }
}
