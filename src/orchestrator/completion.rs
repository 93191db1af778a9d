//! Completion handling
//!
//! A dedicated consumer task drains the engine's completion channel so
//! handler logic never runs on engine worker stacks. Each event is
//! untracked, counted, and on failure classified and routed.

use crate::classify::{classify_failure, FailureKind};
use crate::config::Config;
use crate::engine::CompletionEvent;
use crate::orchestrator::Counters;
use crate::storage::DurableQueue;
use crate::tracker::InFlightTracker;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc::UnboundedReceiver;

/// Consumes completion events until the channel closes
pub async fn run_completions<B>(
    mut events: UnboundedReceiver<CompletionEvent>,
    tracker: Arc<InFlightTracker>,
    counters: Arc<Counters>,
    backend: Arc<Mutex<B>>,
    config: Arc<Config>,
) where
    B: DurableQueue + Send + 'static,
{
    while let Some(event) = events.recv().await {
        handle_completion(&event, &tracker, &counters, &backend, &config);
    }
    tracing::info!("Completion channel closed");
}

/// Handles one completion event.
///
/// The in-flight entry is removed unconditionally. Failures are
/// classified by message: transient ones go back to the task queue for
/// a future retry, everything else goes to the dead-letter queue.
/// Requeueing is unbounded at this level; the idempotent result-store
/// skip on re-dispatch is what makes that safe.
pub fn handle_completion<B: DurableQueue>(
    event: &CompletionEvent,
    tracker: &InFlightTracker,
    counters: &Counters,
    backend: &Mutex<B>,
    config: &Config,
) {
    tracker.remove(event.slot);

    if event.success {
        counters.record_success();
        tracing::info!(
            "Completed {} (successes: {})",
            event.url,
            counters.successes()
        );
        return;
    }

    counters.record_failure();
    let message = event.error_message.clone().unwrap_or_default();

    match classify_failure(&message) {
        FailureKind::Transient => {
            tracing::error!(
                "{} failed ({}), putting back on the task queue",
                event.url,
                message
            );
            push_logged(backend, &config.queue.task_queue, &event.url);
        }
        FailureKind::Permanent => {
            tracing::error!(
                "{} failed permanently ({}), dead-lettering",
                event.url,
                message
            );
            push_logged(backend, &config.queue.dead_letter_queue, &event.url);
        }
    }
}

fn push_logged<B: DurableQueue>(backend: &Mutex<B>, queue: &str, url: &str) {
    let mut backend = backend.lock().unwrap();
    if let Err(e) = backend.push(queue, url) {
        tracing::error!("Failed to push {} to {}: {}", url, queue, e);
    }
}
