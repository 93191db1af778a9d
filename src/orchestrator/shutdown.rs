//! Signal-driven shutdown drain
//!
//! The first termination signal latches the coordinator, flushes the
//! engine's pending window and the in-flight tracker back into the
//! durable task queue, tears the engine down, and exits with a
//! non-zero status. Subsequent signals only log.

use crate::config::Config;
use crate::engine::ScrapeEngine;
use crate::storage::DurableQueue;
use crate::tracker::InFlightTracker;
use crate::url::is_place_url;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Pause between engine teardown and process exit, giving final log
/// lines time to flush
const EXIT_DELAY: Duration = Duration::from_millis(200);

/// Latched drain coordinator: Running -> Draining -> Exited
pub struct ShutdownCoordinator<B> {
    latched: AtomicBool,
    backend: Arc<Mutex<B>>,
    tracker: Arc<InFlightTracker>,
    engine: Arc<dyn ScrapeEngine>,
    config: Arc<Config>,
}

impl<B: DurableQueue> ShutdownCoordinator<B> {
    pub fn new(
        backend: Arc<Mutex<B>>,
        tracker: Arc<InFlightTracker>,
        engine: Arc<dyn ScrapeEngine>,
        config: Arc<Config>,
    ) -> Self {
        Self {
            latched: AtomicBool::new(false),
            backend,
            tracker,
            engine,
            config,
        }
    }

    /// Whether a drain has started; the dispatch loop stops popping
    /// once this is set
    pub fn is_draining(&self) -> bool {
        self.latched.load(Ordering::SeqCst)
    }

    /// Engine handle, for the teardown step after draining
    pub fn engine(&self) -> &Arc<dyn ScrapeEngine> {
        &self.engine
    }

    /// Drains queued and in-flight work back into the durable task
    /// queue. Only the first call drains; later calls log and return
    /// `false`. Returns `true` when this call performed the drain.
    ///
    /// Push failures are logged and not retried: recovery is
    /// best-effort under forced-shutdown time pressure.
    pub fn drain(&self, signal: &str) -> bool {
        if self.latched.swap(true, Ordering::SeqCst) {
            tracing::info!("{} already handled", signal);
            return false;
        }

        tracing::info!("Got {}, backing up queued and in-flight work", signal);
        let task_queue = &self.config.queue.task_queue;

        // Engine window: jobs accepted but not yet started. Anything
        // that is not a place URL has no business being re-queued.
        let mut window_count = 0;
        for (slot, url) in self.engine.pending_window() {
            if !is_place_url(&url, &self.config.target.place_url_marker) {
                continue;
            }
            tracing::info!("{} received, backing up slot {} | {}", signal, slot, url);
            self.push_logged(task_queue, &url);
            window_count += 1;
        }
        tracing::info!("Pending window items recovered: {}", window_count);

        // In-flight jobs; tracker entries are blanked so a second
        // enumeration cannot double-count
        let urls = self.tracker.drain_urls();
        let in_flight_count = urls.len();
        for url in urls {
            tracing::info!("Backing up in-flight job {}", url);
            self.push_logged(task_queue, &url);
        }
        tracing::info!("In-flight jobs recovered: {}", in_flight_count);

        true
    }

    fn push_logged(&self, queue: &str, url: &str) {
        let mut backend = self.backend.lock().unwrap();
        if let Err(e) = backend.push(queue, url) {
            tracing::error!("Failed to back up {} to {}: {}", url, queue, e);
        }
    }
}

/// Waits for a termination signal; on the first one, drains, tears
/// down the engine, and exits the process with a non-zero status.
pub async fn run_signal_listener<B>(coordinator: Arc<ShutdownCoordinator<B>>)
where
    B: DurableQueue + Send + 'static,
{
    loop {
        let signal = wait_for_signal().await;
        if coordinator.drain(signal) {
            coordinator.engine().teardown().await;
            tokio::time::sleep(EXIT_DELAY).await;
            std::process::exit(1);
        }
    }
}

#[cfg(unix)]
async fn wait_for_signal() -> &'static str {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
    let mut sigint = signal(SignalKind::interrupt()).expect("failed to install SIGINT handler");

    tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() -> &'static str {
    let _ = tokio::signal::ctrl_c().await;
    "SIGINT"
}
