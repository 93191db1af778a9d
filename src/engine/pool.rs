//! Bounded worker-pool engine
//!
//! Runs between min-concurrency and max-concurrency workers over an
//! internal pending window. Each worker pulls a job, runs the place
//! processor with a bounded per-navigation retry, and emits a
//! completion event. Workers scale up lazily while a backlog exists.

use crate::classify::{classify_failure, FailureKind};
use crate::config::EngineConfig;
use crate::engine::processor::PlaceProcessor;
use crate::engine::{CompletionEvent, EngineError, ScrapeEngine};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

/// State shared between the pool handle and its workers
struct PoolShared {
    pending: Mutex<VecDeque<(u64, String)>>,
    wakeup: Notify,
    accepting: AtomicBool,
    processor: Arc<dyn PlaceProcessor>,
    completions: UnboundedSender<CompletionEvent>,
    config: EngineConfig,
}

/// Worker-pool implementation of the scrape engine
pub struct WorkerPool {
    shared: Arc<PoolShared>,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl WorkerPool {
    /// Creates the pool and spawns the minimum worker set.
    ///
    /// Completion events for every submitted job are delivered on the
    /// given channel, exactly one per job.
    pub fn new(
        config: EngineConfig,
        processor: Arc<dyn PlaceProcessor>,
        completions: UnboundedSender<CompletionEvent>,
    ) -> Self {
        let shared = Arc::new(PoolShared {
            pending: Mutex::new(VecDeque::new()),
            wakeup: Notify::new(),
            accepting: AtomicBool::new(true),
            processor,
            completions,
            config,
        });

        let pool = Self {
            shared,
            workers: Mutex::new(Vec::new()),
        };

        for _ in 0..pool.shared.config.min_concurrency {
            pool.spawn_worker();
        }

        pool
    }

    fn spawn_worker(&self) {
        let shared = Arc::clone(&self.shared);
        let handle = tokio::spawn(worker_loop(shared));
        self.workers.lock().unwrap().push(handle);
    }

    fn worker_count(&self) -> usize {
        self.workers.lock().unwrap().len()
    }
}

#[async_trait]
impl ScrapeEngine for WorkerPool {
    async fn submit(&self, slot: u64, url: &str) -> Result<(), EngineError> {
        if !self.shared.accepting.load(Ordering::SeqCst) {
            return Err(EngineError::ShutDown);
        }

        let backlog = {
            let mut pending = self.shared.pending.lock().unwrap();
            pending.push_back((slot, url.to_string()));
            pending.len()
        };
        self.shared.wakeup.notify_one();

        // Scale up while a backlog exists and the ceiling allows
        if backlog > 1 && self.worker_count() < self.shared.config.max_concurrency {
            tracing::debug!("Backlog of {} pending jobs, spawning worker", backlog);
            self.spawn_worker();
        }

        Ok(())
    }

    fn pending_window(&self) -> Vec<(u64, String)> {
        self.shared.pending.lock().unwrap().iter().cloned().collect()
    }

    async fn teardown(&self) {
        self.shared.accepting.store(false, Ordering::SeqCst);
        self.shared.wakeup.notify_waiters();

        let grace = Duration::from_millis(self.shared.config.teardown_grace_ms);
        let handles: Vec<JoinHandle<()>> = std::mem::take(&mut *self.workers.lock().unwrap());

        for mut handle in handles {
            if tokio::time::timeout(grace, &mut handle).await.is_err() {
                tracing::warn!("Worker did not stop within grace period, aborting");
                handle.abort();
            }
        }

        tracing::info!("Engine teardown complete");
    }
}

/// Worker task: pulls pending jobs until teardown stops intake.
///
/// No new job is started after teardown; the job being processed when
/// the flag flips is covered by the teardown grace period.
async fn worker_loop(shared: Arc<PoolShared>) {
    loop {
        if !shared.accepting.load(Ordering::SeqCst) {
            break;
        }

        let job = shared.pending.lock().unwrap().pop_front();

        let Some((slot, url)) = job else {
            // Periodic re-check so a missed notify cannot strand the worker
            let _ = tokio::time::timeout(Duration::from_millis(200), shared.wakeup.notified()).await;
            continue;
        };

        let (success, error_message) = run_navigation(&shared, &url).await;

        let event = CompletionEvent {
            slot,
            url,
            success,
            error_message,
        };
        if shared.completions.send(event).is_err() {
            tracing::error!("Completion channel closed, stopping worker");
            break;
        }
    }
}

/// Runs one job with the bounded navigation retry.
///
/// Transient failures and timeouts are retried up to
/// max-request-retries before a failure is reported; permanent
/// failures are reported immediately. Exactly one result is returned
/// per job regardless of attempts.
async fn run_navigation(shared: &PoolShared, url: &str) -> (bool, Option<String>) {
    let timeout = Duration::from_secs(shared.config.handler_timeout_secs);
    let retry_delay = Duration::from_millis(shared.config.retry_delay_ms);
    let mut attempt: u32 = 0;

    loop {
        attempt += 1;

        match tokio::time::timeout(timeout, shared.processor.process(url)).await {
            Ok(Ok(())) => return (true, None),

            Ok(Err(e)) => {
                let message = e.to_string();
                let transient = matches!(classify_failure(&message), FailureKind::Transient);
                if transient && attempt <= shared.config.max_request_retries {
                    tracing::warn!(
                        "Attempt {} failed for {}: {}, retrying",
                        attempt,
                        url,
                        message
                    );
                    tokio::time::sleep(retry_delay).await;
                    continue;
                }
                return (false, Some(message));
            }

            Err(_) => {
                if attempt <= shared.config.max_request_retries {
                    tracing::warn!("Attempt {} timed out for {}, retrying", attempt, url);
                    continue;
                }
                return (
                    false,
                    Some(format!("navigation timeout after {}s", timeout.as_secs())),
                );
            }
        }
    }
}
