//! Shutdown coordination for the pollers.
//!
//! One cancellation token is shared by every poller; a task tracker acts as the
//! join barrier. `signal_stop()` may be called any number of times from any
//! thread (signal handler, render loop, driver). `await_all_stopped()` returns
//! only after every tracked task has returned, so no events are pushed after it.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

#[derive(Debug, Clone, Default)]
pub struct ShutdownCoordinator {
    token: CancellationToken,
    tracker: TaskTracker,
    interrupts: Arc<AtomicUsize>,
}

impl ShutdownCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the cancellation signal. Idempotent.
    pub fn signal_stop(&self) {
        if !self.token.is_cancelled() {
            tracing::info!("stop requested");
        }
        self.token.cancel();
    }

    /// Counts an operator interrupt and requests a stop.
    ///
    /// Returns `true` when an earlier interrupt was already counted.
    pub fn interrupt(&self) -> bool {
        let repeated = self.interrupts.fetch_add(1, Ordering::SeqCst) > 0;
        self.signal_stop();
        repeated
    }

    /// Number of interrupts counted so far.
    pub fn interrupts(&self) -> usize {
        self.interrupts.load(Ordering::SeqCst)
    }

    /// Returns `true` once `signal_stop()` has been called.
    pub fn is_stopping(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Returns a handle to the shared cancellation signal.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Spawns `task` on `handle` and tracks it for `await_all_stopped()`.
    pub fn spawn_on<F>(&self, task: F, handle: &Handle) -> JoinHandle<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        self.tracker.spawn_on(task, handle)
    }

    /// Number of tracked tasks still running.
    pub fn running(&self) -> usize {
        self.tracker.len()
    }

    /// Closes the tracker and waits until every tracked task has exited.
    pub async fn await_all_stopped(&self) {
        self.tracker.close();
        self.tracker.wait().await;
        tracing::info!("all pollers stopped");
    }
}
