//! Polling tasks.
//!
//! Three pollers feed the event queue, each on its own schedule:
//!
//! | poller        | default interval | on tick                          |
//! |---------------|------------------|----------------------------------|
//! | `progress`    | 10s              | fetch job progress → `Progress`  |
//! | `temperature` | 10s              | fetch temperatures → `Temperature` |
//! | `cpu`         | 1s               | push `Cpu` (no remote call)      |
//!
//! Each poller fires immediately, then waits for its interval or the shared
//! cancellation signal, whichever comes first. Fetch failures are logged and
//! produce no event; only cancellation ends a poller. An in-flight fetch is
//! never interrupted; cancellation is observed at the next wait.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;

use crate::config::PollingConfig;
use crate::core::events::StatusEvent;
use crate::core::queue::EventSender;
use crate::core::shutdown::ShutdownCoordinator;
use crate::source::StatusSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PollerKind {
    Progress,
    Temperature,
    Cpu,
}

impl PollerKind {
    pub const ALL: [PollerKind; 3] = [
        PollerKind::Progress,
        PollerKind::Temperature,
        PollerKind::Cpu,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PollerKind::Progress => "update_progress",
            PollerKind::Temperature => "update_temps",
            PollerKind::Cpu => "update_cpu",
        }
    }

    /// Returns this poller's interval from `config`.
    pub fn interval(self, config: &PollingConfig) -> Duration {
        match self {
            PollerKind::Progress => config.progress_interval(),
            PollerKind::Temperature => config.temperature_interval(),
            PollerKind::Cpu => config.cpu_interval(),
        }
    }
}

impl fmt::Display for PollerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One scheduled producer.
pub struct PollingTask<S> {
    kind: PollerKind,
    interval: Duration,
    source: Arc<S>,
    queue: EventSender,
    cancel: CancellationToken,
}

impl<S: StatusSource> PollingTask<S> {
    pub fn new(
        kind: PollerKind,
        interval: Duration,
        source: Arc<S>,
        queue: EventSender,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            kind,
            interval,
            source,
            queue,
            cancel,
        }
    }

    pub fn kind(&self) -> PollerKind {
        self.kind
    }

    /// Runs until the cancellation signal is observed.
    pub async fn run(self) {
        tracing::info!(poller = %self.kind, interval = ?self.interval, "start");
        loop {
            if self.cancel.is_cancelled() {
                break;
            }
            if let Some(event) = self.poll_once().await {
                tracing::trace!(poller = %self.kind, %event, "enqueue");
                if !self.queue.push(event) {
                    tracing::debug!(poller = %self.kind, "queue closed, dropping event");
                }
            }
            tokio::select! {
                biased;
                () = self.cancel.cancelled() => break,
                () = tokio::time::sleep(self.interval) => {}
            }
        }
        tracing::info!(poller = %self.kind, "stop");
    }

    async fn poll_once(&self) -> Option<StatusEvent> {
        let result = match self.kind {
            PollerKind::Progress => self
                .source
                .fetch_job_progress()
                .await
                .map(StatusEvent::Progress),
            PollerKind::Temperature => self
                .source
                .fetch_temperatures()
                .await
                .map(StatusEvent::Temperature),
            PollerKind::Cpu => Ok(StatusEvent::Cpu),
        };
        match result {
            Ok(event) => Some(event),
            Err(err) => {
                tracing::warn!(poller = %self.kind, kind = %err.kind, "fetch failed: {err}");
                None
            }
        }
    }
}

/// Spawns all three pollers on `handle`, tracked by `coordinator`.
pub fn spawn_all<S: StatusSource>(
    handle: &Handle,
    coordinator: &ShutdownCoordinator,
    source: &Arc<S>,
    queue: &EventSender,
    config: &PollingConfig,
) {
    for kind in PollerKind::ALL {
        let task = PollingTask::new(
            kind,
            kind.interval(config),
            Arc::clone(source),
            queue.clone(),
            coordinator.token(),
        );
        coordinator.spawn_on(task.run(), handle);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::core::queue::{EventReceiver, event_queue};
    use crate::source::{FetchError, ProgressRecord, TemperatureRecord};

    /// Source whose progress fetch fails on every odd call.
    #[derive(Default)]
    struct FlakySource {
        progress_calls: AtomicUsize,
        temperature_calls: AtomicUsize,
    }

    impl StatusSource for FlakySource {
        async fn fetch_job_progress(&self) -> Result<ProgressRecord, FetchError> {
            let n = self.progress_calls.fetch_add(1, Ordering::SeqCst);
            if n % 2 == 1 {
                return Err(FetchError::transport("connection refused"));
            }
            Ok(ProgressRecord {
                completion: Some(n as u8),
                eta: "0:10:00".to_string(),
                job_name: "part.gcode".to_string(),
            })
        }

        async fn fetch_temperatures(&self) -> Result<TemperatureRecord, FetchError> {
            self.temperature_calls.fetch_add(1, Ordering::SeqCst);
            Ok(TemperatureRecord {
                tool_actual: "200".to_string(),
                tool_target: "210".to_string(),
                bed_actual: "60".to_string(),
                bed_target: "60".to_string(),
            })
        }
    }

    fn test_config() -> PollingConfig {
        PollingConfig {
            progress_interval_secs: 10,
            temperature_interval_secs: 10,
            cpu_interval_secs: 1,
        }
    }

    fn spawn(
        source: &Arc<FlakySource>,
    ) -> (ShutdownCoordinator, EventReceiver) {
        let coordinator = ShutdownCoordinator::new();
        let (tx, rx) = event_queue();
        spawn_all(&Handle::current(), &coordinator, source, &tx, &test_config());
        (coordinator, rx)
    }

    fn count(events: &[StatusEvent], name: &str) -> usize {
        events.iter().filter(|e| e.name() == name).count()
    }

    #[tokio::test(start_paused = true)]
    async fn test_pollers_fire_immediately() {
        let source = Arc::new(FlakySource::default());
        let (coordinator, mut rx) = spawn(&source);

        tokio::time::sleep(Duration::from_millis(1)).await;
        let events = rx.drain();
        assert_eq!(count(&events, "progress"), 1);
        assert_eq!(count(&events, "temperature"), 1);
        assert_eq!(count(&events, "cpu"), 1);

        coordinator.signal_stop();
        coordinator.await_all_stopped().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_pollers_follow_their_intervals() {
        let source = Arc::new(FlakySource::default());
        let (coordinator, mut rx) = spawn(&source);

        // Ticks at t=0 and t=10s for the slow pollers; t=0..=10s for cpu.
        tokio::time::sleep(Duration::from_millis(10_500)).await;
        let events = rx.drain();
        assert_eq!(count(&events, "cpu"), 11);
        assert_eq!(source.temperature_calls.load(Ordering::SeqCst), 2);
        assert_eq!(count(&events, "temperature"), 2);

        coordinator.signal_stop();
        coordinator.await_all_stopped().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_failure_yields_no_event_and_poller_keeps_running() {
        let source = Arc::new(FlakySource::default());
        let (coordinator, mut rx) = spawn(&source);

        // Progress calls at t=0 (ok), 10 (fail), 20 (ok), 30 (fail).
        tokio::time::sleep(Duration::from_millis(30_500)).await;
        assert_eq!(source.progress_calls.load(Ordering::SeqCst), 4);

        let completions: Vec<Option<u8>> = rx
            .drain()
            .into_iter()
            .filter_map(|e| match e {
                StatusEvent::Progress(p) => Some(p.completion),
                _ => None,
            })
            .collect();
        assert_eq!(completions, vec![Some(0), Some(2)]);

        coordinator.signal_stop();
        coordinator.await_all_stopped().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_stops_pollers_without_waiting_full_interval() {
        let source = Arc::new(FlakySource::default());
        let (coordinator, mut rx) = spawn(&source);

        tokio::time::sleep(Duration::from_millis(2_500)).await;
        assert_eq!(coordinator.running(), 3);

        let started = tokio::time::Instant::now();
        coordinator.signal_stop();
        coordinator.await_all_stopped().await;
        assert!(started.elapsed() < Duration::from_secs(1));
        assert_eq!(coordinator.running(), 0);

        // Nothing pushes after the barrier, even once intervals elapse again.
        rx.drain();
        let progress_calls = source.progress_calls.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(rx.try_pop(), None);
        assert!(rx.producers_gone());
        assert_eq!(source.progress_calls.load(Ordering::SeqCst), progress_calls);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_before_start_never_polls() {
        let source = Arc::new(FlakySource::default());
        let (tx, mut rx) = event_queue();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let task = PollingTask::new(
            PollerKind::Progress,
            Duration::from_secs(10),
            Arc::clone(&source),
            tx,
            cancel,
        );
        assert_eq!(task.kind(), PollerKind::Progress);
        task.run().await;

        assert_eq!(source.progress_calls.load(Ordering::SeqCst), 0);
        assert_eq!(rx.try_pop(), None);
    }

    #[test]
    fn test_interval_lookup() {
        let config = test_config();
        assert_eq!(PollerKind::Cpu.interval(&config), Duration::from_secs(1));
        assert_eq!(
            PollerKind::Temperature.interval(&config),
            Duration::from_secs(10)
        );
        assert_eq!(PollerKind::Progress.to_string(), "update_progress");
    }
}
