//! Asynchronous click recording.
//!
//! Redirect handlers hand a [`ClickJob`] to a [`ClickDispatcher`] and return
//! immediately. [`run_click_worker`] consumes the queue with bounded
//! concurrency and keeps running until every dispatcher is dropped, then
//! finishes the jobs already in flight.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, error, info, warn};

use crate::domain::click_job::ClickJob;
use crate::error::{AppError, ErrorKind};

/// Destination for click jobs.
#[async_trait]
pub trait ClickSink: Send + Sync {
    async fn record(&self, job: ClickJob) -> Result<(), AppError>;
}

/// Sending half of the click queue.
///
/// Cheap to clone; the worker stops once all clones are dropped.
#[derive(Clone)]
pub struct ClickDispatcher {
    tx: mpsc::Sender<ClickJob>,
}

impl ClickDispatcher {
    /// Creates a dispatcher and the receiver to hand to [`run_click_worker`].
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<ClickJob>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }

    /// Queues a job without waiting.
    ///
    /// Returns `false` if the job was dropped because the queue is full or the
    /// worker has stopped.
    pub fn dispatch(&self, job: ClickJob) -> bool {
        match self.tx.try_send(job) {
            Ok(()) => true,
            Err(TrySendError::Full(job)) => {
                metrics::counter!("shortlink_clicks_dropped_total").increment(1);
                warn!(code = %job.code, "Click queue full, dropping click");
                false
            }
            Err(TrySendError::Closed(job)) => {
                metrics::counter!("shortlink_clicks_dropped_total").increment(1);
                warn!(code = %job.code, "Click worker stopped, dropping click");
                false
            }
        }
    }

    pub fn max_capacity(&self) -> usize {
        self.tx.max_capacity()
    }

    /// Free slots left in the queue.
    pub fn available(&self) -> usize {
        self.tx.capacity()
    }

    /// True once the worker has dropped its receiver.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Outcome counts of a finished worker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerReport {
    pub recorded: u64,
    pub failed: u64,
}

impl WorkerReport {
    fn absorb(&mut self, outcome: Result<Result<(), (String, AppError)>, JoinError>) {
        match outcome {
            Ok(Ok(())) => self.recorded += 1,
            Ok(Err((code, e))) => {
                self.failed += 1;
                if e.kind() == ErrorKind::NotFound {
                    debug!(%code, "Click for unknown code ignored");
                } else {
                    warn!(%code, error = %e, "Failed to record click");
                }
            }
            Err(e) => {
                self.failed += 1;
                error!(error = %e, "Click task panicked");
            }
        }
    }
}

/// Processes click jobs until the queue is closed and drained.
///
/// At most `concurrency` jobs run at once. A failing job is logged and
/// counted; it never stops the worker.
pub async fn run_click_worker<S>(
    mut rx: mpsc::Receiver<ClickJob>,
    sink: Arc<S>,
    concurrency: usize,
) -> WorkerReport
where
    S: ClickSink + ?Sized + 'static,
{
    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut tasks = JoinSet::new();
    let mut report = WorkerReport::default();

    info!(concurrency, "Click worker started");

    while let Some(job) = rx.recv().await {
        while let Some(outcome) = tasks.try_join_next() {
            report.absorb(outcome);
        }

        let Ok(permit) = semaphore.clone().acquire_owned().await else {
            break;
        };

        let sink = sink.clone();
        tasks.spawn(async move {
            let _permit = permit;
            let code = job.code.clone();
            sink.record(job).await.map_err(|e| (code, e))
        });
    }

    while let Some(outcome) = tasks.join_next().await {
        report.absorb(outcome);
    }

    info!(
        recorded = report.recorded,
        failed = report.failed,
        "Click worker drained"
    );

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::ClickMeta;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[derive(Default)]
    struct RecordingSink {
        codes: Mutex<Vec<String>>,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    #[async_trait]
    impl ClickSink for RecordingSink {
        async fn record(&self, job: ClickJob) -> Result<(), AppError> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);

            tokio::time::sleep(Duration::from_millis(5)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if job.code == "missing" {
                return Err(AppError::not_found(job.code));
            }

            self.codes.lock().unwrap().push(job.code);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_worker_drains_queue_on_close() {
        let (dispatcher, rx) = ClickDispatcher::channel(100);
        let sink = Arc::new(RecordingSink::default());

        for i in 0..20 {
            assert!(dispatcher.dispatch(ClickJob::new(format!("code{i}"), ClickMeta::default())));
        }
        drop(dispatcher);

        let report = run_click_worker(rx, sink.clone(), 4).await;

        assert_eq!(report.recorded, 20);
        assert_eq!(report.failed, 0);
        assert_eq!(sink.codes.lock().unwrap().len(), 20);
        assert!(sink.max_in_flight.load(Ordering::SeqCst) <= 4);
    }

    #[tokio::test]
    async fn test_worker_isolates_failures() {
        let (dispatcher, rx) = ClickDispatcher::channel(10);
        let sink = Arc::new(RecordingSink::default());

        dispatcher.dispatch(ClickJob::new("abc123", ClickMeta::default()));
        dispatcher.dispatch(ClickJob::new("missing", ClickMeta::default()));
        dispatcher.dispatch(ClickJob::new("xyz789", ClickMeta::default()));
        drop(dispatcher);

        let report = run_click_worker(rx, sink, 2).await;

        assert_eq!(report.recorded, 2);
        assert_eq!(report.failed, 1);
    }

    #[test]
    fn test_dispatch_drops_when_full() {
        let (dispatcher, _rx) = ClickDispatcher::channel(1);

        assert!(dispatcher.dispatch(ClickJob::new("a", ClickMeta::default())));
        assert!(!dispatcher.dispatch(ClickJob::new("b", ClickMeta::default())));
        assert_eq!(dispatcher.available(), 0);
        assert_eq!(dispatcher.max_capacity(), 1);
    }

    #[test]
    fn test_dispatch_after_worker_stopped() {
        let (dispatcher, rx) = ClickDispatcher::channel(4);
        drop(rx);

        assert!(!dispatcher.dispatch(ClickJob::new("a", ClickMeta::default())));
    }
}
