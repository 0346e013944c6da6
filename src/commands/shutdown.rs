//! In-flight tracking for graceful shutdown
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use log::{info, warn};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Counts running dispatches and gates intake during shutdown
pub struct InFlightTracker {
    count: AtomicUsize,
    accepting: AtomicBool,
    drained: Notify,
    cancellation: CancellationToken,
}

impl InFlightTracker {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            count: AtomicUsize::new(0),
            accepting: AtomicBool::new(true),
            drained: Notify::new(),
            cancellation: CancellationToken::new(),
        })
    }

    /// Register one unit of work. `None` once shutdown has begun.
    pub fn try_acquire(self: &Arc<Self>) -> Option<InFlightGuard> {
        // Increment before checking so shutdown can never observe zero while
        // an accepted dispatch is about to start.
        self.count.fetch_add(1, Ordering::SeqCst);
        let guard = InFlightGuard {
            tracker: Arc::clone(self),
        };

        if self.accepting.load(Ordering::SeqCst) {
            Some(guard)
        } else {
            None
        }
    }

    pub fn in_flight(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    pub fn is_accepting(&self) -> bool {
        self.accepting.load(Ordering::SeqCst)
    }

    /// Parent token for every dispatch's cancellation
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancellation
    }

    /// Stop intake and wait up to `grace` for running work to finish.
    ///
    /// Running handlers are never aborted. The shared cancellation token is
    /// cancelled once waiting ends so cooperative handlers can wind down.
    /// Returns `true` if everything drained in time.
    pub async fn shutdown(&self, grace: Duration) -> bool {
        self.accepting.store(false, Ordering::SeqCst);
        let deadline = Instant::now() + grace;

        info!(
            "Shutdown requested; waiting up to {grace:?} for {} in-flight command(s)",
            self.in_flight()
        );

        let drained = loop {
            // Register interest before checking the count to avoid a lost wakeup
            let notified = self.drained.notified();
            if self.in_flight() == 0 {
                break true;
            }
            if tokio::time::timeout_at(deadline, notified).await.is_err() {
                break self.in_flight() == 0;
            }
        };

        if drained {
            info!("All in-flight commands completed");
        } else {
            warn!(
                "Shutdown grace period of {grace:?} expired with {} command(s) still running",
                self.in_flight()
            );
        }

        self.cancellation.cancel();
        drained
    }
}

/// Decrements the in-flight count when dropped, including on panic
pub struct InFlightGuard {
    tracker: Arc<InFlightTracker>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        if self.tracker.count.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.tracker.drained.notify_waiters();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::sleep;

    #[tokio::test]
    async fn test_guard_counts() {
        let tracker = InFlightTracker::new();
        let first = tracker.try_acquire().unwrap();
        let second = tracker.try_acquire().unwrap();
        assert_eq!(tracker.in_flight(), 2);

        drop(first);
        assert_eq!(tracker.in_flight(), 1);
        drop(second);
        assert_eq!(tracker.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_shutdown_with_nothing_running() {
        let tracker = InFlightTracker::new();
        assert!(tracker.shutdown(Duration::from_millis(10)).await);
        assert!(!tracker.is_accepting());
        assert!(tracker.cancellation_token().is_cancelled());
    }

    #[tokio::test]
    async fn test_shutdown_rejects_new_work() {
        let tracker = InFlightTracker::new();
        tracker.shutdown(Duration::from_millis(10)).await;

        assert!(tracker.try_acquire().is_none());
        assert_eq!(tracker.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_shutdown_waits_for_running_work() {
        let tracker = InFlightTracker::new();
        let guard = tracker.try_acquire().unwrap();

        let worker = tokio::spawn(async move {
            sleep(Duration::from_millis(50)).await;
            drop(guard);
        });

        let started = Instant::now();
        assert!(tracker.shutdown(Duration::from_secs(5)).await);
        assert!(started.elapsed() >= Duration::from_millis(40));
        assert_eq!(tracker.in_flight(), 0);
        worker.await.unwrap();
    }

    #[tokio::test]
    async fn test_shutdown_gives_up_after_grace_and_cancels() {
        let tracker = InFlightTracker::new();
        let guard = tracker.try_acquire().unwrap();
        let token = tracker.cancellation_token().child_token();

        assert!(!tracker.shutdown(Duration::from_millis(30)).await);
        assert!(token.is_cancelled());
        assert_eq!(tracker.in_flight(), 1);

        drop(guard);
        assert_eq!(tracker.in_flight(), 0);
    }
}
