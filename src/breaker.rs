//! Circuit breaker state machine.
//!
//! # States
//! - Closed: normal operation, calls pass through
//! - Open: dependency assumed down, calls rejected or blocked
//! - Recovering: cooldown elapsed, one failure away from re-tripping
//!
//! # State Transitions
//! ```text
//! Closed → Open: fails >= threshold
//! Open → Recovering: reset_delay elapsed with no clear
//! Recovering → Open: a single further fault
//! any → Closed: clear() after a successful call
//! ```
//!
//! # Design Decisions
//! - Recovering is not a separate flag: it is Closed with fails pinned at
//!   threshold - 1, so one renewed failure re-trips immediately and a
//!   still-unhealthy dependency only ever sees one probe per cooldown
//! - The recovery timer is a spawned task holding a clone of the shared
//!   state; clear() aborts it
//! - Waiters park on a watch channel; clear() and the timer wake all of them

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Mutable breaker state. Every mutation runs under the lock and completes
/// without suspending.
#[derive(Debug)]
struct Inner {
    tripped: bool,
    fails: u32,
    /// Live recovery timer, if any. At most one per breaker.
    timer: Option<JoinHandle<()>>,
    /// Bumped by clear(). A timer that already finished its sleep checks the
    /// epoch under the lock so it cannot apply a stale half-reset after
    /// losing the race with clear() on a multi-threaded runtime.
    epoch: u64,
}

/// Guard for calls to a single downstream dependency, shared by many tasks.
///
/// After `threshold` consecutive faults the breaker trips and blocks further
/// calls. A background timer reopens it after `reset_delay`, leaving it one
/// failure short of tripping again; only a successful call fully clears it.
#[derive(Debug)]
pub struct CircuitBreaker {
    reset_delay: Duration,
    threshold: u32,
    inner: Arc<Mutex<Inner>>,
    /// Holds `true` while calls are permitted.
    permitted: watch::Sender<bool>,
}

impl CircuitBreaker {
    /// Create a closed breaker. A `threshold` of 0 is treated as 1.
    pub fn new(reset_delay: Duration, threshold: u32) -> Self {
        let (permitted, _) = watch::channel(true);
        Self {
            reset_delay,
            threshold: threshold.max(1),
            inner: Arc::new(Mutex::new(Inner {
                tripped: false,
                fails: 0,
                timer: None,
                epoch: 0,
            })),
            permitted,
        }
    }

    /// Register a failure.
    ///
    /// Once the failure count reaches the threshold the breaker trips,
    /// waiters start blocking, and a recovery timer is spawned unless one is
    /// already running. Must be called from within a Tokio runtime.
    pub fn fault(&self) {
        let mut inner = self.inner.lock().expect("breaker mutex poisoned");
        inner.fails += 1;
        if inner.fails >= self.threshold {
            inner.tripped = true;
            self.permitted.send_replace(false);
            if inner.timer.is_none() {
                tracing::warn!(fails = inner.fails, "circuit breaker tripped");
                inner.timer = Some(self.spawn_reset_timer(inner.epoch));
            }
        }
    }

    /// Fully reset the breaker after a success.
    ///
    /// Cancels any running recovery timer, zeroes the failure count, and
    /// releases every waiter.
    pub fn clear(&self) {
        let mut inner = self.inner.lock().expect("breaker mutex poisoned");
        inner.tripped = false;
        inner.fails = 0;
        inner.epoch += 1;
        if let Some(timer) = inner.timer.take() {
            timer.abort();
        }
        self.permitted.send_replace(true);
        tracing::debug!("circuit breaker cleared");
    }

    /// Suspend until calls are permitted.
    ///
    /// Returns immediately if the breaker is not tripped. No timeout is
    /// applied; bound the wait externally with `tokio::time::timeout` if
    /// needed.
    pub async fn wait(&self) {
        let mut rx = self.permitted.subscribe();
        while !*rx.borrow_and_update() {
            if rx.changed().await.is_err() {
                return;
            }
        }
    }

    /// Spawn the cooldown task. On expiry it reopens the breaker one failure
    /// short of the threshold rather than fully clearing it.
    fn spawn_reset_timer(&self, epoch: u64) -> JoinHandle<()> {
        let inner = Arc::clone(&self.inner);
        let permitted = self.permitted.clone();
        let reset_delay = self.reset_delay;
        let restored_fails = self.threshold - 1;
        tokio::spawn(async move {
            tokio::time::sleep(reset_delay).await;
            let mut inner = inner.lock().expect("breaker mutex poisoned");
            if inner.epoch != epoch {
                return;
            }
            inner.tripped = false;
            inner.fails = restored_fails;
            inner.timer = None;
            permitted.send_replace(true);
            tracing::info!(fails = restored_fails, "circuit breaker reopened after cooldown");
        })
    }

    /// True while calls should be rejected or blocked.
    pub fn tripped(&self) -> bool {
        self.inner.lock().expect("breaker mutex poisoned").tripped
    }

    /// Consecutive failures since the last full clear.
    pub fn fails(&self) -> u32 {
        self.inner.lock().expect("breaker mutex poisoned").fails
    }

    /// Failures required to trip.
    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    /// Cooldown before a tripped breaker reopens.
    pub fn reset_delay(&self) -> Duration {
        self.reset_delay
    }

    /// True while a recovery timer is running.
    pub fn reset_pending(&self) -> bool {
        self.inner.lock().expect("breaker mutex poisoned").timer.is_some()
    }
}

impl Drop for CircuitBreaker {
    fn drop(&mut self) {
        // Don't leave a cooldown timer running behind a dropped breaker.
        if let Ok(mut inner) = self.inner.lock() {
            if let Some(timer) = inner.timer.take() {
                timer.abort();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::{sleep, timeout};

    #[tokio::test]
    async fn test_trips_at_threshold() {
        let breaker = CircuitBreaker::new(Duration::from_secs(10), 3);
        breaker.fault();
        breaker.fault();
        assert!(!breaker.tripped());
        assert_eq!(breaker.fails(), 2);

        breaker.fault();
        assert!(breaker.tripped());
        assert!(breaker.reset_pending());
    }

    #[tokio::test]
    async fn test_clear_resets_everything() {
        let breaker = CircuitBreaker::new(Duration::from_secs(10), 1);
        breaker.fault();
        assert!(breaker.tripped());
        assert!(breaker.reset_pending());

        breaker.clear();
        assert!(!breaker.tripped());
        assert_eq!(breaker.fails(), 0);
        assert!(!breaker.reset_pending());
    }

    #[tokio::test]
    async fn test_cooldown_restores_one_below_threshold() {
        let breaker = CircuitBreaker::new(Duration::from_millis(2), 3);
        for _ in 0..3 {
            breaker.fault();
        }
        assert!(breaker.tripped());

        sleep(Duration::from_millis(30)).await;
        assert!(!breaker.tripped());
        assert_eq!(breaker.fails(), 2);
        assert!(!breaker.reset_pending());

        // One more failure is enough to re-trip.
        breaker.fault();
        assert!(breaker.tripped());
    }

    #[tokio::test]
    async fn test_faults_past_threshold_keep_counting() {
        let breaker = CircuitBreaker::new(Duration::from_secs(10), 1);
        breaker.fault();
        breaker.fault();
        assert_eq!(breaker.fails(), 2);
        assert!(breaker.tripped());
        assert!(breaker.reset_pending());
    }

    #[tokio::test]
    async fn test_wait_returns_immediately_when_closed() {
        let breaker = CircuitBreaker::new(Duration::from_secs(10), 1);
        timeout(Duration::from_millis(10), breaker.wait())
            .await
            .expect("wait on a closed breaker should not block");
    }

    #[tokio::test]
    async fn test_clear_wakes_all_waiters() {
        let breaker = Arc::new(CircuitBreaker::new(Duration::from_secs(10), 1));
        breaker.fault();

        let mut tasks = Vec::new();
        for _ in 0..3 {
            let breaker = Arc::clone(&breaker);
            tasks.push(tokio::spawn(async move { breaker.wait().await }));
        }
        tokio::task::yield_now().await;

        breaker.clear();
        for task in tasks {
            timeout(Duration::from_secs(1), task)
                .await
                .expect("waiter should be released by clear")
                .unwrap();
        }
    }

    #[tokio::test]
    async fn test_threshold_is_at_least_one() {
        let breaker = CircuitBreaker::new(Duration::from_secs(1), 0);
        assert_eq!(breaker.threshold(), 1);
        breaker.fault();
        assert!(breaker.tripped());
    }
}
