//! Run-wide pacing for outbound vendor calls.
//!
//! One [`Throttle`] is shared by the submitter, poller and fetcher so that every
//! request of a run, whatever row it belongs to, is spaced by at least the
//! configured minimum interval.

use tokio::sync::Mutex;
use tokio::time::{sleep_until, Duration, Instant};

/// Snapshot of the throttle state.
#[derive(Debug, Clone)]
pub struct ThrottleStatus {
    pub min_interval: Duration,
    /// Calls granted so far.
    pub grants: u64,
    /// Time until the next call may start, if it would have to wait.
    pub next_available_in: Option<Duration>,
}

#[derive(Debug, Default)]
struct ThrottleState {
    /// Start time of the most recent granted call.
    last_grant: Option<Instant>,
    grants: u64,
}

impl ThrottleState {
    fn ready_at(&self, min_interval: Duration) -> Option<Instant> {
        self.last_grant.map(|last| last + min_interval)
    }
}

/// Minimum-interval throttle with an explicit clock.
///
/// The clock only advances when a call is granted; there are no background timers.
#[derive(Debug)]
pub struct Throttle {
    min_interval: Duration,
    state: Mutex<ThrottleState>,
}

impl Throttle {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            state: Mutex::new(ThrottleState::default()),
        }
    }

    /// Throttle that never waits.
    pub fn unthrottled() -> Self {
        Self::new(Duration::ZERO)
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Wait for the next slot and claim it.
    ///
    /// Returns the instant the call was allowed to start. The lock is held while
    /// waiting, so concurrent callers queue up behind each other.
    pub async fn acquire(&self) -> Instant {
        let mut state = self.state.lock().await;

        if let Some(ready_at) = state.ready_at(self.min_interval) {
            if Instant::now() < ready_at {
                sleep_until(ready_at).await;
            }
        }

        let granted = Instant::now();
        state.last_grant = Some(granted);
        state.grants += 1;
        granted
    }

    pub async fn status(&self) -> ThrottleStatus {
        let state = self.state.lock().await;
        let now = Instant::now();
        ThrottleStatus {
            min_interval: self.min_interval,
            grants: state.grants,
            next_available_in: state
                .ready_at(self.min_interval)
                .filter(|ready_at| *ready_at > now)
                .map(|ready_at| ready_at - now),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unthrottled_never_waits() {
        let throttle = Throttle::unthrottled();
        let started = Instant::now();
        for _ in 0..100 {
            throttle.acquire().await;
        }
        assert!(started.elapsed() < Duration::from_secs(1));
        assert_eq!(throttle.status().await.grants, 100);
    }

    #[tokio::test]
    async fn test_first_acquire_is_immediate() {
        let throttle = Throttle::new(Duration::from_secs(30));
        let started = Instant::now();
        throttle.acquire().await;
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_acquire_spaces_calls() {
        let interval = Duration::from_millis(40);
        let throttle = Throttle::new(interval);

        let mut grants = Vec::new();
        for _ in 0..4 {
            grants.push(throttle.acquire().await);
        }

        for pair in grants.windows(2) {
            assert!(pair[1] - pair[0] >= interval);
        }
    }

    #[tokio::test]
    async fn test_status_reports_wait() {
        let throttle = Throttle::new(Duration::from_secs(10));

        let status = throttle.status().await;
        assert_eq!(status.grants, 0);
        assert!(status.next_available_in.is_none());

        throttle.acquire().await;
        let status = throttle.status().await;
        assert_eq!(status.grants, 1);
        let wait = status.next_available_in.unwrap();
        assert!(wait <= Duration::from_secs(10));
        assert!(wait > Duration::from_secs(9));
    }

    #[tokio::test]
    async fn test_shared_between_tasks() {
        let interval = Duration::from_millis(25);
        let throttle = std::sync::Arc::new(Throttle::new(interval));

        let mut handles = Vec::new();
        for _ in 0..3 {
            let throttle = throttle.clone();
            handles.push(tokio::spawn(async move { throttle.acquire().await }));
        }

        let mut grants = Vec::new();
        for handle in handles {
            grants.push(handle.await.unwrap());
        }
        grants.sort();

        for pair in grants.windows(2) {
            assert!(pair[1] - pair[0] >= interval);
        }
    }
}
