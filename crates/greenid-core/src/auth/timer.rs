//! The inactivity timer behind automatic session expiry.
//!
//! The timer is a single optional deadline on the tokio clock. Arming it
//! replaces the deadline, clearing it drops it, and expiry is observed by
//! polling `take_expired` or awaiting `expired`. Nothing is spawned, so
//! arming works from plain synchronous code as well as inside a runtime.

use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info};

/// Sessions expire after 30 minutes without user activity.
pub const INACTIVITY_TIMEOUT: Duration = Duration::from_secs(30 * 60);

#[derive(Debug)]
pub struct InactivityTimer {
    timeout: Duration,
    deadline: Option<Instant>,
}

impl InactivityTimer {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            deadline: None,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Drop any armed expiry and arm a new one `timeout` from now.
    pub fn reset(&mut self) {
        let deadline = Instant::now() + self.timeout;
        if self.deadline.replace(deadline).is_some() {
            debug!("Inactivity timer re-armed");
        }
    }

    /// Drop the armed expiry without arming a new one.
    pub fn clear(&mut self) {
        self.deadline = None;
    }

    /// Whether an armed expiry has not been reached yet.
    pub fn is_pending(&self) -> bool {
        self.deadline().is_some()
    }

    /// Instant at which the current arm fires, while it is still ahead.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline.filter(|deadline| Instant::now() < *deadline)
    }

    /// Time left in the current arm.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline()
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    /// Consume a reached deadline. Returns true at most once per arm.
    pub fn take_expired(&mut self) -> bool {
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => {
                self.deadline = None;
                info!("Inactivity timeout reached");
                true
            }
            _ => false,
        }
    }

    /// Wait until the current arm is reached. Pends forever when not armed,
    /// which makes it usable as a `tokio::select!` branch.
    pub async fn expired(&mut self) {
        let Some(deadline) = self.deadline else {
            return std::future::pending().await;
        };
        tokio::time::sleep_until(deadline).await;
        self.deadline = None;
        info!("Inactivity timeout reached");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_secs(60);

    #[test]
    fn test_reset_outside_runtime() {
        let mut timer = InactivityTimer::new(WINDOW);
        timer.reset();
        assert!(timer.is_pending());
        assert!(!timer.take_expired());
        assert!(timer.remaining().is_some_and(|left| left <= WINDOW));

        timer.clear();
        assert!(!timer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_fires_once_after_timeout() {
        let mut timer = InactivityTimer::new(WINDOW);
        timer.reset();
        assert!(timer.is_pending());

        tokio::time::sleep(WINDOW - Duration::from_secs(1)).await;
        assert!(!timer.take_expired());

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(!timer.is_pending());
        assert!(timer.take_expired());
        assert!(!timer.take_expired());
    }

    #[tokio::test(start_paused = true)]
    async fn test_repeated_resets_leave_one_timer_measured_from_last_reset() {
        let mut timer = InactivityTimer::new(WINDOW);
        for _ in 0..5 {
            timer.reset();
            tokio::time::sleep(Duration::from_secs(20)).await;
        }
        assert!(timer.is_pending());
        assert!(!timer.take_expired());

        // 20s already elapsed since the last reset
        tokio::time::sleep(Duration::from_secs(39)).await;
        assert!(!timer.take_expired());

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(timer.take_expired());
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_cancels_pending_fire() {
        let mut timer = InactivityTimer::new(WINDOW);
        timer.reset();
        timer.clear();
        assert!(!timer.is_pending());
        assert!(timer.deadline().is_none());

        tokio::time::sleep(WINDOW * 2).await;
        assert!(!timer.take_expired());
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_future_resolves_after_timeout() {
        let mut timer = InactivityTimer::new(WINDOW);
        timer.reset();

        let started = Instant::now();
        timer.expired().await;
        assert!(started.elapsed() >= WINDOW);
        assert!(!timer.is_pending());
        assert!(!timer.take_expired());
    }

    #[tokio::test(start_paused = true)]
    async fn test_remaining_counts_down() {
        let mut timer = InactivityTimer::new(WINDOW);
        assert!(timer.remaining().is_none());

        timer.reset();
        tokio::time::sleep(Duration::from_secs(15)).await;
        assert_eq!(timer.remaining(), Some(Duration::from_secs(45)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_reached_deadline_reports_nothing_left() {
        let mut timer = InactivityTimer::new(WINDOW);
        timer.reset();
        tokio::time::sleep(WINDOW).await;

        // Not yet consumed, but no longer pending or counting down
        assert!(!timer.is_pending());
        assert!(timer.deadline().is_none());
        assert!(timer.remaining().is_none());
        assert!(timer.take_expired());
    }
}
