//! Sliding-window admission control
//!
//! Keeps at most `capacity` admissions inside any trailing window. Callers over
//! budget are suspended, not rejected.

use std::collections::VecDeque;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::info;

use crate::provider::ProviderProfile;

/// Slots kept free below the provider's published per-minute quota
pub const SAFETY_MARGIN: u32 = 2;

const WINDOW: Duration = Duration::from_secs(60);
const WAIT_MARGIN: Duration = Duration::from_millis(200);

#[derive(Debug)]
pub struct RateLimiter {
    capacity: usize,
    window: Duration,
    wait_margin: Duration,
    admissions: Mutex<VecDeque<Instant>>,
}

impl RateLimiter {
    /// Limiter admitting `capacity` requests per minute (at least one)
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            window: WINDOW,
            wait_margin: WAIT_MARGIN,
            admissions: Mutex::new(VecDeque::new()),
        }
    }

    /// `rpm - 2` for the provider, never below one
    pub fn for_profile(profile: &ProviderProfile) -> Self {
        let capacity = profile.requests_per_minute.saturating_sub(SAFETY_MARGIN).max(1);
        Self::new(capacity as usize)
    }

    pub fn with_window(mut self, window: Duration) -> Self {
        self.window = window;
        self
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Wait until a slot is free, then record the admission.
    ///
    /// The lock is held across the wait so concurrent callers queue behind it.
    pub async fn acquire(&self) {
        let mut admissions = self.admissions.lock().await;

        loop {
            let now = Instant::now();
            while let Some(&front) = admissions.front() {
                if now.duration_since(front) >= self.window {
                    admissions.pop_front();
                } else {
                    break;
                }
            }

            let wait = match admissions.front() {
                Some(&oldest) if admissions.len() >= self.capacity => {
                    (oldest + self.window).saturating_duration_since(now)
                }
                _ => {
                    admissions.push_back(now);
                    return;
                }
            };

            info!("Rate limit reached, waiting {:.1}s", wait.as_secs_f64());
            tokio::time::sleep(wait + self.wait_margin).await;
        }
    }

    /// Admissions still inside the trailing window
    pub async fn in_window(&self) -> usize {
        let admissions = self.admissions.lock().await;
        let now = Instant::now();
        admissions
            .iter()
            .filter(|&&at| now.duration_since(at) < self.window)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::ProviderKind;
    use std::sync::Arc;

    #[test]
    fn test_capacity_from_profile() {
        assert_eq!(RateLimiter::for_profile(&ProviderKind::Gemini.profile()).capacity(), 13);
        assert_eq!(RateLimiter::for_profile(&ProviderKind::Cohere.profile()).capacity(), 8);

        let mut tiny = ProviderKind::Cohere.profile();
        tiny.requests_per_minute = 2;
        assert_eq!(RateLimiter::for_profile(&tiny).capacity(), 1);
        assert_eq!(RateLimiter::new(0).capacity(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_admits_immediately_under_capacity() {
        let limiter = RateLimiter::new(3);
        let start = Instant::now();

        for _ in 0..3 {
            limiter.acquire().await;
        }

        assert_eq!(Instant::now(), start);
        assert_eq!(limiter.in_window().await, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_waits_for_oldest_to_expire() {
        let limiter = RateLimiter::new(2);
        let start = Instant::now();

        limiter.acquire().await;
        tokio::time::advance(Duration::from_secs(10)).await;
        limiter.acquire().await;
        limiter.acquire().await;

        // oldest admission at t=0 expires at t=60, plus the wait margin
        assert!(Instant::now() - start >= Duration::from_millis(60_200));
        assert!(Instant::now() - start < Duration::from_secs(61));
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_callers_never_exceed_window() {
        let limiter = Arc::new(RateLimiter::new(3));
        let admitted = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let start = Instant::now();

        let mut handles = Vec::new();
        for _ in 0..7 {
            let limiter = limiter.clone();
            let admitted = admitted.clone();
            handles.push(tokio::spawn(async move {
                limiter.acquire().await;
                admitted.lock().push(Instant::now());
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let mut times = admitted.lock().clone();
        times.sort();
        assert_eq!(times.len(), 7);

        for (i, &at) in times.iter().enumerate() {
            let in_window = times[..=i]
                .iter()
                .filter(|&&earlier| at.duration_since(earlier) < Duration::from_secs(60))
                .count();
            assert!(in_window <= 3, "admission {} saw {} in window", i, in_window);
        }

        // 7 admissions at capacity 3 need two full waits
        assert!(times[6] - start >= Duration::from_secs(120));
    }
}
