//! Request quota accounting
//!
//! Counts requests against the active provider's published per-day and
//! per-minute quotas and logs when headroom runs low. Purely advisory: the
//! [`crate::rate_limit::RateLimiter`] is what actually holds requests back.

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use tracing::{info, warn};

use crate::provider::ProviderProfile;

const DAILY_WARNING_THRESHOLD: i64 = 50;
const MINUTE_WARNING_THRESHOLD: i64 = 3;
const REPORT_EVERY: u64 = 100;

/// Usage numbers after a request was counted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UsageSnapshot {
    pub daily_used: u64,
    pub daily_remaining: i64,
    pub minute_remaining: i64,
}

#[derive(Debug)]
struct UsageCounters {
    daily_count: u64,
    daily_window_start: DateTime<Utc>,
    minute_count: u64,
    minute_window_start: DateTime<Utc>,
}

impl UsageCounters {
    fn new(now: DateTime<Utc>) -> Self {
        Self {
            daily_count: 0,
            daily_window_start: now,
            minute_count: 0,
            minute_window_start: now,
        }
    }

    fn roll_windows(&mut self, now: DateTime<Utc>) {
        if now - self.daily_window_start >= Duration::days(1) {
            self.daily_count = 0;
            self.daily_window_start = now;
        }

        if now - self.minute_window_start >= Duration::seconds(60) {
            self.minute_count = 0;
            self.minute_window_start = now;
        }
    }
}

/// Per-process usage counters for one provider credential
#[derive(Debug)]
pub struct UsageTracker {
    requests_per_day: u32,
    requests_per_minute: u32,
    counters: Mutex<UsageCounters>,
}

impl UsageTracker {
    pub fn new(profile: &ProviderProfile) -> Self {
        Self::with_limits(profile.requests_per_minute, profile.requests_per_day)
    }

    pub fn with_limits(requests_per_minute: u32, requests_per_day: u32) -> Self {
        Self {
            requests_per_day,
            requests_per_minute,
            counters: Mutex::new(UsageCounters::new(Utc::now())),
        }
    }

    /// Count one outbound request
    pub fn log_request(&self) -> UsageSnapshot {
        self.log_request_at(Utc::now())
    }

    pub fn log_request_at(&self, now: DateTime<Utc>) -> UsageSnapshot {
        let snapshot = {
            let mut counters = self.counters.lock();
            counters.roll_windows(now);
            counters.daily_count += 1;
            counters.minute_count += 1;
            self.snapshot_of(&counters)
        };

        if snapshot.daily_used % REPORT_EVERY == 0 {
            info!(
                "Usage: {}/{} requests today ({} left)",
                snapshot.daily_used, self.requests_per_day, snapshot.daily_remaining
            );
        }

        if snapshot.daily_remaining < DAILY_WARNING_THRESHOLD {
            warn!("Only {} requests left today", snapshot.daily_remaining);
        }

        if snapshot.minute_remaining < MINUTE_WARNING_THRESHOLD {
            warn!(
                "Near rate limit: {} requests left this minute",
                snapshot.minute_remaining
            );
        }

        snapshot
    }

    /// Current numbers without counting a request
    pub fn snapshot(&self) -> UsageSnapshot {
        self.snapshot_at(Utc::now())
    }

    pub fn snapshot_at(&self, now: DateTime<Utc>) -> UsageSnapshot {
        let mut counters = self.counters.lock();
        counters.roll_windows(now);
        self.snapshot_of(&counters)
    }

    fn snapshot_of(&self, counters: &UsageCounters) -> UsageSnapshot {
        UsageSnapshot {
            daily_used: counters.daily_count,
            daily_remaining: i64::from(self.requests_per_day) - counters.daily_count as i64,
            minute_remaining: i64::from(self.requests_per_minute) - counters.minute_count as i64,
        }
    }
}
