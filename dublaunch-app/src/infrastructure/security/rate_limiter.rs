use dashmap::DashMap;
use dublaunch_errors::AppError;
use std::sync::Arc;
use std::time::{Duration, Instant};
use uuid::Uuid;

const CLEANUP_INTERVAL_SECS: u64 = 300;

#[derive(Clone)]
struct RequestRecord {
    minute_count: u32,
    hour_count: u32,
    minute_start: Instant,
    hour_start: Instant,
}

impl Default for RequestRecord {
    fn default() -> Self {
        let now = Instant::now();
        Self {
            minute_count: 0,
            hour_count: 0,
            minute_start: now,
            hour_start: now,
        }
    }
}

/// Fixed-window limiter keyed by the signed-in student.
#[derive(Clone)]
pub struct RateLimiter {
    per_minute: u32,
    per_hour: u32,
    requests: Arc<DashMap<Uuid, RequestRecord>>,
    last_cleanup: Arc<std::sync::Mutex<Instant>>,
}

impl RateLimiter {
    pub fn new(per_minute: u32, per_hour: u32) -> Self {
        Self {
            per_minute,
            per_hour,
            requests: Arc::new(DashMap::new()),
            last_cleanup: Arc::new(std::sync::Mutex::new(Instant::now())),
        }
    }

    /// Limits for vote toggles.
    pub fn for_votes() -> Self {
        Self::new(30, 300)
    }

    /// Limits for launch submissions and comments.
    pub fn for_posts() -> Self {
        Self::new(5, 30)
    }

    pub fn check(&self, principal: Uuid) -> Result<(), AppError> {
        self.maybe_cleanup();

        let now = Instant::now();
        let mut record = self.requests.entry(principal).or_default();

        if now.duration_since(record.minute_start) > Duration::from_secs(60) {
            record.minute_count = 0;
            record.minute_start = now;
        }

        if now.duration_since(record.hour_start) > Duration::from_secs(3600) {
            record.hour_count = 0;
            record.hour_start = now;
        }

        if record.minute_count >= self.per_minute {
            let wait_secs = 60u64.saturating_sub(now.duration_since(record.minute_start).as_secs());
            tracing::info!("Rate limited {} for {}s", principal, wait_secs);
            return Err(AppError::RateLimited(wait_secs.max(1)));
        }

        if record.hour_count >= self.per_hour {
            let wait_secs = 3600u64.saturating_sub(now.duration_since(record.hour_start).as_secs());
            tracing::info!("Rate limited {} for {}s", principal, wait_secs);
            return Err(AppError::RateLimited(wait_secs.max(1)));
        }

        record.minute_count += 1;
        record.hour_count += 1;

        Ok(())
    }

    fn maybe_cleanup(&self) {
        let Ok(mut last_cleanup) = self.last_cleanup.lock() else {
            return;
        };
        if last_cleanup.elapsed() > Duration::from_secs(CLEANUP_INTERVAL_SECS) {
            if let Some(cutoff) = Instant::now().checked_sub(Duration::from_secs(3600)) {
                self.requests.retain(|_, v| v.hour_start > cutoff);
            }
            *last_cleanup = Instant::now();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minute_window_is_enforced() {
        let limiter = RateLimiter::new(3, 100);
        let student = Uuid::new_v4();

        for _ in 0..3 {
            assert!(limiter.check(student).is_ok());
        }
        assert!(matches!(
            limiter.check(student),
            Err(AppError::RateLimited(secs)) if secs > 0 && secs <= 60
        ));
    }

    #[test]
    fn test_students_are_limited_independently() {
        let limiter = RateLimiter::new(1, 100);
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());

        assert!(limiter.check(a).is_ok());
        assert!(limiter.check(a).is_err());
        assert!(limiter.check(b).is_ok());
    }

    #[test]
    fn test_hour_window_is_enforced() {
        let limiter = RateLimiter::new(100, 2);
        let student = Uuid::new_v4();

        limiter.check(student).unwrap();
        limiter.check(student).unwrap();
        assert!(matches!(
            limiter.check(student),
            Err(AppError::RateLimited(secs)) if secs > 60
        ));
    }
}
