use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::{mapref::entry::Entry, DashMap};

use crate::entities::rate_limit::{RateDecision, RateLimitRecord};

type Key = String;

/// Process-local fixed-window limiter.
///
/// State lives only in this process and is lost on restart. Each key is mutated
/// under its shard lock, so concurrent submissions from one source cannot corrupt
/// the map or lose an increment.
#[derive(Clone)]
pub struct InMemoryRateLimiter {
    map: Arc<DashMap<Key, RateLimitRecord>>,
    max_requests: u32,
    window: chrono::Duration,
}

impl InMemoryRateLimiter {
    pub fn new(max_requests: u32, window: std::time::Duration) -> Self {
        Self {
            map: Arc::new(DashMap::new()),
            max_requests,
            window: chrono::Duration::from_std(window)
                .unwrap_or_else(|_| chrono::Duration::minutes(15)),
        }
    }

    pub fn check_and_consume(&self, source_id: &str) -> RateDecision {
        self.check_and_consume_at(source_id, Utc::now())
    }

    pub fn check_and_consume_at(&self, source_id: &str, now: DateTime<Utc>) -> RateDecision {
        match self.map.entry(source_id.to_string()) {
            Entry::Vacant(entry) => {
                entry.insert(RateLimitRecord::fresh(now, self.window));
                RateDecision::Allowed
            }
            Entry::Occupied(mut entry) => {
                let record = entry.get_mut();
                if record.is_expired(now) {
                    *record = RateLimitRecord::fresh(now, self.window);
                    RateDecision::Allowed
                } else if record.count < self.max_requests {
                    record.count += 1;
                    RateDecision::Allowed
                } else {
                    RateDecision::Denied { reset_at: record.reset_at }
                }
            }
        }
    }

    /// Drops records whose window has elapsed. Decisions are unaffected since an
    /// expired record is treated as absent anyway.
    pub fn purge_expired(&self, now: DateTime<Utc>) -> usize {
        let before = self.map.len();
        self.map.retain(|_, record| !record.is_expired(now));
        before.saturating_sub(self.map.len())
    }

    pub fn record(&self, source_id: &str) -> Option<RateLimitRecord> {
        self.map.get(source_id).map(|entry| *entry.value())
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use std::time::Duration as StdDuration;

    fn limiter() -> InMemoryRateLimiter {
        InMemoryRateLimiter::new(3, StdDuration::from_secs(15 * 60))
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap()
    }

    #[test]
    fn allows_quota_then_denies_within_window() {
        let limiter = limiter();
        let start = t0();

        for i in 0..3 {
            let now = start + Duration::minutes(i);
            assert!(limiter.check_and_consume_at("203.0.113.7", now).is_allowed());
        }

        let fourth = limiter.check_and_consume_at("203.0.113.7", start + Duration::minutes(5));
        assert_eq!(
            fourth,
            RateDecision::Denied { reset_at: start + Duration::minutes(15) }
        );
        assert_eq!(limiter.record("203.0.113.7").unwrap().count, 3);
    }

    #[test]
    fn window_elapse_resets_count_to_one() {
        let limiter = limiter();
        let start = t0();

        for _ in 0..4 {
            limiter.check_and_consume_at("203.0.113.7", start);
        }

        // Exactly at reset time the window is still closed.
        let at_reset = start + Duration::minutes(15);
        assert!(!limiter.check_and_consume_at("203.0.113.7", at_reset).is_allowed());

        let after = at_reset + Duration::milliseconds(1);
        assert!(limiter.check_and_consume_at("203.0.113.7", after).is_allowed());

        let record = limiter.record("203.0.113.7").unwrap();
        assert_eq!(record.count, 1);
        assert_eq!(record.reset_at, after + Duration::minutes(15));
    }

    #[test]
    fn sources_are_independent() {
        let limiter = limiter();
        let now = t0();

        for _ in 0..3 {
            limiter.check_and_consume_at("198.51.100.1", now);
        }
        assert!(!limiter.check_and_consume_at("198.51.100.1", now).is_allowed());
        assert!(limiter.check_and_consume_at("198.51.100.2", now).is_allowed());
    }

    #[test]
    fn denied_requests_do_not_grow_the_count() {
        let limiter = limiter();
        let now = t0();

        for _ in 0..10 {
            limiter.check_and_consume_at("unknown", now);
        }
        assert_eq!(limiter.record("unknown").unwrap().count, 3);
    }

    #[test]
    fn purge_removes_only_expired_records() {
        let limiter = limiter();
        let start = t0();

        limiter.check_and_consume_at("old", start);
        limiter.check_and_consume_at("new", start + Duration::minutes(10));

        let removed = limiter.purge_expired(start + Duration::minutes(16));
        assert_eq!(removed, 1);
        assert!(limiter.record("old").is_none());
        assert!(limiter.record("new").is_some());
    }

    #[test]
    fn concurrent_consumers_never_exceed_quota() {
        let limiter = limiter();
        let now = t0();

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let limiter = limiter.clone();
                std::thread::spawn(move || limiter.check_and_consume_at("shared", now).is_allowed())
            })
            .collect();

        let allowed = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|allowed| *allowed)
            .count();

        assert_eq!(allowed, 3);
    }
}
