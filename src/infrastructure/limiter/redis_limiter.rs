use chrono::{Duration, Utc};
use deadpool_redis::{Config as RedisPoolConfig, Pool, Runtime};

use crate::{
    entities::rate_limit::RateDecision,
    errors::RateLimitError,
};

const KEY_PREFIX: &str = "contact_form";

/// Fixed-window limiter shared across instances through Redis.
///
/// The first request in a window creates the key with a TTL equal to the window;
/// the key's TTL is the window reset time.
#[derive(Clone)]
pub struct RedisRateLimiter {
    pool: Pool,
    max_requests: u32,
    window_ms: i64,
}

impl RedisRateLimiter {
    pub fn new(redis_url: &str, max_requests: u32, window: std::time::Duration) -> Result<Self, RateLimitError> {
        let pool = RedisPoolConfig::from_url(redis_url)
            .create_pool(Some(Runtime::Tokio1))
            .map_err(|e| RateLimitError::Backend(format!("Redis pool creation error: {}", e)))?;

        Ok(Self {
            pool,
            max_requests,
            window_ms: window.as_millis().min(i64::MAX as u128) as i64,
        })
    }

    fn key(source_id: &str) -> String {
        format!("{}:{}", KEY_PREFIX, urlencoding::encode(source_id))
    }

    pub async fn check_and_consume(&self, source_id: &str) -> Result<RateDecision, RateLimitError> {
        let key = Self::key(source_id);
        let mut conn = self.pool.get().await?;

        let (count, ttl_ms): (i64, i64) = redis::pipe()
            .atomic()
            .cmd("SET").arg(&key).arg(0).arg("NX").arg("PX").arg(self.window_ms).ignore()
            .incr(&key, 1)
            .pttl(&key)
            .query_async(&mut conn)
            .await?;

        if count <= i64::from(self.max_requests) {
            return Ok(RateDecision::Allowed);
        }

        // PTTL is negative when the key has no expiry; fall back to a full window.
        let remaining = if ttl_ms > 0 { ttl_ms } else { self.window_ms };
        Ok(RateDecision::Denied {
            reset_at: Utc::now() + Duration::milliseconds(remaining),
        })
    }

    pub async fn ping(&self) -> Result<(), RateLimitError> {
        let mut conn = self.pool.get().await?;
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_prefixed_and_encoded() {
        assert_eq!(RedisRateLimiter::key("203.0.113.7"), "contact_form:203.0.113.7");
        assert_eq!(RedisRateLimiter::key("2001:db8::1"), "contact_form:2001%3Adb8%3A%3A1");
    }

    fn redis_url() -> String {
        std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string())
    }

    async fn connected(max_requests: u32, window: std::time::Duration) -> RedisRateLimiter {
        let limiter = RedisRateLimiter::new(&redis_url(), max_requests, window)
            .expect("Failed to create Redis pool");
        limiter.ping().await.expect("Failed to ping Redis");
        limiter
    }

    #[tokio::test]
    #[ignore = "requires a running Redis at REDIS_URL"]
    async fn denies_after_quota_with_reset_inside_window() {
        let limiter = connected(2, std::time::Duration::from_secs(60)).await;
        let source = format!("test-{}", uuid::Uuid::new_v4());
        let before = Utc::now();

        assert_eq!(limiter.check_and_consume(&source).await.unwrap(), RateDecision::Allowed);
        assert_eq!(limiter.check_and_consume(&source).await.unwrap(), RateDecision::Allowed);

        match limiter.check_and_consume(&source).await.unwrap() {
            RateDecision::Denied { reset_at } => {
                assert!(reset_at > before);
                assert!(reset_at <= Utc::now() + Duration::seconds(60));
            }
            RateDecision::Allowed => panic!("third request should be denied"),
        }

        let other = format!("test-{}", uuid::Uuid::new_v4());
        assert_eq!(limiter.check_and_consume(&other).await.unwrap(), RateDecision::Allowed);
    }

    #[tokio::test]
    #[ignore = "requires a running Redis at REDIS_URL"]
    async fn window_expiry_allows_again() {
        let limiter = connected(1, std::time::Duration::from_millis(300)).await;
        let source = format!("test-{}", uuid::Uuid::new_v4());

        assert_eq!(limiter.check_and_consume(&source).await.unwrap(), RateDecision::Allowed);
        assert!(matches!(
            limiter.check_and_consume(&source).await.unwrap(),
            RateDecision::Denied { .. }
        ));

        tokio::time::sleep(std::time::Duration::from_millis(500)).await;

        assert_eq!(limiter.check_and_consume(&source).await.unwrap(), RateDecision::Allowed);
    }
}
