use chrono::Utc;
use tokio::time::{interval, Duration, MissedTickBehavior};

use crate::limiter::rate_limiter::InMemoryRateLimiter;

/// Drops rate limit records whose window has elapsed. Expired records already
/// behave like missing ones, so this only bounds memory.
pub async fn start_purge_task(limiter: InMemoryRateLimiter, every: Duration) {
    let mut interval = interval(every);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        interval.tick().await;

        let purged = limiter.purge_expired(Utc::now());
        if purged > 0 {
            tracing::info!("Purged {} expired rate limit records", purged);
        } else {
            tracing::debug!(tracked = limiter.len(), "No expired rate limit records");
        }
    }
}
