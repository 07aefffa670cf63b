use chrono::{DateTime, Utc};

/// Fixed-window counter for one source identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitRecord {
    pub count: u32,
    pub reset_at: DateTime<Utc>,
}

impl RateLimitRecord {
    pub fn fresh(now: DateTime<Utc>, window: chrono::Duration) -> Self {
        RateLimitRecord {
            count: 1,
            reset_at: now + window,
        }
    }

    /// A record whose reset time has passed behaves exactly like a missing one.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.reset_at
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    Allowed,
    Denied { reset_at: DateTime<Utc> },
}

impl RateDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateDecision::Allowed)
    }
}
