use async_trait::async_trait;

use crate::{
    entities::rate_limit::RateDecision,
    errors::RateLimitError,
    limiter::{rate_limiter::InMemoryRateLimiter, redis_limiter::RedisRateLimiter},
    settings::{RateLimitBackendKind, RateLimitConfig},
};

#[async_trait]
pub trait RateLimitStore: Send + Sync {
    /// Counts one request against `source_id` and says whether it may proceed.
    async fn check_and_consume(&self, source_id: &str) -> Result<RateDecision, RateLimitError>;
}

#[async_trait]
impl RateLimitStore for InMemoryRateLimiter {
    async fn check_and_consume(&self, source_id: &str) -> Result<RateDecision, RateLimitError> {
        Ok(InMemoryRateLimiter::check_and_consume(self, source_id))
    }
}

#[async_trait]
impl RateLimitStore for RedisRateLimiter {
    async fn check_and_consume(&self, source_id: &str) -> Result<RateDecision, RateLimitError> {
        RedisRateLimiter::check_and_consume(self, source_id).await
    }
}

/// The limiter selected by configuration.
#[derive(Clone)]
pub enum RateLimitBackend {
    Memory(InMemoryRateLimiter),
    Redis(RedisRateLimiter),
}

impl RateLimitBackend {
    pub fn from_config(config: &RateLimitConfig) -> Result<Self, RateLimitError> {
        match config.backend {
            RateLimitBackendKind::Memory => Ok(RateLimitBackend::Memory(
                InMemoryRateLimiter::new(config.max_requests, config.window()),
            )),
            RateLimitBackendKind::Redis => {
                let url = config.redis_url.as_deref().ok_or_else(|| {
                    RateLimitError::Backend("Redis URL not configured".to_string())
                })?;
                Ok(RateLimitBackend::Redis(RedisRateLimiter::new(
                    url,
                    config.max_requests,
                    config.window(),
                )?))
            }
        }
    }

    pub fn kind(&self) -> RateLimitBackendKind {
        match self {
            RateLimitBackend::Memory(_) => RateLimitBackendKind::Memory,
            RateLimitBackend::Redis(_) => RateLimitBackendKind::Redis,
        }
    }

    pub fn in_memory(&self) -> Option<&InMemoryRateLimiter> {
        match self {
            RateLimitBackend::Memory(limiter) => Some(limiter),
            RateLimitBackend::Redis(_) => None,
        }
    }

    /// Backend reachability for the health endpoint.
    pub async fn status(&self) -> &'static str {
        match self {
            RateLimitBackend::Memory(_) => "OK",
            RateLimitBackend::Redis(limiter) => match limiter.ping().await {
                Ok(()) => "OK",
                Err(_) => "Unavailable",
            },
        }
    }
}

#[async_trait]
impl RateLimitStore for RateLimitBackend {
    async fn check_and_consume(&self, source_id: &str) -> Result<RateDecision, RateLimitError> {
        match self {
            RateLimitBackend::Memory(limiter) => RateLimitStore::check_and_consume(limiter, source_id).await,
            RateLimitBackend::Redis(limiter) => RateLimitStore::check_and_consume(limiter, source_id).await,
        }
    }
}
