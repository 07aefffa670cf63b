use actix_web::{web, get, HttpResponse, Responder};
use humantime::format_duration;
use once_cell::sync::Lazy;
use chrono::Utc;
use parking_lot::RwLock;
use std::{
    time::Duration,
    sync::atomic::{AtomicI64, Ordering},
};
use serde::Serialize;
use crate::{constants::START_TIME, repositories::mail::MailTransport, AppState};

#[derive(Serialize, Clone, Default)]
struct RateLimiterInfo {
    backend: String,
    status: String,
}

#[derive(Serialize, Clone, Default)]
struct HealthCheckResponse {
    status: String,
    version: String,
    uptime: String,
    started_at: String,
    timestamp: String,
    mail_transport: String,
    rate_limiter: RateLimiterInfo,
}

const CACHE_SECS: i64 = 5;

static LAST_CHECK: AtomicI64 = AtomicI64::new(0);
static CACHED_STATUS: Lazy<RwLock<HealthCheckResponse>> = Lazy::new(||
    RwLock::new(HealthCheckResponse::default())
);

async fn build_health_response(state: &web::Data<AppState>) -> HealthCheckResponse {
    let now_utc = Utc::now();
    let uptime_duration = now_utc.signed_duration_since(*START_TIME);
    let human_uptime = format_duration(Duration::from_secs(uptime_duration.num_seconds().max(0) as u64));

    let mail_transport = if state.contact_handler.notifier.transport.is_configured() {
        "configured"
    } else {
        "not configured"
    };

    let limiter = &state.contact_handler.rate_limiter;

    HealthCheckResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime: human_uptime.to_string(),
        started_at: START_TIME.to_rfc3339(),
        timestamp: now_utc.to_rfc3339(),
        mail_transport: mail_transport.to_string(),
        rate_limiter: RateLimiterInfo {
            backend: limiter.kind().to_string(),
            status: limiter.status().await.to_string(),
        },
    }
}

#[get("/health")]
pub async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let now = Utc::now().timestamp();
    let last = LAST_CHECK.load(Ordering::Relaxed);

    if now - last > CACHE_SECS {
        let response = build_health_response(&state).await;

        *CACHED_STATUS.write() = response.clone();
        LAST_CHECK.store(now, Ordering::Relaxed);

        HttpResponse::Ok().json(response)
    } else {
        HttpResponse::Ok().json(CACHED_STATUS.read().clone())
    }
}
