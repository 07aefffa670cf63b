use std::sync::Arc;

use anyhow::Context;

mod domain;
mod interfaces;
mod infrastructure;
pub mod errors;
pub mod settings;
pub mod constants;
pub mod graceful_shutdown;
pub mod background_task;

pub use domain::{entities, use_cases, bot_filter, validation};
pub use interfaces::{handlers, repositories, routes};
pub use infrastructure::{limiter, mail, utils};

use mail::smtp::SmtpMailer;
use repositories::{mail::MailTransport, rate_limit::RateLimitBackend};
use settings::AppConfig;
use use_cases::contact::ContactHandler;

pub struct AppState {
    pub contact_handler: AppContactHandler,
    pub config: Arc<AppConfig>,
}

pub type AppContactHandler = ContactHandler<RateLimitBackend, Arc<dyn MailTransport>>;

impl AppState {
    pub fn new(config: AppConfig) -> anyhow::Result<Self> {
        let transport: Arc<dyn MailTransport> = Arc::new(SmtpMailer::new(config.smtp.clone()));
        Self::with_transport(config, transport)
    }

    /// Builds the state around a caller-supplied mail transport.
    pub fn with_transport(config: AppConfig, transport: Arc<dyn MailTransport>) -> anyhow::Result<Self> {
        let config = Arc::new(config);

        let rate_limiter = RateLimitBackend::from_config(&config.rate_limit)
            .context("Failed to initialise rate limiter")?;

        if !transport.is_configured() {
            tracing::warn!("Mail transport is not configured; contact submissions will fail");
        }

        let contact_handler = ContactHandler::new(rate_limiter, transport, config.clone());

        Ok(AppState {
            contact_handler,
            config,
        })
    }

    pub fn rate_limiter(&self) -> &RateLimitBackend {
        &self.contact_handler.rate_limiter
    }
}
