use std::{collections::BTreeMap, panic::AssertUnwindSafe, sync::Arc};

use futures_util::FutureExt;
use tracing::Instrument;
use uuid::Uuid;
use validator::Validate;

use crate::{
    domain::{
        bot_filter::BotFilter,
        validation::{field_error_map, validate_field},
    },
    entities::{
        contact::{
            Budget, ContactFormInput, ContactSubmission, SubmissionMeta, SubmissionResult,
            ValidationReport,
        },
        rate_limit::RateDecision,
    },
    errors::ContactError,
    repositories::{mail::MailTransport, rate_limit::RateLimitStore},
    settings::AppConfig,
    use_cases::notifier::Notifier,
    utils::sanitize::sanitize_input,
};

/// Runs a contact submission through every stage and reports a uniform result.
///
/// Stages run in order and the first failure short-circuits the rest:
/// rate limit, bot filter, schema validation, sanitization, notification.
pub struct ContactHandler<L, T>
where
    L: RateLimitStore,
    T: MailTransport,
{
    pub rate_limiter: L,
    pub notifier: Notifier<T>,
    bot_filter: BotFilter,
}

impl<L, T> ContactHandler<L, T>
where
    L: RateLimitStore,
    T: MailTransport,
{
    pub fn new(rate_limiter: L, transport: T, config: Arc<AppConfig>) -> Self {
        let bot_filter = BotFilter::new(config.contact.min_elapsed_ms);
        ContactHandler {
            rate_limiter,
            notifier: Notifier::new(transport, config),
            bot_filter,
        }
    }

    /// Handles one submission. Never panics or errors out: every failure is a
    /// `SubmissionResult::Failure` carrying a message safe for the requester.
    pub async fn submit(&self, input: ContactFormInput, meta: SubmissionMeta) -> SubmissionResult {
        let span = tracing::info_span!(
            "contact_submission",
            submission_id = %Uuid::new_v4(),
            source = %meta.source_id,
        );

        async {
            let outcome = AssertUnwindSafe(self.process(input, &meta))
                .catch_unwind()
                .await
                .unwrap_or_else(|_| {
                    Err(ContactError::Internal("submission pipeline panicked".to_string()))
                });

            match outcome {
                Ok(()) => SubmissionResult::Success,
                Err(e) => {
                    match &e {
                        ContactError::NotConfigured
                        | ContactError::Delivery(_)
                        | ContactError::Internal(_) => {
                            tracing::error!("Contact submission failed: {}", e)
                        }
                        _ => tracing::warn!("Contact submission rejected: {}", e),
                    }
                    SubmissionResult::Failure {
                        error: e.user_message(),
                        kind: e.kind(),
                    }
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Field-level check for inline feedback. Touches no limiter and sends nothing.
    ///
    /// With `field`, only that field is reported, as on blur/change.
    pub fn validate(&self, input: &ContactFormInput, field: Option<&str>) -> ValidationReport {
        let errors = match field {
            Some(field) => validate_field(input, field)
                .map(|message| BTreeMap::from([(field.to_string(), message)]))
                .unwrap_or_default(),
            None => field_error_map(input),
        };
        ValidationReport {
            valid: errors.is_empty(),
            errors,
        }
    }

    async fn process(&self, input: ContactFormInput, meta: &SubmissionMeta) -> Result<(), ContactError> {
        self.check_rate(&meta.source_id).await?;

        self.bot_filter.inspect(&input)?;

        input.validate()?;

        let submission = sanitize_submission(&input)?;

        let outcome = self.notifier.notify(&submission, meta).await?;

        tracing::info!(
            name = %submission.name,
            email = %submission.email,
            company = %submission.company,
            budget = %submission.budget,
            auto_reply_sent = outcome.auto_reply_sent,
            "New lead received"
        );
        Ok(())
    }

    async fn check_rate(&self, source_id: &str) -> Result<(), ContactError> {
        match self.rate_limiter.check_and_consume(source_id).await {
            Ok(RateDecision::Allowed) => Ok(()),
            Ok(RateDecision::Denied { reset_at }) => Err(ContactError::RateLimited { reset_at }),
            Err(e) => {
                tracing::error!("Rate limiter unavailable, letting request through: {}", e);
                Ok(())
            }
        }
    }
}

/// Strips markup from the free-text fields of a validated form.
fn sanitize_submission(input: &ContactFormInput) -> Result<ContactSubmission, ContactError> {
    let budget = Budget::parse(&input.budget)
        .ok_or_else(|| ContactError::Internal(format!("unknown budget {}", input.budget)))?;

    Ok(ContactSubmission {
        name: sanitize_input(&input.name),
        email: sanitize_input(&input.email),
        company: sanitize_input(&input.company),
        budget,
        message: sanitize_input(&input.message),
    })
}
