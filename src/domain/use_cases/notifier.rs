use std::{future::Future, sync::Arc};

use tokio::time::timeout;

use crate::{
    entities::{
        contact::{ContactSubmission, SubmissionMeta},
        email::OutboundEmail,
    },
    errors::MailError,
    mail::templates::{auto_reply_email, notification_email, RenderedEmail},
    repositories::mail::{MailSession, MailTransport},
    settings::AppConfig,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotifyOutcome {
    pub auto_reply_sent: bool,
}

/// Sends the operator notification and the requester auto-reply over one session.
///
/// Only the notification decides the outcome; a failed auto-reply is logged.
pub struct Notifier<T>
where
    T: MailTransport,
{
    pub transport: T,
    config: Arc<AppConfig>,
}

impl<T> Notifier<T>
where
    T: MailTransport,
{
    pub fn new(transport: T, config: Arc<AppConfig>) -> Self {
        Notifier { transport, config }
    }

    fn envelope(&self, to: &str, reply_to: Option<&str>, rendered: RenderedEmail) -> OutboundEmail {
        OutboundEmail {
            from_name: self.config.brand.name.clone(),
            from: self.config.smtp.sender().to_string(),
            to: to.to_string(),
            reply_to: reply_to.map(str::to_string),
            subject: rendered.subject,
            html: rendered.html,
            text: rendered.text,
        }
    }

    async fn bounded<F, R>(&self, fut: F) -> Result<R, MailError>
    where
        F: Future<Output = Result<R, MailError>>,
    {
        let limit = self.config.smtp.timeout();
        timeout(limit, fut).await.map_err(|_| MailError::Timeout(limit))?
    }

    pub async fn notify(
        &self,
        submission: &ContactSubmission,
        meta: &SubmissionMeta,
    ) -> Result<NotifyOutcome, MailError> {
        if !self.transport.is_configured() {
            return Err(MailError::NotConfigured);
        }

        let notification = self.envelope(
            self.config.notification_recipient(),
            Some(&submission.email),
            notification_email(submission, meta, &self.config),
        );
        let auto_reply = self.envelope(
            &submission.email,
            Some(self.config.notification_recipient()),
            auto_reply_email(submission, &self.config),
        );

        let mut session = self.bounded(self.transport.open_session()).await?;

        if let Err(e) = self.bounded(session.send(&notification)).await {
            self.close(session).await;
            return Err(e);
        }
        tracing::info!(to = %notification.to, "Lead notification sent");

        let auto_reply_sent = match self.bounded(session.send(&auto_reply)).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Failed to send auto-reply: {}", e);
                false
            }
        };

        self.close(session).await;
        Ok(NotifyOutcome { auto_reply_sent })
    }

    async fn close(&self, mut session: Box<dyn MailSession>) {
        let limit = self.config.smtp.timeout();
        if timeout(limit, session.close()).await.is_err() {
            tracing::debug!("Mail session close timed out");
        }
    }
}
