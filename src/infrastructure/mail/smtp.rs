use async_trait::async_trait;
use mail_builder::MessageBuilder;
use mail_send::{SmtpClient, SmtpClientBuilder};
use tokio::io::{AsyncRead, AsyncWrite};

use crate::{
    entities::email::OutboundEmail,
    errors::MailError,
    repositories::mail::{MailSession, MailTransport},
    settings::SmtpConfig,
};

/// SMTP transport. Port 465 uses implicit TLS, other ports upgrade with STARTTLS
/// unless plaintext is explicitly allowed.
#[derive(Clone, Debug)]
pub struct SmtpMailer {
    config: SmtpConfig,
}

impl SmtpMailer {
    pub fn new(config: SmtpConfig) -> Self {
        SmtpMailer { config }
    }

    fn builder(&self) -> SmtpClientBuilder<String> {
        SmtpClientBuilder::new(self.config.host.clone(), self.config.port)
            .implicit_tls(self.config.implicit_tls())
            .credentials((self.config.username.clone(), self.config.password.clone()))
            .timeout(self.config.timeout())
    }

    fn connect_error(&self, err: mail_send::Error) -> MailError {
        MailError::Connect {
            host: format!("{}:{}", self.config.host, self.config.port),
            reason: err.to_string(),
        }
    }
}

#[async_trait]
impl MailTransport for SmtpMailer {
    fn is_configured(&self) -> bool {
        self.config.is_configured()
    }

    async fn open_session(&self) -> Result<Box<dyn MailSession>, MailError> {
        if !self.is_configured() {
            return Err(MailError::NotConfigured);
        }

        if self.config.allow_plaintext && !self.config.implicit_tls() {
            let client = self
                .builder()
                .connect_plain()
                .await
                .map_err(|e| self.connect_error(e))?;
            tracing::debug!(host = %self.config.host, "SMTP session opened (plaintext)");
            return Ok(Box::new(SmtpSession { client: Some(client) }));
        }

        let client = self
            .builder()
            .connect()
            .await
            .map_err(|e| self.connect_error(e))?;
        tracing::debug!(host = %self.config.host, "SMTP session opened");
        Ok(Box::new(SmtpSession { client: Some(client) }))
    }
}

struct SmtpSession<T: AsyncRead + AsyncWrite + Unpin + Send> {
    client: Option<SmtpClient<T>>,
}

fn build_message(email: &OutboundEmail) -> MessageBuilder<'_> {
    let mut message = MessageBuilder::new()
        .from((email.from_name.as_str(), email.from.as_str()))
        .to(email.to.as_str())
        .subject(email.subject.as_str())
        .html_body(email.html.as_str())
        .text_body(email.text.as_str());

    if let Some(reply_to) = &email.reply_to {
        message = message.reply_to(reply_to.as_str());
    }

    message
}

#[async_trait]
impl<T: AsyncRead + AsyncWrite + Unpin + Send> MailSession for SmtpSession<T> {
    async fn send(&mut self, email: &OutboundEmail) -> Result<(), MailError> {
        let client = self.client.as_mut().ok_or_else(|| MailError::Send {
            recipient: email.to.clone(),
            reason: "session already closed".to_string(),
        })?;

        client
            .send(build_message(email))
            .await
            .map_err(|e| MailError::Send {
                recipient: email.to.clone(),
                reason: e.to_string(),
            })
    }

    async fn close(&mut self) {
        if let Some(mut client) = self.client.take() {
            if let Err(e) = client.quit().await {
                tracing::debug!("SMTP QUIT failed: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unconfigured_mailer_fails_before_connecting() {
        let mailer = SmtpMailer::new(SmtpConfig::default());
        assert!(!mailer.is_configured());
        assert!(matches!(mailer.open_session().await, Err(MailError::NotConfigured)));
    }

    #[test]
    fn message_contains_both_bodies() {
        let email = OutboundEmail {
            from_name: "Rob Knowlton".into(),
            from: "mailer@example.com".into(),
            to: "jane@example.com".into(),
            reply_to: Some("rob@example.com".into()),
            subject: "Thanks for reaching out!".into(),
            html: "<p>Hello</p>".into(),
            text: "Hello".into(),
        };

        let raw = build_message(&email).write_to_string().unwrap();
        assert!(raw.contains("Subject: Thanks for reaching out!"));
        assert!(raw.contains("multipart/alternative"));
        assert!(raw.contains("text/html"));
        assert!(raw.contains("text/plain"));
        assert!(raw.contains("jane@example.com"));
    }
}
