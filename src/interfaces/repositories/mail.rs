use std::sync::Arc;

use async_trait::async_trait;

use crate::{entities::email::OutboundEmail, errors::MailError};

/// An outbound transactional mail service.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Whether host and credentials are present. Checked before any connection attempt.
    fn is_configured(&self) -> bool;

    async fn open_session(&self) -> Result<Box<dyn MailSession>, MailError>;
}

/// One connection to the transport; several messages may be sent over it.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MailSession: Send {
    async fn send(&mut self, email: &OutboundEmail) -> Result<(), MailError>;

    async fn close(&mut self);
}

#[async_trait]
impl<T: MailTransport + ?Sized> MailTransport for Arc<T> {
    fn is_configured(&self) -> bool {
        (**self).is_configured()
    }

    async fn open_session(&self) -> Result<Box<dyn MailSession>, MailError> {
        (**self).open_session().await
    }
}
