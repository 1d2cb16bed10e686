use async_trait::async_trait;
use tracing::info;

use crate::{MailError, MailMessage, MailSender};

/// Writes messages to the log instead of delivering them. Meant for local
/// development where no SMTP relay is available.
#[derive(Debug, Clone, Default)]
pub struct LogMailer;

#[async_trait]
impl MailSender for LogMailer {
    async fn send(&self, message: &MailMessage) -> Result<(), MailError> {
        info!(
            from = %message.from,
            to = %message.to,
            subject = %message.subject,
            body = %message.text,
            "mail transport is log-only; message not delivered"
        );
        Ok(())
    }
}
