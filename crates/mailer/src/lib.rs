use async_trait::async_trait;
use thiserror::Error;

mod logged;
mod smtp;

pub use logged::LogMailer;
pub use smtp::{SmtpConfig, SmtpMailer};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub text: String,
    pub html: String,
}

#[derive(Debug, Error)]
pub enum MailError {
    #[error("invalid mailbox '{address}': {reason}")]
    InvalidMailbox { address: String, reason: String },
    #[error("failed to build message: {0}")]
    Build(String),
    #[error("mail transport unavailable: {0}")]
    Unavailable(String),
    #[error("mail transport rejected message: {0}")]
    Rejected(String),
}

/// Outbound mail capability used by the join pipeline.
///
/// Implementations make exactly one delivery attempt per call.
#[async_trait]
pub trait MailSender: Send + Sync {
    /// Checks that the transport is reachable before a message is handed over.
    async fn verify(&self) -> Result<(), MailError> {
        Ok(())
    }

    async fn send(&self, message: &MailMessage) -> Result<(), MailError>;
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
