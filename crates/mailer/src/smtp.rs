use async_trait::async_trait;
use lettre::{
    message::{Mailbox, MultiPart},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use tracing::{debug, info};

use crate::{MailError, MailMessage, MailSender};

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    /// Implicit TLS from the first byte. When unset the relay must offer
    /// STARTTLS.
    pub secure: bool,
    pub username: String,
    pub password: String,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: "smtp.gmail.com".into(),
            port: 587,
            secure: false,
            username: String::new(),
            password: String::new(),
        }
    }
}

#[derive(Clone)]
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    host: String,
}

impl SmtpMailer {
    pub fn new(cfg: &SmtpConfig) -> Result<Self, MailError> {
        let builder = if cfg.secure {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&cfg.host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&cfg.host)
        }
        .map_err(|e| MailError::Unavailable(e.to_string()))?;

        let mut builder = builder.port(cfg.port);
        if !cfg.username.is_empty() {
            builder = builder.credentials(Credentials::new(
                cfg.username.clone(),
                cfg.password.clone(),
            ));
        }

        info!(host = %cfg.host, port = cfg.port, secure = cfg.secure, "smtp transport configured");
        Ok(Self {
            transport: builder.build(),
            host: cfg.host.clone(),
        })
    }
}

impl std::fmt::Debug for SmtpMailer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpMailer").field("host", &self.host).finish()
    }
}

#[async_trait]
impl MailSender for SmtpMailer {
    async fn verify(&self) -> Result<(), MailError> {
        match self.transport.test_connection().await {
            Ok(true) => {
                debug!(host = %self.host, "smtp server is ready to take messages");
                Ok(())
            }
            Ok(false) => Err(MailError::Unavailable(format!(
                "{} did not accept the connection check",
                self.host
            ))),
            Err(e) => Err(MailError::Unavailable(e.to_string())),
        }
    }

    async fn send(&self, message: &MailMessage) -> Result<(), MailError> {
        let email = build_message(message)?;
        self.transport
            .send(email)
            .await
            .map_err(|e| MailError::Rejected(e.to_string()))?;
        Ok(())
    }
}

pub(crate) fn build_message(message: &MailMessage) -> Result<Message, MailError> {
    Message::builder()
        .from(parse_mailbox(&message.from)?)
        .to(parse_mailbox(&message.to)?)
        .subject(message.subject.as_str())
        .multipart(MultiPart::alternative_plain_html(
            message.text.clone(),
            message.html.clone(),
        ))
        .map_err(|e| MailError::Build(e.to_string()))
}

fn parse_mailbox(address: &str) -> Result<Mailbox, MailError> {
    address
        .parse::<Mailbox>()
        .map_err(|e| MailError::InvalidMailbox {
            address: address.to_string(),
            reason: e.to_string(),
        })
}
