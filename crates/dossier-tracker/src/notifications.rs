//! Outbound email over SMTP.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::SmtpConfig;

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("invalid address {address}: {reason}")]
    Address { address: String, reason: String },
    #[error("could not build message: {0}")]
    Build(String),
    #[error("smtp delivery failed: {0}")]
    Transport(String),
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, text: &str) -> Result<(), MailError>;
}

/// Plain SMTP relay (no implicit TLS), authenticated when credentials exist.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl std::fmt::Debug for SmtpMailer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpMailer")
            .field("from", &self.from.to_string())
            .finish()
    }
}

impl SmtpMailer {
    pub fn from_config(config: &SmtpConfig) -> Result<Self, MailError> {
        let from = parse_mailbox(&config.from)?;
        let mut builder =
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(config.host.as_str())
                .port(config.port);
        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        Ok(Self {
            transport: builder.build(),
            from,
        })
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, MailError> {
    address.parse().map_err(|err: lettre::address::AddressError| MailError::Address {
        address: address.to_string(),
        reason: err.to_string(),
    })
}

/// Text/plain UTF-8 message from the configured sender.
pub fn compose(from: &Mailbox, to: &str, subject: &str, text: &str) -> Result<Message, MailError> {
    Message::builder()
        .from(from.clone())
        .to(parse_mailbox(to)?)
        .subject(subject)
        .header(ContentType::TEXT_PLAIN)
        .body(text.to_string())
        .map_err(|err| MailError::Build(err.to_string()))
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, to: &str, subject: &str, text: &str) -> Result<(), MailError> {
        let message = compose(&self.from, to, subject, text)?;
        self.transport
            .send(message)
            .await
            .map_err(|err| MailError::Transport(err.to_string()))?;
        tracing::debug!(to, "smtp message sent");
        Ok(())
    }
}
