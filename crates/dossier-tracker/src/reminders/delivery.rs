use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::domain::ReminderChannel;
use crate::auth::User;
use crate::error::ServiceError;
use crate::ids::UserId;
use crate::notifications::{MailError, Mailer};

#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("channel {} is not supported", .0.label())]
    UnsupportedChannel(ReminderChannel),
    #[error("no email transport configured")]
    NoTransport,
    #[error(transparent)]
    Mail(#[from] MailError),
    #[error("{0}")]
    Gmail(String),
}

impl From<ServiceError> for DeliveryError {
    fn from(err: ServiceError) -> Self {
        DeliveryError::Gmail(err.to_string())
    }
}

/// Sends mail from a user's own Gmail account.
#[async_trait]
pub trait GmailOutbox: Send + Sync {
    async fn is_connected(&self, user_id: &UserId) -> Result<bool, ServiceError>;
    async fn send(
        &self,
        user_id: &UserId,
        to: &str,
        subject: &str,
        text: &str,
        now: DateTime<Utc>,
    ) -> Result<(), ServiceError>;
}

#[async_trait]
pub trait ReminderDelivery: Send + Sync {
    async fn deliver(
        &self,
        channel: ReminderChannel,
        user: &User,
        subject: &str,
        text: &str,
        now: DateTime<Utc>,
    ) -> Result<(), DeliveryError>;
}

/// Routes email reminders through the user's Gmail when connected, else the
/// SMTP relay. Other channels have no transport.
#[derive(Clone, Default)]
pub struct EmailRouter {
    gmail: Option<Arc<dyn GmailOutbox>>,
    smtp: Option<Arc<dyn Mailer>>,
}

impl EmailRouter {
    pub fn new(gmail: Option<Arc<dyn GmailOutbox>>, smtp: Option<Arc<dyn Mailer>>) -> Self {
        Self { gmail, smtp }
    }
}

#[async_trait]
impl ReminderDelivery for EmailRouter {
    async fn deliver(
        &self,
        channel: ReminderChannel,
        user: &User,
        subject: &str,
        text: &str,
        now: DateTime<Utc>,
    ) -> Result<(), DeliveryError> {
        if channel != ReminderChannel::Email {
            return Err(DeliveryError::UnsupportedChannel(channel));
        }

        if let Some(gmail) = &self.gmail {
            if gmail.is_connected(&user.id).await? {
                gmail.send(&user.id, &user.email, subject, text, now).await?;
                return Ok(());
            }
        }

        match &self.smtp {
            Some(smtp) => Ok(smtp.send(&user.email, subject, text).await?),
            None => Err(DeliveryError::NoTransport),
        }
    }
}

#[cfg(test)]
pub(crate) mod fake {
    use std::sync::Mutex;

    use super::*;

    /// Records every delivery; fails for recipients listed in `failing`.
    #[derive(Default)]
    pub(crate) struct RecordingDelivery {
        pub sent: Mutex<Vec<(String, String, String)>>,
        pub failing: Vec<String>,
    }

    #[async_trait]
    impl ReminderDelivery for RecordingDelivery {
        async fn deliver(
            &self,
            channel: ReminderChannel,
            user: &User,
            subject: &str,
            text: &str,
            _now: DateTime<Utc>,
        ) -> Result<(), DeliveryError> {
            if channel != ReminderChannel::Email {
                return Err(DeliveryError::UnsupportedChannel(channel));
            }
            if self.failing.contains(&user.email) {
                return Err(DeliveryError::Gmail("Gmail down".into()));
            }
            self.sent.lock().expect("sent").push((
                user.email.clone(),
                subject.to_string(),
                text.to_string(),
            ));
            Ok(())
        }
    }
}
