use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::Deadline;
use crate::ids::{DeadlineId, ReminderId, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderChannel {
    Email,
    Sms,
    Push,
}

impl ReminderChannel {
    pub fn label(self) -> &'static str {
        match self {
            ReminderChannel::Email => "email",
            ReminderChannel::Sms => "sms",
            ReminderChannel::Push => "push",
        }
    }
}

/// Reminders move from `Pending` to either `Sent` or `Error`, never back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderStatus {
    Pending,
    Sent,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reminder {
    pub id: ReminderId,
    pub user_id: UserId,
    pub deadline_id: DeadlineId,
    pub channel: ReminderChannel,
    pub send_at: DateTime<Utc>,
    pub status: ReminderStatus,
    pub last_error: Option<String>,
    pub sent_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Reminder {
    pub fn pending(
        user_id: UserId,
        deadline_id: DeadlineId,
        channel: ReminderChannel,
        send_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: ReminderId::generate(),
            user_id,
            deadline_id,
            channel,
            send_at,
            status: ReminderStatus::Pending,
            last_error: None,
            sent_at: None,
            created_at: now,
        }
    }

    /// Uniqueness key: one reminder per user, deadline, channel and send time.
    pub fn same_slot(&self, other: &Reminder) -> bool {
        self.user_id == other.user_id
            && self.deadline_id == other.deadline_id
            && self.channel == other.channel
            && self.send_at == other.send_at
    }

    pub fn mark_sent(&mut self, at: DateTime<Utc>) {
        self.status = ReminderStatus::Sent;
        self.sent_at = Some(at);
        self.last_error = None;
    }

    pub fn mark_failed(&mut self, reason: impl Into<String>) {
        self.status = ReminderStatus::Error;
        self.last_error = Some(reason.into());
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderView {
    #[serde(flatten)]
    pub reminder: Reminder,
    pub deadline: Option<Deadline>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReminderRequest {
    pub deadline_id: DeadlineId,
    pub send_at: DateTime<Utc>,
    #[serde(default)]
    pub channel: Option<ReminderChannel>,
}

/// Outcome of one dispatch pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchReport {
    pub attempted: usize,
    pub sent: usize,
    pub failed: usize,
}
