use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::delivery::ReminderDelivery;
use super::domain::{CreateReminderRequest, DispatchReport, Reminder, ReminderChannel, ReminderView};
use super::repository::ReminderRepository;
use crate::auth::{User, UserRepository};
use crate::catalog::{CatalogRepository, Deadline};
use crate::error::ServiceError;
use crate::ids::UserId;
use crate::store::RepositoryError;

/// Reminder scheduling and the periodic dispatch pass.
#[derive(Clone)]
pub struct ReminderService {
    reminders: Arc<dyn ReminderRepository>,
    catalog: Arc<dyn CatalogRepository>,
    users: Arc<dyn UserRepository>,
    delivery: Arc<dyn ReminderDelivery>,
    batch_size: usize,
}

impl ReminderService {
    pub fn new(
        reminders: Arc<dyn ReminderRepository>,
        catalog: Arc<dyn CatalogRepository>,
        users: Arc<dyn UserRepository>,
        delivery: Arc<dyn ReminderDelivery>,
        batch_size: usize,
    ) -> Self {
        Self {
            reminders,
            catalog,
            users,
            delivery,
            batch_size: batch_size.max(1),
        }
    }

    pub fn list_for_user(&self, user_id: &UserId) -> Result<Vec<ReminderView>, ServiceError> {
        let deadlines: HashMap<_, Deadline> = self
            .catalog
            .deadlines()?
            .into_iter()
            .map(|deadline| (deadline.id.clone(), deadline))
            .collect();
        let mut reminders = self.reminders.list_for_user(user_id)?;
        reminders.sort_by(|a, b| a.send_at.cmp(&b.send_at));
        Ok(reminders
            .into_iter()
            .map(|reminder| ReminderView {
                deadline: deadlines.get(&reminder.deadline_id).cloned(),
                reminder,
            })
            .collect())
    }

    pub fn create(
        &self,
        user_id: &UserId,
        request: CreateReminderRequest,
        now: DateTime<Utc>,
    ) -> Result<ReminderView, ServiceError> {
        let deadline = self
            .catalog
            .deadline(&request.deadline_id)?
            .ok_or_else(|| ServiceError::not_found("Deadline not found"))?;
        let reminder = self.reminders.insert(Reminder::pending(
            user_id.clone(),
            request.deadline_id,
            request.channel.unwrap_or(ReminderChannel::Email),
            request.send_at,
            now,
        ))?;
        Ok(ReminderView {
            reminder,
            deadline: Some(deadline),
        })
    }

    /// Delivers every pending reminder due at `now`, up to the batch size.
    /// Each row ends up `sent` or `error` independently of the others.
    pub async fn dispatch_due(&self, now: DateTime<Utc>) -> Result<DispatchReport, ServiceError> {
        let due = self.reminders.due(now, self.batch_size)?;
        let mut report = DispatchReport::default();

        for mut reminder in due {
            report.attempted += 1;
            let delivered = match self.deliver(&reminder, now).await {
                Ok(()) => {
                    reminder.mark_sent(now);
                    true
                }
                Err(reason) => {
                    tracing::warn!(
                        reminder_id = %reminder.id,
                        user_id = %reminder.user_id,
                        error = %reason,
                        "reminder delivery failed"
                    );
                    reminder.mark_failed(reason);
                    false
                }
            };

            let reminder_id = reminder.id.clone();
            match self.reminders.update(reminder) {
                Ok(_) if delivered => report.sent += 1,
                Ok(_) => report.failed += 1,
                // The row is still pending and will be picked up again.
                Err(err) => {
                    tracing::error!(
                        reminder_id = %reminder_id,
                        delivered,
                        error = %err,
                        "could not record reminder outcome"
                    );
                    report.failed += 1;
                }
            }
        }

        if report.attempted > 0 {
            tracing::info!(
                attempted = report.attempted,
                sent = report.sent,
                failed = report.failed,
                "reminder dispatch pass"
            );
        }
        Ok(report)
    }

    async fn deliver(&self, reminder: &Reminder, now: DateTime<Utc>) -> Result<(), String> {
        let user = self
            .users
            .find_by_id(&reminder.user_id)
            .map_err(|err| err.to_string())?
            .ok_or_else(|| RepositoryError::NotFound("user").to_string())?;
        let deadline = self
            .catalog
            .deadline(&reminder.deadline_id)
            .map_err(|err| err.to_string())?
            .ok_or_else(|| RepositoryError::NotFound("deadline").to_string())?;

        let (subject, text) = reminder_message(&user, &deadline);
        self.delivery
            .deliver(reminder.channel, &user, &subject, &text, now)
            .await
            .map_err(|err| err.to_string())
    }
}

/// French notification for an upcoming deadline.
pub fn reminder_message(user: &User, deadline: &Deadline) -> (String, String) {
    let subject = format!("Rappel : {}", deadline.title);
    let text = format!(
        "Bonjour {},\n\nL'échéance « {} » arrive le {} (UTC).\n\nPense à vérifier tes tâches sur DossierTracker.\n",
        user.first_name,
        deadline.title,
        deadline.due_at.format("%d/%m/%Y à %H:%M"),
    );
    (subject, text)
}
