use chrono::{DateTime, Utc};

use super::domain::Reminder;
use crate::ids::UserId;
use crate::store::RepositoryError;

pub trait ReminderRepository: Send + Sync {
    /// Conflict when a reminder already occupies the same slot.
    fn insert(&self, reminder: Reminder) -> Result<Reminder, RepositoryError>;
    /// Inserts every reminder whose slot is free and returns how many landed.
    fn insert_many(&self, reminders: Vec<Reminder>) -> Result<usize, RepositoryError>;
    fn update(&self, reminder: Reminder) -> Result<Reminder, RepositoryError>;
    fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Reminder>, RepositoryError>;
    /// Pending reminders with `send_at <= now`, oldest first.
    fn due(&self, now: DateTime<Utc>, limit: usize) -> Result<Vec<Reminder>, RepositoryError>;
}
