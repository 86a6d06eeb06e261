use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::service::ReminderService;

/// Runs one dispatch pass per tick until the handle is aborted. A slow pass
/// delays the next tick instead of stacking passes.
pub fn spawn_dispatcher(service: Arc<ReminderService>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tracing::info!(every_secs = every.as_secs(), "reminder dispatcher started");
        loop {
            ticker.tick().await;
            if let Err(err) = service.dispatch_due(Utc::now()).await {
                tracing::error!(error = %err, "reminder dispatch pass failed");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{User, UserRepository, UserRole};
    use crate::catalog::{CatalogRepository, Deadline, DeadlineType};
    use crate::ids::{DeadlineId, UserId};
    use crate::reminders::delivery::fake::RecordingDelivery;
    use crate::reminders::domain::CreateReminderRequest;
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn dispatcher_delivers_until_aborted() {
        let store = Arc::new(MemoryStore::default());
        let now = Utc::now();
        UserRepository::insert(
            store.as_ref(),
            User {
                id: UserId::from("usr_1"),
                email: "student@example.com".into(),
                password_hash: String::new(),
                first_name: "Sam".into(),
                last_name: "Durand".into(),
                role: UserRole::Student,
                created_at: now,
            },
        )
        .expect("user");
        let deadline = store
            .insert_deadline(Deadline {
                id: DeadlineId::generate(),
                title: "Inscription".into(),
                deadline_type: DeadlineType::Registration,
                due_at: now + chrono::Duration::days(2),
                contest_id: None,
                school_id: None,
                program_id: None,
                diploma_name: None,
                session_label: None,
                created_by_admin: true,
            })
            .expect("deadline");

        let delivery = Arc::new(RecordingDelivery::default());
        let service = Arc::new(ReminderService::new(
            store.clone(),
            store.clone(),
            store.clone(),
            delivery.clone(),
            10,
        ));
        service
            .create(
                &UserId::from("usr_1"),
                CreateReminderRequest {
                    deadline_id: deadline.id,
                    send_at: now - chrono::Duration::seconds(1),
                    channel: None,
                },
                now,
            )
            .expect("reminder");

        let handle = spawn_dispatcher(service, Duration::from_millis(10));
        tokio::time::sleep(Duration::from_millis(100)).await;
        handle.abort();
        assert!(handle.await.is_err());

        assert_eq!(delivery.sent.lock().unwrap().len(), 1);
    }
}
