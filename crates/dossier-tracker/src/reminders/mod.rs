//! Reminder scheduling, delivery routing and the background dispatcher.

pub mod delivery;
pub mod dispatcher;
pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

pub use delivery::{DeliveryError, EmailRouter, GmailOutbox, ReminderDelivery};
pub use dispatcher::spawn_dispatcher;
pub use domain::{DispatchReport, Reminder, ReminderChannel, ReminderStatus, ReminderView};
pub use repository::ReminderRepository;
pub use router::reminders_router;
pub use service::{reminder_message, ReminderService};
