//! DossierTracker: admissions deadlines, candidatures, tasks and reminders.

pub mod auth;
pub mod candidatures;
pub mod catalog;
pub mod config;
pub mod error;
pub mod google;
pub mod http;
pub mod ids;
pub mod notifications;
pub mod rankings;
pub mod reminders;
pub mod store;
pub mod telemetry;

#[cfg(test)]
mod test_support;
