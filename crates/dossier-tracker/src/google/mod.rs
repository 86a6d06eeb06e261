//! Google OAuth plus the Calendar and Gmail calls made on a user's behalf.

pub mod api;
pub mod client;
pub mod domain;
pub mod message;
pub mod repository;
pub mod router;
pub mod service;

pub use api::{GoogleApi, GoogleApiError};
pub use client::HttpGoogleApi;
pub use domain::{CalendarDeadline, GmailMessage, GoogleCredential, GoogleStatus};
pub use repository::CredentialRepository;
pub use router::{google_router, GoogleHandle};
pub use service::GoogleService;
