use async_trait::async_trait;

use super::domain::{GmailMessage, TokenGrant};
use super::message::EventBody;
use crate::error::ServiceError;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GoogleApiError {
    #[error("google api returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("google api unreachable: {0}")]
    Transport(String),
    #[error("unexpected google api response: {0}")]
    Decode(String),
}

impl GoogleApiError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, GoogleApiError::Status { status: 404, .. })
    }

    pub fn is_invalid_id(&self) -> bool {
        self.to_string()
            .to_lowercase()
            .contains("invalid resource id")
    }
}

impl From<GoogleApiError> for ServiceError {
    fn from(err: GoogleApiError) -> Self {
        ServiceError::Upstream(err.to_string())
    }
}

/// The slice of Google OAuth, Calendar and Gmail the service talks to.
/// Calls take the caller's access token; refresh is handled above this seam.
#[async_trait]
pub trait GoogleApi: Send + Sync {
    async fn exchange_code(&self, code: &str) -> Result<TokenGrant, GoogleApiError>;
    async fn refresh_token(&self, refresh_token: &str) -> Result<TokenGrant, GoogleApiError>;

    async fn get_calendar(&self, token: &str, calendar_id: &str) -> Result<(), GoogleApiError>;
    /// Returns the id of the new calendar.
    async fn create_calendar(
        &self,
        token: &str,
        summary: &str,
        description: &str,
    ) -> Result<String, GoogleApiError>;
    async fn patch_event(
        &self,
        token: &str,
        calendar_id: &str,
        event_id: &str,
        body: &EventBody,
    ) -> Result<(), GoogleApiError>;
    async fn insert_event(
        &self,
        token: &str,
        calendar_id: &str,
        event_id: Option<&str>,
        body: &EventBody,
    ) -> Result<(), GoogleApiError>;
    /// Ids of events carrying the given private extended property.
    async fn list_events_tagged(
        &self,
        token: &str,
        calendar_id: &str,
        property: &str,
    ) -> Result<Vec<String>, GoogleApiError>;
    async fn delete_event(
        &self,
        token: &str,
        calendar_id: &str,
        event_id: &str,
    ) -> Result<(), GoogleApiError>;

    async fn send_message(&self, token: &str, raw: &str) -> Result<(), GoogleApiError>;
    /// Returns the draft id.
    async fn create_draft(&self, token: &str, raw: &str) -> Result<String, GoogleApiError>;
    async fn list_messages(
        &self,
        token: &str,
        label: &str,
        max_results: u32,
    ) -> Result<Vec<String>, GoogleApiError>;
    async fn message_metadata(
        &self,
        token: &str,
        message_id: &str,
    ) -> Result<GmailMessage, GoogleApiError>;
}
