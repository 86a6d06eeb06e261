use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{CandidatureId, DeadlineId, UserId};

/// Stored OAuth grant for one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoogleCredential {
    pub user_id: UserId,
    pub access_token: String,
    pub refresh_token: String,
    pub scope: String,
    pub token_type: String,
    pub expiry_date: Option<DateTime<Utc>>,
    pub calendar_id: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl GoogleCredential {
    /// Unknown expiry counts as stale, as does anything inside the next minute.
    pub fn needs_refresh(&self, now: DateTime<Utc>) -> bool {
        self.expiry_date
            .map_or(true, |expiry| expiry <= now + Duration::seconds(60))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleStatus {
    pub connected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scopes: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<DateTime<Utc>>,
}

impl GoogleStatus {
    pub fn disconnected() -> Self {
        Self {
            connected: false,
            scopes: None,
            expiry_date: None,
        }
    }
}

/// A deadline as pushed to the user's calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarDeadline {
    pub id: DeadlineId,
    pub title: String,
    pub due_at: DateTime<Utc>,
    #[serde(default)]
    pub candidature_id: Option<CandidatureId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GmailMessage {
    pub id: String,
    pub snippet: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

/// Token endpoint answer, both for code exchange and refresh.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TokenGrant {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthUrl {
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExchangeCodeRequest {
    pub code: String,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Connected {
    pub connected: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SyncDeadlinesRequest {
    pub deadlines: Vec<CalendarDeadline>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Synced {
    pub synced: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Purged {
    pub deleted: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateDraftRequest {
    pub to: String,
    pub subject: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftCreated {
    pub draft_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credential(expiry: Option<DateTime<Utc>>) -> GoogleCredential {
        GoogleCredential {
            user_id: UserId::from("usr_1"),
            access_token: "access".into(),
            refresh_token: "refresh".into(),
            scope: "calendar".into(),
            token_type: "Bearer".into(),
            expiry_date: expiry,
            calendar_id: None,
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn refresh_is_needed_near_expiry() {
        let now = Utc::now();
        assert!(credential(None).needs_refresh(now));
        assert!(credential(Some(now + Duration::seconds(30))).needs_refresh(now));
        assert!(!credential(Some(now + Duration::minutes(10))).needs_refresh(now));
    }

    #[test]
    fn disconnected_status_hides_optional_fields() {
        let value = serde_json::to_value(GoogleStatus::disconnected()).expect("json");
        assert_eq!(value, serde_json::json!({"connected": false}));
    }
}
