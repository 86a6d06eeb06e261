use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use url::Url;

use super::api::GoogleApi;
use super::domain::{
    CalendarDeadline, Connected, CreateDraftRequest, DraftCreated, GmailMessage, GoogleCredential,
    GoogleStatus, Purged, Synced, TokenGrant,
};
use super::message::{
    event_id, raw_email, EventBody, CALENDAR_DESCRIPTION, CALENDAR_SUMMARY, EVENT_SOURCE,
};
use super::repository::CredentialRepository;
use crate::auth::service::looks_like_email;
use crate::candidatures::DeadlineCalendar;
use crate::config::GoogleConfig;
use crate::error::ServiceError;
use crate::ids::UserId;
use crate::reminders::GmailOutbox;

const AUTH_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const INBOX_LABEL: &str = "INBOX";
const INBOX_SIZE: u32 = 10;
const NOT_CONNECTED: &str = "Google account not connected";

/// Per-user Google OAuth, Calendar and Gmail operations.
#[derive(Clone)]
pub struct GoogleService {
    config: GoogleConfig,
    api: Arc<dyn GoogleApi>,
    credentials: Arc<dyn CredentialRepository>,
}

impl GoogleService {
    pub fn new(
        config: GoogleConfig,
        api: Arc<dyn GoogleApi>,
        credentials: Arc<dyn CredentialRepository>,
    ) -> Self {
        Self {
            config,
            api,
            credentials,
        }
    }

    pub fn auth_url(&self) -> Result<String, ServiceError> {
        let scope = self.config.scopes.join(" ");
        let url = Url::parse_with_params(
            AUTH_ENDPOINT,
            &[
                ("client_id", self.config.client_id.as_str()),
                ("redirect_uri", self.config.redirect_uri.as_str()),
                ("response_type", "code"),
                ("access_type", "offline"),
                ("prompt", "consent"),
                ("scope", scope.as_str()),
            ],
        )
        .map_err(|err| ServiceError::Internal(err.to_string()))?;
        Ok(url.into())
    }

    pub async fn exchange_code(
        &self,
        user_id: &UserId,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<Connected, ServiceError> {
        if code.trim().is_empty() {
            return Err(ServiceError::validation("code must not be empty"));
        }

        let grant = self.api.exchange_code(code).await?;
        let refresh_token = grant.refresh_token.clone().ok_or_else(|| {
            ServiceError::validation(
                "Google did not return a refresh token (prompt=consent and access_type=offline are required)",
            )
        })?;
        let calendar_id = self
            .credentials
            .find_by_user(user_id)?
            .and_then(|existing| existing.calendar_id);
        let credential = self.credential_from(user_id, grant, refresh_token, calendar_id, now);
        self.credentials.upsert(credential)?;
        tracing::info!(user_id = %user_id, "google account connected");
        Ok(Connected { connected: true })
    }

    pub fn status(&self, user_id: &UserId) -> Result<GoogleStatus, ServiceError> {
        Ok(match self.credentials.find_by_user(user_id)? {
            Some(credential) => GoogleStatus {
                connected: true,
                scopes: Some(
                    credential
                        .scope
                        .split_whitespace()
                        .map(str::to_string)
                        .collect(),
                ),
                expiry_date: credential.expiry_date,
            },
            None => GoogleStatus::disconnected(),
        })
    }

    pub fn is_connected(&self, user_id: &UserId) -> Result<bool, ServiceError> {
        Ok(self.credentials.find_by_user(user_id)?.is_some())
    }

    /// Stored credential with a usable access token, refreshed and persisted
    /// when it is about to expire.
    async fn authorized(
        &self,
        user_id: &UserId,
        now: DateTime<Utc>,
    ) -> Result<GoogleCredential, ServiceError> {
        let stored = self
            .credentials
            .find_by_user(user_id)?
            .ok_or_else(|| ServiceError::validation(NOT_CONNECTED))?;
        if !stored.needs_refresh(now) {
            return Ok(stored);
        }

        let grant = self.api.refresh_token(&stored.refresh_token).await?;
        let refresh_token = grant
            .refresh_token
            .clone()
            .unwrap_or_else(|| stored.refresh_token.clone());
        let refreshed =
            self.credential_from(user_id, grant, refresh_token, stored.calendar_id, now);
        tracing::debug!(user_id = %user_id, "google access token refreshed");
        Ok(self.credentials.upsert(refreshed)?)
    }

    fn credential_from(
        &self,
        user_id: &UserId,
        grant: TokenGrant,
        refresh_token: String,
        calendar_id: Option<String>,
        now: DateTime<Utc>,
    ) -> GoogleCredential {
        GoogleCredential {
            user_id: user_id.clone(),
            access_token: grant.access_token,
            refresh_token,
            scope: grant.scope.unwrap_or_else(|| self.config.scopes.join(" ")),
            token_type: grant.token_type.unwrap_or_else(|| "Bearer".to_string()),
            expiry_date: grant.expires_in.map(|secs| now + Duration::seconds(secs)),
            calendar_id,
            updated_at: now,
        }
    }

    async fn ensure_calendar(&self, credential: &GoogleCredential) -> Result<String, ServiceError> {
        let token = credential.access_token.as_str();
        if let Some(calendar_id) = credential.calendar_id.as_deref() {
            match self.api.get_calendar(token, calendar_id).await {
                Ok(()) => return Ok(calendar_id.to_string()),
                Err(err) => tracing::warn!(
                    user_id = %credential.user_id,
                    calendar_id,
                    error = %err,
                    "stored calendar missing, creating a new one"
                ),
            }
        }

        let calendar_id = self
            .api
            .create_calendar(token, CALENDAR_SUMMARY, CALENDAR_DESCRIPTION)
            .await?;
        self.credentials
            .set_calendar(&credential.user_id, &calendar_id)?;
        Ok(calendar_id)
    }

    pub async fn sync_deadlines(
        &self,
        user_id: &UserId,
        deadlines: &[CalendarDeadline],
        now: DateTime<Utc>,
    ) -> Result<Synced, ServiceError> {
        if deadlines.is_empty() {
            return Ok(Synced { synced: 0 });
        }

        let credential = self.authorized(user_id, now).await?;
        let calendar_id = self.ensure_calendar(&credential).await?;
        let mut synced = 0;
        for deadline in deadlines {
            if self
                .upsert_event(&credential.access_token, &calendar_id, deadline)
                .await
            {
                synced += 1;
            }
        }
        Ok(Synced { synced })
    }

    /// Patch first, insert on 404, and drop the id when Google rejects it.
    async fn upsert_event(&self, token: &str, calendar_id: &str, deadline: &CalendarDeadline) -> bool {
        let id = event_id(deadline);
        let body = EventBody::for_deadline(deadline);

        match self.api.patch_event(token, calendar_id, &id, &body).await {
            Ok(()) => return true,
            Err(err) if err.is_not_found() => {}
            Err(err) => {
                tracing::warn!(deadline_id = %deadline.id, error = %err, "calendar sync failed");
                return false;
            }
        }

        let err = match self.api.insert_event(token, calendar_id, Some(&id), &body).await {
            Ok(()) => return true,
            Err(err) => err,
        };
        if !err.is_invalid_id() {
            tracing::warn!(deadline_id = %deadline.id, error = %err, "calendar insert failed");
            return false;
        }

        tracing::warn!(
            deadline_id = %deadline.id,
            event_id = %id,
            error = %err,
            "calendar rejected event id, retrying without it"
        );
        match self.api.insert_event(token, calendar_id, None, &body).await {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(deadline_id = %deadline.id, error = %err, "calendar insert retry failed");
                false
            }
        }
    }

    pub async fn purge_events(
        &self,
        user_id: &UserId,
        now: DateTime<Utc>,
    ) -> Result<Purged, ServiceError> {
        let credential = self.authorized(user_id, now).await?;
        let Some(calendar_id) = credential.calendar_id.as_deref() else {
            return Ok(Purged { deleted: 0 });
        };

        let token = credential.access_token.as_str();
        let property = format!("source={}", EVENT_SOURCE);
        let events = self
            .api
            .list_events_tagged(token, calendar_id, &property)
            .await?;
        let mut deleted = 0;
        for event in events {
            match self.api.delete_event(token, calendar_id, &event).await {
                Ok(()) => deleted += 1,
                Err(err) => {
                    tracing::warn!(event_id = %event, error = %err, "calendar event delete failed")
                }
            }
        }
        Ok(Purged { deleted })
    }

    pub async fn send_email(
        &self,
        user_id: &UserId,
        to: &str,
        subject: &str,
        text: &str,
        now: DateTime<Utc>,
    ) -> Result<(), ServiceError> {
        let credential = self.authorized(user_id, now).await?;
        let raw = raw_email(to, subject, text);
        self.api
            .send_message(&credential.access_token, &raw)
            .await?;
        Ok(())
    }

    pub async fn create_draft(
        &self,
        user_id: &UserId,
        request: CreateDraftRequest,
        now: DateTime<Utc>,
    ) -> Result<DraftCreated, ServiceError> {
        validate_draft(&request)?;
        let credential = self.authorized(user_id, now).await?;
        let raw = raw_email(&request.to, &request.subject, &request.text);
        let draft_id = self
            .api
            .create_draft(&credential.access_token, &raw)
            .await?;
        Ok(DraftCreated { draft_id })
    }

    pub async fn list_inbox(
        &self,
        user_id: &UserId,
        now: DateTime<Utc>,
    ) -> Result<Vec<GmailMessage>, ServiceError> {
        let credential = self.authorized(user_id, now).await?;
        let token = credential.access_token.as_str();
        let ids = self.api.list_messages(token, INBOX_LABEL, INBOX_SIZE).await?;

        let mut messages = Vec::with_capacity(ids.len());
        for id in ids {
            match self.api.message_metadata(token, &id).await {
                Ok(message) => messages.push(message),
                Err(err) => {
                    tracing::warn!(message_id = %id, error = %err, "unable to fetch gmail message")
                }
            }
        }
        Ok(messages)
    }
}

fn validate_draft(request: &CreateDraftRequest) -> Result<(), ServiceError> {
    if !looks_like_email(request.to.trim()) {
        return Err(ServiceError::validation("to must be an email"));
    }
    let subject_len = request.subject.chars().count();
    if !(1..=120).contains(&subject_len) {
        return Err(ServiceError::validation(
            "subject must be between 1 and 120 characters",
        ));
    }
    let text_len = request.text.chars().count();
    if !(1..=2000).contains(&text_len) {
        return Err(ServiceError::validation(
            "text must be between 1 and 2000 characters",
        ));
    }
    Ok(())
}

#[async_trait]
impl DeadlineCalendar for GoogleService {
    async fn is_connected(&self, user_id: &UserId) -> Result<bool, ServiceError> {
        GoogleService::is_connected(self, user_id)
    }

    async fn push_deadlines(
        &self,
        user_id: &UserId,
        deadlines: &[CalendarDeadline],
        now: DateTime<Utc>,
    ) -> Result<usize, ServiceError> {
        self.sync_deadlines(user_id, deadlines, now)
            .await
            .map(|synced| synced.synced)
    }
}

#[async_trait]
impl GmailOutbox for GoogleService {
    async fn is_connected(&self, user_id: &UserId) -> Result<bool, ServiceError> {
        GoogleService::is_connected(self, user_id)
    }

    async fn send(
        &self,
        user_id: &UserId,
        to: &str,
        subject: &str,
        text: &str,
        now: DateTime<Utc>,
    ) -> Result<(), ServiceError> {
        self.send_email(user_id, to, subject, text, now).await
    }
}

#[cfg(test)]
pub(crate) mod fake {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::google::api::{GoogleApi, GoogleApiError};
    use crate::google::domain::{GmailMessage, TokenGrant};
    use crate::google::message::EventBody;

    /// Scriptable stand-in for the Google REST surface; records every call.
    #[derive(Default)]
    pub(crate) struct FakeGoogleApi {
        pub calls: Mutex<Vec<String>>,
        pub grant: Mutex<TokenGrant>,
        pub calendar_exists: Mutex<bool>,
        pub patch_error: Mutex<Option<GoogleApiError>>,
        pub insert_errors: Mutex<Vec<GoogleApiError>>,
        pub tagged_events: Mutex<Vec<String>>,
        pub inbox: Mutex<Vec<String>>,
    }

    impl FakeGoogleApi {
        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().expect("calls").clone()
        }

        fn record(&self, call: impl Into<String>) {
            self.calls.lock().expect("calls").push(call.into());
        }
    }

    #[async_trait]
    impl GoogleApi for FakeGoogleApi {
        async fn exchange_code(&self, code: &str) -> Result<TokenGrant, GoogleApiError> {
            self.record(format!("exchange:{}", code));
            Ok(self.grant.lock().expect("grant").clone())
        }

        async fn refresh_token(&self, refresh_token: &str) -> Result<TokenGrant, GoogleApiError> {
            self.record(format!("refresh:{}", refresh_token));
            Ok(self.grant.lock().expect("grant").clone())
        }

        async fn get_calendar(&self, _token: &str, calendar_id: &str) -> Result<(), GoogleApiError> {
            self.record(format!("get_calendar:{}", calendar_id));
            if *self.calendar_exists.lock().expect("calendar") {
                Ok(())
            } else {
                Err(GoogleApiError::Status {
                    status: 404,
                    message: "Not Found".into(),
                })
            }
        }

        async fn create_calendar(
            &self,
            _token: &str,
            summary: &str,
            _description: &str,
        ) -> Result<String, GoogleApiError> {
            self.record(format!("create_calendar:{}", summary));
            Ok("cal-new".to_string())
        }

        async fn patch_event(
            &self,
            _token: &str,
            _calendar_id: &str,
            event_id: &str,
            _body: &EventBody,
        ) -> Result<(), GoogleApiError> {
            self.record(format!("patch:{}", event_id));
            match self.patch_error.lock().expect("patch").clone() {
                Some(err) => Err(err),
                None => Ok(()),
            }
        }

        async fn insert_event(
            &self,
            _token: &str,
            _calendar_id: &str,
            event_id: Option<&str>,
            _body: &EventBody,
        ) -> Result<(), GoogleApiError> {
            self.record(format!("insert:{}", event_id.unwrap_or("-")));
            let mut errors = self.insert_errors.lock().expect("insert");
            if errors.is_empty() {
                Ok(())
            } else {
                Err(errors.remove(0))
            }
        }

        async fn list_events_tagged(
            &self,
            _token: &str,
            _calendar_id: &str,
            property: &str,
        ) -> Result<Vec<String>, GoogleApiError> {
            self.record(format!("list_events:{}", property));
            Ok(self.tagged_events.lock().expect("events").clone())
        }

        async fn delete_event(
            &self,
            _token: &str,
            _calendar_id: &str,
            event_id: &str,
        ) -> Result<(), GoogleApiError> {
            self.record(format!("delete:{}", event_id));
            Ok(())
        }

        async fn send_message(&self, token: &str, _raw: &str) -> Result<(), GoogleApiError> {
            self.record(format!("send:{}", token));
            Ok(())
        }

        async fn create_draft(&self, _token: &str, _raw: &str) -> Result<String, GoogleApiError> {
            self.record("draft");
            Ok("draft-1".to_string())
        }

        async fn list_messages(
            &self,
            _token: &str,
            label: &str,
            max_results: u32,
        ) -> Result<Vec<String>, GoogleApiError> {
            self.record(format!("list_messages:{}:{}", label, max_results));
            Ok(self.inbox.lock().expect("inbox").clone())
        }

        async fn message_metadata(
            &self,
            _token: &str,
            message_id: &str,
        ) -> Result<GmailMessage, GoogleApiError> {
            self.record(format!("metadata:{}", message_id));
            if message_id.starts_with("broken") {
                return Err(GoogleApiError::Status {
                    status: 500,
                    message: "backend error".into(),
                });
            }
            Ok(GmailMessage {
                id: message_id.to_string(),
                snippet: "Bonjour".to_string(),
                subject: Some("Admission".to_string()),
                from: None,
                date: None,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fake::FakeGoogleApi;
    use super::*;
    use crate::config::default_google_scopes;
    use crate::google::api::GoogleApiError;
    use crate::ids::DeadlineId;
    use crate::store::MemoryStore;
    use axum::http::StatusCode;

    fn config() -> GoogleConfig {
        GoogleConfig {
            client_id: "client".into(),
            client_secret: "secret".into(),
            redirect_uri: "http://localhost:3000/google/callback".into(),
            scopes: default_google_scopes(),
        }
    }

    fn service() -> (GoogleService, Arc<FakeGoogleApi>, Arc<MemoryStore>) {
        let api = Arc::new(FakeGoogleApi::default());
        let store = Arc::new(MemoryStore::default());
        let service = GoogleService::new(config(), api.clone(), store.clone());
        (service, api, store)
    }

    fn grant(refresh: Option<&str>) -> TokenGrant {
        TokenGrant {
            access_token: "access-1".into(),
            refresh_token: refresh.map(str::to_string),
            scope: None,
            token_type: None,
            expires_in: Some(3600),
        }
    }

    fn connect(store: &MemoryStore, user: &UserId, expiry: Option<DateTime<Utc>>, calendar: Option<&str>) {
        store
            .upsert(GoogleCredential {
                user_id: user.clone(),
                access_token: "stored-access".into(),
                refresh_token: "stored-refresh".into(),
                scope: "calendar".into(),
                token_type: "Bearer".into(),
                expiry_date: expiry,
                calendar_id: calendar.map(str::to_string),
                updated_at: Utc::now(),
            })
            .expect("store credential");
    }

    fn deadline(id: &str) -> CalendarDeadline {
        CalendarDeadline {
            id: DeadlineId::from(id),
            title: "Oral".into(),
            due_at: Utc::now() + Duration::days(10),
            candidature_id: None,
        }
    }

    #[test]
    fn auth_url_requests_offline_consent() {
        let (service, _, _) = service();
        let url = Url::parse(&service.auth_url().expect("url")).expect("valid url");
        let params: std::collections::HashMap<_, _> = url.query_pairs().into_owned().collect();
        assert_eq!(params["access_type"], "offline");
        assert_eq!(params["prompt"], "consent");
        assert_eq!(params["client_id"], "client");
        assert!(params["scope"].contains("gmail.compose"));
    }

    #[tokio::test]
    async fn exchange_requires_refresh_token() {
        let (service, api, _) = service();
        *api.grant.lock().unwrap() = grant(None);
        let user = UserId::from("usr_1");

        let err = service
            .exchange_code(&user, "code-1", Utc::now())
            .await
            .expect_err("refresh token required");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert!(!service.is_connected(&user).unwrap());
    }

    #[tokio::test]
    async fn exchange_stores_credential_with_defaults() {
        let (service, api, _) = service();
        *api.grant.lock().unwrap() = grant(Some("refresh-1"));
        let user = UserId::from("usr_1");

        let connected = service
            .exchange_code(&user, "code-1", Utc::now())
            .await
            .expect("exchange");
        assert!(connected.connected);

        let status = service.status(&user).expect("status");
        assert!(status.connected);
        assert_eq!(status.scopes.expect("scopes").len(), 5);
        assert!(status.expiry_date.is_some());
    }

    #[tokio::test]
    async fn missing_credential_is_a_bad_request() {
        let (service, _, _) = service();
        let err = service
            .list_inbox(&UserId::from("usr_x"), Utc::now())
            .await
            .expect_err("not connected");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), NOT_CONNECTED);
    }

    #[tokio::test]
    async fn stale_tokens_are_refreshed_keeping_refresh_token() {
        let (service, api, store) = service();
        let user = UserId::from("usr_1");
        connect(&store, &user, None, Some("cal-1"));
        *api.grant.lock().unwrap() = grant(None);

        service
            .send_email(&user, "a@b.fr", "Hi", "Text", Utc::now())
            .await
            .expect("send");

        assert_eq!(api.calls(), vec!["refresh:stored-refresh", "send:access-1"]);
        let stored = store.find_by_user(&user).unwrap().expect("credential");
        assert_eq!(stored.refresh_token, "stored-refresh");
        assert_eq!(stored.access_token, "access-1");
        assert_eq!(stored.calendar_id.as_deref(), Some("cal-1"));
    }

    #[tokio::test]
    async fn empty_sync_makes_no_calls() {
        let (service, api, _) = service();
        let synced = service
            .sync_deadlines(&UserId::from("usr_1"), &[], Utc::now())
            .await
            .expect("sync");
        assert_eq!(synced.synced, 0);
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn sync_creates_calendar_and_falls_back_to_insert() {
        let (service, api, store) = service();
        let user = UserId::from("usr_1");
        connect(&store, &user, Some(Utc::now() + Duration::hours(1)), Some("cal-gone"));
        *api.patch_error.lock().unwrap() = Some(GoogleApiError::Status {
            status: 404,
            message: "Not Found".into(),
        });
        api.insert_errors.lock().unwrap().push(GoogleApiError::Status {
            status: 400,
            message: "Invalid resource id value.".into(),
        });

        let first = deadline("ddl_1");
        let synced = service
            .sync_deadlines(&user, &[first.clone()], Utc::now())
            .await
            .expect("sync");

        assert_eq!(synced.synced, 1);
        let id = event_id(&first);
        assert_eq!(
            api.calls(),
            vec![
                "get_calendar:cal-gone".to_string(),
                "create_calendar:DossierTracker".to_string(),
                format!("patch:{}", id),
                format!("insert:{}", id),
                "insert:-".to_string(),
            ]
        );
        let stored = store.find_by_user(&user).unwrap().expect("credential");
        assert_eq!(stored.calendar_id.as_deref(), Some("cal-new"));
    }

    #[tokio::test]
    async fn failing_events_are_not_counted() {
        let (service, api, store) = service();
        let user = UserId::from("usr_1");
        connect(&store, &user, Some(Utc::now() + Duration::hours(1)), Some("cal-1"));
        *api.calendar_exists.lock().unwrap() = true;
        *api.patch_error.lock().unwrap() = Some(GoogleApiError::Status {
            status: 403,
            message: "Forbidden".into(),
        });

        let synced = service
            .sync_deadlines(&user, &[deadline("ddl_1"), deadline("ddl_2")], Utc::now())
            .await
            .expect("sync");
        assert_eq!(synced.synced, 0);
    }

    #[tokio::test]
    async fn purge_deletes_tagged_events_only_with_calendar() {
        let (service, api, store) = service();
        let user = UserId::from("usr_1");
        let fresh = Some(Utc::now() + Duration::hours(1));
        connect(&store, &user, fresh, None);

        let purged = service.purge_events(&user, Utc::now()).await.expect("purge");
        assert_eq!(purged.deleted, 0);
        assert!(api.calls().is_empty());

        connect(&store, &user, fresh, Some("cal-1"));
        *api.tagged_events.lock().unwrap() = vec!["evt1".into(), "evt2".into()];
        let purged = service.purge_events(&user, Utc::now()).await.expect("purge");
        assert_eq!(purged.deleted, 2);
        assert_eq!(api.calls()[0], "list_events:source=dossiertracker");
    }

    #[tokio::test]
    async fn drafts_are_validated_before_any_call() {
        let (service, api, store) = service();
        let user = UserId::from("usr_1");
        connect(&store, &user, Some(Utc::now() + Duration::hours(1)), None);

        let invalid = CreateDraftRequest {
            to: "not-an-email".into(),
            subject: "Hello".into(),
            text: "Body".into(),
        };
        let err = service
            .create_draft(&user, invalid, Utc::now())
            .await
            .expect_err("invalid address");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let too_long = CreateDraftRequest {
            to: "a@b.fr".into(),
            subject: "x".repeat(121),
            text: "Body".into(),
        };
        assert!(service.create_draft(&user, too_long, Utc::now()).await.is_err());
        assert!(api.calls().is_empty());

        let ok = CreateDraftRequest {
            to: "a@b.fr".into(),
            subject: "Hello".into(),
            text: "Body".into(),
        };
        let draft = service.create_draft(&user, ok, Utc::now()).await.expect("draft");
        assert_eq!(draft.draft_id, "draft-1");
    }

    #[tokio::test]
    async fn inbox_skips_unreadable_messages() {
        let (service, api, store) = service();
        let user = UserId::from("usr_1");
        connect(&store, &user, Some(Utc::now() + Duration::hours(1)), None);
        *api.inbox.lock().unwrap() = vec!["m1".into(), "broken-2".into(), "m3".into()];

        let messages = service.list_inbox(&user, Utc::now()).await.expect("inbox");
        let ids: Vec<&str> = messages.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["m1", "m3"]);
        assert_eq!(api.calls()[0], "list_messages:INBOX:10");
    }
}
