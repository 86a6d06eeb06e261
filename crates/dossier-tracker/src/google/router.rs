use std::sync::Arc;

use axum::{
    extract::{FromRef, State},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;

use super::domain::{
    AuthUrl, Connected, CreateDraftRequest, DraftCreated, ExchangeCodeRequest, GmailMessage,
    GoogleStatus, Purged, SyncDeadlinesRequest, Synced,
};
use super::service::GoogleService;
use crate::auth::{AuthUser, TokenSigner};
use crate::error::ServiceError;

/// Handle on the Google integration; `None` when OAuth is not configured.
pub type GoogleHandle = Option<Arc<GoogleService>>;

/// `/google` endpoints. Every route answers 503 while the integration is off.
pub fn google_router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
    GoogleHandle: FromRef<S>,
    Arc<TokenSigner>: FromRef<S>,
{
    Router::new()
        .route("/google/oauth/url", get(auth_url_handler))
        .route("/google/oauth/exchange", post(exchange_handler))
        .route("/google/status", get(status_handler))
        .route("/google/calendar/sync-deadlines", post(sync_handler))
        .route("/google/calendar/purge-dossiertracker", post(purge_handler))
        .route("/google/gmail/messages", get(inbox_handler))
        .route("/google/gmail/drafts", post(draft_handler))
}

fn configured(handle: GoogleHandle) -> Result<Arc<GoogleService>, ServiceError> {
    handle.ok_or_else(|| ServiceError::Unavailable("Google integration is not configured".into()))
}

async fn auth_url_handler(
    State(google): State<GoogleHandle>,
    _user: AuthUser,
) -> Result<Json<AuthUrl>, ServiceError> {
    let url = configured(google)?.auth_url()?;
    Ok(Json(AuthUrl { url }))
}

async fn exchange_handler(
    State(google): State<GoogleHandle>,
    user: AuthUser,
    Json(request): Json<ExchangeCodeRequest>,
) -> Result<Json<Connected>, ServiceError> {
    configured(google)?
        .exchange_code(&user.user_id, &request.code, Utc::now())
        .await
        .map(Json)
}

async fn status_handler(
    State(google): State<GoogleHandle>,
    user: AuthUser,
) -> Result<Json<GoogleStatus>, ServiceError> {
    configured(google)?.status(&user.user_id).map(Json)
}

async fn sync_handler(
    State(google): State<GoogleHandle>,
    user: AuthUser,
    Json(request): Json<SyncDeadlinesRequest>,
) -> Result<Json<Synced>, ServiceError> {
    configured(google)?
        .sync_deadlines(&user.user_id, &request.deadlines, Utc::now())
        .await
        .map(Json)
}

async fn purge_handler(
    State(google): State<GoogleHandle>,
    user: AuthUser,
) -> Result<Json<Purged>, ServiceError> {
    configured(google)?
        .purge_events(&user.user_id, Utc::now())
        .await
        .map(Json)
}

async fn inbox_handler(
    State(google): State<GoogleHandle>,
    user: AuthUser,
) -> Result<Json<Vec<GmailMessage>>, ServiceError> {
    configured(google)?
        .list_inbox(&user.user_id, Utc::now())
        .await
        .map(Json)
}

async fn draft_handler(
    State(google): State<GoogleHandle>,
    user: AuthUser,
    Json(request): Json<CreateDraftRequest>,
) -> Result<Json<DraftCreated>, ServiceError> {
    configured(google)?
        .create_draft(&user.user_id, request, Utc::now())
        .await
        .map(Json)
}
