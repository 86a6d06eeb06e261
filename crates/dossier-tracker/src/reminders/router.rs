use std::sync::Arc;

use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::Utc;

use super::domain::{CreateReminderRequest, ReminderView};
use super::service::ReminderService;
use crate::auth::{AuthUser, TokenSigner};
use crate::error::ServiceError;

pub fn reminders_router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
    Arc<ReminderService>: FromRef<S>,
    Arc<TokenSigner>: FromRef<S>,
{
    Router::new().route("/reminders", get(list_handler).post(create_handler))
}

async fn list_handler(
    State(service): State<Arc<ReminderService>>,
    user: AuthUser,
) -> Result<Json<Vec<ReminderView>>, ServiceError> {
    service.list_for_user(&user.user_id).map(Json)
}

async fn create_handler(
    State(service): State<Arc<ReminderService>>,
    user: AuthUser,
    Json(request): Json<CreateReminderRequest>,
) -> Result<(StatusCode, Json<ReminderView>), ServiceError> {
    let view = service.create(&user.user_id, request, Utc::now())?;
    Ok((StatusCode::CREATED, Json(view)))
}
