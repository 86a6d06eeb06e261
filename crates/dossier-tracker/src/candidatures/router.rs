use std::sync::Arc;

use axum::{
    extract::{FromRef, Path, State},
    http::StatusCode,
    routing::{delete, get, patch, post},
    Json, Router,
};
use chrono::Utc;

use super::domain::{
    CandidatureView, CreateCandidatureRequest, CreateTaskRequest, Deleted, SyncOutcome, TaskView,
    UpdateCandidatureRequest, UpdateTaskStatusRequest,
};
use super::service::CandidatureService;
use crate::auth::{AuthUser, TokenSigner};
use crate::error::ServiceError;
use crate::ids::{CandidatureId, TaskId};

pub fn candidatures_router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
    Arc<CandidatureService>: FromRef<S>,
    Arc<TokenSigner>: FromRef<S>,
{
    Router::new()
        .route("/candidatures", get(list_handler).post(create_handler))
        .route(
            "/candidatures/:id",
            patch(update_handler).delete(delete_handler),
        )
        .route("/candidatures/:id/tasks", post(add_task_handler))
        .route("/candidatures/:id/sync-deadlines", post(sync_handler))
        .route("/candidatures/tasks/:id/status", patch(task_status_handler))
        .route("/candidatures/tasks/:id", delete(delete_task_handler))
}

async fn list_handler(
    State(service): State<Arc<CandidatureService>>,
    user: AuthUser,
) -> Result<Json<Vec<CandidatureView>>, ServiceError> {
    service.list_for_user(&user.user_id).map(Json)
}

async fn create_handler(
    State(service): State<Arc<CandidatureService>>,
    user: AuthUser,
    Json(request): Json<CreateCandidatureRequest>,
) -> Result<(StatusCode, Json<CandidatureView>), ServiceError> {
    let view = service.create(&user.user_id, request, Utc::now()).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

async fn update_handler(
    State(service): State<Arc<CandidatureService>>,
    user: AuthUser,
    Path(id): Path<CandidatureId>,
    Json(request): Json<UpdateCandidatureRequest>,
) -> Result<Json<CandidatureView>, ServiceError> {
    service
        .update(&user.user_id, &id, request, Utc::now())
        .await
        .map(Json)
}

async fn delete_handler(
    State(service): State<Arc<CandidatureService>>,
    user: AuthUser,
    Path(id): Path<CandidatureId>,
) -> Result<Json<Deleted>, ServiceError> {
    service.delete(&user.user_id, &id).map(Json)
}

async fn add_task_handler(
    State(service): State<Arc<CandidatureService>>,
    user: AuthUser,
    Path(id): Path<CandidatureId>,
    Json(request): Json<CreateTaskRequest>,
) -> Result<(StatusCode, Json<TaskView>), ServiceError> {
    let task = service.add_task(&user.user_id, &id, request, Utc::now())?;
    Ok((StatusCode::CREATED, Json(task)))
}

async fn sync_handler(
    State(service): State<Arc<CandidatureService>>,
    user: AuthUser,
    Path(id): Path<CandidatureId>,
) -> Result<Json<SyncOutcome>, ServiceError> {
    service
        .sync_deadlines(&user.user_id, &id, Utc::now())
        .await
        .map(Json)
}

async fn task_status_handler(
    State(service): State<Arc<CandidatureService>>,
    user: AuthUser,
    Path(id): Path<TaskId>,
    Json(request): Json<UpdateTaskStatusRequest>,
) -> Result<Json<TaskView>, ServiceError> {
    service
        .update_task_status(&user.user_id, &id, request.status)
        .map(Json)
}

async fn delete_task_handler(
    State(service): State<Arc<CandidatureService>>,
    user: AuthUser,
    Path(id): Path<TaskId>,
) -> Result<Json<Deleted>, ServiceError> {
    service.delete_task(&user.user_id, &id).map(Json)
}
