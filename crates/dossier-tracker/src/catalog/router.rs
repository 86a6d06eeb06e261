use std::sync::Arc;

use axum::{
    extract::{FromRef, Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;

use super::domain::{
    ContestFilter, ContestView, Deadline, DeadlineFilter, LeaderboardView, ProgramDetail,
    ProgramFilter, ProgramView, SchoolFilter, SchoolView,
};
use super::service::CatalogService;
use crate::auth::{AuthUser, TokenSigner};
use crate::error::ServiceError;
use crate::rankings::{IngestSummary, LeaderboardPayload};

/// Public catalog browsing under `/catalog`, plus the admin ranking import.
pub fn catalog_router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
    Arc<CatalogService>: FromRef<S>,
    Arc<TokenSigner>: FromRef<S>,
{
    Router::new()
        .route("/catalog/contests", get(contests_handler))
        .route("/catalog/schools", get(schools_handler))
        .route("/catalog/programs", get(programs_handler))
        .route("/catalog/programs/:slug", get(program_handler))
        .route("/catalog/deadlines", get(deadlines_handler))
        .route("/catalog/leaderboards", get(leaderboards_handler))
        .route("/catalog/leaderboards/import", post(import_handler))
        .route("/catalog/leaderboards/:slug", get(leaderboard_handler))
}

async fn contests_handler(
    State(service): State<Arc<CatalogService>>,
    Query(filter): Query<ContestFilter>,
) -> Result<Json<Vec<ContestView>>, ServiceError> {
    service.list_contests(&filter).map(Json)
}

async fn schools_handler(
    State(service): State<Arc<CatalogService>>,
    Query(filter): Query<SchoolFilter>,
) -> Result<Json<Vec<SchoolView>>, ServiceError> {
    service.list_schools(&filter).map(Json)
}

async fn programs_handler(
    State(service): State<Arc<CatalogService>>,
    Query(filter): Query<ProgramFilter>,
) -> Result<Json<Vec<ProgramView>>, ServiceError> {
    service.list_programs(&filter).map(Json)
}

async fn program_handler(
    State(service): State<Arc<CatalogService>>,
    Path(slug): Path<String>,
) -> Result<Json<ProgramDetail>, ServiceError> {
    service.get_program(&slug).map(Json)
}

async fn deadlines_handler(
    State(service): State<Arc<CatalogService>>,
    Query(filter): Query<DeadlineFilter>,
) -> Result<Json<Vec<Deadline>>, ServiceError> {
    service.list_deadlines(&filter).map(Json)
}

async fn leaderboards_handler(
    State(service): State<Arc<CatalogService>>,
) -> Result<Json<Vec<LeaderboardView>>, ServiceError> {
    service.list_leaderboards().map(Json)
}

async fn leaderboard_handler(
    State(service): State<Arc<CatalogService>>,
    Path(slug): Path<String>,
) -> Result<Json<LeaderboardView>, ServiceError> {
    service.get_leaderboard(&slug).map(Json)
}

async fn import_handler(
    State(service): State<Arc<CatalogService>>,
    user: AuthUser,
    Json(payload): Json<LeaderboardPayload>,
) -> Result<(StatusCode, Json<IngestSummary>), ServiceError> {
    let summary = service.import_leaderboard(&user, &payload, Utc::now())?;
    Ok((StatusCode::CREATED, Json(summary)))
}
