use std::sync::Arc;

use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;

use super::domain::{AuthSession, LoginRequest, SignupRequest, UpdateProfileRequest, UserProfile};
use super::extract::AuthUser;
use super::service::AuthService;
use super::token::TokenSigner;
use crate::error::ServiceError;

/// `/auth` endpoints: signup, login and the caller's profile.
pub fn auth_router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
    Arc<AuthService>: FromRef<S>,
    Arc<TokenSigner>: FromRef<S>,
{
    Router::new()
        .route("/auth/signup", post(signup_handler))
        .route("/auth/login", post(login_handler))
        .route("/auth/me", get(me_handler).patch(update_me_handler))
}

async fn signup_handler(
    State(service): State<Arc<AuthService>>,
    Json(request): Json<SignupRequest>,
) -> Result<(StatusCode, Json<AuthSession>), ServiceError> {
    let session = service.signup(request, Utc::now()).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

async fn login_handler(
    State(service): State<Arc<AuthService>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthSession>, ServiceError> {
    service.login(request, Utc::now()).await.map(Json)
}

async fn me_handler(
    State(service): State<Arc<AuthService>>,
    user: AuthUser,
) -> Result<Json<UserProfile>, ServiceError> {
    service.me(&user.user_id).map(Json)
}

async fn update_me_handler(
    State(service): State<Arc<AuthService>>,
    user: AuthUser,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<UserProfile>, ServiceError> {
    service.update_profile(&user.user_id, request).map(Json)
}
