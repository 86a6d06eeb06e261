use std::sync::Arc;

use axum::extract::{FromRef, FromRequestParts};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use chrono::Utc;

use super::domain::UserRole;
use super::token::TokenSigner;
use crate::error::ServiceError;
use crate::ids::UserId;

/// Caller identity resolved from an `Authorization: Bearer` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: UserId,
    pub role: UserRole,
}

impl AuthUser {
    pub fn require_admin(&self) -> Result<(), ServiceError> {
        if self.role.is_admin() {
            Ok(())
        } else {
            Err(ServiceError::forbidden())
        }
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    Arc<TokenSigner>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let signer = Arc::<TokenSigner>::from_ref(state);
        let token = bearer_token(parts).ok_or_else(unauthorized)?;
        let claims = signer.verify(token, Utc::now()).map_err(|err| {
            tracing::debug!(error = %err, "rejected access token");
            unauthorized()
        })?;

        Ok(AuthUser {
            user_id: claims.sub,
            role: claims.role,
        })
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

fn unauthorized() -> ServiceError {
    ServiceError::Unauthorized("Unauthorized".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts(header: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/auth/me");
        if let Some(value) = header {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(()).expect("request").into_parts().0
    }

    #[test]
    fn bearer_token_requires_scheme_and_value() {
        assert_eq!(bearer_token(&parts(Some("Bearer abc.def.ghi"))), Some("abc.def.ghi"));
        assert_eq!(bearer_token(&parts(Some("bearer  xyz"))), Some("xyz"));
        assert_eq!(bearer_token(&parts(Some("Basic abc"))), None);
        assert_eq!(bearer_token(&parts(Some("Bearer "))), None);
        assert_eq!(bearer_token(&parts(None)), None);
    }

    #[tokio::test]
    async fn extractor_resolves_signed_tokens() {
        let signer = Arc::new(
            TokenSigner::new("test", chrono::Duration::hours(1)).expect("signer"),
        );
        let token = signer
            .sign(&UserId::from("usr_1"), UserRole::CampusAdmin, Utc::now())
            .expect("token");

        let mut request = parts(Some(&format!("Bearer {token}")));
        let user = AuthUser::from_request_parts(&mut request, &signer)
            .await
            .expect("authorized");
        assert_eq!(user.user_id, UserId::from("usr_1"));
        assert!(user.require_admin().is_ok());

        let mut anonymous = parts(None);
        let err = AuthUser::from_request_parts(&mut anonymous, &signer)
            .await
            .expect_err("missing header");
        assert_eq!(err.status(), axum::http::StatusCode::UNAUTHORIZED);
    }
}
