use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::domain::{
    AuthSession, LoginRequest, SignupRequest, UpdateProfileRequest, User, UserProfile, UserRole,
};
use super::repository::UserRepository;
use super::token::{TokenError, TokenSigner};
use crate::error::ServiceError;
use crate::ids::UserId;
use crate::store::RepositoryError;

const DUPLICATE_EMAIL: &str = "Email already registered";
const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// Account lifecycle: signup, login and profile edits.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    signer: Arc<TokenSigner>,
    bcrypt_cost: u32,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserRepository>, signer: Arc<TokenSigner>, bcrypt_cost: u32) -> Self {
        Self {
            users,
            signer,
            bcrypt_cost,
        }
    }

    pub fn signer(&self) -> Arc<TokenSigner> {
        Arc::clone(&self.signer)
    }

    pub async fn signup(
        &self,
        request: SignupRequest,
        now: DateTime<Utc>,
    ) -> Result<AuthSession, ServiceError> {
        let email = request.email.trim().to_string();
        if !looks_like_email(&email) {
            return Err(ServiceError::validation("email must be an email"));
        }
        if request.password.is_empty() {
            return Err(ServiceError::validation("password should not be empty"));
        }

        if self.users.find_by_email(&email)?.is_some() {
            return Err(ServiceError::Unauthorized(DUPLICATE_EMAIL.to_string()));
        }

        let cost = self.bcrypt_cost;
        let password = request.password;
        let password_hash = off_runtime(move || bcrypt::hash(password, cost))
            .await?
            .map_err(|err| ServiceError::Internal(format!("password hashing failed: {err}")))?;

        let user = User {
            id: UserId::generate(),
            email,
            password_hash,
            first_name: request.first_name,
            last_name: request.last_name,
            role: request.role.unwrap_or(UserRole::Student),
            created_at: now,
        };

        let user = match self.users.insert(user) {
            Ok(user) => user,
            Err(RepositoryError::Conflict(_)) => {
                return Err(ServiceError::Unauthorized(DUPLICATE_EMAIL.to_string()))
            }
            Err(err) => return Err(err.into()),
        };

        tracing::info!(user_id = %user.id, role = user.role.label(), "user signed up");
        self.session_for(&user, now)
    }

    pub async fn login(
        &self,
        request: LoginRequest,
        now: DateTime<Utc>,
    ) -> Result<AuthSession, ServiceError> {
        let user = self
            .users
            .find_by_email(request.email.trim())?
            .ok_or_else(|| ServiceError::Unauthorized(INVALID_CREDENTIALS.to_string()))?;

        let password = request.password;
        let hash = user.password_hash.clone();
        let valid = off_runtime(move || bcrypt::verify(password, &hash).unwrap_or(false)).await?;
        if !valid {
            return Err(ServiceError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }

        self.session_for(&user, now)
    }

    pub fn me(&self, user_id: &UserId) -> Result<UserProfile, ServiceError> {
        self.users
            .find_by_id(user_id)?
            .map(|user| user.profile())
            .ok_or_else(|| ServiceError::not_found("User not found"))
    }

    pub fn update_profile(
        &self,
        user_id: &UserId,
        request: UpdateProfileRequest,
    ) -> Result<UserProfile, ServiceError> {
        let mut user = self
            .users
            .find_by_id(user_id)?
            .ok_or_else(|| ServiceError::not_found("User not found"))?;

        if let Some(first_name) = request.first_name {
            if first_name.is_empty() {
                return Err(ServiceError::validation(
                    "firstName must be longer than or equal to 1 characters",
                ));
            }
            user.first_name = first_name;
        }
        if let Some(last_name) = request.last_name {
            if last_name.is_empty() {
                return Err(ServiceError::validation(
                    "lastName must be longer than or equal to 1 characters",
                ));
            }
            user.last_name = last_name;
        }

        Ok(self.users.update(user)?.profile())
    }

    fn session_for(&self, user: &User, now: DateTime<Utc>) -> Result<AuthSession, ServiceError> {
        let access_token = self
            .signer
            .sign(&user.id, user.role, now)
            .map_err(token_failure)?;

        Ok(AuthSession {
            access_token,
            user_id: user.id.clone(),
            role: user.role,
        })
    }
}

/// Runs bcrypt work on the blocking pool so request workers keep serving.
async fn off_runtime<T, F>(work: F) -> Result<T, ServiceError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|err| ServiceError::Internal(format!("password worker failed: {err}")))
}

fn token_failure(err: TokenError) -> ServiceError {
    ServiceError::Internal(format!("token signing failed: {err}"))
}

/// Loose address check: a non-empty local part and a dotted domain.
pub(crate) fn looks_like_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !value.chars().any(char::is_whitespace)
        && !domain.contains('@')
        && domain
            .split_once('.')
            .is_some_and(|(head, tail)| !head.is_empty() && !tail.is_empty() && !tail.ends_with('.'))
}
