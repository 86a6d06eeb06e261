//! Shared router state and the composed API router.

use std::sync::Arc;

use axum::extract::FromRef;
use axum::Router;

use crate::auth::{auth_router, AuthService, TokenError, TokenSigner};
use crate::candidatures::{candidatures_router, CandidatureService};
use crate::catalog::{catalog_router, CatalogService};
use crate::config::AuthConfig;
use crate::google::{google_router, GoogleHandle, GoogleService};
use crate::notifications::Mailer;
use crate::reminders::{reminders_router, EmailRouter, GmailOutbox, ReminderService};
use crate::store::MemoryStore;

#[derive(Clone)]
pub struct ApiState {
    pub auth: Arc<AuthService>,
    pub catalog: Arc<CatalogService>,
    pub candidatures: Arc<CandidatureService>,
    pub reminders: Arc<ReminderService>,
    pub google: GoogleHandle,
    pub tokens: Arc<TokenSigner>,
}

impl ApiState {
    /// Wires every service over one store. A configured Google integration
    /// doubles as the calendar target and the preferred email transport.
    pub fn new(
        store: Arc<MemoryStore>,
        auth: &AuthConfig,
        reminder_batch_size: usize,
        google: Option<Arc<GoogleService>>,
        smtp: Option<Arc<dyn Mailer>>,
    ) -> Result<Self, TokenError> {
        let tokens = Arc::new(TokenSigner::from_config(auth)?);

        let mut candidatures =
            CandidatureService::new(store.clone(), store.clone(), store.clone());
        if let Some(google) = &google {
            candidatures = candidatures.with_calendar(google.clone());
        }

        let gmail = google
            .clone()
            .map(|google| google as Arc<dyn GmailOutbox>);
        let delivery = Arc::new(EmailRouter::new(gmail, smtp));
        let reminders = ReminderService::new(
            store.clone(),
            store.clone(),
            store.clone(),
            delivery,
            reminder_batch_size,
        );

        Ok(Self {
            auth: Arc::new(AuthService::new(
                store.clone(),
                tokens.clone(),
                auth.bcrypt_cost,
            )),
            catalog: Arc::new(CatalogService::new(store)),
            candidatures: Arc::new(candidatures),
            reminders: Arc::new(reminders),
            google,
            tokens,
        })
    }
}

impl FromRef<ApiState> for Arc<AuthService> {
    fn from_ref(state: &ApiState) -> Self {
        state.auth.clone()
    }
}

impl FromRef<ApiState> for Arc<CatalogService> {
    fn from_ref(state: &ApiState) -> Self {
        state.catalog.clone()
    }
}

impl FromRef<ApiState> for Arc<CandidatureService> {
    fn from_ref(state: &ApiState) -> Self {
        state.candidatures.clone()
    }
}

impl FromRef<ApiState> for Arc<ReminderService> {
    fn from_ref(state: &ApiState) -> Self {
        state.reminders.clone()
    }
}

impl FromRef<ApiState> for GoogleHandle {
    fn from_ref(state: &ApiState) -> Self {
        state.google.clone()
    }
}

impl FromRef<ApiState> for Arc<TokenSigner> {
    fn from_ref(state: &ApiState) -> Self {
        state.tokens.clone()
    }
}

pub fn api_router(state: ApiState) -> Router {
    Router::new()
        .merge(auth_router())
        .merge(catalog_router())
        .merge(candidatures_router())
        .merge(reminders_router())
        .merge(google_router())
        .with_state(state)
}
