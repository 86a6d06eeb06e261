use chrono::{DateTime, Utc};
use dossier_tracker::auth::domain::SignupRequest;
use dossier_tracker::candidatures::CreateCandidatureRequest;
use dossier_tracker::catalog::{CatalogSeed, SeedDemoAccount};
use dossier_tracker::config::AppConfig;
use dossier_tracker::error::{AppError, ServiceError};
use dossier_tracker::google::{GoogleService, HttpGoogleApi};
use dossier_tracker::http::ApiState;
use dossier_tracker::notifications::{Mailer, SmtpMailer};
use dossier_tracker::rankings::{ingest_leaderboard, load_payload};
use dossier_tracker::store::MemoryStore;
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::{info, warn};

const DEMO_CATALOG: &str = include_str!("../data/demo_catalog.json");

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Store and services shared by the HTTP server and the reminder loop.
pub(crate) struct Wiring {
    pub(crate) store: Arc<MemoryStore>,
    pub(crate) api: ApiState,
}

pub(crate) fn load_seed(config: &AppConfig) -> Result<CatalogSeed, AppError> {
    let seed = match &config.catalog_seed_path {
        Some(path) => {
            info!(path = %path.display(), "loading catalog seed");
            CatalogSeed::from_path(path)?
        }
        None => CatalogSeed::from_json(DEMO_CATALOG)?,
    };
    Ok(seed)
}

/// Builds the in-memory store, applies the catalog seed and wires every
/// service, including the optional Google and SMTP adapters.
pub(crate) async fn build(config: &AppConfig, now: DateTime<Utc>) -> Result<Wiring, AppError> {
    let store = Arc::new(MemoryStore::default());
    let seed = load_seed(config)?;
    seed.apply(store.as_ref(), now)?;

    let google = config.google.as_ref().map(|google| {
        info!("google integration enabled");
        Arc::new(GoogleService::new(
            google.clone(),
            Arc::new(HttpGoogleApi::new(google)),
            store.clone(),
        ))
    });

    let smtp = match &config.smtp {
        Some(smtp) => {
            info!(host = %smtp.host, port = smtp.port, "smtp relay enabled");
            Some(Arc::new(SmtpMailer::from_config(smtp)?) as Arc<dyn Mailer>)
        }
        None => None,
    };

    let api = ApiState::new(
        store.clone(),
        &config.auth,
        config.reminders.batch_size,
        google,
        smtp,
    )?;

    if let Some(demo) = &seed.demo {
        if let Err(err) = enroll_demo(&api, demo, now).await {
            warn!(email = %demo.email, error = %err, "demo account not enrolled");
        }
    }

    Ok(Wiring { store, api })
}

/// Signs the demo account up and opens a candidature on its program.
async fn enroll_demo(
    api: &ApiState,
    demo: &SeedDemoAccount,
    now: DateTime<Utc>,
) -> Result<(), ServiceError> {
    let session = api
        .auth
        .signup(
            SignupRequest {
                email: demo.email.clone(),
                password: demo.password.clone(),
                first_name: demo.first_name.clone(),
                last_name: demo.last_name.clone(),
                role: None,
            },
            now,
        )
        .await?;

    let Some(slug) = &demo.program_slug else {
        return Ok(());
    };
    let detail = api.catalog.get_program(slug)?;
    let contest_id = detail
        .program
        .contest_id
        .clone()
        .ok_or_else(|| ServiceError::validation("demo program has no contest"))?;

    let mut request = CreateCandidatureRequest::for_contest(contest_id);
    request.school_id = Some(detail.program.school_id.clone());
    request.program_id = Some(detail.program.id.clone());
    request.diploma_name = Some(detail.program.name.clone());
    let view = api
        .candidatures
        .create(&session.user_id, request, now)
        .await?;

    info!(
        user_id = %session.user_id,
        candidature_id = %view.candidature.id,
        tasks = view.tasks.len(),
        "demo account enrolled"
    );
    Ok(())
}

/// Imports leaderboard JSON files into the catalog before serving.
pub(crate) fn preload_rankings(
    store: &MemoryStore,
    paths: &[PathBuf],
    now: DateTime<Utc>,
) -> Result<(), AppError> {
    for path in paths {
        let payload = load_payload(path, None)?;
        let summary = ingest_leaderboard(store, &payload, now)?;
        info!(
            path = %path.display(),
            leaderboard = %summary.slug,
            entries = summary.entries,
            "ranking preloaded"
        );
    }
    Ok(())
}
