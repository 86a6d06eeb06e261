use crate::cli::ServeArgs;
use crate::infra::{self, AppState};
use crate::routes::with_operational_routes;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::Method;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use chrono::Utc;
use dossier_tracker::config::AppConfig;
use dossier_tracker::error::AppError;
use dossier_tracker::reminders::spawn_dispatcher;
use dossier_tracker::telemetry;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let now = Utc::now();
    let wiring = infra::build(&config, now).await?;
    infra::preload_rankings(&wiring.store, &args.rankings, now)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let dispatcher = if config.reminders.enabled {
        Some(spawn_dispatcher(
            wiring.api.reminders.clone(),
            config.reminders.poll_interval,
        ))
    } else {
        info!("reminder dispatch disabled");
        None
    };

    let app = with_operational_routes(wiring.api)
        .layer(Extension(app_state))
        .layer(prometheus_layer)
        .layer(cors());

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "dossier tracker api ready");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(handle) = dispatcher {
        handle.abort();
    }
    info!("dossier tracker api stopped");
    Ok(())
}

fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60))
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("received ctrl-c, shutting down"),
        Err(err) => {
            warn!(error = %err, "could not listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    }
}
