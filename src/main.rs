//! Rotabot Backend
//!
//! Slack app managing on-call rotas per channel, backed by SQLite.

mod api;
mod auth;
mod config;
mod db;
mod errors;
mod models;
mod slack;
mod views;

use std::any::Any;
use std::sync::Arc;

use axum::{
    extract::Request,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use sentry::integrations::tracing as sentry_tracing;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::{Config, LogFormat};
use db::Repository;
use errors::{AppError, ErrorResponse};
use slack::{SlackApi, SlackClient};

/// Correlates a request with its logs; generated when the caller sends none.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub slack: Arc<dyn SlackApi>,
    pub config: Arc<Config>,
}

/// Initialize Sentry error tracking and return the guard that must be kept alive.
fn init_sentry(config: &Config) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    Some(guard)
}

/// Warnings and errors become Sentry events, lower levels breadcrumbs.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Sentry must be up before the subscriber so the tracing layer has a client
    let sentry_guard = init_sentry(&config);

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    let json_layer = (config.log_format == LogFormat::Json)
        .then(|| tracing_subscriber::fmt::layer().json().flatten_event(true));
    let text_layer = (config.log_format == LogFormat::Pretty).then(tracing_subscriber::fmt::layer);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    tracing::info!("Starting Rotabot Backend");
    tracing::info!("Database path: {:?}", config.db_path);
    tracing::info!("Bind address: {}", config.bind_addr);
    if config.sentry_dsn.is_none() {
        tracing::warn!("No Sentry DSN configured (ROTABOT_SENTRY_DSN). Error reporting is disabled");
    }

    // Initialize database
    let pool = db::init_database(&config.db_path).await?;
    let repo = Arc::new(Repository::new(pool));

    let slack = Arc::new(SlackClient::new(
        config.bot_token.clone(),
        config.slack_api_base.clone(),
    ));

    // Create application state
    let state = AppState {
        repo,
        slack,
        config: Arc::new(config.clone()),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");

    // Closing the client flushes events still queued for Sentry
    drop(sentry_guard);

    Ok(())
}

/// Wait for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed_to_listen_for_ctrl_c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed_to_listen_for_sigterm");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    let signing_secret = state.config.signing_secret.clone();

    Router::new()
        .route("/slack/commands", post(api::handle_command))
        .route("/slack/events", post(api::handle_event))
        .route("/slack/message_actions", post(api::handle_action))
        .route("/health", get(health_check))
        // Applies to every route; non-Slack paths pass straight through
        .layer(middleware::from_fn(move |req, next| {
            auth::slack_signature_layer(signing_secret.clone(), req, next)
        }))
        .layer(CatchPanicLayer::custom(handle_panic))
        // Outermost last: the request ID is set before the span opens and
        // copied onto the response on the way out.
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default();
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id
                )
            }),
        )
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .with_state(state)
}

/// Answer a panicking handler with the generic 500 envelope.
///
/// Sentry's panic hook has already reported the panic by the time this runs.
fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::info!(panic = detail, "recovered_from_panic");

    let error = AppError::Internal(format!("Handler panicked: {}", detail));
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::new(&error)),
    )
        .into_response()
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
