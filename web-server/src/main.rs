//! MindCheck Web Server
//!
//! Two-screen depression risk questionnaire plus a JSON API.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      MINDCHECK WEB                          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌───────────┐  ┌───────────┐  ┌─────────────────────────┐ │
//! │  │  Pages    │  │  JSON API │  │  Session store          │ │
//! │  │  (Axum)   │  │  /api/v1  │  │  (cookie → Session)     │ │
//! │  └─────┬─────┘  └─────┬─────┘  └─────────────────────────┘ │
//! │        └──────────────┤                                     │
//! │                       ▼                                     │
//! │   Assessor: RecordBuilder → RiskModel → classify            │
//! │                       │                                     │
//! │                       ▼                                     │
//! │                input_data.csv                               │
//! └─────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod error;
mod form;
mod handlers;
mod session;
mod views;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    Router,
    routing::{get, post},
};
use mindcheck_core::{constants, load_model, AuditSink, Assessor, CsvAuditLog, NullAuditSink};
use tower_http::{
    cors::{CorsLayer, Any},
    trace::TraceLayer,
    compression::CompressionLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub use error::{AppError, AppResult};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env();

    // Initialize logging (JSON lines in production)
    let json_logs = config.is_production();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "mindcheck_web=debug,mindcheck_core=info,tower_http=debug".into()))
        .with(json_logs.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json_logs).then(tracing_subscriber::fmt::layer))
        .init();

    tracing::info!("{} v{} starting...", constants::APP_NAME, constants::APP_VERSION);
    tracing::info!("Environment: {}", config.environment);

    // Model is loaded once; the server never starts without it
    let model_path = config.model_path.clone();
    let model = tokio::task::spawn_blocking(move || load_model(&model_path))
        .await
        .context("model loading task failed")?
        .with_context(|| format!("cannot serve without a model ({})", config.model_path.display()))?;

    let audit: Arc<dyn AuditSink> = if config.audit_enabled {
        tracing::info!("Audit log: {}", config.audit_log.display());
        Arc::new(CsvAuditLog::new(&config.audit_log))
    } else {
        tracing::warn!("Audit log disabled");
        Arc::new(NullAuditSink)
    };

    // Build application state
    let state = AppState {
        assessor: Arc::new(Assessor::new(model, audit)),
        sessions: session::SessionStore::new(),
        config: config.clone(),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("🚀 Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub assessor: Arc<Assessor>,
    pub sessions: session::SessionStore,
    pub config: config::Config,
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    // Screens
    let page_routes = Router::new()
        .route("/", get(handlers::pages::landing))
        .route("/start", post(handlers::pages::start))
        .route("/home", post(handlers::pages::home))
        .route("/assess", get(handlers::pages::form).post(handlers::pages::submit));

    // JSON API
    let api_routes = Router::new()
        .route("/health", get(handlers::health::check))
        .route("/api/v1/assess", post(handlers::assess::assess));

    let cors = if state.config.is_production() {
        CorsLayer::new()
    } else {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    };

    // Combine all routes
    Router::new()
        .merge(page_routes)
        .merge(api_routes)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
