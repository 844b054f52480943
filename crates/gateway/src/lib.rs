//! HTTP API gateway for prepwise.
//!
//! Exposes a health check and the v1 API: allocation, plan requests,
//! stored plans, progress tracking, and the admin workflow that renders the
//! producer prompt and accepts its curriculum.
//!
//! Built on Axum.

pub mod api_v1;

use axum::extract::DefaultBodyLimit;
use axum::{
    Router,
    extract::State,
    http::{HeaderValue, Method, StatusCode, header},
    middleware::Next,
    response::Json,
    routing::get,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{info, warn};

use prepwise_config::AppConfig;
use prepwise_core::syllabus::Syllabus;
use prepwise_planner::DayRange;

pub use api_v1::{ApiV1State, SharedApiState};

/// Origin of the web frontend during development.
const DEV_FRONTEND_ORIGIN: &str = "http://localhost:3000";

/// Build the full router: `/health` plus the v1 API under `/v1`.
///
/// Layers applied:
/// - Bearer token authentication on `/v1/admin` routes
/// - CORS limited to the frontend origin
/// - Request body size limit
/// - HTTP trace logging
pub fn build_full_router(state: SharedApiState, max_body_bytes: usize) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::exact(HeaderValue::from_static(
            DEV_FRONTEND_ORIGIN,
        )))
        .allow_methods([Method::GET, Method::POST, Method::PATCH])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .max_age(std::time::Duration::from_secs(3600));

    Router::new()
        .route("/health", get(health_handler))
        .with_state(state.clone())
        .nest("/v1", api_v1::v1_router(state))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(cors)
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

/// Assemble the shared API state from configuration.
pub fn build_state(config: &AppConfig) -> Result<SharedApiState, Box<dyn std::error::Error>> {
    let syllabus = Syllabus::load_or_builtin(config.planner.syllabus_path.as_deref())?;
    for warning in syllabus.validate() {
        warn!(%warning, "Syllabus data-quality warning");
    }

    let store = prepwise_store::build_from_config(&config.store);

    Ok(Arc::new(ApiV1State {
        syllabus: Arc::new(syllabus),
        day_range: DayRange::new(config.planner.min_days, config.planner.max_days),
        store,
        admin_tokens: config.gateway.admin_tokens.clone(),
        start_time: chrono::Utc::now(),
    }))
}

/// Start the gateway HTTP server.
pub async fn start(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);
    let state = build_state(&config)?;

    if state.admin_tokens.is_empty() {
        warn!("No admin tokens configured; /v1/admin routes are open to any caller");
    }

    let app = build_full_router(state.clone(), config.gateway.max_body_bytes);

    info!(
        addr = %addr,
        exam = %state.syllabus.exam,
        subjects = state.syllabus.subjects.len(),
        store = state.store.name(),
        "Gateway starting"
    );
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// --- Handlers ---

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    uptime_secs: i64,
}

async fn health_handler(State(state): State<SharedApiState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        uptime_secs: (chrono::Utc::now() - state.start_time).num_seconds(),
    })
}

/// Authentication middleware for `/v1/admin`.
///
/// Requires a valid `Authorization: Bearer <token>` header when any admin
/// token is configured. With none configured every request passes.
pub(crate) async fn auth_middleware(
    State(state): State<SharedApiState>,
    req: axum::extract::Request,
    next: Next,
) -> Result<axum::response::Response, StatusCode> {
    if state.admin_tokens.is_empty() {
        return Ok(next.run(req).await);
    }

    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    match auth_header {
        Some(token) if state.admin_tokens.iter().any(|t| t == token) => Ok(next.run(req).await),
        _ => {
            warn!(path = %req.uri().path(), "Unauthorized admin request: missing or invalid bearer token");
            Err(StatusCode::UNAUTHORIZED)
        }
    }
}
