//! HTTP API gateway for stepwise.
//!
//! Exposes one planning step per `POST /v1/planning`, the known-model
//! listing at `GET /v1/models`, and an unauthenticated `GET /health`.
//!
//! Built on Axum for high performance async HTTP.

pub mod error;
pub mod session;

use axum::extract::DefaultBodyLimit;
use axum::extract::rejection::JsonRejection;
use axum::{
    Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    middleware,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use serde::Serialize;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use stepwise_agent::{PlanningService, RequestScope};
use stepwise_config::AppConfig;
use stepwise_core::credential::Credential;
use stepwise_core::error::Error;
use stepwise_core::model::ModelSpec;
use stepwise_core::planning::{PlanningRequest, PlanningResponse};
use stepwise_core::provider::Provider;

pub use error::ApiError;
pub use session::{SessionValidator, StaticSessionValidator};

/// Largest accepted request body.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Shared application state for the gateway.
pub struct GatewayState {
    pub planner: Arc<PlanningService>,
    /// Used for model listing.
    pub provider: Arc<dyn Provider>,
    /// Server credential for callers that send none.
    pub fallback_key: Option<Credential>,
}

pub type SharedState = Arc<GatewayState>;

impl GatewayState {
    /// Build providers and the planning service once; every request
    /// shares them.
    pub fn from_config(config: &AppConfig) -> Self {
        let stack = stepwise_providers::build_from_config(config);
        let planner =
            PlanningService::from_config(config, stack.provider.clone(), stack.token_gateway);
        Self {
            planner: Arc::new(planner),
            provider: stack.provider,
            fallback_key: config
                .api_key
                .as_deref()
                .filter(|k| !k.is_empty())
                .map(Credential::new),
        }
    }
}

/// Build the Axum router with all gateway routes.
///
/// - Session validation on all /v1 routes
/// - Request body size limit (1 MB)
/// - HTTP trace logging
pub fn build_router(state: SharedState, sessions: Arc<dyn SessionValidator>) -> Router {
    let v1 = Router::new()
        .route("/planning", post(planning_handler))
        .route("/models", get(models_handler))
        .layer(middleware::from_fn_with_state(
            sessions,
            session::session_middleware,
        ))
        .with_state(state);

    Router::new()
        .route("/health", get(health_handler))
        .nest("/v1", v1)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
}

/// Start the gateway HTTP server.
pub async fn start(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);

    if !config.has_api_key() {
        warn!("No server API key configured; callers must send their own key");
    }

    let state = Arc::new(GatewayState::from_config(&config));
    let sessions: Arc<dyn SessionValidator> = Arc::new(StaticSessionValidator::new(
        config.gateway.session_tokens.clone(),
    ));
    let app = build_router(state, sessions);

    info!(addr = %addr, model = %config.default_model, "Gateway starting");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

// --- Handlers ---

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn planning_handler(
    State(state): State<SharedState>,
    payload: Result<Json<PlanningRequest>, JsonRejection>,
) -> Result<Json<PlanningResponse>, Response> {
    let Json(request) = payload.map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            rejection.into_response()
        } else {
            ApiError(Error::InvalidRequest(rejection.body_text())).into_response()
        }
    })?;

    // The step is cancelled if the client goes away and this future is dropped.
    let cancel = CancellationToken::new();
    let _disconnect = cancel.clone().drop_guard();

    let response = state
        .planner
        .plan(RequestScope::with_cancel(cancel), request)
        .await
        .map_err(|e| ApiError(e).into_response())?;
    Ok(Json(response))
}

async fn models_handler(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> Result<Json<Vec<ModelSpec>>, ApiError> {
    let credential = headers
        .get("X-Api-Key")
        .and_then(|v| v.to_str().ok())
        .filter(|k| !k.is_empty())
        .map(Credential::new)
        .or_else(|| state.fallback_key.clone())
        .ok_or(ApiError(Error::Unauthorized))?;

    let models = stepwise_providers::list_known_models(
        state.provider.as_ref(),
        state.planner.catalog(),
        &credential,
    )
    .await?;
    Ok(Json(models))
}
