//! Axum router for ingest and search.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Request, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use secrecy::{ExposeSecret, SecretString};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::schema::{
    ErrorEnvelope, HealthResponse, SearchRequest, SearchResponse, validate_ingest, validate_search,
};
use crate::config::Settings;
use crate::documents::IngestOutcome;
use crate::engine::{BrandMemory, IngestRequest};
use crate::error::BrandMemoryError;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    memory: Arc<BrandMemory>,
    api_token: Option<Arc<SecretString>>,
}

impl AppState {
    pub fn new(memory: Arc<BrandMemory>) -> Self {
        Self {
            memory,
            api_token: None,
        }
    }

    /// Require this token on `/v1` routes. Blank tokens leave auth off.
    pub fn with_api_token(mut self, token: Option<String>) -> Self {
        self.api_token = token
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .map(|t| Arc::new(SecretString::new(t)));
        self
    }
}

/// Error response wrapper.
#[derive(Debug)]
pub struct ApiError(BrandMemoryError);

impl From<BrandMemoryError> for ApiError {
    fn from(error: BrandMemoryError) -> Self {
        Self(error)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(BrandMemoryError::Validation(rejection.body_text()))
    }
}

/// HTTP status for each error category.
pub fn status_for(error: &BrandMemoryError) -> StatusCode {
    match error {
        BrandMemoryError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        BrandMemoryError::Backend { .. } => StatusCode::BAD_GATEWAY,
        BrandMemoryError::Configuration(_) | BrandMemoryError::Persistence(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        if status.is_server_error() {
            tracing::error!("[http] {status}: {}", self.0);
        } else {
            crate::debug_event!("http", "rejected", "{status}: {}", self.0);
        }
        (status, Json(ErrorEnvelope::new(self.0.kind(), self.0.to_string()))).into_response()
    }
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorEnvelope::new(
            "unauthorized",
            "missing or invalid API token",
        )),
    )
        .into_response()
}

/// Token presented as `Authorization: Bearer ...` or `x-api-key`.
///
/// The auth scheme is matched case-insensitively.
fn presented_token(headers: &HeaderMap) -> Option<&str> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().split_once(' '))
        .filter(|(scheme, _)| scheme.eq_ignore_ascii_case("bearer"))
        .map(|(_, token)| token.trim());

    bearer.or_else(|| {
        headers
            .get("x-api-key")
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
    })
}

/// Compare without short-circuiting on the first differing byte.
fn tokens_match(presented: &str, expected: &str) -> bool {
    let (presented, expected) = (presented.as_bytes(), expected.as_bytes());
    presented.len() == expected.len()
        && presented
            .iter()
            .zip(expected)
            .fold(0u8, |diff, (a, b)| diff | (a ^ b))
            == 0
}

async fn require_token(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let Some(expected) = &state.api_token else {
        return next.run(req).await;
    };

    // CORS preflight carries no credentials
    if req.method() == axum::http::Method::OPTIONS {
        return next.run(req).await;
    }

    let authorized = presented_token(req.headers())
        .is_some_and(|token| tokens_match(token, expected.expose_secret()));
    if authorized {
        return next.run(req).await;
    }

    crate::debug_event!("http", "unauthorized", "{} {}", req.method(), req.uri().path());
    unauthorized()
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

async fn ingest(
    State(state): State<AppState>,
    body: Result<Json<IngestRequest>, JsonRejection>,
) -> Result<Json<IngestOutcome>, ApiError> {
    let Json(request) = body?;
    validate_ingest(&request)?;

    let outcome = state.memory.ingest(request).await?;
    Ok(Json(outcome))
}

async fn search(
    State(state): State<AppState>,
    body: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<SearchResponse>, ApiError> {
    let Json(request) = body?;
    validate_search(&request)?;

    let options = request.options(state.memory.search_defaults());
    let matches = state
        .memory
        .search(&request.client_id, &request.query, options)
        .await?;
    Ok(Json(SearchResponse { matches }))
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    let v1 = Router::new()
        .route("/v1/brand/ingest", post(ingest))
        .route("/v1/brand/search", post(search))
        .layer(middleware::from_fn_with_state(state.clone(), require_token));

    Router::new()
        .route("/health", get(health))
        .merge(v1)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("[http] failed to listen for ctrl+c: {e}");
        std::future::pending::<()>().await;
    }
    eprintln!("Received shutdown signal");
}

/// Serve the API until Ctrl+C.
pub async fn serve(settings: &Settings, bind: Option<String>) -> anyhow::Result<()> {
    let bind = bind.unwrap_or_else(|| settings.server.bind.clone());
    let memory = Arc::new(BrandMemory::from_settings(settings)?);
    let state = AppState::new(memory).with_api_token(settings.server.api_token.clone());

    if state.api_token.is_none() {
        tracing::warn!("[http] no server.api_token set, /v1 routes are unauthenticated");
    }

    let listener = tokio::net::TcpListener::bind(&bind).await?;
    crate::log_event!("http", "listening", "{bind}");
    eprintln!("Brand memory API listening on http://{bind}");
    eprintln!("Health check: http://{bind}/health");
    eprintln!("Press Ctrl+C to stop the server");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    eprintln!("HTTP server shut down gracefully");
    Ok(())
}
