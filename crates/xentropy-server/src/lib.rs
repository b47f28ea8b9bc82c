//! HTTP front end for xentropy.
//!
//! Serves bounded random integers as JSON. Generation blocks on the search
//! feed and the rate-limit delay, so each request runs on tokio's blocking
//! pool; concurrent requests share one [`XEntropy`] and therefore one
//! request gate.

use std::sync::Arc;

use axum::{
    Router,
    extract::{Query, State},
    http::StatusCode,
    response::Json,
    routing::get,
};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use xentropy_core::{Draw, XEntropy, XEntropyError};

const DEFAULT_MIN: i64 = 1;
const DEFAULT_MAX: i64 = 100;

/// Shared server state.
struct AppState {
    engine: Arc<XEntropy>,
}

#[derive(Deserialize)]
struct RandomParams {
    min: Option<i64>,
    max: Option<i64>,
}

#[derive(Serialize, Debug, PartialEq)]
struct RandomResponse {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<i64>,
    min: i64,
    max: i64,
    /// Feed requests spent on this draw.
    attempts: u32,
    /// Whether clock fallback entropy went into the seed.
    degraded: bool,
    /// Error message if request failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl RandomResponse {
    fn from_draw(draw: &Draw) -> Self {
        Self {
            success: true,
            value: Some(draw.value),
            min: draw.min,
            max: draw.max,
            attempts: draw.attempts,
            degraded: draw.degraded(),
            error: None,
        }
    }

    fn failure(min: i64, max: i64, error: String) -> Self {
        Self {
            success: false,
            value: None,
            min,
            max,
            attempts: 0,
            degraded: false,
            error: Some(error),
        }
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

/// HTTP status for a failed draw.
fn status_for(e: &XEntropyError) -> StatusCode {
    match e {
        XEntropyError::InvalidRange { .. } | XEntropyError::RangeOverflow { .. } => {
            StatusCode::BAD_REQUEST
        }
        XEntropyError::CollectionTimeout { .. } => StatusCode::SERVICE_UNAVAILABLE,
        XEntropyError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

async fn handle_random(
    State(state): State<Arc<AppState>>,
    Query(params): Query<RandomParams>,
) -> (StatusCode, Json<RandomResponse>) {
    let min = params.min.unwrap_or(DEFAULT_MIN);
    let max = params.max.unwrap_or(DEFAULT_MAX);

    let engine = Arc::clone(&state.engine);
    let result = tokio::task::spawn_blocking(move || engine.generate_detailed(min, max)).await;

    match result {
        Ok(Ok(draw)) => (StatusCode::OK, Json(RandomResponse::from_draw(&draw))),
        Ok(Err(e)) => (
            status_for(&e),
            Json(RandomResponse::failure(min, max, e.to_string())),
        ),
        Err(e) => {
            warn!("generation task failed: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(RandomResponse::failure(
                    min,
                    max,
                    "generation task failed".to_string(),
                )),
            )
        }
    }
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: xentropy_core::VERSION.to_string(),
    })
}

async fn handle_index(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let config = state.engine.config();
    Json(serde_json::json!({
        "name": "XEntropy Server",
        "version": xentropy_core::VERSION,
        "entropy_bits": config.entropy_bits,
        "request_spacing_ms": config.retry.delay.as_millis() as u64,
        "endpoints": {
            "/": "This API index",
            "/api/v1/random": {
                "method": "GET",
                "description": "Random integer in min..=max, seeded from recent post timestamps",
                "params": {
                    "min": format!("Lower bound, inclusive (default: {DEFAULT_MIN})"),
                    "max": format!("Upper bound, inclusive (default: {DEFAULT_MAX})"),
                }
            },
            "/health": "Health check",
        },
        "examples": {
            "die": "/api/v1/random?min=1&max=6",
            "coin": "/api/v1/random?min=0&max=1",
        }
    }))
}

/// Build the axum router.
fn build_router(engine: XEntropy) -> Router {
    let state = Arc::new(AppState {
        engine: Arc::new(engine),
    });

    Router::new()
        .route("/", get(handle_index))
        .route("/api/v1/random", get(handle_random))
        .route("/health", get(handle_health))
        .with_state(state)
}

/// Run the HTTP server until it fails.
pub async fn run_server(engine: XEntropy, host: &str, port: u16) -> std::io::Result<()> {
    let app = build_router(engine);
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("XEntropy server listening on {addr}");
    axum::serve(listener, app).await
}
