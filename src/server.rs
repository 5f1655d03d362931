//! HTTP surface: usage page and the `/recommend` endpoint.

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Html;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

use crate::advisor::{create_provider_client, RecommendationAdapter, RecommendationError};
use crate::config::{ErrorPolicy, ServiceConfig};
use crate::data::is_blank;

/// Error text for a missing, unparsable or non-object body.
pub const NO_JSON_ERROR: &str = "No JSON data provided";

/// Error text when either sub-object is missing or empty.
pub const MISSING_INPUTS_ERROR: &str = "Both soil_data and weather_data are required";

/// Error text for faults that escape the adapter.
pub const INTERNAL_ERROR: &str = "Internal server error";

/// Shared, read-only handler state.
#[derive(Clone)]
pub struct AppState {
    adapter: Arc<RecommendationAdapter>,
    error_policy: ErrorPolicy,
}

impl AppState {
    /// Wraps an adapter for sharing across request handlers.
    pub fn new(adapter: RecommendationAdapter, error_policy: ErrorPolicy) -> Self {
        Self {
            adapter: Arc::new(adapter),
            error_policy,
        }
    }

    /// Builds the provider client and adapter described by `config`.
    pub fn from_config(config: &ServiceConfig) -> Result<Self> {
        let client = create_provider_client(&config.provider)
            .context("Failed to initialize provider client")?;
        Ok(Self::new(
            RecommendationAdapter::new(client, config.adapter),
            config.error_policy,
        ))
    }
}

/// Builds the service router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/recommend", post(recommend))
        .with_state(state)
}

/// Binds the configured address and serves until Ctrl-C.
pub async fn serve(config: ServiceConfig) -> Result<()> {
    let state = AppState::from_config(&config)?;
    let metadata = state.adapter.metadata();
    let app = build_router(state);

    let listener = TcpListener::bind((config.host.as_str(), config.port))
        .await
        .with_context(|| format!("Failed to bind {}:{}", config.host, config.port))?;
    let addr = listener
        .local_addr()
        .context("Failed to read listener address")?;

    info!(
        %addr,
        provider = metadata.kind.display_name(),
        model = %metadata.model,
        error_policy = %config.error_policy,
        "agri-advisor listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("agri-advisor stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

async fn home(State(state): State<AppState>) -> Html<String> {
    let title = state.adapter.metadata().kind.service_title();
    Html(format!(
        r#"
    <h1>{title}</h1>
    <p>Send POST requests to <code>/recommend</code> with JSON like:</p>
    <pre>
    {{
        "soil_data": {{"ph": 6.5, "nitrogen": 10}},
        "weather_data": {{"temperature": 26, "humidity": 50}}
    }}
    </pre>
    "#
    ))
}

async fn recommend(State(state): State<AppState>, body: Bytes) -> (StatusCode, Json<Value>) {
    let (status, body) = handle_recommend(&state, &body).await;
    (status, Json(body))
}

/// Handles one recommendation request body.
///
/// Shared by the HTTP route and the `recommend` command so both produce the
/// same status and payload.
pub async fn handle_recommend(state: &AppState, body: &[u8]) -> (StatusCode, Value) {
    let started = Instant::now();

    let request = match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(fields)) if !fields.is_empty() => fields,
        Ok(_) => return client_error(NO_JSON_ERROR),
        Err(e) => {
            debug!(error = %e, "Request body is not JSON");
            return client_error(NO_JSON_ERROR);
        }
    };

    let soil = request.get("soil_data").cloned().unwrap_or(Value::Null);
    let weather = request.get("weather_data").cloned().unwrap_or(Value::Null);
    if is_blank(&soil) || is_blank(&weather) {
        return client_error(MISSING_INPUTS_ERROR);
    }

    let adapter = Arc::clone(&state.adapter);
    let task = tokio::spawn(async move {
        let outcome = adapter.generate_recommendations(&soil, &weather).await;
        (soil, weather, outcome)
    });

    let (soil, weather, outcome) = match task.await {
        Ok(finished) => finished,
        Err(e) => {
            error!(error = %e, "Recommendation task failed");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": INTERNAL_ERROR }),
            );
        }
    };

    let (status, payload) = match outcome {
        Ok(text) => (StatusCode::OK, success_body(soil, weather, text)),
        Err(err) => render_failure(state.error_policy, soil, weather, &err),
    };

    info!(
        status = status.as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Handled recommendation request"
    );
    (status, payload)
}

fn render_failure(
    policy: ErrorPolicy,
    soil: Value,
    weather: Value,
    err: &RecommendationError,
) -> (StatusCode, Value) {
    match policy {
        ErrorPolicy::Embed => (StatusCode::OK, success_body(soil, weather, err.to_string())),
        ErrorPolicy::Status if err.is_validation() => client_error(&err.to_string()),
        ErrorPolicy::Status => (StatusCode::BAD_GATEWAY, json!({ "error": err.to_string() })),
    }
}

fn success_body(soil: Value, weather: Value, recommendations: String) -> Value {
    json!({
        "status": "success",
        "soil_data": soil,
        "weather_data": weather,
        "recommendations": recommendations,
    })
}

fn client_error(message: &str) -> (StatusCode, Value) {
    (StatusCode::BAD_REQUEST, json!({ "error": message }))
}
