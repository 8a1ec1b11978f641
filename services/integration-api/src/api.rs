//! Integration HTTP surface
//!
//! Endpoints:
//! - POST /integrations/hubspot/authorize       : form user_id, org_id; returns consent URL
//! - GET  /integrations/hubspot/oauth2callback  : HubSpot redirect target; closes the popup
//! - POST /integrations/hubspot/credentials     : form user_id, org_id; returns token record
//! - POST /integrations/hubspot/load            : form credentials (JSON); returns items
//! - GET  /health
//! - GET  /metrics

use std::sync::Arc;
use std::time::Instant;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use hubspot_auth::{CallbackParams, HubSpotOAuth};
use hubspot_items::CrmClient;
use kv_store::MemoryStore;
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Deserialize;
use tracing::{Instrument, info_span, warn};

use crate::error::ApiError;

/// Returned to the consent popup once the callback succeeds.
const CLOSE_WINDOW_HTML: &str = "<html>\n    <script>\n        window.close();\n    </script>\n</html>\n";

/// Shared state for all handlers.
#[derive(Clone)]
pub struct AppState {
    pub oauth: Arc<HubSpotOAuth>,
    pub crm: CrmClient,
    pub store: Arc<MemoryStore>,
    pub prometheus: PrometheusHandle,
    pub started_at: Instant,
}

/// Build the axum router with all routes and shared state.
///
/// `max_connections` bounds concurrently handled requests.
pub fn build_router(state: AppState, max_connections: usize) -> Router {
    Router::new()
        .route("/integrations/hubspot/authorize", post(authorize))
        .route("/integrations/hubspot/oauth2callback", get(oauth2callback))
        .route("/integrations/hubspot/credentials", post(credentials))
        .route("/integrations/hubspot/load", post(load_items))
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .layer(tower::limit::ConcurrencyLimitLayer::new(max_connections))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct UserOrgForm {
    #[serde(default)]
    user_id: String,
    #[serde(default)]
    org_id: String,
}

#[derive(Deserialize)]
struct LoadForm {
    #[serde(default)]
    credentials: String,
}

fn new_request_id() -> String {
    format!("req_{}", uuid::Uuid::new_v4().as_simple())
}

/// Turn a handler outcome into a response and record it.
fn finish<T: IntoResponse>(
    route: &'static str,
    request_id: &str,
    started: Instant,
    result: Result<T, ApiError>,
) -> Response {
    let response = match result {
        Ok(body) => body.into_response(),
        Err(e) => {
            warn!(route, request_id, error = %e, "request failed");
            e.into_response_with_id(request_id)
        }
    };
    crate::metrics::record_request(
        route,
        response.status().as_u16(),
        started.elapsed().as_secs_f64(),
    );
    response
}

async fn authorize(State(state): State<AppState>, Form(form): Form<UserOrgForm>) -> Response {
    let started = Instant::now();
    let request_id = new_request_id();
    let span = info_span!("authorize", %request_id, org_id = %form.org_id, user_id = %form.user_id);

    let result = state
        .oauth
        .authorize(&form.user_id, &form.org_id)
        .instrument(span)
        .await
        .map(Json)
        .map_err(ApiError::from);
    finish("authorize", &request_id, started, result)
}

async fn oauth2callback(
    State(state): State<AppState>,
    Query(params): Query<CallbackParams>,
) -> Response {
    let started = Instant::now();
    let request_id = new_request_id();
    let span = info_span!("oauth2callback", %request_id);

    let result = state
        .oauth
        .complete_authorization(&params)
        .instrument(span)
        .await
        .map(|_| Html(CLOSE_WINDOW_HTML))
        .map_err(ApiError::from);
    finish("oauth2callback", &request_id, started, result)
}

async fn credentials(State(state): State<AppState>, Form(form): Form<UserOrgForm>) -> Response {
    let started = Instant::now();
    let request_id = new_request_id();
    let span =
        info_span!("credentials", %request_id, org_id = %form.org_id, user_id = %form.user_id);

    let result = state
        .oauth
        .credentials(&form.user_id, &form.org_id)
        .instrument(span)
        .await
        .map(Json)
        .map_err(ApiError::from);
    finish("credentials", &request_id, started, result)
}

async fn load_items(State(state): State<AppState>, Form(form): Form<LoadForm>) -> Response {
    let started = Instant::now();
    let request_id = new_request_id();
    let span = info_span!("load", %request_id);

    let result = state
        .crm
        .load_items(&form.credentials)
        .instrument(span)
        .await
        .map(Json)
        .map_err(ApiError::from);
    finish("load", &request_id, started, result)
}

/// Liveness plus a count of live cache entries.
async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let body = serde_json::json!({
        "status": "healthy",
        "uptime_seconds": state.started_at.elapsed().as_secs(),
        "cache_entries": state.store.len().await,
    });
    (
        StatusCode::OK,
        [(axum::http::header::CONTENT_TYPE, "application/json")],
        body.to_string(),
    )
}

/// Prometheus metrics endpoint, text exposition format.
async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(
            axum::http::header::CONTENT_TYPE,
            "text/plain; version=0.0.4; charset=utf-8",
        )],
        state.prometheus.render(),
    )
}
