//! Router assembly.
//!
//! [`build_router`] wires routes, state and the per-request middleware.
//! Sentry layers and the listener are added by the binary.

use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Request, State},
    http::{
        HeaderValue, Method, StatusCode,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    middleware::from_fn,
    routing::get,
};
use cyborgtech_core::Collection;
use serde_json::{Value, json};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultOnResponse, OnResponse, TraceLayer},
};
use tracing::Span;

use crate::config::StorefrontConfig;
use crate::middleware::{admin_rate_limiter, create_session_layer, request_id_middleware};
use crate::routes;
use crate::state::AppState;

/// Build the storefront router with every route and middleware layer.
pub fn build_router(state: AppState) -> Router {
    let session_layer = create_session_layer(state.config());
    let cors = cors_layer(state.config());

    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(routes::routes())
        .merge(routes::admin_routes().layer(admin_rate_limiter()))
        .layer(session_layer)
        .layer(cors)
        .layer(from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>, latency: Duration, span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
}

/// CORS for browser clients served from the storefront's own origin.
fn cors_layer(config: &StorefrontConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_credentials(true);

    match HeaderValue::from_str(config.base_url.trim_end_matches('/')) {
        Ok(origin) => layer.allow_origin(origin),
        Err(e) => {
            tracing::warn!(error = %e, "Base URL is not a valid origin, CORS disabled");
            layer
        }
    }
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable until every catalog collection has loaded.
/// The body reports each collection's load status and last refresh time.
async fn readiness(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let collections: serde_json::Map<String, Value> = Collection::ALL
        .iter()
        .map(|collection| {
            let catalog = state.catalog();
            let entry = json!({
                "status": catalog.state(*collection).status(),
                "refreshed_at": catalog.refreshed_at(*collection),
            });
            (collection.to_string(), entry)
        })
        .collect();

    let status = if state.catalog().is_ready() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(json!({ "catalog": collections })))
}
