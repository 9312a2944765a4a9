//! Router assembly: HTTP endpoints, CORS, and HTTP tracing.

use std::sync::Arc;

use axum::{http::HeaderValue, routing::get, Router};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{warn, Level};

use crate::state::AppState;

pub mod http;

/// Build the application router with:
/// - `GET /health`
/// - `GET /cf/problems` (and the bare `/problems` alias)
/// - `GET /cf/accepted`
/// - CORS (configured origin, or any origin when unset)
/// - HTTP trace layer (per-request spans w/ method, path, status, latency)
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(state.cfg.cors_origin.as_deref());

    Router::new()
        .route("/health", get(http::http_health))
        .route("/cf/problems", get(http::http_get_problems))
        .route("/problems", get(http::http_get_problems))
        .route("/cf/accepted", get(http::http_get_accepted))
        .fallback(http::http_not_found)
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}

fn cors_layer(origin: Option<&str>) -> CorsLayer {
    let allow_origin = match origin.map(HeaderValue::from_str) {
        Some(Ok(v)) => AllowOrigin::exact(v),
        Some(Err(e)) => {
            warn!(target: "algoquest_backend", error = %e, "Invalid CORS_ORIGIN; allowing any origin");
            AllowOrigin::from(Any)
        }
        None => AllowOrigin::from(Any),
    };
    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any)
}
