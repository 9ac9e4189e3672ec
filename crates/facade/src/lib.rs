//! Paygate checkout facade library.
//!
//! Accepts simplified checkout, subscription and installment-term requests
//! from a front end, assembles them into gateway payloads, delegates to the
//! payment gateway, and records the gateway's asynchronous callbacks.
//!
//! The crate is a library so the router can be exercised in tests with a
//! mock gateway; `main.rs` wires the production collaborators.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod assembly;
pub mod config;
pub mod error;
pub mod gateway;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod webhooks;

use axum::{Router, routing::get};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::{DefaultOnResponse, OnResponse, TraceLayer},
};
use tracing::Span;

use state::AppState;

/// Build the application router.
///
/// Sentry layers are added by the binary so tests stay free of a Sentry hub.
#[must_use]
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(routes::routes())
        .with_state(state)
        .layer(axum::middleware::from_fn(
            middleware::request_id_middleware,
        ))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
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
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}

async fn health() -> &'static str {
    "ok"
}
