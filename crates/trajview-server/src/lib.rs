//! HTTP viewer backend for trajview.
//!
//! Holds one [`TraceSession`](trajview_trace::TraceSession) and serves its
//! derived views as JSON. See [`build_router`] for the routes.

pub mod error;
pub mod handlers;
mod state;

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::extract::DefaultBodyLimit;
use axum::http::{Request, Response};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

pub use state::ServerState;

pub fn build_router(state: Arc<ServerState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request<Body>| {
            tracing::info_span!(
                "request",
                method = %req.method(),
                uri = %req.uri(),
                version = ?req.version(),
            )
        })
        .on_response(|res: &Response<Body>, latency: Duration, _span: &tracing::Span| {
            info!(
                latency = %format!("{} ms", latency.as_millis()),
                status = %res.status().as_u16(),
                "finished processing request"
            );
        });

    let api_routes = Router::new()
        .route("/api/trace", post(handlers::trace::upload).get(handlers::trace::get))
        .route("/api/trace/demo", post(handlers::trace::demo))
        .route("/api/trace/spans/{id}", get(handlers::trace::span))
        .route("/api/trace/timeline", get(handlers::trace::timeline_entries))
        .route("/api/trace/graph", get(handlers::trace::graph))
        .layer(DefaultBodyLimit::max(state.config.server.max_upload_bytes))
        .layer(trace_layer);

    Router::new()
        .merge(api_routes)
        .route("/health", get(handlers::health))
        .layer(cors)
        .with_state(state)
}
