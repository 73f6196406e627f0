//! HTTP route handlers for the viewer server.

pub mod trace;

/// Health check endpoint.
pub async fn health() -> &'static str {
    "OK"
}
