//! Application error types and Axum response conversion.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use trajview_trace::TraceLoadError;

/// Application-level errors with HTTP status code mapping.
#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    NotFound(String),
    Internal(String),
}

impl AppError {
    pub fn no_trace() -> Self {
        AppError::NotFound("no trace loaded".into())
    }
}

impl From<TraceLoadError> for AppError {
    fn from(e: TraceLoadError) -> Self {
        match e {
            TraceLoadError::Parse(_) => AppError::BadRequest(e.to_string()),
            TraceLoadError::Io { .. } => AppError::Internal(e.to_string()),
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound(message) => (StatusCode::NOT_FOUND, message),
            AppError::Internal(message) => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };
        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use trajview_trace::ParseError;

    #[test]
    fn test_status_mapping() {
        let parse: AppError = TraceLoadError::from(ParseError::Empty).into();
        assert_eq!(parse.into_response().status(), StatusCode::BAD_REQUEST);

        let io: AppError = TraceLoadError::Io {
            path: PathBuf::from("missing.traj"),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        }
        .into();
        assert_eq!(io.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);

        assert_eq!(AppError::no_trace().into_response().status(), StatusCode::NOT_FOUND);
    }
}
