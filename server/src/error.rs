//! API errors mapped to HTTP status codes.
//!
//! Every variant renders as a JSON body `{"error": "message"}`.

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use cpsearch_core::SearchError;
use serde_json::json;

/// Seconds a client should wait before retrying while the index builds.
pub const RETRY_AFTER_SECS: u32 = 2;

#[derive(Debug)]
pub enum ApiError {
    /// Malformed request or a query with nothing searchable (400).
    BadRequest(String),
    /// Wrong HTTP method for the route (405).
    MethodNotAllowed(String),
    /// Index still building (503 with `Retry-After`).
    NotReady(String),
    /// Index build failed; search is down for good (503).
    Unavailable(String),
}

impl From<SearchError> for ApiError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::InvalidQuery => ApiError::BadRequest(err.to_string()),
            _ if err.is_retryable() => ApiError::NotReady("Index building in progress. Try again shortly.".into()),
            _ => ApiError::Unavailable(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_retryable_errors_carry_retry_after() {
        let resp = ApiError::from(SearchError::NotReady).into_response();
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(resp.headers()[header::RETRY_AFTER], "2");

        let resp = ApiError::from(SearchError::Unavailable("corpus unreadable".into())).into_response();
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(resp.headers().get(header::RETRY_AFTER).is_none());

        let resp = ApiError::from(SearchError::InvalidQuery).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, retry) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, false),
            ApiError::MethodNotAllowed(msg) => (StatusCode::METHOD_NOT_ALLOWED, msg, false),
            ApiError::NotReady(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg, true),
            ApiError::Unavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg, false),
        };
        let mut resp = (status, axum::Json(json!({ "error": message }))).into_response();
        if retry {
            resp.headers_mut().insert(header::RETRY_AFTER, HeaderValue::from(RETRY_AFTER_SECS));
        }
        resp
    }
}
