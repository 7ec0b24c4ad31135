//! Error types for the feed service
//!
//! Provides unified error handling using thiserror. The cache has no error
//! type: absent or expired keys read as `None`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

// == Store Error ==
/// Failures reported by the persisted notification store.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    /// Store could not be reached
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// No record with this id
    #[error("Notification not found: {0}")]
    NotFound(Uuid),

    /// Store refused the write
    #[error("Store rejected request: {0}")]
    Rejected(String),
}

// == Source Error ==
/// Failures talking to a live-score data source.
#[derive(Error, Debug)]
pub enum SourceError {
    /// Transport failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success status code
    #[error("Unexpected status {status} from {url}")]
    Status { status: u16, url: String },

    /// Body did not decode
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),
}

// == Feed Error ==
/// Failures of notification feed operations. Local state is unchanged
/// whenever one of these is returned.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FeedError {
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The feed was unmounted
    #[error("Feed for '{0}' is detached")]
    Detached(String),
}

// == App Error ==
/// Error type at the HTTP boundary.
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Notification feed failure
    #[error(transparent)]
    Feed(#[from] FeedError),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Feed(FeedError::Store(StoreError::NotFound(_))) => StatusCode::NOT_FOUND,
            AppError::Feed(FeedError::Store(StoreError::Rejected(_))) => StatusCode::BAD_REQUEST,
            AppError::Feed(FeedError::Store(StoreError::Unavailable(_))) => StatusCode::BAD_GATEWAY,
            AppError::Feed(FeedError::Detached(_)) => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Aliases ==
/// Convenience Result type for HTTP handlers.
pub type Result<T> = std::result::Result<T, AppError>;

pub type StoreResult<T> = std::result::Result<T, StoreError>;

pub type FeedResult<T> = std::result::Result<T, FeedError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        let id = Uuid::nil();
        let test_cases = vec![
            (AppError::NotFound("match".into()), StatusCode::NOT_FOUND),
            (AppError::InvalidRequest("bad".into()), StatusCode::BAD_REQUEST),
            (
                AppError::Feed(StoreError::NotFound(id).into()),
                StatusCode::NOT_FOUND,
            ),
            (
                AppError::Feed(StoreError::Unavailable("down".into()).into()),
                StatusCode::BAD_GATEWAY,
            ),
            (
                AppError::Feed(FeedError::Detached("u1".into())),
                StatusCode::CONFLICT,
            ),
            (AppError::Internal("boom".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (error, expected_status) in test_cases {
            assert_eq!(error.into_response().status(), expected_status);
        }
    }

    #[test]
    fn test_feed_error_is_transparent() {
        let err = FeedError::from(StoreError::Unavailable("timeout".into()));
        assert_eq!(err.to_string(), "Store unavailable: timeout");
    }
}
