use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CrossroadsError {
    #[error("upstream request failed: {0}")]
    Upstream(#[from] reqwest::Error),

    #[error("upstream returned status {status}: {body}")]
    UpstreamStatus { status: u16, body: String },

    #[error("failed to parse upstream response: {0}")]
    Parse(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, CrossroadsError>;

/// Every failure crossing the HTTP boundary collapses to the same generic
/// payload: the caller only needs to know the round trip was lost.
impl IntoResponse for CrossroadsError {
    fn into_response(self) -> Response {
        tracing::error!("gateway error: {self}");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": "Failed to connect to Groq"})),
        )
            .into_response()
    }
}
