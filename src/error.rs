//! ==============================================================================
//! error.rs - api error kinds
//! ==============================================================================
//!
//! two things can go wrong for a caller:
//!     - MalformedInput: the ingest body is missing or is not a json object (400)
//!     - InternalFault:  anything unexpected while handling a request (500)
//!
//! both render as `{"error": "..."}`. query, clear and health never fail.
//!
//! ==============================================================================

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    MalformedInput(String),
    #[error("{0}")]
    InternalFault(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MalformedInput(_) => StatusCode::BAD_REQUEST,
            ApiError::InternalFault(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::InternalFault(format!("{:#}", err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            ApiError::MalformedInput(msg) => tracing::warn!("rejected ingest: {}", msg),
            ApiError::InternalFault(msg) => tracing::error!("request failed: {}", msg),
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
