//! Request-boundary error mapping.
//!
//! Every `ReframeError` becomes a `{success: false, message}` JSON body
//! with a status matching its kind; nothing escapes as a panic or a
//! plain-text response.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tracing::error;

use reframe_core::ReframeError;

/// Wire shape of every failed request.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub message: String,
}

/// Axum-facing wrapper around the backend error type.
#[derive(Debug)]
pub struct ApiError(pub ReframeError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            ReframeError::Validation(_) => StatusCode::BAD_REQUEST,
            ReframeError::ModelUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ReframeError::Parse(_) => StatusCode::BAD_GATEWAY,
            ReframeError::NotFound(_) => StatusCode::NOT_FOUND,
            ReframeError::Storage(_) | ReframeError::Catalog(_) | ReframeError::Other(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<ReframeError> for ApiError {
    fn from(err: ReframeError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self.0, "Request failed");
        }
        let body = ErrorBody {
            success: false,
            message: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
