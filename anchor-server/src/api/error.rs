//! API Error Handling
//!
//! Maps service errors onto HTTP responses with a `{ "error": message }` body.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::service::BaselineError;

/// API error type
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    InternalError(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            ApiError::NotFound(msg) | ApiError::BadRequest(msg) => msg,
            ApiError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                msg
            }
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

impl From<BaselineError> for ApiError {
    fn from(err: BaselineError) -> Self {
        match err {
            BaselineError::NotFound(_) => ApiError::NotFound(err.to_string()),
            BaselineError::Configuration(msg) => ApiError::BadRequest(msg),
            BaselineError::Inconsistent(_) => ApiError::InternalError(err.to_string()),
            BaselineError::Persistence(e) => {
                tracing::error!("Persistence error: {:?}", e);
                ApiError::InternalError("Internal server error".to_string())
            }
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
