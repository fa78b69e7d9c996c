use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Request-level failures surfaced to the caller as 4xx.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Query cannot be empty")]
    EmptyQuery,

    /// Body the JSON extractor could not accept: bad syntax, wrong or missing
    /// fields, or a missing `application/json` content type.
    #[error("{0}")]
    InvalidBody(String),
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::EmptyQuery => StatusCode::BAD_REQUEST,
            ApiError::InvalidBody(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    detail: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorBody {
            detail: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(err: JsonRejection) -> Self {
        ApiError::InvalidBody(err.body_text())
    }
}
