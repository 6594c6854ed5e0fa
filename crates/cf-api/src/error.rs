//! Maps contract failures onto HTTP responses with a JSON `{"error": ...}`
//! body.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use cf_core::error::ForumError;
use std::fmt;

#[derive(Debug)]
pub struct ApiError(pub ForumError);

impl From<ForumError> for ApiError {
    fn from(err: ForumError) -> Self {
        ApiError(err)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match &self.0 {
            ForumError::NotFound { .. } => StatusCode::NOT_FOUND,
            ForumError::AlreadyExists { .. } | ForumError::AlreadyVoted { .. } => StatusCode::CONFLICT,
            ForumError::Forbidden(_) => StatusCode::FORBIDDEN,
            ForumError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            ForumError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ForumError::Read { .. }
            | ForumError::Write { .. }
            | ForumError::Codec { .. }
            | ForumError::Commit(_)
            | ForumError::Aggregate(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let message = if status.is_server_error() {
            log::error!("request failed: {}", self.0);
            "Internal server error".to_string()
        } else {
            self.0.to_string()
        };
        HttpResponse::build(status).json(serde_json::json!({ "error": message }))
    }
}
