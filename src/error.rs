//! Error taxonomy shared by core operations and handlers
//!
//! Core operations fail fast with a typed error instead of returning partial
//! results. The ResponseError impl translates each variant onto the JSON
//! envelope so handlers can propagate with `?`.

use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use sea_orm::DbErr;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OpError {
    /// Missing or malformed input. 400.
    #[error("{0}")]
    Validation(String),
    /// No usable identity on the request. 401.
    #[error("{0}")]
    Unauthorized(String),
    /// Caller lacks the role or ownership. 403.
    #[error("{0}")]
    Forbidden(String),
    /// Referenced entity absent. 404.
    #[error("{0}")]
    NotFound(String),
    /// Uniqueness violation. 409.
    #[error("{0}")]
    Conflict(String),
    /// Sliding-window rate limit tripped. 429.
    #[error("Too many requests. Please wait {0} seconds.")]
    RateLimited(u64),
    /// Storage or runtime failure. 500; details are logged, not returned.
    #[error("Internal server error")]
    Database(#[from] DbErr),
}

impl OpError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }
}

impl From<crate::rate_limit::RateLimitError> for OpError {
    fn from(e: crate::rate_limit::RateLimitError) -> Self {
        Self::RateLimited(e.retry_after_seconds)
    }
}

impl actix_web::ResponseError for OpError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let Self::Database(e) = self {
            log::error!("Database error: {}", e);
        }

        HttpResponse::build(self.status_code()).json(json!({
            "success": false,
            "error": self.to_string(),
        }))
    }
}
