use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use strum_macros::Display;
use thiserror::Error;
use tracing::error;

use crate::auth::error::AuthError;

/// Coarse failure classes handed to the presentation layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    Unauthorized,
    Unsupported,
    Internal,
}

#[derive(Debug, Error)]
pub enum RequestError {
    #[error("bad auth credentials")]
    BadCredentials,
    #[error("unauthorized: {0}")]
    Unauthorized(#[from] AuthError),
    #[error("unsupported operation: {0}")]
    Unsupported(&'static str),
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),
    #[error("referential integrity violated: {0}")]
    Integrity(String),
    #[error("internal error: {0}")]
    Internal(String),
    #[error("sqlx error: {0}")]
    Sqlx(#[from] sqlx::Error),
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("input value is invalid: `{value}`, reason: {reason}")]
    InvalidInput { value: String, reason: String },
    #[error("limit out of range: got {attempted}, allowed {min}..={max}")]
    LimitOutOfRange { attempted: i64, min: i64, max: i64 },
    #[error("offset out of range: got {attempted}")]
    OffsetOutOfRange { attempted: i64 },
    #[error("mutually exclusive pagination modes: `offset` cannot be combined with `max_id`")]
    ConflictingPagination,
    #[error("invalid cursor: `{value}`")]
    InvalidCursor { value: String },
    #[error("requested object already exists")]
    AlreadyExists,
    #[error("requested object doesn't exist")]
    NotFound,
}

impl RequestError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::Sqlx(sqlx::Error::RowNotFound) => ErrorKind::Validation,
            Self::BadCredentials | Self::Unauthorized(_) => ErrorKind::Unauthorized,
            Self::Unsupported(_) => ErrorKind::Unsupported,
            Self::Integrity(_) | Self::Internal(_) | Self::Sqlx(_) => ErrorKind::Internal,
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Validation(ValidationError::NotFound) | Self::Sqlx(sqlx::Error::RowNotFound) => {
                StatusCode::NOT_FOUND
            }
            Self::Validation(ValidationError::AlreadyExists) => StatusCode::CONFLICT,
            _ => match self.kind() {
                ErrorKind::Validation => StatusCode::BAD_REQUEST,
                ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
                ErrorKind::Unsupported => StatusCode::NOT_IMPLEMENTED,
                ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl IntoResponse for RequestError {
    fn into_response(self) -> Response {
        let status = self.status();
        let kind = self.kind();
        let message = match kind {
            ErrorKind::Internal => {
                error!("received internal error for user request: {self}");
                "Something went wrong".to_string()
            }
            _ => self.to_string(),
        };
        let body = json!({ "error": message, "kind": kind.to_string() }).to_string();
        (status, body).into_response()
    }
}
