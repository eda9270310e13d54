use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("missing credentials")]
    MissingCredentials,
    #[error("malformed token")]
    MalformedToken,
    #[error("invalid token")]
    InvalidToken,
    #[error("token has expired")]
    TokenExpired,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct ErrorResponse<'a> {
    error: &'a str,
    kind: &'a str,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            Self::MissingCredentials => (StatusCode::UNAUTHORIZED, "Missing Credentials"),
            Self::MalformedToken => (StatusCode::UNAUTHORIZED, "Missing or bad token in request"),
            Self::InvalidToken => (StatusCode::UNAUTHORIZED, "Invalid Token"),
            Self::TokenExpired => (StatusCode::UNAUTHORIZED, "Token has expired"),
        };
        let error = serde_json::to_string(&ErrorResponse {
            error,
            kind: "unauthorized",
        })
        .expect("infallible serialization");
        (status, error).into_response()
    }
}
