use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::{async_trait, RequestPartsExt};
use axum_extra::headers::authorization::Bearer;
use axum_extra::headers::Authorization;
use axum_extra::TypedHeader;
use chrono::{DateTime, Duration, TimeZone, Utc};
use hmac::{Hmac, Mac};
use jwt::{Claims as JwtClaims, Header, RegisteredClaims, SignWithKey, Token, VerifyWithKey};
use serde::Serialize;
use sha2::Sha256;
use tracing::debug;

use crate::auth::error::AuthError;
use crate::config::AuthConfig;
use crate::error::RequestError;
use crate::models::user::{UserId, UserProfile};
use crate::server::state::AppState;

/// Verified identity of the caller, resolved from the bearer token.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Claims {
    pub user_id: UserId,
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for Claims {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|e| {
                debug!("malformed auth header token: {e}");
                AuthError::MissingCredentials
            })?;
        let user_id = state.tokens.verify(bearer.token())?;
        Ok(Claims { user_id })
    }
}

/// Signs and verifies HS256 access tokens. The secret only ever comes from [`AuthConfig`].
#[derive(Clone)]
pub struct TokenIssuer {
    key: Hmac<Sha256>,
    issuer: String,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(config: &AuthConfig) -> Result<Self, RequestError> {
        let key = Hmac::<Sha256>::new_from_slice(config.secret.as_bytes())
            .map_err(|e| RequestError::Internal(format!("unusable signing secret: {e}")))?;
        Ok(Self {
            key,
            issuer: config.issuer.clone(),
            ttl: config.token_ttl(),
        })
    }

    pub fn issue(&self, user_id: UserId) -> Result<String, RequestError> {
        self.issue_at(user_id, Utc::now())
    }

    fn issue_at(&self, user_id: UserId, issued_at: DateTime<Utc>) -> Result<String, RequestError> {
        let claims = JwtClaims::new(RegisteredClaims {
            issuer: Some(self.issuer.clone()),
            subject: Some(user_id.to_string()),
            issued_at: Some(issued_at.timestamp() as u64),
            expiration: Some((issued_at + self.ttl).timestamp() as u64),
            ..Default::default()
        });
        claims
            .sign_with_key(&self.key)
            .map_err(|e| RequestError::Internal(format!("token creation failed: {e}")))
    }

    pub fn verify(&self, token: &str) -> Result<UserId, AuthError> {
        self.verify_at(token, Utc::now())
    }

    fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<UserId, AuthError> {
        let token: Token<Header, JwtClaims, _> = token.verify_with_key(&self.key).map_err(|e| {
            debug!("rejected token: {e}");
            AuthError::InvalidToken
        })?;
        let claims = &token.claims().registered;

        if claims.issuer.as_deref() != Some(self.issuer.as_str()) {
            return Err(AuthError::InvalidToken);
        }
        let iat = claims
            .issued_at
            .and_then(|x| Utc.timestamp_opt(x as i64, 0).single())
            .ok_or(AuthError::MalformedToken)?;
        if iat > now {
            return Err(AuthError::InvalidToken);
        }
        let exp = claims
            .expiration
            .and_then(|x| Utc.timestamp_opt(x as i64, 0).single())
            .ok_or(AuthError::MalformedToken)?;
        if exp <= now {
            return Err(AuthError::TokenExpired);
        }

        claims
            .subject
            .as_deref()
            .and_then(|sub| sub.parse::<UserId>().ok())
            .ok_or(AuthError::MalformedToken)
    }
}

#[derive(Debug, Serialize)]
pub struct TokenExchangePayload {
    pub user: UserProfile,
    pub token: String,
}
