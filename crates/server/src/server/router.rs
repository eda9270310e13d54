use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use tracing::info;

use crate::auth::password::{hash_password, verify_password};
use crate::auth::token::{Claims, TokenExchangePayload};
use crate::error::{RequestError, ValidationError};
use crate::models::listing::{ListingQuery, PageRequest, PageResult};
use crate::models::message::{validate_message_body, FeedItem, Message, PostMessagePayload};
use crate::models::user::{
    validate_user_name, validate_user_password, CredentialsPayload, UserId, UserProfile,
};
use crate::server::state::AppState;
use crate::timeline::{get_global_timeline, get_personal_feed};

pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/me", get(me))
        .route("/users/:user_id", get(user_profile))
        .route("/users/:user_id/follow", post(follow).delete(unfollow))
        .route("/users/:user_id/followers", get(followers))
        .route("/users/:user_id/followees", get(followees))
        .route("/tweets", get(global_timeline).post(post_message))
        .route("/feed", get(personal_feed))
        .with_state(state)
}

pub async fn serve(state: Arc<AppState>) -> anyhow::Result<()> {
    let addr = state.config.server.address.clone();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("starting server on: {}", listener.local_addr()?);
    axum::serve(listener, app(state)).await?;
    Ok(())
}

async fn hash_off_thread(password: String) -> Result<String, RequestError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| RequestError::Internal(format!("password hashing task failed: {e}")))?
}

async fn verify_off_thread(password: String, phc_hash: String) -> Result<bool, RequestError> {
    tokio::task::spawn_blocking(move || verify_password(&password, &phc_hash))
        .await
        .map_err(|e| RequestError::Internal(format!("password check task failed: {e}")))?
}

pub async fn signup(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CredentialsPayload>,
) -> Result<(StatusCode, Json<TokenExchangePayload>), RequestError> {
    validate_user_name(&payload.name)?;
    validate_user_password(&payload.password)?;
    let password_hash = hash_off_thread(payload.password).await?;
    let user = state
        .db_connection
        .create_user(&payload.name, password_hash)
        .await?;
    let token = state.tokens.issue(user.id)?;
    Ok((StatusCode::CREATED, Json(TokenExchangePayload { user, token })))
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CredentialsPayload>,
) -> Result<Json<TokenExchangePayload>, RequestError> {
    let credentials = state
        .db_connection
        .find_credentials(&payload.name)
        .await?
        .ok_or(RequestError::BadCredentials)?;
    if !verify_off_thread(payload.password, credentials.hashed_password).await? {
        return Err(RequestError::BadCredentials);
    }
    let user = state
        .db_connection
        .find_user(credentials.user_id)
        .await?
        .ok_or_else(|| {
            RequestError::Integrity(format!(
                "credentials without profile for {}",
                credentials.user_id
            ))
        })?;
    let token = state.tokens.issue(user.id)?;
    Ok(Json(TokenExchangePayload { user, token }))
}

/// Tokens are stateless, so this only confirms the caller held a valid one.
pub async fn logout(claims: Claims) -> StatusCode {
    info!("user {} logged out", claims.user_id);
    StatusCode::NO_CONTENT
}

pub async fn me(
    State(state): State<Arc<AppState>>,
    claims: Claims,
) -> Result<Json<UserProfile>, RequestError> {
    let user = state
        .db_connection
        .find_user(claims.user_id)
        .await?
        .ok_or(ValidationError::NotFound)?;
    Ok(Json(user))
}

pub async fn user_profile(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<UserId>,
) -> Result<Json<UserProfile>, RequestError> {
    let user = state
        .db_connection
        .find_user(user_id)
        .await?
        .ok_or(ValidationError::NotFound)?;
    Ok(Json(user))
}

pub async fn follow(
    State(state): State<Arc<AppState>>,
    claims: Claims,
    Path(user_id): Path<UserId>,
) -> Result<StatusCode, RequestError> {
    state.db_connection.follow(claims.user_id, user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn unfollow(
    State(state): State<Arc<AppState>>,
    claims: Claims,
    Path(user_id): Path<UserId>,
) -> Result<StatusCode, RequestError> {
    state.db_connection.unfollow(claims.user_id, user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn followers(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<UserId>,
) -> Result<Json<Vec<UserProfile>>, RequestError> {
    Ok(Json(state.db_connection.list_followers(user_id).await?))
}

pub async fn followees(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<UserId>,
) -> Result<Json<Vec<UserProfile>>, RequestError> {
    Ok(Json(state.db_connection.list_followees(user_id).await?))
}

pub async fn post_message(
    State(state): State<Arc<AppState>>,
    claims: Claims,
    Json(payload): Json<PostMessagePayload>,
) -> Result<(StatusCode, Json<Message>), RequestError> {
    validate_message_body(&payload.content)?;
    let message = state
        .db_connection
        .post_message(claims.user_id, &payload.content)
        .await?;
    Ok((StatusCode::CREATED, Json(message)))
}

pub async fn global_timeline(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListingQuery>,
) -> Result<Json<PageResult<Message>>, RequestError> {
    let request = PageRequest::from_query(&query)?;
    let page = get_global_timeline(&state.db_connection, &request).await?;
    Ok(Json(page))
}

pub async fn personal_feed(
    State(state): State<Arc<AppState>>,
    claims: Option<Claims>,
    Query(query): Query<ListingQuery>,
) -> Result<Json<PageResult<FeedItem>>, RequestError> {
    let request = PageRequest::from_query(&query)?;
    let viewer = claims.map(|claims| claims.user_id);
    let page = get_personal_feed(&state.db_connection, &state.db_connection, viewer, &request).await?;
    Ok(Json(page))
}
