use std::collections::HashSet;

use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use sqlx::{Error as SqlxError, PgExecutor};
use tracing::instrument;

use crate::database::connection::DbConnection;
use crate::database::utils::map_not_found_as_none;
use crate::error::RequestError;
use crate::models::message::{Message, MessageId, MessageRow};
use crate::models::user::{UserCredentials, UserId, UserProfile};
use crate::timeline::store::{AuthorFilter, FollowGraph, MessageStore};

impl DbConnection {
    pub async fn find_user(&self, user_id: UserId) -> Result<Option<UserProfile>, RequestError> {
        Ok(find_user_by_id(self.pool(), user_id).await?)
    }

    pub async fn find_credentials(
        &self,
        name: &str,
    ) -> Result<Option<UserCredentials>, RequestError> {
        Ok(find_credentials_by_name(self.pool(), name).await?)
    }

    pub async fn list_followers(&self, user_id: UserId) -> Result<Vec<UserProfile>, RequestError> {
        Ok(list_follower_profiles(self.pool(), user_id).await?)
    }

    pub async fn list_followees(&self, user_id: UserId) -> Result<Vec<UserProfile>, RequestError> {
        Ok(list_followee_profiles(self.pool(), user_id).await?)
    }
}

impl FollowGraph for DbConnection {
    async fn followees(&self, user_id: UserId) -> Result<HashSet<UserId>, RequestError> {
        Ok(list_followee_ids(self.pool(), user_id).await?)
    }

    async fn followers(&self, user_id: UserId) -> Result<HashSet<UserId>, RequestError> {
        Ok(list_follower_ids(self.pool(), user_id).await?)
    }
}

impl MessageStore for DbConnection {
    async fn scan(
        &self,
        filter: &AuthorFilter,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<MessageRow>, RequestError> {
        // the guard hands the connection back to the pool on every exit path
        let mut connection = self.pool().acquire().await?;
        Ok(scan_messages(&mut *connection, filter, offset, limit).await?)
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ScannedRow {
    id: MessageId,
    author_id: UserId,
    body: String,
    like_count: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    author_ref: Option<UserId>,
    author_name: Option<String>,
    author_created_at: Option<DateTime<Utc>>,
    author_updated_at: Option<DateTime<Utc>>,
}

impl From<ScannedRow> for MessageRow {
    fn from(row: ScannedRow) -> Self {
        let author = match (
            row.author_ref,
            row.author_name,
            row.author_created_at,
            row.author_updated_at,
        ) {
            (Some(id), Some(name), Some(created_at), Some(updated_at)) => Some(UserProfile {
                id,
                name,
                created_at,
                updated_at,
            }),
            _ => None,
        };
        MessageRow {
            message: Message {
                id: row.id,
                author_id: row.author_id,
                body: row.body,
                like_count: row.like_count,
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
            author,
        }
    }
}

#[instrument(skip(executor, filter))]
pub async fn scan_messages<'a, E: PgExecutor<'a>>(
    executor: E,
    filter: &AuthorFilter,
    offset: i64,
    limit: i64,
) -> Result<Vec<MessageRow>, SqlxError> {
    let authors: Option<Vec<UserId>> = match filter {
        AuthorFilter::Everyone => None,
        AuthorFilter::Only(authors) => Some(authors.iter().copied().collect()),
    };
    sqlx::query_as::<_, ScannedRow>(
        "
    SELECT
        messages.id AS id, messages.author_id AS author_id, messages.body AS body,
        messages.like_count AS like_count, messages.created_at AS created_at,
        messages.updated_at AS updated_at,
        users.id AS author_ref, users.name AS author_name,
        users.created_at AS author_created_at, users.updated_at AS author_updated_at
    FROM
        messages LEFT JOIN users ON messages.author_id = users.id
    WHERE
        $1::uuid[] IS NULL OR messages.author_id = ANY($1)
    ORDER BY
        messages.created_at DESC, messages.id DESC
    LIMIT $2 OFFSET $3;
    ",
    )
    .bind(authors)
    .bind(limit)
    .bind(offset)
    .fetch(executor)
    .map_ok(MessageRow::from)
    .try_collect()
    .await
}

#[instrument(skip(executor))]
pub async fn find_user_by_id<'a, E: PgExecutor<'a>>(
    executor: E,
    user_id: UserId,
) -> Result<Option<UserProfile>, SqlxError> {
    map_not_found_as_none(
        sqlx::query_as("SELECT id, name, created_at, updated_at FROM users WHERE id = $1;")
            .bind(user_id)
            .fetch_one(executor)
            .await,
    )
}

#[instrument(skip(executor))]
pub async fn find_credentials_by_name<'a, E: PgExecutor<'a>>(
    executor: E,
    name: &str,
) -> Result<Option<UserCredentials>, SqlxError> {
    sqlx::query_as(
        "
    SELECT
        user_auth.user_id AS user_id, user_auth.hashed_password AS hashed_password
    FROM
        users JOIN user_auth ON users.id = user_auth.user_id
    WHERE
        users.name = $1;
    ",
    )
    .bind(name)
    .fetch_optional(executor)
    .await
}

#[instrument(skip(executor))]
pub async fn list_followee_ids<'a, E: PgExecutor<'a>>(
    executor: E,
    user_id: UserId,
) -> Result<HashSet<UserId>, SqlxError> {
    sqlx::query_scalar::<_, UserId>("SELECT followee_id FROM follows WHERE follower_id = $1;")
        .bind(user_id)
        .fetch(executor)
        .try_collect()
        .await
}

#[instrument(skip(executor))]
pub async fn list_follower_ids<'a, E: PgExecutor<'a>>(
    executor: E,
    user_id: UserId,
) -> Result<HashSet<UserId>, SqlxError> {
    sqlx::query_scalar::<_, UserId>("SELECT follower_id FROM follows WHERE followee_id = $1;")
        .bind(user_id)
        .fetch(executor)
        .try_collect()
        .await
}

#[instrument(skip(executor))]
pub async fn list_follower_profiles<'a, E: PgExecutor<'a>>(
    executor: E,
    user_id: UserId,
) -> Result<Vec<UserProfile>, SqlxError> {
    sqlx::query_as(
        "
    SELECT
        users.id AS id, users.name AS name, users.created_at AS created_at, users.updated_at AS updated_at
    FROM
        follows JOIN users ON follows.follower_id = users.id
    WHERE
        follows.followee_id = $1
    ORDER BY
        follows.created_at DESC;
    ",
    )
    .bind(user_id)
    .fetch_all(executor)
    .await
}

#[instrument(skip(executor))]
pub async fn list_followee_profiles<'a, E: PgExecutor<'a>>(
    executor: E,
    user_id: UserId,
) -> Result<Vec<UserProfile>, SqlxError> {
    sqlx::query_as(
        "
    SELECT
        users.id AS id, users.name AS name, users.created_at AS created_at, users.updated_at AS updated_at
    FROM
        follows JOIN users ON follows.followee_id = users.id
    WHERE
        follows.follower_id = $1
    ORDER BY
        follows.created_at DESC;
    ",
    )
    .bind(user_id)
    .fetch_all(executor)
    .await
}
