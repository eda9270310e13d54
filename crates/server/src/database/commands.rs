use sqlx::{Error as SqlxError, PgExecutor};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::database::connection::DbConnection;
use crate::database::utils::map_constraint_violation;
use crate::error::RequestError;
use crate::models::follow::{validate_follow, FollowEdge};
use crate::models::message::{CreateMessage, Message};
use crate::models::user::{CreateUser, UserId, UserProfile};

impl DbConnection {
    /// Inserts the profile and its credentials atomically.
    pub async fn create_user(
        &self,
        name: &str,
        password_hash: String,
    ) -> Result<UserProfile, RequestError> {
        let user = CreateUser {
            id: Uuid::now_v7(),
            name: name.to_string(),
            password_hash,
        };
        let mut transaction = self.pool().begin().await?;
        let profile = insert_user(transaction.as_mut(), &user)
            .await
            .map_err(map_constraint_violation)?;
        insert_user_auth(transaction.as_mut(), &user).await?;
        transaction.commit().await?;
        Ok(profile)
    }

    pub async fn post_message(&self, author_id: UserId, body: &str) -> Result<Message, RequestError> {
        let message = CreateMessage {
            id: Uuid::now_v7(),
            author_id,
            body: body.to_string(),
        };
        insert_message(self.pool(), &message)
            .await
            .map_err(map_constraint_violation)
    }

    /// Idempotent; following someone twice keeps the original edge.
    pub async fn follow(&self, follower_id: UserId, followee_id: UserId) -> Result<(), RequestError> {
        validate_follow(follower_id, followee_id)?;
        let edge = insert_follow(self.pool(), follower_id, followee_id)
            .await
            .map_err(map_constraint_violation)?;
        match edge {
            Some(edge) => info!(
                "{} now follows {} since {}",
                edge.follower_id, edge.followee_id, edge.created_at
            ),
            None => debug!("{follower_id} already follows {followee_id}"),
        }
        Ok(())
    }

    pub async fn unfollow(&self, follower_id: UserId, followee_id: UserId) -> Result<(), RequestError> {
        let removed = delete_follow(self.pool(), follower_id, followee_id).await?;
        debug!("unfollow {follower_id} -> {followee_id}, removed: {removed}");
        Ok(())
    }
}

#[instrument(skip_all, fields(name = %user.name))]
pub async fn insert_user<'a, E: PgExecutor<'a>>(
    executor: E,
    user: &CreateUser,
) -> Result<UserProfile, SqlxError> {
    let profile: UserProfile = sqlx::query_as(
        "
            INSERT INTO users (id, name)
            VALUES ($1, $2)
            RETURNING id, name, created_at, updated_at;
        ",
    )
    .bind(user.id)
    .bind(&user.name)
    .fetch_one(executor)
    .await?;
    info!("created user with id: {}", profile.id);
    Ok(profile)
}

#[instrument(skip_all)]
pub async fn insert_user_auth<'a, E: PgExecutor<'a>>(
    executor: E,
    user: &CreateUser,
) -> Result<(), SqlxError> {
    sqlx::query("INSERT INTO user_auth (user_id, hashed_password) VALUES ($1, $2);")
        .bind(user.id)
        .bind(&user.password_hash)
        .execute(executor)
        .await?;
    Ok(())
}

#[instrument(skip_all, fields(author_id = %message.author_id))]
pub async fn insert_message<'a, E: PgExecutor<'a>>(
    executor: E,
    message: &CreateMessage,
) -> Result<Message, SqlxError> {
    sqlx::query_as(
        "
            INSERT INTO messages (id, author_id, body)
            VALUES ($1, $2, $3)
            RETURNING id, author_id, body, like_count, created_at, updated_at;
        ",
    )
    .bind(message.id)
    .bind(message.author_id)
    .bind(&message.body)
    .fetch_one(executor)
    .await
}

/// Returns `None` when the edge already existed.
#[instrument(skip(executor))]
pub async fn insert_follow<'a, E: PgExecutor<'a>>(
    executor: E,
    follower_id: UserId,
    followee_id: UserId,
) -> Result<Option<FollowEdge>, SqlxError> {
    sqlx::query_as(
        "
            INSERT INTO follows (follower_id, followee_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            RETURNING follower_id, followee_id, created_at;
        ",
    )
    .bind(follower_id)
    .bind(followee_id)
    .fetch_optional(executor)
    .await
}

#[instrument(skip(executor))]
pub async fn delete_follow<'a, E: PgExecutor<'a>>(
    executor: E,
    follower_id: UserId,
    followee_id: UserId,
) -> Result<bool, SqlxError> {
    let result = sqlx::query("DELETE FROM follows WHERE follower_id = $1 AND followee_id = $2;")
        .bind(follower_id)
        .bind(followee_id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected() > 0)
}
