use sqlx::{Error as SqlxError, Postgres, Transaction};
use tracing::{info, instrument};

use crate::database::connection::DbConnection;

impl DbConnection {
    pub async fn init_schema(&self) -> Result<(), SqlxError> {
        let mut transaction = self.pool().begin().await?;
        create_all_tables(&mut transaction).await?;
        create_all_indexes(&mut transaction).await?;
        transaction.commit().await?;
        info!("schema created");
        Ok(())
    }

    pub async fn drop_schema(&self) -> Result<(), SqlxError> {
        let mut transaction = self.pool().begin().await?;
        drop_all_tables(&mut transaction).await?;
        transaction.commit().await?;
        info!("schema dropped");
        Ok(())
    }
}

#[instrument(skip_all)]
pub async fn create_all_tables(
    transaction: &mut Transaction<'_, Postgres>,
) -> Result<(), SqlxError> {
    sqlx::query(
        "
            CREATE TABLE users (
                id              uuid PRIMARY KEY,
                name            VARCHAR(30) NOT NULL UNIQUE,
                created_at      TIMESTAMPTZ NOT NULL DEFAULT now(),
                updated_at      TIMESTAMPTZ NOT NULL DEFAULT now()
            );
        ",
    )
    .execute(transaction.as_mut())
    .await?;
    sqlx::query(
        "
            CREATE TABLE user_auth (
                user_id         uuid PRIMARY KEY REFERENCES users(id) ON UPDATE CASCADE ON DELETE CASCADE,
                hashed_password TEXT NOT NULL,
                created_at      TIMESTAMPTZ NOT NULL DEFAULT now(),
                updated_at      TIMESTAMPTZ NOT NULL DEFAULT now()
            );
        ",
    )
    .execute(transaction.as_mut())
    .await?;
    sqlx::query(
        "
            CREATE TABLE messages (
                id           uuid PRIMARY KEY,
                author_id    uuid NOT NULL REFERENCES users(id),
                body         VARCHAR(280) NOT NULL,
                like_count   BIGINT NOT NULL DEFAULT 0,
                created_at   TIMESTAMPTZ NOT NULL DEFAULT clock_timestamp(),
                updated_at   TIMESTAMPTZ NOT NULL DEFAULT clock_timestamp()
            );
        ",
    )
    .execute(transaction.as_mut())
    .await?;
    sqlx::query(
        "
            CREATE TABLE follows (
                follower_id  uuid NOT NULL REFERENCES users(id) ON UPDATE CASCADE ON DELETE CASCADE,
                followee_id  uuid NOT NULL REFERENCES users(id) ON UPDATE CASCADE ON DELETE CASCADE,
                created_at   TIMESTAMPTZ NOT NULL DEFAULT clock_timestamp(),
                CONSTRAINT follows_pkey PRIMARY KEY (follower_id, followee_id),
                CONSTRAINT follows_no_self_edge CHECK (follower_id <> followee_id)
            );
        ",
    )
    .execute(transaction.as_mut())
    .await?;
    Ok(())
}

#[instrument(skip_all)]
pub async fn create_all_indexes(
    transaction: &mut Transaction<'_, Postgres>,
) -> Result<(), SqlxError> {
    let statements = [
        "CREATE INDEX messages_timeline_idx ON messages (created_at DESC, id DESC);",
        "CREATE INDEX messages_author_timeline_idx ON messages (author_id, created_at DESC, id DESC);",
        "CREATE INDEX follows_followee_idx ON follows (followee_id);",
    ];
    for statement in &statements {
        sqlx::query(statement).execute(transaction.as_mut()).await?;
    }
    Ok(())
}

#[instrument(skip_all)]
pub async fn drop_all_tables(transaction: &mut Transaction<'_, Postgres>) -> Result<(), SqlxError> {
    let statements = [
        "DROP TABLE IF EXISTS follows;",
        "DROP TABLE IF EXISTS messages;",
        "DROP TABLE IF EXISTS user_auth;",
        "DROP TABLE IF EXISTS users;",
    ];
    for statement in &statements {
        sqlx::query(statement).execute(transaction.as_mut()).await?;
    }
    Ok(())
}
