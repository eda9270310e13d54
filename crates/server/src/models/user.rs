use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

pub type UserId = Uuid;
const USER_NAME_LENGTH_LIMIT: usize = 30;
const USER_PASSWORD_MIN_LENGTH: usize = 8;
const USER_PASSWORD_MAX_LENGTH: usize = 80;

/// Public part of a user record, safe to embed into responses.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct UserProfile {
    pub id: UserId,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct CredentialsPayload {
    pub name: String,
    pub password: String,
}

#[derive(Clone, Debug)]
pub struct CreateUser {
    pub id: UserId,
    pub name: String,
    pub password_hash: String,
}

#[derive(Clone, Debug, sqlx::FromRow)]
pub struct UserCredentials {
    pub user_id: UserId,
    pub hashed_password: String,
}

pub fn validate_user_name(name: &str) -> Result<(), ValidationError> {
    if name.is_empty() {
        return Err(ValidationError::InvalidInput {
            value: name.to_string(),
            reason: "user name cannot be empty".to_string(),
        });
    }
    if !name.chars().all(|ch| ch.is_alphanumeric() || ch == '_') {
        return Err(ValidationError::InvalidInput {
            value: name.to_string(),
            reason: "user name can only contain letters, numbers and underscores".to_string(),
        });
    }
    if name.chars().count() > USER_NAME_LENGTH_LIMIT {
        return Err(ValidationError::InvalidInput {
            value: name.to_string(),
            reason: format!(
                "user name cannot be longer than {} chars",
                USER_NAME_LENGTH_LIMIT
            ),
        });
    }
    Ok(())
}

pub fn validate_user_password(password: &str) -> Result<(), ValidationError> {
    let length = password.chars().count();
    if !(USER_PASSWORD_MIN_LENGTH..=USER_PASSWORD_MAX_LENGTH).contains(&length) {
        return Err(ValidationError::InvalidInput {
            value: "<password>".to_string(),
            reason: format!(
                "password should be at least {} and at most {} characters long",
                USER_PASSWORD_MIN_LENGTH, USER_PASSWORD_MAX_LENGTH
            ),
        });
    }
    Ok(())
}
