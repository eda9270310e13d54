use chrono::{DateTime, Utc};

use crate::error::ValidationError;
use crate::models::user::UserId;

/// Directed edge granting `follower_id` visibility of `followee_id`'s messages.
#[derive(Clone, Debug, PartialEq, Eq, sqlx::FromRow)]
pub struct FollowEdge {
    pub follower_id: UserId,
    pub followee_id: UserId,
    pub created_at: DateTime<Utc>,
}

pub fn validate_follow(follower_id: UserId, followee_id: UserId) -> Result<(), ValidationError> {
    if follower_id == followee_id {
        return Err(ValidationError::InvalidInput {
            value: followee_id.to_string(),
            reason: "users cannot follow themselves".to_string(),
        });
    }
    Ok(())
}
