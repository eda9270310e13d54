use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;
use crate::models::user::{UserId, UserProfile};

/// UUIDv7, so ids grow with creation time and break `created_at` ties.
pub type MessageId = Uuid;
const MESSAGE_BODY_LENGTH_LIMIT: usize = 280;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Message {
    pub id: MessageId,
    #[serde(rename = "user_id")]
    pub author_id: UserId,
    #[serde(rename = "content")]
    pub body: String,
    #[serde(rename = "likes_count")]
    pub like_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A scanned message with its author left-joined in; `author` is `None` when the user row is gone.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MessageRow {
    pub message: Message,
    pub author: Option<UserProfile>,
}

/// Home feed entry: the message plus its author's public profile.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FeedItem {
    #[serde(flatten)]
    pub message: Message,
    pub user: UserProfile,
}

#[derive(Clone, Debug, Deserialize)]
pub struct PostMessagePayload {
    pub content: String,
}

#[derive(Clone, Debug)]
pub struct CreateMessage {
    pub id: MessageId,
    pub author_id: UserId,
    pub body: String,
}

pub fn validate_message_body(body: &str) -> Result<(), ValidationError> {
    if body.trim().is_empty() {
        return Err(ValidationError::InvalidInput {
            value: body.to_string(),
            reason: "message cannot be empty".to_string(),
        });
    }
    if body.chars().count() > MESSAGE_BODY_LENGTH_LIMIT {
        return Err(ValidationError::InvalidInput {
            value: body.to_string(),
            reason: format!(
                "message cannot be longer than {} chars",
                MESSAGE_BODY_LENGTH_LIMIT
            ),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_bounds() {
        assert!(validate_message_body("It seems lonely here :((").is_ok());
        assert!(validate_message_body("   ").is_err());
        assert!(validate_message_body(&"é".repeat(280)).is_ok());
        assert!(validate_message_body(&"é".repeat(281)).is_err());
    }

    #[test]
    fn serializes_with_wire_names() {
        let now = Utc::now();
        let author = Uuid::now_v7();
        let item = FeedItem {
            message: Message {
                id: Uuid::now_v7(),
                author_id: author,
                body: "Hi Ben!".to_string(),
                like_count: 0,
                created_at: now,
                updated_at: now,
            },
            user: UserProfile {
                id: author,
                name: "fuance".to_string(),
                created_at: now,
                updated_at: now,
            },
        };
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["content"], "Hi Ben!");
        assert_eq!(json["likes_count"], 0);
        assert_eq!(json["user"]["name"], "fuance");
        assert_eq!(json["user_id"], json["user"]["id"]);
    }
}
