//! Read-side contracts the timeline consumes. Persistence lives behind these traits.

use std::collections::HashSet;
use std::future::Future;

use crate::error::RequestError;
use crate::models::message::MessageRow;
use crate::models::user::UserId;

/// Which authors a scan may return messages from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthorFilter {
    Everyone,
    Only(HashSet<UserId>),
}

impl AuthorFilter {
    /// True when no message can possibly match.
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Only(authors) if authors.is_empty())
    }

    pub fn admits(&self, author_id: &UserId) -> bool {
        match self {
            Self::Everyone => true,
            Self::Only(authors) => authors.contains(author_id),
        }
    }
}

pub trait FollowGraph: Send + Sync {
    /// Users that `user_id` follows, fully materialized.
    fn followees(
        &self,
        user_id: UserId,
    ) -> impl Future<Output = Result<HashSet<UserId>, RequestError>> + Send;

    fn followers(
        &self,
        user_id: UserId,
    ) -> impl Future<Output = Result<HashSet<UserId>, RequestError>> + Send;
}

pub trait MessageStore: Send + Sync {
    /// Single ordered range read by `(created_at desc, id desc)`, skipping `offset` rows and
    /// returning at most `limit` of them, each with its author left-joined in.
    fn scan(
        &self,
        filter: &AuthorFilter,
        offset: i64,
        limit: i64,
    ) -> impl Future<Output = Result<Vec<MessageRow>, RequestError>> + Send;
}
