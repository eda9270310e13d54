use std::future::Future;

use crate::error::RequestError;
use crate::models::message::{FeedItem, Message, MessageRow};
use crate::models::user::UserId;
use crate::timeline::store::{AuthorFilter, FollowGraph};

/// Strategy deciding which messages a timeline draws from and how rows become items.
pub trait MessageSource: Send + Sync {
    type Item: Send;

    fn author_filter(&self) -> impl Future<Output = Result<AuthorFilter, RequestError>> + Send;

    fn shape(&self, row: MessageRow) -> Result<Self::Item, RequestError>;
}

/// Every message from every author.
#[derive(Clone, Copy, Debug, Default)]
pub struct GlobalStream;

impl MessageSource for GlobalStream {
    type Item = Message;

    async fn author_filter(&self) -> Result<AuthorFilter, RequestError> {
        Ok(AuthorFilter::Everyone)
    }

    fn shape(&self, row: MessageRow) -> Result<Message, RequestError> {
        Ok(row.message)
    }
}

/// Messages authored by whoever `viewer` follows at the time of the call.
pub struct FollowedAuthors<'a, G> {
    graph: &'a G,
    viewer: UserId,
}

impl<'a, G: FollowGraph> FollowedAuthors<'a, G> {
    pub fn new(graph: &'a G, viewer: UserId) -> Self {
        Self { graph, viewer }
    }
}

impl<G: FollowGraph> MessageSource for FollowedAuthors<'_, G> {
    type Item = FeedItem;

    async fn author_filter(&self) -> Result<AuthorFilter, RequestError> {
        Ok(AuthorFilter::Only(self.graph.followees(self.viewer).await?))
    }

    fn shape(&self, row: MessageRow) -> Result<FeedItem, RequestError> {
        let MessageRow { message, author } = row;
        match author {
            Some(user) => Ok(FeedItem { message, user }),
            None => Err(RequestError::Integrity(format!(
                "message {} references missing author {}",
                message.id, message.author_id
            ))),
        }
    }
}
