//! Timeline assembly: offset pagination over a time-ordered message stream.
//!
//! Pages are computed with a single ordered read of `limit + 1` rows; the surplus row is
//! the only signal that a further page exists. Nothing is pinned between pages, so rows
//! inserted while a client is paging shift later offsets and may surface twice or be skipped.

pub mod source;
pub mod store;

use tracing::{debug, instrument};

use crate::auth::error::AuthError;
use crate::error::RequestError;
use crate::models::listing::{PagePosition, PageRequest, PageResult};
use crate::models::message::{FeedItem, Message};
use crate::models::user::UserId;
use crate::timeline::source::{FollowedAuthors, GlobalStream, MessageSource};
use crate::timeline::store::{FollowGraph, MessageStore};

#[instrument(skip(store, source))]
pub async fn assemble_page<S, Src>(
    store: &S,
    source: &Src,
    request: &PageRequest,
) -> Result<PageResult<Src::Item>, RequestError>
where
    S: MessageStore,
    Src: MessageSource,
{
    let offset = match request.position() {
        PagePosition::Offset(offset) => offset,
        PagePosition::MaxId(_) => return Err(RequestError::Unsupported("max_id pagination")),
    };
    let limit = request.limit();

    let filter = source.author_filter().await?;
    if filter.is_empty() {
        debug!("no authors to read from");
        return Ok(PageResult::empty(offset, limit));
    }

    let rows = store.scan(&filter, offset, limit + 1).await?;
    let fetched = rows.len();
    let page = PageResult::from_overfetch(rows, offset, limit).try_map(|row| source.shape(row))?;
    debug!(fetched, next_offset = ?page.page_info.next_offset, "assembled page");
    Ok(page)
}

pub async fn get_global_timeline<S: MessageStore>(
    store: &S,
    request: &PageRequest,
) -> Result<PageResult<Message>, RequestError> {
    assemble_page(store, &GlobalStream, request).await
}

/// Home feed of `viewer`; a missing viewer is rejected before any store is touched.
pub async fn get_personal_feed<S: MessageStore, G: FollowGraph>(
    store: &S,
    graph: &G,
    viewer: Option<UserId>,
    request: &PageRequest,
) -> Result<PageResult<FeedItem>, RequestError> {
    let viewer = viewer.ok_or(AuthError::MissingCredentials)?;
    assemble_page(store, &FollowedAuthors::new(graph, viewer), request).await
}
