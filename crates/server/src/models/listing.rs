use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::models::message::MessageId;
use crate::server::constants::MAX_LISTING_ELEMENTS;
pub const DEFAULT_LIMIT: i64 = 20;
pub const DEFAULT_OFFSET: i64 = 0;
const MIN_LIMIT: i64 = 1;

/// Raw pagination parameters as they arrive in the query string.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ListingQuery {
    pub limit: Option<String>,
    pub offset: Option<String>,
    pub max_id: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PagePosition {
    /// Skip this many rows of the ordered stream.
    Offset(i64),
    /// Everything strictly older than this message.
    MaxId(MessageId),
}

/// Canonical, bounded page descriptor. Only constructible through validation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageRequest {
    limit: i64,
    position: PagePosition,
}

pub fn validate_limit(limit: i64) -> Result<(), ValidationError> {
    if !(MIN_LIMIT..=MAX_LISTING_ELEMENTS).contains(&limit) {
        return Err(ValidationError::LimitOutOfRange {
            attempted: limit,
            min: MIN_LIMIT,
            max: MAX_LISTING_ELEMENTS,
        });
    }
    Ok(())
}

/// `offset + limit + 1` is what the store gets asked for, so it has to fit.
pub fn validate_offset(offset: i64, limit: i64) -> Result<(), ValidationError> {
    if offset < 0 || offset.checked_add(limit + 1).is_none() {
        return Err(ValidationError::OffsetOutOfRange { attempted: offset });
    }
    Ok(())
}

fn non_empty(raw: &Option<String>) -> Option<&str> {
    raw.as_deref().filter(|value| !value.is_empty())
}

fn parse_integer(name: &str, raw: &str) -> Result<i64, ValidationError> {
    raw.parse().map_err(|_| ValidationError::InvalidInput {
        value: raw.to_string(),
        reason: format!("{name} should be an integer"),
    })
}

impl PageRequest {
    pub fn offset(limit: i64, offset: i64) -> Result<Self, ValidationError> {
        validate_limit(limit)?;
        validate_offset(offset, limit)?;
        Ok(Self {
            limit,
            position: PagePosition::Offset(offset),
        })
    }

    pub fn from_query(query: &ListingQuery) -> Result<Self, ValidationError> {
        let limit = match non_empty(&query.limit) {
            Some(raw) => parse_integer("limit", raw)?,
            None => DEFAULT_LIMIT,
        };
        validate_limit(limit)?;

        let offset = non_empty(&query.offset)
            .map(|raw| parse_integer("offset", raw))
            .transpose()?;
        if let Some(offset) = offset {
            validate_offset(offset, limit)?;
        }

        match (offset, non_empty(&query.max_id)) {
            (Some(_), Some(_)) => Err(ValidationError::ConflictingPagination),
            (None, Some(raw)) => {
                let max_id = raw.parse().map_err(|_| ValidationError::InvalidCursor {
                    value: raw.to_string(),
                })?;
                Ok(Self {
                    limit,
                    position: PagePosition::MaxId(max_id),
                })
            }
            (offset, None) => Ok(Self {
                limit,
                position: PagePosition::Offset(offset.unwrap_or(DEFAULT_OFFSET)),
            }),
        }
    }

    pub fn limit(&self) -> i64 {
        self.limit
    }

    pub fn position(&self) -> PagePosition {
        self.position
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct PageInfo {
    pub offset: i64,
    pub limit: i64,
    /// Present iff at least one row exists past this page.
    pub next_offset: Option<i64>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PageResult<T> {
    pub items: Vec<T>,
    pub page_info: PageInfo,
}

impl<T> PageResult<T> {
    pub fn empty(offset: i64, limit: i64) -> Self {
        Self {
            items: Vec::new(),
            page_info: PageInfo {
                offset,
                limit,
                next_offset: None,
            },
        }
    }

    /// Trims rows fetched with `limit + 1` down to the page; the surplus row only signals a next page.
    pub fn from_overfetch(mut rows: Vec<T>, offset: i64, limit: i64) -> Self {
        let page_len = usize::try_from(limit).unwrap_or(0);
        let next_offset = if rows.len() > page_len {
            rows.truncate(page_len);
            Some(offset + limit)
        } else {
            None
        };
        Self {
            items: rows,
            page_info: PageInfo {
                offset,
                limit,
                next_offset,
            },
        }
    }

    pub fn try_map<U, E, F>(self, f: F) -> Result<PageResult<U>, E>
    where
        F: FnMut(T) -> Result<U, E>,
    {
        Ok(PageResult {
            items: self.items.into_iter().map(f).collect::<Result<_, _>>()?,
            page_info: self.page_info,
        })
    }
}
