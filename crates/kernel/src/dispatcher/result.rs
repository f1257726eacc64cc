//! Result records returned by the dispatcher.

use serde::Serialize;

use crate::models::sort::ListQuery;
use crate::models::{ContentEntry, ContentType, User};

/// Page window metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub total_count: i64,
    pub has_more: bool,
    pub limit: i64,
    pub offset: i64,
}

impl PageInfo {
    pub fn new(total_count: i64, returned: usize, limit: i64, offset: i64) -> Self {
        let returned = i64::try_from(returned).unwrap_or(i64::MAX);
        Self {
            total_count,
            has_more: offset.saturating_add(returned) < total_count,
            limit,
            offset,
        }
    }
}

/// One page of items.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page_info: PageInfo,
}

impl<T> Page<T> {
    pub fn new<S>(items: Vec<T>, total_count: i64, query: &ListQuery<S>) -> Self {
        let page_info = PageInfo::new(total_count, items.len(), query.limit, query.offset);
        Self { items, page_info }
    }
}

/// Successful login.
#[derive(Debug, Clone, Serialize)]
pub struct AuthPayload {
    pub token: String,
    pub user: User,
}

/// Result of any operation.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum OperationResult {
    ContentTypes(Page<ContentType>),
    ContentType(ContentType),
    ContentEntries(Page<ContentEntry>),
    ContentEntry(ContentEntry),
    User(User),
    Auth(AuthPayload),
    Success(bool),
}
