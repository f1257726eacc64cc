//! Named operations and their arguments.
//!
//! Wire shape: `{"operation": "<name>", "arguments": {...}}` with camelCase
//! names. `arguments` may be omitted only for `logout`.
//!
//! Required string arguments default to empty so that a missing value is
//! reported as `InvalidInput` by the dispatcher rather than as a decode error.

use serde::Deserialize;

use crate::models::sort::{ListQuery, SortDirection, SortKey};

/// Page size used when `limit` is omitted.
pub const DEFAULT_LIMIT: i64 = 10;

/// Largest page a caller may request.
pub const MAX_LIMIT: i64 = 100;

/// An inbound operation.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "operation", content = "arguments", rename_all = "camelCase")]
pub enum Operation {
    ContentTypes(ListArgs),
    ContentType(IdArgs),
    ContentTypeBySlug(SlugArgs),
    Content(ContentListArgs),
    ContentEntry(IdArgs),
    Register(CredentialsArgs),
    Login(CredentialsArgs),
    Logout,
    CreateContentType(CreateContentTypeArgs),
    UpdateContentType(UpdateContentTypeArgs),
    DeleteContentType(IdArgs),
    CreateContent(CreateContentArgs),
    UpdateContent(UpdateContentArgs),
    DeleteContent(IdArgs),
}

impl Operation {
    /// Wire name, for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Operation::ContentTypes(_) => "contentTypes",
            Operation::ContentType(_) => "contentType",
            Operation::ContentTypeBySlug(_) => "contentTypeBySlug",
            Operation::Content(_) => "content",
            Operation::ContentEntry(_) => "contentEntry",
            Operation::Register(_) => "register",
            Operation::Login(_) => "login",
            Operation::Logout => "logout",
            Operation::CreateContentType(_) => "createContentType",
            Operation::UpdateContentType(_) => "updateContentType",
            Operation::DeleteContentType(_) => "deleteContentType",
            Operation::CreateContent(_) => "createContent",
            Operation::UpdateContent(_) => "updateContent",
            Operation::DeleteContent(_) => "deleteContent",
        }
    }

    /// Whether the operation is mutation-class and needs a live session.
    pub fn requires_session(&self) -> bool {
        matches!(
            self,
            Operation::Logout
                | Operation::CreateContentType(_)
                | Operation::UpdateContentType(_)
                | Operation::DeleteContentType(_)
                | Operation::CreateContent(_)
                | Operation::UpdateContent(_)
                | Operation::DeleteContent(_)
        )
    }
}

/// Pagination and ordering for list operations.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListArgs {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub order_by: Option<String>,
    pub order_direction: Option<String>,
}

impl ListArgs {
    /// Resolve defaults, clamp the window, and apply the sort allow-list.
    pub fn to_query<S: SortKey>(&self) -> ListQuery<S> {
        ListQuery {
            limit: self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT),
            offset: self.offset.unwrap_or(0).max(0),
            order_by: S::from_param(self.order_by.as_deref()),
            direction: SortDirection::from_param(self.order_direction.as_deref()),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IdArgs {
    #[serde(default)]
    pub id: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SlugArgs {
    #[serde(default)]
    pub slug: String,
}

/// Entries of one content type, addressed by slug.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentListArgs {
    #[serde(default)]
    pub type_slug: String,
    #[serde(flatten)]
    pub page: ListArgs,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CredentialsArgs {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateContentTypeArgs {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub slug: String,
    pub description: Option<String>,
    /// JSON document as text.
    #[serde(default)]
    pub schema: String,
}

/// Blank `name` or `schema` means "leave unchanged"; `description` may be
/// cleared by passing an empty string.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateContentTypeArgs {
    #[serde(default)]
    pub id: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub schema: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateContentArgs {
    #[serde(default)]
    pub type_slug: String,
    /// JSON document as text.
    #[serde(default)]
    pub data: String,
    pub status: Option<String>,
}

/// Blank `data` or `status` means "leave unchanged".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateContentArgs {
    #[serde(default)]
    pub id: String,
    pub data: Option<String>,
    pub status: Option<String>,
}
