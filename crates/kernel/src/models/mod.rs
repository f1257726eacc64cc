//! Database models.

pub mod content_entry;
pub mod content_type;
pub mod sort;
pub mod user;

pub use content_entry::{ContentEntry, ContentEntrySort, CreateContentEntry, UpdateContentEntry};
pub use content_type::{ContentType, ContentTypeSort, CreateContentType, UpdateContentType};
pub use sort::{ListQuery, SortDirection, SortKey};
pub use user::User;
