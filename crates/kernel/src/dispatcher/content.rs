//! Content type and content entry operations.

use tracing::info;

use super::operation::{
    ContentListArgs, CreateContentArgs, CreateContentTypeArgs, IdArgs, ListArgs, SlugArgs,
    UpdateContentArgs, UpdateContentTypeArgs,
};
use super::result::Page;
use super::{
    Dispatcher, MAX_STATUS_LEN, MAX_TEXT_LEN, bounded, no_nul, parse_id, parse_json, required,
    supplied,
};
use crate::error::AppResult;
use crate::models::{
    ContentEntry, ContentEntrySort, ContentType, ContentTypeSort, CreateContentEntry,
    CreateContentType, UpdateContentEntry, UpdateContentType,
};
use crate::session::Session;

impl Dispatcher {
    pub(super) async fn list_content_types(&self, args: ListArgs) -> AppResult<Page<ContentType>> {
        let query = args.to_query::<ContentTypeSort>();
        let (items, total) = self.content_types.list(query).await?;
        Ok(Page::new(items, total, &query))
    }

    pub(super) async fn get_content_type(&self, args: IdArgs) -> AppResult<ContentType> {
        let id = parse_id(&args.id)?;
        self.content_types.get(id).await
    }

    pub(super) async fn get_content_type_by_slug(&self, args: SlugArgs) -> AppResult<ContentType> {
        let slug = no_nul("slug", required("slug", &args.slug)?)?;
        self.content_types.get_by_slug(slug).await
    }

    /// Entries of the content type named by `typeSlug`.
    pub(super) async fn list_content(&self, args: ContentListArgs) -> AppResult<Page<ContentEntry>> {
        let slug = no_nul("typeSlug", required("typeSlug", &args.type_slug)?)?;
        let content_type = self.content_types.get_by_slug(slug).await?;

        let query = args.page.to_query::<ContentEntrySort>();
        let (items, total) = self.entries.list(content_type.id, query).await?;
        Ok(Page::new(items, total, &query))
    }

    pub(super) async fn get_content_entry(&self, args: IdArgs) -> AppResult<ContentEntry> {
        let id = parse_id(&args.id)?;
        self.entries.get(id).await
    }

    pub(super) async fn create_content_type(
        &self,
        args: CreateContentTypeArgs,
    ) -> AppResult<ContentType> {
        let name = bounded("name", required("name", &args.name)?, MAX_TEXT_LEN)?;
        let slug = bounded("slug", required("slug", &args.slug)?, MAX_TEXT_LEN)?;
        let schema = parse_json("schema", required("schema", &args.schema)?)?;
        if let Some(description) = args.description.as_deref() {
            no_nul("description", description)?;
        }

        let content_type = self
            .content_types
            .create(CreateContentType {
                name: name.to_string(),
                slug: slug.to_string(),
                description: args.description.unwrap_or_default(),
                schema,
            })
            .await?;

        info!(id = %content_type.id, slug = %content_type.slug, "content type created");
        Ok(content_type)
    }

    pub(super) async fn update_content_type(
        &self,
        args: UpdateContentTypeArgs,
    ) -> AppResult<ContentType> {
        let id = parse_id(&args.id)?;
        let name = supplied(args.name)
            .map(|n| bounded("name", n.trim(), MAX_TEXT_LEN).map(str::to_string))
            .transpose()?;
        if let Some(description) = args.description.as_deref() {
            no_nul("description", description)?;
        }
        let schema = supplied(args.schema)
            .map(|s| parse_json("schema", &s))
            .transpose()?;

        let content_type = self
            .content_types
            .update(
                id,
                UpdateContentType {
                    name,
                    description: args.description,
                    schema,
                },
            )
            .await?;

        info!(id = %content_type.id, "content type updated");
        Ok(content_type)
    }

    pub(super) async fn delete_content_type(&self, args: IdArgs) -> AppResult<bool> {
        let id = parse_id(&args.id)?;
        self.content_types.delete(id).await?;

        info!(id = %id, "content type deleted");
        Ok(true)
    }

    /// Create an entry, attributing it to the acting session's user.
    pub(super) async fn create_content(
        &self,
        args: CreateContentArgs,
        session: Option<&Session>,
    ) -> AppResult<ContentEntry> {
        let slug = no_nul("typeSlug", required("typeSlug", &args.type_slug)?)?;
        let data = parse_json("data", required("data", &args.data)?)?;
        if let Some(status) = args.status.as_deref() {
            bounded("status", status.trim(), MAX_STATUS_LEN)?;
        }
        let content_type = self.content_types.get_by_slug(slug).await?;

        let entry = self
            .entries
            .create(CreateContentEntry {
                content_type_id: content_type.id,
                data,
                status: args.status,
                created_by: session.map(|s| s.user_id),
            })
            .await?;

        info!(id = %entry.id, content_type = %content_type.slug, "content entry created");
        Ok(entry)
    }

    /// Partial update. Ownership is never re-attributed.
    pub(super) async fn update_content(&self, args: UpdateContentArgs) -> AppResult<ContentEntry> {
        let id = parse_id(&args.id)?;
        let data = supplied(args.data)
            .map(|d| parse_json("data", &d))
            .transpose()?;
        let status = supplied(args.status)
            .map(|s| bounded("status", s.trim(), MAX_STATUS_LEN).map(str::to_string))
            .transpose()?;

        let entry = self
            .entries
            .update(
                id,
                UpdateContentEntry {
                    data,
                    status,
                },
            )
            .await?;

        info!(id = %entry.id, "content entry updated");
        Ok(entry)
    }

    pub(super) async fn delete_content(&self, args: IdArgs) -> AppResult<bool> {
        let id = parse_id(&args.id)?;
        self.entries.delete(id).await?;

        info!(id = %id, "content entry deleted");
        Ok(true)
    }
}
