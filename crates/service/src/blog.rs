use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use inkwell_blob::Uploader;
use inkwell_core::{BlogPost, CreateBlogPostRequest, PostStatus};
use inkwell_query::{Filter, Patch, QueryOptions, Sort, Value, parse_filters_with};
use inkwell_store::Repository;
use tracing::{info, instrument};

use crate::actor::Actor;
use crate::assembler::{FileParts, assemble_blog_post};
use crate::error::ServiceError;
use crate::links::{DEFAULT_LINK_TTL, attach_links};
use crate::query::RawQuery;

/// Blog post operations over a document repository.
///
/// Callers filter on `id`; it is mapped to the store key `_id` before any
/// query runs. Non-admin actors only ever modify their own posts.
pub struct BlogService {
    repo: Arc<dyn Repository<BlogPost>>,
    uploader: Arc<dyn Uploader>,
    link_ttl: Duration,
}

impl BlogService {
    pub fn new(repo: Arc<dyn Repository<BlogPost>>, uploader: Arc<dyn Uploader>) -> Self {
        Self {
            repo,
            uploader,
            link_ttl: DEFAULT_LINK_TTL,
        }
    }

    /// Set the lifetime of presigned media links.
    #[must_use]
    pub fn with_link_ttl(mut self, ttl: Duration) -> Self {
        self.link_ttl = ttl;
        self
    }

    /// Assemble and insert a new post. Returns its identifier.
    #[instrument(skip_all, fields(author = %actor.id))]
    pub async fn create(
        &self,
        actor: &Actor,
        request: CreateBlogPostRequest,
        files: &FileParts,
    ) -> Result<String, ServiceError> {
        let post = assemble_blog_post(request, files, self.uploader.as_ref(), &actor.id).await?;
        let id = self.repo.insert(post).await?;
        info!(post_id = %id, "blog post created");
        Ok(id)
    }

    /// Run a raw list query, newest first unless a sort is given.
    #[instrument(skip_all)]
    pub async fn find(&self, query: &RawQuery) -> Result<Vec<BlogPost>, ServiceError> {
        let mut options = query
            .parse(&BlogPost::field_types())?
            .with_default_sort(vec![Sort::desc("created_at")]);
        options.rename_field("id", "_id");

        let mut posts = self.repo.find(&options).await?;
        attach_links(&mut posts, self.uploader.as_ref(), self.link_ttl).await;
        Ok(posts)
    }

    /// Every post, newest first.
    #[instrument(skip_all)]
    pub async fn find_all(&self) -> Result<Vec<BlogPost>, ServiceError> {
        let options = QueryOptions::new().with_sorts(vec![Sort::desc("created_at")]);
        let mut posts = self.repo.find(&options).await?;
        attach_links(&mut posts, self.uploader.as_ref(), self.link_ttl).await;
        Ok(posts)
    }

    /// Replace the first post matching `raw_filters` with a freshly assembled
    /// one. The original author and creation time are kept.
    #[instrument(skip_all, fields(actor = %actor.id))]
    pub async fn update(
        &self,
        actor: &Actor,
        raw_filters: &[String],
        request: CreateBlogPostRequest,
        files: &FileParts,
    ) -> Result<(), ServiceError> {
        let filters = scoped_filters(actor, raw_filters)?;
        let existing = self
            .repo
            .find_one(&filters)
            .await?
            .ok_or_else(|| ServiceError::NotFound("blog post not found".into()))?;

        let mut post =
            assemble_blog_post(request, files, self.uploader.as_ref(), &actor.id).await?;
        post.author_id = existing.author_id;
        post.created_at = existing.created_at;

        if self.repo.update_one(&filters, &post).await? == 0 {
            return Err(ServiceError::NotFound("blog post not found".into()));
        }
        info!(post_id = ?existing.id, "blog post updated");
        Ok(())
    }

    /// Mark every post matching `raw_filters` as deleted. Returns how many
    /// matched. Nothing is ever removed.
    #[instrument(skip_all, fields(actor = %actor.id))]
    pub async fn soft_delete(
        &self,
        actor: &Actor,
        raw_filters: &[String],
    ) -> Result<u64, ServiceError> {
        let filters = scoped_filters(actor, raw_filters)?;
        let patch = Patch::new()
            .set("status", PostStatus::Deleted.as_str())
            .set("updated_at", Utc::now());

        let matched = self.repo.update_fields(&filters, &patch).await?;
        if matched == 0 {
            return Err(ServiceError::NotFound("blog post not found".into()));
        }
        info!(matched, "blog posts soft-deleted");
        Ok(matched)
    }
}

/// Parse write filters, map `id` to `_id` and restrict non-admins to their
/// own posts. At least one client filter is required.
fn scoped_filters(actor: &Actor, raw_filters: &[String]) -> Result<Vec<Filter>, ServiceError> {
    if raw_filters.is_empty() {
        return Err(ServiceError::Validation(
            "at least one filter is required".into(),
        ));
    }

    let mut options =
        QueryOptions::new().with_filters(parse_filters_with(raw_filters, &BlogPost::field_types())?);
    options.rename_field("id", "_id");

    let mut filters = options.filters;
    if !actor.is_admin() {
        filters.push(Filter::eq("author_id", Value::String(actor.id.clone())));
    }
    Ok(filters)
}
