//! Blog posts: public content with a publish flag and date.

use async_graphql::{Context, InputObject, Object, Result, ResultExt, ID};
use inkwell_core::error::CoreError;
use inkwell_core::pagination::{PageRequest, TimestampCursor};
use inkwell_core::types::{DbId, Timestamp};
use inkwell_core::validation::{require_non_blank, require_non_blank_if_present};
use inkwell_db::models::blog_post as model;
use inkwell_db::repositories::BlogPostRepo;

use super::author::{load_author, Author};
use super::context::{identity, loaders, pool};
use super::edit::{edits_of, Edit};
use super::pagination::{BlogPostConnection, Pager};
use super::{parse_id, require_id, require_owner};
use crate::error::AppResult;

const ENTITY: &str = "BlogPost";

pub struct BlogPost(pub model::BlogPost);

#[Object(rename_fields = "snake_case")]
impl BlogPost {
    pub(crate) async fn id(&self) -> ID {
        ID::from(self.0.id)
    }

    async fn author(&self, ctx: &Context<'_>) -> Result<Option<Author>> {
        load_author(ctx, self.0.author_id).await.extend()
    }

    pub(crate) async fn title(&self) -> String {
        self.0.title.clone()
    }

    pub(crate) async fn content(&self) -> String {
        self.0.content.clone()
    }

    async fn is_published(&self) -> bool {
        self.0.is_published
    }

    async fn publish_date(&self) -> Timestamp {
        self.0.publish_date
    }

    /// Edit history, most recent first.
    async fn edits(&self, ctx: &Context<'_>) -> Result<Vec<Edit>> {
        edits_of(ctx, self.0.id).await.extend()
    }
}

/// Resolve a blog post through the request's loader.
pub(super) async fn load_blog_post(ctx: &Context<'_>, id: DbId) -> AppResult<Option<BlogPost>> {
    Ok(loaders(ctx)?.blog_posts.load(id).await?.map(BlogPost))
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct BlogPostQuery;

#[Object(rename_fields = "snake_case")]
impl BlogPostQuery {
    async fn blog_post(&self, ctx: &Context<'_>, id: ID) -> Result<Option<BlogPost>> {
        match parse_id(&id) {
            Some(id) => load_blog_post(ctx, id).await.extend(),
            None => Ok(None),
        }
    }

    /// Every blog post, newest publish date first.
    async fn blog_posts(
        &self,
        ctx: &Context<'_>,
        pager: Option<Pager>,
    ) -> Result<BlogPostConnection> {
        page(ctx, pager.unwrap_or_default()).await.extend()
    }
}

async fn page(ctx: &Context<'_>, pager: Pager) -> AppResult<BlogPostConnection> {
    let request = PageRequest::parse(&pager.into(), &TimestampCursor)?;
    let connection = BlogPostRepo::connection(pool(ctx)?, &request).await?;

    let loaders = loaders(ctx)?;
    for post in connection.nodes() {
        loaders.blog_posts.prime(post.id, post.clone());
    }
    Ok(BlogPostConnection::from_page(connection, BlogPost))
}

// ---------------------------------------------------------------------------
// Mutations
// ---------------------------------------------------------------------------

#[derive(Debug, InputObject)]
#[graphql(rename_fields = "snake_case")]
pub struct CreateBlogPostInput {
    pub title: String,
    pub content: String,
    pub is_published: Option<bool>,
    pub publish_date: Option<Timestamp>,
}

impl From<CreateBlogPostInput> for model::CreateBlogPost {
    fn from(input: CreateBlogPostInput) -> Self {
        Self {
            title: input.title,
            content: input.content,
            is_published: input.is_published,
            publish_date: input.publish_date,
        }
    }
}

#[derive(Debug, InputObject)]
#[graphql(rename_fields = "snake_case")]
pub struct UpdateBlogPostInput {
    pub title: Option<String>,
    pub content: Option<String>,
    pub is_published: Option<bool>,
    pub publish_date: Option<Timestamp>,
}

impl From<UpdateBlogPostInput> for model::UpdateBlogPost {
    fn from(input: UpdateBlogPostInput) -> Self {
        Self {
            title: input.title,
            content: input.content,
            is_published: input.is_published,
            publish_date: input.publish_date,
        }
    }
}

#[derive(Default)]
pub struct BlogPostMutation;

#[Object(rename_fields = "snake_case")]
impl BlogPostMutation {
    async fn create_blog_post(
        &self,
        ctx: &Context<'_>,
        input: CreateBlogPostInput,
    ) -> Result<BlogPost> {
        create(ctx, input).await.extend()
    }

    /// Change a post. A changed body is recorded as an edit.
    async fn update_blog_post(
        &self,
        ctx: &Context<'_>,
        id: ID,
        input: UpdateBlogPostInput,
    ) -> Result<BlogPost> {
        update(ctx, &id, input).await.extend()
    }

    /// Delete a post and its edit history, returning its id.
    async fn delete_blog_post(&self, ctx: &Context<'_>, id: ID) -> Result<ID> {
        delete(ctx, &id).await.extend()
    }
}

async fn create(ctx: &Context<'_>, input: CreateBlogPostInput) -> AppResult<BlogPost> {
    let author = identity(ctx)?.require()?;
    require_non_blank("title", &input.title)?;

    let post = BlogPostRepo::create(pool(ctx)?, author.id, &input.into()).await?;
    tracing::info!(blog_post_id = %post.id, author_id = %author.id, "Blog post created");

    loaders(ctx)?.blog_posts.prime(post.id, post.clone());
    Ok(BlogPost(post))
}

/// Load `id` for a change by the logged-in author.
async fn load_owned(ctx: &Context<'_>, id: &ID) -> AppResult<model::BlogPost> {
    let author = identity(ctx)?.require()?;
    let id = require_id(ENTITY, id)?;
    let post = loaders(ctx)?
        .blog_posts
        .load(id)
        .await?
        .ok_or(CoreError::NotFound { entity: ENTITY, id })?;
    require_owner(author, post.author_id)?;
    Ok(post)
}

async fn update(ctx: &Context<'_>, id: &ID, input: UpdateBlogPostInput) -> AppResult<BlogPost> {
    let existing = load_owned(ctx, id).await?;
    require_non_blank_if_present("title", input.title.as_deref())?;

    let post = BlogPostRepo::update(pool(ctx)?, existing.id, &input.into())
        .await?
        .ok_or(CoreError::NotFound {
            entity: ENTITY,
            id: existing.id,
        })?;
    tracing::info!(blog_post_id = %post.id, "Blog post updated");

    let loaders = loaders(ctx)?;
    loaders.blog_posts.clear(&post.id);
    loaders.blog_posts.prime(post.id, post.clone());
    loaders.edits_by_content.clear(&post.id);
    Ok(BlogPost(post))
}

async fn delete(ctx: &Context<'_>, id: &ID) -> AppResult<ID> {
    let existing = load_owned(ctx, id).await?;

    if !BlogPostRepo::delete(pool(ctx)?, existing.id).await? {
        return Err(CoreError::NotFound {
            entity: ENTITY,
            id: existing.id,
        }
        .into());
    }
    tracing::info!(blog_post_id = %existing.id, "Blog post deleted");

    let loaders = loaders(ctx)?;
    loaders.blog_posts.clear(&existing.id);
    loaders.edits_by_content.clear(&existing.id);
    loaders.types.clear(&existing.id);
    Ok(ID::from(existing.id))
}
