//! Drafts: private, unfinished content visible only to its author.

use async_graphql::{Context, InputObject, Object, Result, ResultExt, ID};
use inkwell_core::error::CoreError;
use inkwell_core::pagination::{PageRequest, TimestampCursor};
use inkwell_core::types::{DbId, Timestamp};
use inkwell_core::validation::{require_non_blank, require_non_blank_if_present};
use inkwell_db::models::draft as model;
use inkwell_db::repositories::DraftRepo;

use super::author::{load_author, Author};
use super::context::{identity, loaders, pool};
use super::edit::{edits_of, Edit};
use super::pagination::{DraftConnection, Pager};
use super::{parse_id, require_id, require_owner};
use crate::error::AppResult;

const ENTITY: &str = "Draft";

pub struct Draft(pub model::Draft);

#[Object(rename_fields = "snake_case")]
impl Draft {
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

    async fn date(&self) -> Timestamp {
        self.0.date
    }

    /// Edit history, most recent first.
    async fn edits(&self, ctx: &Context<'_>) -> Result<Vec<Edit>> {
        edits_of(ctx, self.0.id).await.extend()
    }
}

/// Resolve one of the viewer's drafts through the request's loader.
/// Other authors' drafts resolve to `None`.
pub(super) async fn load_draft(
    ctx: &Context<'_>,
    id: DbId,
) -> AppResult<Option<Draft>> {
    Ok(loaders(ctx)?
        .drafts
        .load(id)
        .await?
        .map(Draft))
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct DraftQuery;

#[Object(rename_fields = "snake_case")]
impl DraftQuery {
    async fn draft(&self, ctx: &Context<'_>, id: ID) -> Result<Option<Draft>> {
        find(ctx, &id).await.extend()
    }

    /// The viewer's drafts, newest first.
    async fn drafts(
        &self,
        ctx: &Context<'_>,
        pager: Option<Pager>,
    ) -> Result<DraftConnection> {
        page(ctx, pager.unwrap_or_default()).await.extend()
    }
}

async fn find(ctx: &Context<'_>, id: &ID) -> AppResult<Option<Draft>> {
    identity(ctx)?.require()?;
    match parse_id(id) {
        Some(id) => load_draft(ctx, id).await,
        None => Ok(None),
    }
}

async fn page(ctx: &Context<'_>, pager: Pager) -> AppResult<DraftConnection> {
    let author = identity(ctx)?.require()?;
    let request = PageRequest::parse(&pager.into(), &TimestampCursor)?;
    let connection = DraftRepo::connection(pool(ctx)?, author.id, &request).await?;

    let loaders = loaders(ctx)?;
    for draft in connection.nodes() {
        loaders.drafts.prime(draft.id, draft.clone());
    }
    Ok(DraftConnection::from_page(connection, Draft))
}

// ---------------------------------------------------------------------------
// Mutations
// ---------------------------------------------------------------------------

#[derive(Debug, InputObject)]
#[graphql(rename_fields = "snake_case")]
pub struct CreateDraftInput {
    pub title: String,
    pub content: String,
    pub date: Option<Timestamp>,
}

impl From<CreateDraftInput> for model::CreateDraft {
    fn from(input: CreateDraftInput) -> Self {
        Self {
            title: input.title,
            content: input.content,
            date: input.date,
        }
    }
}

#[derive(Debug, InputObject)]
#[graphql(rename_fields = "snake_case")]
pub struct UpdateDraftInput {
    pub title: Option<String>,
    pub content: Option<String>,
    pub date: Option<Timestamp>,
}

impl From<UpdateDraftInput> for model::UpdateDraft {
    fn from(input: UpdateDraftInput) -> Self {
        Self {
            title: input.title,
            content: input.content,
            date: input.date,
        }
    }
}

#[derive(Default)]
pub struct DraftMutation;

#[Object(rename_fields = "snake_case")]
impl DraftMutation {
    async fn create_draft(
        &self,
        ctx: &Context<'_>,
        input: CreateDraftInput,
    ) -> Result<Draft> {
        create(ctx, input).await.extend()
    }

    /// Change a draft. A changed body is recorded as an edit.
    async fn update_draft(
        &self,
        ctx: &Context<'_>,
        id: ID,
        input: UpdateDraftInput,
    ) -> Result<Draft> {
        update(ctx, &id, input).await.extend()
    }

    /// Delete a draft and its edit history, returning its id.
    async fn delete_draft(&self, ctx: &Context<'_>, id: ID) -> Result<ID> {
        delete(ctx, &id).await.extend()
    }
}

async fn create(ctx: &Context<'_>, input: CreateDraftInput) -> AppResult<Draft> {
    let author = identity(ctx)?.require()?;
    require_non_blank("title", &input.title)?;

    let draft = DraftRepo::create(pool(ctx)?, author.id, &input.into()).await?;
    tracing::info!(draft_id = %draft.id, author_id = %author.id, "Draft created");

    loaders(ctx)?.drafts.prime(draft.id, draft.clone());
    Ok(Draft(draft))
}

/// Load `id` for a change by the logged-in author.
async fn load_owned(ctx: &Context<'_>, id: &ID) -> AppResult<model::Draft> {
    let author = identity(ctx)?.require()?;
    let id = require_id(ENTITY, id)?;
    let draft = loaders(ctx)?
        .drafts
        .load(id)
        .await?
        .ok_or(CoreError::NotFound { entity: ENTITY, id })?;
    require_owner(author, draft.author_id)?;
    Ok(draft)
}

async fn update(
    ctx: &Context<'_>,
    id: &ID,
    input: UpdateDraftInput,
) -> AppResult<Draft> {
    let existing = load_owned(ctx, id).await?;
    require_non_blank_if_present("title", input.title.as_deref())?;

    let draft = DraftRepo::update(pool(ctx)?, existing.id, &input.into())
        .await?
        .ok_or(CoreError::NotFound {
            entity: ENTITY,
            id: existing.id,
        })?;
    tracing::info!(draft_id = %draft.id, "Draft updated");

    let loaders = loaders(ctx)?;
    loaders.drafts.clear(&draft.id);
    loaders.drafts.prime(draft.id, draft.clone());
    loaders.edits_by_content.clear(&draft.id);
    Ok(Draft(draft))
}

async fn delete(ctx: &Context<'_>, id: &ID) -> AppResult<ID> {
    let existing = load_owned(ctx, id).await?;

    if !DraftRepo::delete(pool(ctx)?, existing.id).await? {
        return Err(CoreError::NotFound {
            entity: ENTITY,
            id: existing.id,
        }
        .into());
    }
    tracing::info!(draft_id = %existing.id, "Draft deleted");

    let loaders = loaders(ctx)?;
    loaders.drafts.clear(&existing.id);
    loaders.edits_by_content.clear(&existing.id);
    loaders.types.clear(&existing.id);
    Ok(ID::from(existing.id))
}
