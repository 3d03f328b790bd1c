//! Journal entries: private, dated content visible only to its author.

use async_graphql::{Context, InputObject, Object, Result, ResultExt, ID};
use inkwell_core::error::CoreError;
use inkwell_core::pagination::{PageRequest, TimestampCursor};
use inkwell_core::types::{DbId, Timestamp};
use inkwell_core::validation::{require_non_blank, require_non_blank_if_present};
use inkwell_db::models::journal_entry as model;
use inkwell_db::repositories::JournalEntryRepo;

use super::author::{load_author, Author};
use super::context::{identity, loaders, pool};
use super::edit::{edits_of, Edit};
use super::pagination::{JournalEntryConnection, Pager};
use super::{parse_id, require_id, require_owner};
use crate::error::AppResult;

const ENTITY: &str = "JournalEntry";

pub struct JournalEntry(pub model::JournalEntry);

#[Object(rename_fields = "snake_case")]
impl JournalEntry {
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

/// Resolve one of the viewer's entries through the request's loader.
/// Other authors' entries resolve to `None`.
pub(super) async fn load_journal_entry(
    ctx: &Context<'_>,
    id: DbId,
) -> AppResult<Option<JournalEntry>> {
    Ok(loaders(ctx)?
        .journal_entries
        .load(id)
        .await?
        .map(JournalEntry))
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct JournalEntryQuery;

#[Object(rename_fields = "snake_case")]
impl JournalEntryQuery {
    async fn journal_entry(&self, ctx: &Context<'_>, id: ID) -> Result<Option<JournalEntry>> {
        find(ctx, &id).await.extend()
    }

    /// The viewer's entries, newest first.
    async fn journal_entries(
        &self,
        ctx: &Context<'_>,
        pager: Option<Pager>,
    ) -> Result<JournalEntryConnection> {
        page(ctx, pager.unwrap_or_default()).await.extend()
    }
}

async fn find(ctx: &Context<'_>, id: &ID) -> AppResult<Option<JournalEntry>> {
    identity(ctx)?.require()?;
    match parse_id(id) {
        Some(id) => load_journal_entry(ctx, id).await,
        None => Ok(None),
    }
}

async fn page(ctx: &Context<'_>, pager: Pager) -> AppResult<JournalEntryConnection> {
    let author = identity(ctx)?.require()?;
    let request = PageRequest::parse(&pager.into(), &TimestampCursor)?;
    let connection = JournalEntryRepo::connection(pool(ctx)?, author.id, &request).await?;

    let loaders = loaders(ctx)?;
    for entry in connection.nodes() {
        loaders.journal_entries.prime(entry.id, entry.clone());
    }
    Ok(JournalEntryConnection::from_page(connection, JournalEntry))
}

// ---------------------------------------------------------------------------
// Mutations
// ---------------------------------------------------------------------------

#[derive(Debug, InputObject)]
#[graphql(rename_fields = "snake_case")]
pub struct CreateJournalEntryInput {
    pub title: String,
    pub content: String,
    pub date: Option<Timestamp>,
}

impl From<CreateJournalEntryInput> for model::CreateJournalEntry {
    fn from(input: CreateJournalEntryInput) -> Self {
        Self {
            title: input.title,
            content: input.content,
            date: input.date,
        }
    }
}

#[derive(Debug, InputObject)]
#[graphql(rename_fields = "snake_case")]
pub struct UpdateJournalEntryInput {
    pub title: Option<String>,
    pub content: Option<String>,
    pub date: Option<Timestamp>,
}

impl From<UpdateJournalEntryInput> for model::UpdateJournalEntry {
    fn from(input: UpdateJournalEntryInput) -> Self {
        Self {
            title: input.title,
            content: input.content,
            date: input.date,
        }
    }
}

#[derive(Default)]
pub struct JournalEntryMutation;

#[Object(rename_fields = "snake_case")]
impl JournalEntryMutation {
    async fn create_journal_entry(
        &self,
        ctx: &Context<'_>,
        input: CreateJournalEntryInput,
    ) -> Result<JournalEntry> {
        create(ctx, input).await.extend()
    }

    /// Change an entry. A changed body is recorded as an edit.
    async fn update_journal_entry(
        &self,
        ctx: &Context<'_>,
        id: ID,
        input: UpdateJournalEntryInput,
    ) -> Result<JournalEntry> {
        update(ctx, &id, input).await.extend()
    }

    /// Delete an entry and its edit history, returning its id.
    async fn delete_journal_entry(&self, ctx: &Context<'_>, id: ID) -> Result<ID> {
        delete(ctx, &id).await.extend()
    }
}

async fn create(ctx: &Context<'_>, input: CreateJournalEntryInput) -> AppResult<JournalEntry> {
    let author = identity(ctx)?.require()?;
    require_non_blank("title", &input.title)?;

    let entry = JournalEntryRepo::create(pool(ctx)?, author.id, &input.into()).await?;
    tracing::info!(journal_entry_id = %entry.id, author_id = %author.id, "Journal entry created");

    loaders(ctx)?.journal_entries.prime(entry.id, entry.clone());
    Ok(JournalEntry(entry))
}

/// Load `id` for a change by the logged-in author.
async fn load_owned(ctx: &Context<'_>, id: &ID) -> AppResult<model::JournalEntry> {
    let author = identity(ctx)?.require()?;
    let id = require_id(ENTITY, id)?;
    let entry = loaders(ctx)?
        .journal_entries
        .load(id)
        .await?
        .ok_or(CoreError::NotFound { entity: ENTITY, id })?;
    require_owner(author, entry.author_id)?;
    Ok(entry)
}

async fn update(
    ctx: &Context<'_>,
    id: &ID,
    input: UpdateJournalEntryInput,
) -> AppResult<JournalEntry> {
    let existing = load_owned(ctx, id).await?;
    require_non_blank_if_present("title", input.title.as_deref())?;

    let entry = JournalEntryRepo::update(pool(ctx)?, existing.id, &input.into())
        .await?
        .ok_or(CoreError::NotFound {
            entity: ENTITY,
            id: existing.id,
        })?;
    tracing::info!(journal_entry_id = %entry.id, "Journal entry updated");

    let loaders = loaders(ctx)?;
    loaders.journal_entries.clear(&entry.id);
    loaders.journal_entries.prime(entry.id, entry.clone());
    loaders.edits_by_content.clear(&entry.id);
    Ok(JournalEntry(entry))
}

async fn delete(ctx: &Context<'_>, id: &ID) -> AppResult<ID> {
    let existing = load_owned(ctx, id).await?;

    if !JournalEntryRepo::delete(pool(ctx)?, existing.id).await? {
        return Err(CoreError::NotFound {
            entity: ENTITY,
            id: existing.id,
        }
        .into());
    }
    tracing::info!(journal_entry_id = %existing.id, "Journal entry deleted");

    let loaders = loaders(ctx)?;
    loaders.journal_entries.clear(&existing.id);
    loaders.edits_by_content.clear(&existing.id);
    loaders.types.clear(&existing.id);
    Ok(ID::from(existing.id))
}
