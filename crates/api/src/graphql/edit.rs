//! Edit records: the word-level change list captured on every content
//! update that changed the body.

use async_graphql::{Context, Object, Result, ResultExt, SimpleObject, ID};
use inkwell_core::diff;
use inkwell_core::types::{DbId, Timestamp};
use inkwell_db::models::edit as model;

use super::context::loaders;
use super::node::{resolve_node, Content};
use crate::error::AppResult;

/// One run of an edit. Neither flag set means the text is unchanged.
#[derive(Debug, Clone, SimpleObject)]
pub struct EditChange {
    pub text: String,
    pub added: Option<bool>,
    pub removed: Option<bool>,
}

impl From<&diff::EditChange> for EditChange {
    fn from(change: &diff::EditChange) -> Self {
        Self {
            text: change.text.clone(),
            added: change.added,
            removed: change.removed,
        }
    }
}

pub struct Edit(pub model::Edit);

#[Object(rename_fields = "snake_case")]
impl Edit {
    pub(crate) async fn id(&self) -> ID {
        ID::from(self.0.id)
    }

    /// The blog post, journal entry or draft this edit changed.
    async fn content(&self, ctx: &Context<'_>) -> Result<Option<Content>> {
        parent(ctx, self.0.content_id).await.extend()
    }

    async fn date(&self) -> Timestamp {
        self.0.date
    }

    async fn changes(&self) -> Vec<EditChange> {
        self.0.changes.iter().map(EditChange::from).collect()
    }
}

async fn parent(ctx: &Context<'_>, content_id: DbId) -> AppResult<Option<Content>> {
    Ok(resolve_node(ctx, content_id)
        .await?
        .and_then(|node| node.into_content()))
}

/// Resolve one edit through the request's loader.
pub(super) async fn load_edit(ctx: &Context<'_>, id: DbId) -> AppResult<Option<Edit>> {
    Ok(loaders(ctx)?.edits.load(id).await?.map(Edit))
}

/// Edit history of a content item, most recent first.
pub(super) async fn edits_of(ctx: &Context<'_>, content_id: DbId) -> AppResult<Vec<Edit>> {
    let edits = loaders(ctx)?
        .edits_by_content
        .load(content_id)
        .await?
        .unwrap_or_default();
    Ok(edits.into_iter().map(Edit).collect())
}
