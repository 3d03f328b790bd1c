//! Polymorphic lookup through the shared id registry.
//!
//! Every id the server hands out is registered with its entity type, so a
//! bare id is enough to find the row: the type comes from the request's type
//! loader, the row from the loader for that type.

use async_graphql::{Context, Interface, Object, Result, ResultExt, ID};
use inkwell_core::entity::EntityType;
use inkwell_core::types::DbId;

use super::author::{load_author, Author};
use super::blog_post::{load_blog_post, BlogPost};
use super::context::loaders;
use super::draft::{load_draft, Draft};
use super::edit::{load_edit, Edit};
use super::journal_entry::{load_journal_entry, JournalEntry};
use super::parse_id;
use crate::error::AppResult;

/// Anything with a globally unique id.
#[derive(Interface)]
#[graphql(field(name = "id", ty = "ID"))]
pub enum Node {
    Author(Author),
    BlogPost(BlogPost),
    JournalEntry(JournalEntry),
    Draft(Draft),
    Edit(Edit),
}

impl Node {
    /// The node as a content item, if it is one.
    pub fn into_content(self) -> Option<Content> {
        match self {
            Self::BlogPost(post) => Some(Content::BlogPost(post)),
            Self::JournalEntry(entry) => Some(Content::JournalEntry(entry)),
            Self::Draft(draft) => Some(Content::Draft(draft)),
            Self::Author(_) | Self::Edit(_) => None,
        }
    }
}

/// A titled body of text with an edit history.
#[derive(Interface)]
#[graphql(
    field(name = "id", ty = "ID"),
    field(name = "title", ty = "String"),
    field(name = "content", ty = "String")
)]
pub enum Content {
    BlogPost(BlogPost),
    JournalEntry(JournalEntry),
    Draft(Draft),
}

/// Find whatever `id` names, as far as the viewer may see it.
pub(super) async fn resolve_node(ctx: &Context<'_>, id: DbId) -> AppResult<Option<Node>> {
    let Some(kind) = loaders(ctx)?.types.load(id).await? else {
        return Ok(None);
    };

    let node = match kind {
        EntityType::Author => load_author(ctx, id).await?.map(Node::Author),
        EntityType::BlogPost => load_blog_post(ctx, id).await?.map(Node::BlogPost),
        EntityType::JournalEntry => load_journal_entry(ctx, id)
            .await?
            .map(Node::JournalEntry),
        EntityType::Draft => load_draft(ctx, id).await?.map(Node::Draft),
        EntityType::Edit => load_edit(ctx, id).await?.map(Node::Edit),
    };
    Ok(node)
}

#[derive(Default)]
pub struct NodeQuery;

#[Object]
impl NodeQuery {
    /// Look up any entity by id. Unknown ids resolve to `null`.
    async fn node(&self, ctx: &Context<'_>, id: ID) -> Result<Option<Node>> {
        match parse_id(&id) {
            Some(id) => resolve_node(ctx, id).await.extend(),
            None => Ok(None),
        }
    }
}
