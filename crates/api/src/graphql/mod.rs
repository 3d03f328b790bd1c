//! The GraphQL schema.
//!
//! Each entity module contributes its object type plus a query and a mutation
//! fragment; the fragments are merged into [`QueryRoot`] and
//! [`MutationRoot`]. Resolvers do their work in functions returning
//! [`AppResult`] and convert at the edge with
//! [`ResultExt::extend`](async_graphql::ResultExt::extend), so every GraphQL
//! error carries the same `code` extension the HTTP layer uses.
//!
//! Content types and their operations use snake_case field names; author
//! operations and connection metadata use camelCase.

pub mod author;
pub mod blog_post;
pub mod context;
pub mod draft;
pub mod edit;
pub mod journal_entry;
pub mod loaders;
pub mod node;
pub mod pagination;

use std::time::Duration;

use async_graphql::{EmptySubscription, MergedObject, Schema, ID};
use inkwell_core::error::CoreError;
use inkwell_core::loader::LoaderConfig;
use inkwell_core::types::DbId;
use inkwell_db::DbPool;

use crate::auth::jwt::TokenAuthor;
use crate::config::ServerConfig;
use crate::error::AppResult;

#[derive(MergedObject, Default)]
pub struct QueryRoot(
    node::NodeQuery,
    author::AuthorQuery,
    blog_post::BlogPostQuery,
    journal_entry::JournalEntryQuery,
    draft::DraftQuery,
);

#[derive(MergedObject, Default)]
pub struct MutationRoot(
    author::AuthorMutation,
    blog_post::BlogPostMutation,
    journal_entry::JournalEntryMutation,
    draft::DraftMutation,
);

pub type InkwellSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

/// Build the schema with the pool and JWT settings attached.
///
/// The identity and the loader set are per-request data, attached by the
/// HTTP handler.
pub fn build_schema(pool: DbPool, config: &ServerConfig) -> InkwellSchema {
    Schema::build(QueryRoot::default(), MutationRoot::default(), EmptySubscription)
        .data(pool)
        .data(config.jwt.clone())
        .register_output_type::<node::Content>()
        .limit_depth(config.graphql_depth_limit)
        .limit_complexity(config.graphql_complexity_limit)
        .finish()
}

/// Loader tuning derived from server configuration.
pub fn loader_config(config: &ServerConfig) -> LoaderConfig {
    LoaderConfig {
        delay: Duration::from_millis(config.loader_delay_ms),
        ..LoaderConfig::default()
    }
}

/// Parse a client-supplied id. Anything that is not a UUID names nothing.
pub(crate) fn parse_id(id: &ID) -> Option<DbId> {
    uuid::Uuid::parse_str(id.as_str()).ok()
}

/// Like [`parse_id`], for mutations, where an unknown id is an error.
pub(crate) fn require_id(entity: &'static str, id: &ID) -> AppResult<DbId> {
    parse_id(id).ok_or_else(|| {
        CoreError::Validation(format!("'{}' is not a valid {entity} id", id.as_str())).into()
    })
}

/// Reject changes to content owned by someone else.
pub(crate) fn require_owner(author: &TokenAuthor, owner_id: DbId) -> AppResult<()> {
    if author.id != owner_id {
        return Err(
            CoreError::Forbidden("Only the author may change this content.".into()).into(),
        );
    }
    Ok(())
}
