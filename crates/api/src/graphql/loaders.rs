//! Request-scoped batched loaders.
//!
//! A fresh [`Loaders`] set is built for every GraphQL request, so cached rows
//! never leak between requests or between viewers. Loaders for private
//! content are bound to the requesting author and resolve other authors'
//! rows to `None`.

use std::collections::HashMap;

use async_trait::async_trait;
use inkwell_core::entity::EntityType;
use inkwell_core::loader::{BatchLoad, DataLoader, LoaderConfig};
use inkwell_core::types::DbId;
use inkwell_db::models::author::Author;
use inkwell_db::models::blog_post::BlogPost;
use inkwell_db::models::draft::Draft;
use inkwell_db::models::edit::Edit;
use inkwell_db::models::journal_entry::JournalEntry;
use inkwell_db::repositories::{
    AuthorRepo, BlogPostRepo, DraftRepo, EditRepo, JournalEntryRepo, NodeRepo,
};
use inkwell_db::DbPool;

/// Line up fetched `rows` with the requested `keys`.
fn by_key<T>(keys: &[DbId], rows: Vec<T>, key: impl Fn(&T) -> DbId) -> Vec<Option<T>> {
    let mut rows: HashMap<DbId, T> = rows.into_iter().map(|row| (key(&row), row)).collect();
    keys.iter().map(|k| rows.remove(k)).collect()
}

/// Group fetched `rows` under the requested `keys`, keeping row order.
fn grouped_by_key<T>(
    keys: &[DbId],
    rows: Vec<T>,
    key: impl Fn(&T) -> DbId,
) -> Vec<Option<Vec<T>>> {
    let mut groups: HashMap<DbId, Vec<T>> = HashMap::new();
    for row in rows {
        groups.entry(key(&row)).or_default().push(row);
    }
    keys.iter()
        .map(|k| Some(groups.remove(k).unwrap_or_default()))
        .collect()
}

// ---------------------------------------------------------------------------
// Batch functions
// ---------------------------------------------------------------------------

pub struct AuthorLoad {
    pool: DbPool,
}

#[async_trait]
impl BatchLoad for AuthorLoad {
    type Key = DbId;
    type Value = Author;
    type Error = sqlx::Error;

    fn name(&self) -> &'static str {
        "authors"
    }

    async fn load_batch(&self, keys: &[DbId]) -> Result<Vec<Option<Author>>, sqlx::Error> {
        let rows = AuthorRepo::find_by_ids(&self.pool, keys).await?;
        Ok(by_key(keys, rows, |a| a.id))
    }
}

pub struct BlogPostLoad {
    pool: DbPool,
}

#[async_trait]
impl BatchLoad for BlogPostLoad {
    type Key = DbId;
    type Value = BlogPost;
    type Error = sqlx::Error;

    fn name(&self) -> &'static str {
        "blog_posts"
    }

    async fn load_batch(&self, keys: &[DbId]) -> Result<Vec<Option<BlogPost>>, sqlx::Error> {
        let rows = BlogPostRepo::find_by_ids(&self.pool, keys).await?;
        Ok(by_key(keys, rows, |p| p.id))
    }
}

/// Every post of an author, newest first. Fetched posts also seed the
/// by-id loader.
pub struct BlogPostsByAuthorLoad {
    pool: DbPool,
    posts: DataLoader<BlogPostLoad>,
}

#[async_trait]
impl BatchLoad for BlogPostsByAuthorLoad {
    type Key = DbId;
    type Value = Vec<BlogPost>;
    type Error = sqlx::Error;

    fn name(&self) -> &'static str {
        "blog_posts_by_author"
    }

    async fn load_batch(&self, keys: &[DbId]) -> Result<Vec<Option<Vec<BlogPost>>>, sqlx::Error> {
        let rows = BlogPostRepo::list_by_authors(&self.pool, keys).await?;
        for post in &rows {
            self.posts.prime(post.id, post.clone());
        }
        Ok(grouped_by_key(keys, rows, |p| p.author_id))
    }
}

pub struct JournalEntryLoad {
    pool: DbPool,
    viewer: Option<DbId>,
}

#[async_trait]
impl BatchLoad for JournalEntryLoad {
    type Key = DbId;
    type Value = JournalEntry;
    type Error = sqlx::Error;

    fn name(&self) -> &'static str {
        "journal_entries"
    }

    async fn load_batch(&self, keys: &[DbId]) -> Result<Vec<Option<JournalEntry>>, sqlx::Error> {
        let Some(viewer) = self.viewer else {
            return Ok(vec![None; keys.len()]);
        };
        let rows = JournalEntryRepo::find_by_ids_for_author(&self.pool, keys, viewer).await?;
        Ok(by_key(keys, rows, |e| e.id))
    }
}

pub struct DraftLoad {
    pool: DbPool,
    viewer: Option<DbId>,
}

#[async_trait]
impl BatchLoad for DraftLoad {
    type Key = DbId;
    type Value = Draft;
    type Error = sqlx::Error;

    fn name(&self) -> &'static str {
        "drafts"
    }

    async fn load_batch(&self, keys: &[DbId]) -> Result<Vec<Option<Draft>>, sqlx::Error> {
        let Some(viewer) = self.viewer else {
            return Ok(vec![None; keys.len()]);
        };
        let rows = DraftRepo::find_by_ids_for_author(&self.pool, keys, viewer).await?;
        Ok(by_key(keys, rows, |d| d.id))
    }
}

pub struct EditLoad {
    pool: DbPool,
    viewer: Option<DbId>,
}

#[async_trait]
impl BatchLoad for EditLoad {
    type Key = DbId;
    type Value = Edit;
    type Error = sqlx::Error;

    fn name(&self) -> &'static str {
        "edits"
    }

    async fn load_batch(&self, keys: &[DbId]) -> Result<Vec<Option<Edit>>, sqlx::Error> {
        let rows = EditRepo::find_by_ids_visible_to(&self.pool, keys, self.viewer).await?;
        Ok(by_key(keys, rows, |e| e.id))
    }
}

/// The edit history of a content item, most recent first. Fetched edits
/// also seed the by-id loader.
pub struct EditsByContentLoad {
    pool: DbPool,
    edits: DataLoader<EditLoad>,
}

#[async_trait]
impl BatchLoad for EditsByContentLoad {
    type Key = DbId;
    type Value = Vec<Edit>;
    type Error = sqlx::Error;

    fn name(&self) -> &'static str {
        "edits_by_content"
    }

    async fn load_batch(&self, keys: &[DbId]) -> Result<Vec<Option<Vec<Edit>>>, sqlx::Error> {
        let rows = EditRepo::list_for_contents(&self.pool, keys).await?;
        for edit in &rows {
            self.edits.prime(edit.id, edit.clone());
        }
        Ok(grouped_by_key(keys, rows, |e| e.content_id))
    }
}

pub struct TypeLoad {
    pool: DbPool,
}

#[async_trait]
impl BatchLoad for TypeLoad {
    type Key = DbId;
    type Value = EntityType;
    type Error = sqlx::Error;

    fn name(&self) -> &'static str {
        "entity_types"
    }

    async fn load_batch(&self, keys: &[DbId]) -> Result<Vec<Option<EntityType>>, sqlx::Error> {
        let mut types: HashMap<DbId, EntityType> =
            NodeRepo::types_of(&self.pool, keys).await?.into_iter().collect();
        Ok(keys.iter().map(|k| types.remove(k)).collect())
    }
}

// ---------------------------------------------------------------------------
// Request loader set
// ---------------------------------------------------------------------------

/// Every loader a request may use, sharing one viewer.
#[derive(Clone)]
pub struct Loaders {
    pub authors: DataLoader<AuthorLoad>,
    pub blog_posts: DataLoader<BlogPostLoad>,
    pub blog_posts_by_author: DataLoader<BlogPostsByAuthorLoad>,
    pub journal_entries: DataLoader<JournalEntryLoad>,
    pub drafts: DataLoader<DraftLoad>,
    pub edits: DataLoader<EditLoad>,
    pub edits_by_content: DataLoader<EditsByContentLoad>,
    pub types: DataLoader<TypeLoad>,
}

impl Loaders {
    pub fn new(pool: DbPool, viewer: Option<DbId>, config: LoaderConfig) -> Self {
        let blog_posts = DataLoader::with_config(BlogPostLoad { pool: pool.clone() }, config);
        let edits = DataLoader::with_config(
            EditLoad {
                pool: pool.clone(),
                viewer,
            },
            config,
        );

        Self {
            authors: DataLoader::with_config(AuthorLoad { pool: pool.clone() }, config),
            blog_posts_by_author: DataLoader::with_config(
                BlogPostsByAuthorLoad {
                    pool: pool.clone(),
                    posts: blog_posts.clone(),
                },
                config,
            ),
            blog_posts,
            journal_entries: DataLoader::with_config(
                JournalEntryLoad {
                    pool: pool.clone(),
                    viewer,
                },
                config,
            ),
            drafts: DataLoader::with_config(
                DraftLoad {
                    pool: pool.clone(),
                    viewer,
                },
                config,
            ),
            edits_by_content: DataLoader::with_config(
                EditsByContentLoad {
                    pool: pool.clone(),
                    edits: edits.clone(),
                },
                config,
            ),
            edits,
            types: DataLoader::with_config(TypeLoad { pool }, config),
        }
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    #[test]
    fn by_key_follows_key_order_and_fills_gaps() {
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let rows = vec![(c, "c"), (a, "a")];

        let aligned = by_key(&[a, b, c], rows, |r| r.0);
        assert_eq!(aligned, vec![Some((a, "a")), None, Some((c, "c"))]);
    }

    #[test]
    fn grouped_by_key_gives_empty_lists_for_missing_keys() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let rows = vec![(a, 1), (a, 2)];

        let grouped = grouped_by_key(&[b, a], rows, |r| r.0);
        assert_eq!(grouped, vec![Some(vec![]), Some(vec![(a, 1), (a, 2)])]);
    }
}
