//! Repository for blog posts (`content` joined with `blog_posts`).

use inkwell_core::entity::EntityType;
use inkwell_core::pagination::{paginate, Connection, PageRequest, SortOrder, TimestampCursor};
use inkwell_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use super::content;
use crate::models::blog_post::{BlogPost, CreateBlogPost, UpdateBlogPost};
use crate::pagination::TimestampPageSource;

/// Column list for blog post queries.
const COLUMNS: &str = "c.id, c.author_id, c.title, c.content, \
    b.is_published, b.publish_date, c.created_at, c.updated_at";

const FROM: &str = "blog_posts b JOIN content c ON c.id = b.id";

/// Provides CRUD operations and paging for blog posts.
pub struct BlogPostRepo;

impl BlogPostRepo {
    /// Create a post owned by `author_id`, returning the created row.
    pub async fn create(
        pool: &PgPool,
        author_id: DbId,
        input: &CreateBlogPost,
    ) -> Result<BlogPost, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let id = content::insert(
            &mut tx,
            EntityType::BlogPost,
            author_id,
            &input.title,
            &input.content,
        )
        .await?;

        sqlx::query(
            "INSERT INTO blog_posts (id, is_published, publish_date)
             VALUES ($1, COALESCE($2, FALSE),
                     DATE_TRUNC('milliseconds', COALESCE($3, CLOCK_TIMESTAMP())))",
        )
        .bind(id)
        .bind(input.is_published)
        .bind(input.publish_date)
        .execute(&mut *tx)
        .await?;

        let query = format!("SELECT {COLUMNS} FROM {FROM} WHERE c.id = $1");
        let post = sqlx::query_as::<_, BlogPost>(&query)
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(post)
    }

    /// Find a blog post by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<BlogPost>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM {FROM} WHERE c.id = $1");
        sqlx::query_as::<_, BlogPost>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Every blog post whose id is in `ids`, in no particular order.
    pub async fn find_by_ids(pool: &PgPool, ids: &[DbId]) -> Result<Vec<BlogPost>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM {FROM} WHERE c.id = ANY($1)");
        sqlx::query_as::<_, BlogPost>(&query)
            .bind(ids)
            .fetch_all(pool)
            .await
    }

    /// Posts written by any of `author_ids`, newest first.
    pub async fn list_by_authors(
        pool: &PgPool,
        author_ids: &[DbId],
    ) -> Result<Vec<BlogPost>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM {FROM}
             WHERE c.author_id = ANY($1)
             ORDER BY b.publish_date DESC, c.id DESC"
        );
        sqlx::query_as::<_, BlogPost>(&query)
            .bind(author_ids)
            .fetch_all(pool)
            .await
    }

    /// One page of every blog post, ordered by publish date descending.
    pub async fn connection(
        pool: &PgPool,
        request: &PageRequest<Timestamp>,
    ) -> Result<Connection<BlogPost>, sqlx::Error> {
        let source = TimestampPageSource::new(pool, COLUMNS, FROM, "b.publish_date", publish_date);
        paginate(&source, SortOrder::Desc, request, &TimestampCursor).await
    }

    /// Update a post, recording an edit when the body changes.
    ///
    /// Returns `None` if no blog post with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateBlogPost,
    ) -> Result<Option<BlogPost>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let result = sqlx::query(
            "UPDATE blog_posts SET
                is_published = COALESCE($2, is_published),
                publish_date = DATE_TRUNC('milliseconds', COALESCE($3, publish_date))
             WHERE id = $1",
        )
        .bind(id)
        .bind(input.is_published)
        .bind(input.publish_date)
        .execute(&mut *tx)
        .await?;
        if result.rows_affected() == 0 {
            return Ok(None);
        }

        content::update(&mut tx, id, input.title.as_deref(), input.content.as_deref()).await?;

        let query = format!("SELECT {COLUMNS} FROM {FROM} WHERE c.id = $1");
        let post = sqlx::query_as::<_, BlogPost>(&query)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(post)
    }

    /// Delete a post with its edit history. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        content::delete(pool, EntityType::BlogPost, id).await
    }
}

fn publish_date(post: &BlogPost) -> Timestamp {
    post.publish_date
}
