//! Repository for drafts (`content` joined with `drafts`).
//!
//! Drafts are private; every read other than by primary key is
//! scoped to one author.

use inkwell_core::entity::EntityType;
use inkwell_core::pagination::{paginate, Connection, PageRequest, SortOrder, TimestampCursor};
use inkwell_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use super::content;
use crate::models::draft::{CreateDraft, Draft, UpdateDraft};
use crate::pagination::TimestampPageSource;

/// Column list for draft queries.
const COLUMNS: &str = "c.id, c.author_id, c.title, c.content, d.date, c.created_at, c.updated_at";

const FROM: &str = "drafts d JOIN content c ON c.id = d.id";

/// Provides CRUD operations and paging for drafts.
pub struct DraftRepo;

impl DraftRepo {
    /// Create a draft owned by `author_id`, returning the created row.
    pub async fn create(
        pool: &PgPool,
        author_id: DbId,
        input: &CreateDraft,
    ) -> Result<Draft, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let id = content::insert(
            &mut tx,
            EntityType::Draft,
            author_id,
            &input.title,
            &input.content,
        )
        .await?;

        sqlx::query(
            "INSERT INTO drafts (id, date)
             VALUES ($1, DATE_TRUNC('milliseconds', COALESCE($2, CLOCK_TIMESTAMP())))",
        )
        .bind(id)
        .bind(input.date)
        .execute(&mut *tx)
        .await?;

        let query = format!("SELECT {COLUMNS} FROM {FROM} WHERE c.id = $1");
        let draft = sqlx::query_as::<_, Draft>(&query)
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(draft)
    }

    /// Find a draft by its ID, regardless of owner.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Draft>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM {FROM} WHERE c.id = $1");
        sqlx::query_as::<_, Draft>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Drafts among `ids` written by `author_id`, in no particular order.
    pub async fn find_by_ids_for_author(
        pool: &PgPool,
        ids: &[DbId],
        author_id: DbId,
    ) -> Result<Vec<Draft>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM {FROM} WHERE c.id = ANY($1) AND c.author_id = $2");
        sqlx::query_as::<_, Draft>(&query)
            .bind(ids)
            .bind(author_id)
            .fetch_all(pool)
            .await
    }

    /// One page of `author_id`'s drafts, ordered by date descending.
    pub async fn connection(
        pool: &PgPool,
        author_id: DbId,
        request: &PageRequest<Timestamp>,
    ) -> Result<Connection<Draft>, sqlx::Error> {
        let source =
            TimestampPageSource::new(pool, COLUMNS, FROM, "d.date", draft_date).owned_by(author_id);
        paginate(&source, SortOrder::Desc, request, &TimestampCursor).await
    }

    /// Update a draft, recording an edit when the body changes.
    ///
    /// Returns `None` if no draft with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateDraft,
    ) -> Result<Option<Draft>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let result = sqlx::query(
            "UPDATE drafts SET
                date = DATE_TRUNC('milliseconds', COALESCE($2, date))
             WHERE id = $1",
        )
        .bind(id)
        .bind(input.date)
        .execute(&mut *tx)
        .await?;
        if result.rows_affected() == 0 {
            return Ok(None);
        }

        content::update(&mut tx, id, input.title.as_deref(), input.content.as_deref()).await?;

        let query = format!("SELECT {COLUMNS} FROM {FROM} WHERE c.id = $1");
        let draft = sqlx::query_as::<_, Draft>(&query)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(draft)
    }

    /// Delete a draft with its edit history. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        content::delete(pool, EntityType::Draft, id).await
    }
}

fn draft_date(draft: &Draft) -> Timestamp {
    draft.date
}
