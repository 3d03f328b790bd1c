//! Repository for the `edits` table.

use inkwell_core::diff::compute_changes;
use inkwell_core::entity::EntityType;
use inkwell_core::types::{DbId, Timestamp};
use sqlx::types::Json;
use sqlx::PgPool;

use super::NodeRepo;
use crate::models::edit::Edit;

/// Column list for edits queries.
const COLUMNS: &str = "id, content_id, date, changes";

/// Records and reads the change history of content bodies.
pub struct EditRepo;

impl EditRepo {
    /// Diff `old` against `new` and store the result as an edit of
    /// `content_id`, inside the caller's transaction.
    ///
    /// Returns `None` without writing anything when the texts are equal.
    pub async fn record_edit(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        content_id: DbId,
        old: &str,
        new: &str,
        date: Timestamp,
    ) -> Result<Option<Edit>, sqlx::Error> {
        let Some(changes) = compute_changes(old, new) else {
            return Ok(None);
        };

        let id = NodeRepo::register(tx, EntityType::Edit).await?;
        let query = format!(
            "INSERT INTO edits (id, content_id, date, changes)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        let edit = sqlx::query_as::<_, Edit>(&query)
            .bind(id)
            .bind(content_id)
            .bind(date)
            .bind(Json(&changes))
            .fetch_one(&mut **tx)
            .await?;

        tracing::debug!(edit_id = %edit.id, %content_id, segments = changes.len(), "Recorded content edit");
        Ok(Some(edit))
    }

    /// Find an edit by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Edit>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM edits WHERE id = $1");
        sqlx::query_as::<_, Edit>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Edits among `ids` that `viewer` may see: edits of blog posts, plus
    /// edits of private content written by `viewer`.
    pub async fn find_by_ids_visible_to(
        pool: &PgPool,
        ids: &[DbId],
        viewer: Option<DbId>,
    ) -> Result<Vec<Edit>, sqlx::Error> {
        sqlx::query_as::<_, Edit>(
            "SELECT e.id, e.content_id, e.date, e.changes FROM edits e
             JOIN content c ON c.id = e.content_id
             LEFT JOIN blog_posts b ON b.id = c.id
             WHERE e.id = ANY($1) AND (b.id IS NOT NULL OR c.author_id = $2)",
        )
        .bind(ids)
        .bind(viewer)
        .fetch_all(pool)
        .await
    }

    /// Edits of a content item, most recent first.
    pub async fn list_for_content(pool: &PgPool, content_id: DbId) -> Result<Vec<Edit>, sqlx::Error> {
        Self::list_for_contents(pool, &[content_id]).await
    }

    /// Edits of several content items, most recent first.
    pub async fn list_for_contents(
        pool: &PgPool,
        content_ids: &[DbId],
    ) -> Result<Vec<Edit>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM edits
             WHERE content_id = ANY($1)
             ORDER BY date DESC, id DESC"
        );
        sqlx::query_as::<_, Edit>(&query)
            .bind(content_ids)
            .fetch_all(pool)
            .await
    }
}
