//! Statements shared by every content kind.
//!
//! A content item is an `entity_ids` row, a `content` row holding the author,
//! title and body, and one subtype row (`blog_posts`, `journal_entries` or
//! `drafts`) sharing the same id.

use chrono::Utc;
use inkwell_core::entity::EntityType;
use inkwell_core::types::DbId;
use sqlx::PgPool;

use super::{EditRepo, NodeRepo};

/// Register an id and insert the `content` row for it.
pub(super) async fn insert(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    kind: EntityType,
    author_id: DbId,
    title: &str,
    content: &str,
) -> Result<DbId, sqlx::Error> {
    debug_assert!(kind.is_content(), "{kind} is not a content kind");
    let id = NodeRepo::register(tx, kind).await?;
    sqlx::query("INSERT INTO content (id, author_id, title, content) VALUES ($1, $2, $3, $4)")
        .bind(id)
        .bind(author_id)
        .bind(title)
        .bind(content)
        .execute(&mut **tx)
        .await?;
    Ok(id)
}

/// Rewrite title and body, recording an edit when the body changes.
///
/// Returns `false` when no content row has this id.
pub(super) async fn update(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    id: DbId,
    title: Option<&str>,
    content: Option<&str>,
) -> Result<bool, sqlx::Error> {
    let old = sqlx::query_scalar::<_, String>("SELECT content FROM content WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?;
    let Some(old) = old else {
        return Ok(false);
    };

    if let Some(new) = content {
        EditRepo::record_edit(tx, id, &old, new, Utc::now()).await?;
    }

    sqlx::query(
        "UPDATE content SET
            title = COALESCE($2, title),
            content = COALESCE($3, content),
            updated_at = DATE_TRUNC('milliseconds', CLOCK_TIMESTAMP())
         WHERE id = $1",
    )
    .bind(id)
    .bind(title)
    .bind(content)
    .execute(&mut **tx)
    .await?;
    Ok(true)
}

/// Delete a content item of the given kind together with its edit history.
///
/// Removing the registry row cascades to the content, subtype and edit rows;
/// the registry rows of the edits are removed explicitly. Returns `false`
/// when no item of this kind has the id.
pub(super) async fn delete(pool: &PgPool, kind: EntityType, id: DbId) -> Result<bool, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let edit_ids = sqlx::query_scalar::<_, DbId>("DELETE FROM edits WHERE content_id = $1 RETURNING id")
        .bind(id)
        .fetch_all(&mut *tx)
        .await?;

    let result = sqlx::query(
        "DELETE FROM entity_ids
         WHERE id = $1 AND type_id = (SELECT id FROM entity_types WHERE name = $2)",
    )
    .bind(id)
    .bind(kind.as_str())
    .execute(&mut *tx)
    .await?;
    if result.rows_affected() == 0 {
        // Dropping the transaction rolls back the edit deletion.
        return Ok(false);
    }

    sqlx::query("DELETE FROM entity_ids WHERE id = ANY($1)")
        .bind(&edit_ids)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    tracing::debug!(%id, kind = %kind, edits = edit_ids.len(), "Deleted content item");
    Ok(true)
}
