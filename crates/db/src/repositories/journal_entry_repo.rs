//! Repository for journal entries (`content` joined with `journal_entries`).
//!
//! Journal entries are private; every read other than by primary key is
//! scoped to one author.

use inkwell_core::entity::EntityType;
use inkwell_core::pagination::{paginate, Connection, PageRequest, SortOrder, TimestampCursor};
use inkwell_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use super::content;
use crate::models::journal_entry::{CreateJournalEntry, JournalEntry, UpdateJournalEntry};
use crate::pagination::TimestampPageSource;

/// Column list for journal entry queries.
const COLUMNS: &str = "c.id, c.author_id, c.title, c.content, j.date, c.created_at, c.updated_at";

const FROM: &str = "journal_entries j JOIN content c ON c.id = j.id";

/// Provides CRUD operations and paging for journal entries.
pub struct JournalEntryRepo;

impl JournalEntryRepo {
    /// Create an entry owned by `author_id`, returning the created row.
    pub async fn create(
        pool: &PgPool,
        author_id: DbId,
        input: &CreateJournalEntry,
    ) -> Result<JournalEntry, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let id = content::insert(
            &mut tx,
            EntityType::JournalEntry,
            author_id,
            &input.title,
            &input.content,
        )
        .await?;

        sqlx::query(
            "INSERT INTO journal_entries (id, date)
             VALUES ($1, DATE_TRUNC('milliseconds', COALESCE($2, CLOCK_TIMESTAMP())))",
        )
        .bind(id)
        .bind(input.date)
        .execute(&mut *tx)
        .await?;

        let query = format!("SELECT {COLUMNS} FROM {FROM} WHERE c.id = $1");
        let entry = sqlx::query_as::<_, JournalEntry>(&query)
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(entry)
    }

    /// Entries among `ids` written by `author_id`, in no particular order.
    pub async fn find_by_ids_for_author(
        pool: &PgPool,
        ids: &[DbId],
        author_id: DbId,
    ) -> Result<Vec<JournalEntry>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM {FROM} WHERE c.id = ANY($1) AND c.author_id = $2");
        sqlx::query_as::<_, JournalEntry>(&query)
            .bind(ids)
            .bind(author_id)
            .fetch_all(pool)
            .await
    }

    /// One page of `author_id`'s entries, ordered by date descending.
    pub async fn connection(
        pool: &PgPool,
        author_id: DbId,
        request: &PageRequest<Timestamp>,
    ) -> Result<Connection<JournalEntry>, sqlx::Error> {
        let source =
            TimestampPageSource::new(pool, COLUMNS, FROM, "j.date", entry_date).owned_by(author_id);
        paginate(&source, SortOrder::Desc, request, &TimestampCursor).await
    }

    /// Update an entry, recording an edit when the body changes.
    ///
    /// Returns `None` if no journal entry with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateJournalEntry,
    ) -> Result<Option<JournalEntry>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let result = sqlx::query(
            "UPDATE journal_entries SET
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
        let entry = sqlx::query_as::<_, JournalEntry>(&query)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(entry)
    }

    /// Delete an entry with its edit history. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        content::delete(pool, EntityType::JournalEntry, id).await
    }
}

fn entry_date(entry: &JournalEntry) -> Timestamp {
    entry.date
}
