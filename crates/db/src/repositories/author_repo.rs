//! Repository for the `authors` table.

use inkwell_core::entity::EntityType;
use inkwell_core::types::DbId;
use inkwell_core::validation::normalize_username;
use sqlx::PgPool;

use super::NodeRepo;
use crate::models::author::{Author, CreateAuthor, UpdateAuthor};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, username, password_hash, created_at";

/// Provides CRUD operations for authors.
///
/// Usernames are stored lower-cased and looked up case-insensitively.
pub struct AuthorRepo;

impl AuthorRepo {
    /// Register an id and insert the author, returning the created row.
    ///
    /// A taken username fails with the `uq_authors_username` violation.
    pub async fn create(pool: &PgPool, input: &CreateAuthor) -> Result<Author, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let id = NodeRepo::register(&mut tx, EntityType::Author).await?;

        let query = format!(
            "INSERT INTO authors (id, name, username, password_hash)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        let author = sqlx::query_as::<_, Author>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(normalize_username(&input.username))
            .bind(&input.password_hash)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(author)
    }

    /// Find an author by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Author>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM authors WHERE id = $1");
        sqlx::query_as::<_, Author>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Every author whose id is in `ids`, in no particular order.
    pub async fn find_by_ids(pool: &PgPool, ids: &[DbId]) -> Result<Vec<Author>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM authors WHERE id = ANY($1)");
        sqlx::query_as::<_, Author>(&query)
            .bind(ids)
            .fetch_all(pool)
            .await
    }

    /// Find an author by username, ignoring case.
    pub async fn find_by_username(
        pool: &PgPool,
        username: &str,
    ) -> Result<Option<Author>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM authors WHERE username = $1");
        sqlx::query_as::<_, Author>(&query)
            .bind(normalize_username(username))
            .fetch_optional(pool)
            .await
    }

    /// Find the earliest-registered author with this display name.
    pub async fn find_by_name(pool: &PgPool, name: &str) -> Result<Option<Author>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM authors WHERE name = $1
             ORDER BY created_at ASC, id ASC
             LIMIT 1"
        );
        sqlx::query_as::<_, Author>(&query)
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    /// List all authors, oldest first.
    pub async fn list(pool: &PgPool) -> Result<Vec<Author>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM authors ORDER BY created_at ASC, id ASC");
        sqlx::query_as::<_, Author>(&query).fetch_all(pool).await
    }

    /// Update an author. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateAuthor,
    ) -> Result<Option<Author>, sqlx::Error> {
        let query = format!(
            "UPDATE authors SET
                name = COALESCE($2, name),
                username = COALESCE($3, username),
                password_hash = COALESCE($4, password_hash)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Author>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(input.username.as_deref().map(normalize_username))
            .bind(&input.password_hash)
            .fetch_optional(pool)
            .await
    }
}
