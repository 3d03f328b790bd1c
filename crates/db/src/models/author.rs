//! Author model.

use inkwell_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `authors` table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Author {
    pub id: DbId,
    pub name: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: Timestamp,
}

/// DTO for registering a new author. The password is already hashed.
#[derive(Debug, Deserialize)]
pub struct CreateAuthor {
    pub name: String,
    pub username: String,
    pub password_hash: String,
}

/// DTO for updating an author's profile or credentials.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateAuthor {
    pub name: Option<String>,
    pub username: Option<String>,
    pub password_hash: Option<String>,
}
