//! Draft model.

use inkwell_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A private work-in-progress `content` row.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Draft {
    pub id: DbId,
    pub author_id: DbId,
    pub title: String,
    pub content: String,
    pub date: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Deserialize)]
pub struct CreateDraft {
    pub title: String,
    pub content: String,
    pub date: Option<Timestamp>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateDraft {
    pub title: Option<String>,
    pub content: Option<String>,
    pub date: Option<Timestamp>,
}
