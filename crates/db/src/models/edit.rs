//! Edit history model.

use inkwell_core::diff::EditChange;
use inkwell_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;
use sqlx::types::Json;

/// A row from the `edits` table: one recorded change to a content body.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Edit {
    pub id: DbId,
    pub content_id: DbId,
    pub date: Timestamp,
    pub changes: Json<Vec<EditChange>>,
}
