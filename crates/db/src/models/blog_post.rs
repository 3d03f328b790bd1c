//! Blog post model: a `content` row joined with its `blog_posts` row.

use inkwell_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct BlogPost {
    pub id: DbId,
    pub author_id: DbId,
    pub title: String,
    pub content: String,
    pub is_published: bool,
    pub publish_date: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a blog post. Unpublished and dated now unless given.
#[derive(Debug, Deserialize)]
pub struct CreateBlogPost {
    pub title: String,
    pub content: String,
    pub is_published: Option<bool>,
    pub publish_date: Option<Timestamp>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateBlogPost {
    pub title: Option<String>,
    pub content: Option<String>,
    pub is_published: Option<bool>,
    pub publish_date: Option<Timestamp>,
}
