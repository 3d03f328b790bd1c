//! Entity type tags stored in the shared id registry.
//!
//! Every id handed out by the server is first registered together with one of
//! these tags, which is what lets a bare id be resolved back to its row.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// The kind of entity an id was allocated for.
///
/// The string forms match the rows seeded into the `entity_types` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityType {
    Author,
    BlogPost,
    JournalEntry,
    Draft,
    Edit,
}

impl EntityType {
    /// All tags, in the order they are seeded.
    pub const ALL: [EntityType; 5] = [
        Self::Author,
        Self::BlogPost,
        Self::JournalEntry,
        Self::Draft,
        Self::Edit,
    ];

    /// String representation for display, logging, and database storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Author => "Author",
            Self::BlogPost => "BlogPost",
            Self::JournalEntry => "JournalEntry",
            Self::Draft => "Draft",
            Self::Edit => "Edit",
        }
    }

    /// Whether the tag denotes a content item (something with a title, a
    /// body and an edit history).
    pub fn is_content(&self) -> bool {
        matches!(self, Self::BlogPost | Self::JournalEntry | Self::Draft)
    }
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| CoreError::Internal(format!("Unknown entity type tag '{s}'")))
    }
}
