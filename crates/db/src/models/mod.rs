//! Row structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` struct matching a (joined) database row
//! - A `Deserialize` create DTO for inserts
//! - A `Deserialize` update DTO (all `Option` fields) for patches

pub mod author;
pub mod blog_post;
pub mod draft;
pub mod edit;
pub mod journal_entry;
