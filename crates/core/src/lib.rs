//! Domain logic for the inkwell journaling server.
//!
//! Nothing in this crate touches the database: the batched loader, the
//! connection pager and the word-diff tracker are generic over their data
//! sources so the persistence and API layers can plug into them.

pub mod diff;
pub mod entity;
pub mod error;
pub mod loader;
pub mod pagination;
pub mod types;
pub mod validation;
