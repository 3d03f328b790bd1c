//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` (or an open transaction) as the first argument.

pub mod author_repo;
pub mod blog_post_repo;
mod content;
pub mod draft_repo;
pub mod edit_repo;
pub mod journal_entry_repo;
pub mod node_repo;

pub use author_repo::AuthorRepo;
pub use blog_post_repo::BlogPostRepo;
pub use draft_repo::DraftRepo;
pub use edit_repo::EditRepo;
pub use journal_entry_repo::JournalEntryRepo;
pub use node_repo::NodeRepo;
