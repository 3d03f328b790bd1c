//! GraphQL shapes for paginated collections.

use async_graphql::{InputObject, SimpleObject};
use inkwell_core::pagination as page;

use super::blog_post::BlogPost;
use super::draft::Draft;
use super::journal_entry::JournalEntry;

/// Cursor arguments accepted by every paginated field.
#[derive(Debug, Clone, Default, InputObject)]
pub struct Pager {
    pub first: Option<i32>,
    pub after: Option<String>,
    pub last: Option<i32>,
    pub before: Option<String>,
}

impl From<Pager> for page::PagerInput {
    fn from(pager: Pager) -> Self {
        Self {
            first: pager.first.map(i64::from),
            after: pager.after,
            last: pager.last.map(i64::from),
            before: pager.before,
        }
    }
}

#[derive(Debug, Clone, SimpleObject)]
pub struct PageInfo {
    pub start_cursor: Option<String>,
    pub end_cursor: Option<String>,
    pub has_previous_page: bool,
    pub has_next_page: bool,
}

impl From<page::PageInfo> for PageInfo {
    fn from(info: page::PageInfo) -> Self {
        Self {
            start_cursor: info.start_cursor,
            end_cursor: info.end_cursor,
            has_previous_page: info.has_previous_page,
            has_next_page: info.has_next_page,
        }
    }
}

/// Declare the edge and connection objects of one paginated collection.
macro_rules! connection_types {
    ($node:ident, $edge:ident, $connection:ident) => {
        #[derive(SimpleObject)]
        pub struct $edge {
            pub node: $node,
            pub cursor: String,
        }

        /// Edges on both sides of the requested cursors, plus the size of
        /// the whole collection.
        #[derive(SimpleObject)]
        pub struct $connection {
            pub total: i64,
            pub before_edges: Vec<$edge>,
            pub after_edges: Vec<$edge>,
            pub page_info: PageInfo,
        }

        impl $connection {
            /// Wrap every row of an assembled page.
            pub fn from_page<R>(
                connection: page::Connection<R>,
                wrap: impl FnMut(R) -> $node,
            ) -> Self {
                let connection = connection.map(wrap);
                let edges = |edges: Vec<page::Edge<$node>>| -> Vec<$edge> {
                    edges
                        .into_iter()
                        .map(|e| $edge {
                            node: e.node,
                            cursor: e.cursor,
                        })
                        .collect()
                };
                Self {
                    total: connection.total,
                    before_edges: edges(connection.before_edges),
                    after_edges: edges(connection.after_edges),
                    page_info: connection.page_info.into(),
                }
            }
        }
    };
}

connection_types!(BlogPost, BlogPostEdge, BlogPostConnection);
connection_types!(JournalEntry, JournalEntryEdge, JournalEntryConnection);
connection_types!(Draft, DraftEdge, DraftConnection);
