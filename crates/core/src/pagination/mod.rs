//! Cursor-based connection paging.
//!
//! A [`PagerInput`] (`first`/`after`/`last`/`before`) is validated and decoded
//! into a [`PageRequest`], which plans at most two bounded range reads against
//! a [`PageSource`]: a forward page strictly after `after`, and a backward page
//! strictly before `before`. Each read fetches one extra row to learn whether
//! more rows exist in that direction. [`paginate`] runs the reads and assembles
//! the [`Connection`].

pub mod cursor;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

pub use cursor::{CursorCodec, NumericCursor, PlainCursor, TimestampCursor};

/// Raw pagination arguments as supplied by a client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PagerInput {
    pub first: Option<i64>,
    pub after: Option<String>,
    pub last: Option<i64>,
    pub before: Option<String>,
}

/// Natural order of a collection by its cursor column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn reverse(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Strict comparison applied to the cursor column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    GreaterThan,
    LessThan,
}

impl Comparison {
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::GreaterThan => ">",
            Self::LessThan => "<",
        }
    }

    /// Evaluate `value <op> bound`.
    pub fn holds<K: PartialOrd>(self, value: &K, bound: &K) -> bool {
        match self {
            Self::GreaterThan => value > bound,
            Self::LessThan => value < bound,
        }
    }
}

/// One range read: optional exclusive bound, ordering and row cap.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeQuery<K> {
    pub bound: Option<(Comparison, K)>,
    pub order: SortOrder,
    /// Maximum rows to fetch, already including the look-ahead row.
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, PartialEq)]
struct Window<K> {
    cursor: Option<K>,
    limit: Option<i64>,
}

impl<K: Clone> Window<K> {
    fn range(&self, order: SortOrder, comparison: Comparison) -> RangeQuery<K> {
        RangeQuery {
            bound: self.cursor.clone().map(|c| (comparison, c)),
            order,
            limit: self.limit.map(|l| l + 1),
        }
    }
}

/// Reject argument combinations that have no single meaning.
///
/// `first` and `last` together are only accepted when both `after` and
/// `before` are present, i.e. when the caller asks for the neighbours on
/// both sides of a pivot.
pub fn validate_pager_input(input: &PagerInput) -> Result<(), CoreError> {
    if input.first.is_some_and(|n| n < 0) || input.last.is_some_and(|n| n < 0) {
        return Err(CoreError::Validation(
            "Neither `first` nor `last` can be negative.".to_string(),
        ));
    }
    if input.first.is_some()
        && input.last.is_some()
        && !(input.after.is_some() && input.before.is_some())
    {
        return Err(CoreError::Validation(
            "Cannot specify both `first` and `last` unless both `after` and `before` are given."
                .to_string(),
        ));
    }
    Ok(())
}

/// A validated, decoded pagination request.
#[derive(Debug, Clone, PartialEq)]
pub struct PageRequest<K> {
    forward: Option<Window<K>>,
    backward: Option<Window<K>>,
}

impl<K: Clone> PageRequest<K> {
    /// Validate `input` and decode its cursors with `codec`.
    ///
    /// With no arguments at all the request is a single unbounded forward page.
    pub fn parse<C>(input: &PagerInput, codec: &C) -> Result<Self, CoreError>
    where
        C: CursorCodec<Key = K>,
    {
        validate_pager_input(input)?;

        let decode = |cursor: &Option<String>| -> Result<Option<K>, CoreError> {
            cursor.as_deref().map(|c| codec.decode(c)).transpose()
        };

        let wants_forward = input.first.is_some() || input.after.is_some();
        let wants_backward = input.last.is_some() || input.before.is_some();

        let forward = if wants_forward || !wants_backward {
            Some(Window {
                cursor: decode(&input.after)?,
                limit: input.first,
            })
        } else {
            None
        };
        let backward = if wants_backward {
            Some(Window {
                cursor: decode(&input.before)?,
                limit: input.last,
            })
        } else {
            None
        };

        Ok(Self { forward, backward })
    }

    /// A request for everything: one forward page, no cursor, no limit.
    pub fn is_unbounded(&self) -> bool {
        self.backward.is_none()
            && self
                .forward
                .as_ref()
                .is_some_and(|w| w.cursor.is_none() && w.limit.is_none())
    }

    /// Range read for rows after the `after` cursor, in natural order.
    pub fn forward_range(&self, order: SortOrder) -> Option<RangeQuery<K>> {
        let comparison = match order {
            SortOrder::Asc => Comparison::GreaterThan,
            SortOrder::Desc => Comparison::LessThan,
        };
        self.forward.as_ref().map(|w| w.range(order, comparison))
    }

    /// Range read for rows before the `before` cursor, in reverse order.
    pub fn backward_range(&self, order: SortOrder) -> Option<RangeQuery<K>> {
        let comparison = match order {
            SortOrder::Asc => Comparison::LessThan,
            SortOrder::Desc => Comparison::GreaterThan,
        };
        self.backward
            .as_ref()
            .map(|w| w.range(order.reverse(), comparison))
    }
}

/// A collection that can be read in cursor-bounded ranges.
#[async_trait]
pub trait PageSource: Sync {
    type Key: Clone + Send + Sync;
    type Item: Send;
    type Error: Send;

    /// The sort-key value of `item`, the thing cursors encode.
    fn cursor_key(&self, item: &Self::Item) -> Self::Key;

    /// Rows matching `range`, in `range.order`.
    async fn fetch(&self, range: &RangeQuery<Self::Key>) -> Result<Vec<Self::Item>, Self::Error>;

    /// Size of the whole collection, ignoring cursors and limits.
    async fn count(&self) -> Result<i64, Self::Error>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Edge<T> {
    pub node: T,
    pub cursor: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PageInfo {
    pub start_cursor: Option<String>,
    pub end_cursor: Option<String>,
    pub has_previous_page: bool,
    pub has_next_page: bool,
}

/// Edges on both sides of the requested cursors, in natural order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Connection<T> {
    pub total: i64,
    pub before_edges: Vec<Edge<T>>,
    pub after_edges: Vec<Edge<T>>,
    pub page_info: PageInfo,
}

impl<T> Connection<T> {
    /// Every node of the page, before-edges first.
    pub fn nodes(&self) -> impl Iterator<Item = &T> {
        self.before_edges
            .iter()
            .chain(self.after_edges.iter())
            .map(|edge| &edge.node)
    }

    /// Convert every node, keeping cursors and page info.
    pub fn map<U>(self, mut f: impl FnMut(T) -> U) -> Connection<U> {
        let mut convert = |edges: Vec<Edge<T>>| -> Vec<Edge<U>> {
            edges
                .into_iter()
                .map(|e| Edge {
                    node: f(e.node),
                    cursor: e.cursor,
                })
                .collect()
        };
        let before_edges = convert(self.before_edges);
        let after_edges = convert(self.after_edges);
        Connection {
            total: self.total,
            before_edges,
            after_edges,
            page_info: self.page_info,
        }
    }
}

/// Drop the look-ahead row, reporting whether it was there.
fn take_page<T>(mut rows: Vec<T>, range: &RangeQuery<impl Sized>) -> (Vec<T>, bool) {
    match range.limit {
        Some(probe) if rows.len() as i64 >= probe => {
            rows.truncate((probe - 1).max(0) as usize);
            (rows, true)
        }
        _ => (rows, false),
    }
}

/// Run `request` against `source` and assemble the connection.
///
/// The forward read, the backward read and the count are independent and run
/// concurrently. The count is skipped for unbounded requests, whose fetched
/// length already is the total.
pub async fn paginate<S, C>(
    source: &S,
    order: SortOrder,
    request: &PageRequest<S::Key>,
    codec: &C,
) -> Result<Connection<S::Item>, S::Error>
where
    S: PageSource,
    C: CursorCodec<Key = S::Key>,
{
    let forward_range = request.forward_range(order);
    let backward_range = request.backward_range(order);

    let forward = async {
        match &forward_range {
            Some(range) => source.fetch(range).await.map(|rows| take_page(rows, range)),
            None => Ok((Vec::new(), false)),
        }
    };
    let backward = async {
        match &backward_range {
            Some(range) => source.fetch(range).await.map(|rows| take_page(rows, range)),
            None => Ok((Vec::new(), false)),
        }
    };
    let total = async {
        if request.is_unbounded() {
            Ok(None)
        } else {
            source.count().await.map(Some)
        }
    };

    let ((after_rows, has_next_page), (mut before_rows, has_previous_page), total) =
        futures::try_join!(forward, backward, total)?;
    before_rows.reverse();

    let edge = |node: S::Item| Edge {
        cursor: codec.encode(&source.cursor_key(&node)),
        node,
    };
    let before_edges: Vec<_> = before_rows.into_iter().map(edge).collect();
    let after_edges: Vec<_> = after_rows.into_iter().map(edge).collect();

    let page_info = PageInfo {
        start_cursor: before_edges
            .first()
            .or(after_edges.first())
            .map(|e| e.cursor.clone()),
        end_cursor: after_edges
            .last()
            .or(before_edges.last())
            .map(|e| e.cursor.clone()),
        has_previous_page,
        has_next_page,
    };

    Ok(Connection {
        total: total.unwrap_or(after_edges.len() as i64),
        before_edges,
        after_edges,
        page_info,
    })
}
