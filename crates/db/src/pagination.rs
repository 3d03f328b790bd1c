//! SQL-backed page source for timestamp-ordered collections.

use async_trait::async_trait;
use inkwell_core::pagination::{PageSource, RangeQuery};
use inkwell_core::types::{DbId, Timestamp};
use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};

/// Reads ranges of a joined content table ordered by a timestamp column.
///
/// `from` must alias the `content` table as `c`; ties on the sort column are
/// broken by `c.id`.
pub struct TimestampPageSource<'a, T> {
    pool: &'a PgPool,
    columns: &'static str,
    from: &'static str,
    sort_column: &'static str,
    author_id: Option<DbId>,
    key: fn(&T) -> Timestamp,
}

impl<'a, T> TimestampPageSource<'a, T> {
    pub fn new(
        pool: &'a PgPool,
        columns: &'static str,
        from: &'static str,
        sort_column: &'static str,
        key: fn(&T) -> Timestamp,
    ) -> Self {
        Self {
            pool,
            columns,
            from,
            sort_column,
            author_id: None,
            key,
        }
    }

    /// Restrict the collection to rows written by `author_id`.
    pub fn owned_by(mut self, author_id: DbId) -> Self {
        self.author_id = Some(author_id);
        self
    }

    fn push_scope(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        qb.push(" WHERE TRUE");
        if let Some(author_id) = self.author_id {
            qb.push(" AND c.author_id = ").push_bind(author_id);
        }
    }
}

#[async_trait]
impl<'a, T> PageSource for TimestampPageSource<'a, T>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin + 'static,
{
    type Key = Timestamp;
    type Item = T;
    type Error = sqlx::Error;

    fn cursor_key(&self, item: &T) -> Timestamp {
        (self.key)(item)
    }

    async fn fetch(&self, range: &RangeQuery<Timestamp>) -> Result<Vec<T>, sqlx::Error> {
        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM {}",
            self.columns, self.from
        ));
        self.push_scope(&mut qb);
        if let Some((comparison, bound)) = &range.bound {
            qb.push(format!(" AND {} {} ", self.sort_column, comparison.as_sql()))
                .push_bind(*bound);
        }
        let order = range.order.as_sql();
        qb.push(format!(" ORDER BY {} {order}, c.id {order}", self.sort_column));
        if let Some(limit) = range.limit {
            qb.push(" LIMIT ").push_bind(limit);
        }
        qb.build_query_as::<T>().fetch_all(self.pool).await
    }

    async fn count(&self) -> Result<i64, sqlx::Error> {
        let mut qb = QueryBuilder::<Postgres>::new(format!("SELECT COUNT(*) FROM {}", self.from));
        self.push_scope(&mut qb);
        qb.build_query_scalar::<i64>().fetch_one(self.pool).await
    }
}
