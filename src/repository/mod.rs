//! Generic repository
//!
//! Uniform get/list/create/update/delete/search over any clinic entity. The
//! entity's schema is described by the `Entity` trait; column names used in
//! SQL always come from that description, never from caller input.

pub mod fields;
pub mod page;

pub use fields::{FieldValue, Fields, Filters};
pub use page::{Page, PageRequest, MAX_PAGE_SIZE};

use crate::error::AppError;
use crate::store::Db;
use chrono::{DateTime, Utc};
use fields::{contains_pattern, push_value};
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, QueryBuilder, Sqlite};
use std::marker::PhantomData;
use tracing::debug;

/// Schema description of a persisted record
pub trait Entity: for<'r> FromRow<'r, SqliteRow> + Send + Unpin + 'static {
    /// Table holding the rows
    const TABLE: &'static str;
    /// Display name used in messages
    const NAME: &'static str;
    /// Writable columns. Field and filter keys outside this list (and `id`)
    /// are ignored.
    const COLUMNS: &'static [&'static str];

    /// Row identity
    fn id(&self) -> i64;
}

/// Which rows a query selects
enum Criteria<'a> {
    /// Every filter ANDed; text by substring, everything else by equality
    AllOf(&'a Filters),
    /// Any of the columns contains the term
    AnyText(&'a [&'a str], &'a str),
}

/// Repository over one entity type, sharing the injected store handle
pub struct Repository<E> {
    db: Db,
    _entity: PhantomData<fn() -> E>,
}

impl<E> Clone for Repository<E> {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
            _entity: PhantomData,
        }
    }
}

impl<E: Entity> Repository<E> {
    /// Create a repository on the given store
    pub fn new(db: Db) -> Self {
        Self {
            db,
            _entity: PhantomData,
        }
    }

    /// The store handle
    pub fn db(&self) -> &Db {
        &self.db
    }

    /// One page of all rows in insertion order
    pub async fn list(&self, request: PageRequest) -> Result<Page<E>, AppError> {
        self.paginate(Criteria::AllOf(&Filters::new()), request).await
    }

    /// Fetch a row by id; `None` when absent
    pub async fn get(&self, id: i64) -> Result<Option<E>, AppError> {
        let sql = format!("SELECT * FROM {} WHERE id = ?", E::TABLE);
        let row = sqlx::query_as::<_, E>(&sql)
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?;
        Ok(row)
    }

    /// Whether a row with this id exists
    pub async fn exists(&self, id: i64) -> Result<bool, AppError> {
        let sql = format!("SELECT EXISTS(SELECT 1 FROM {} WHERE id = ?)", E::TABLE);
        let found: i64 = sqlx::query_scalar(&sql)
            .bind(id)
            .fetch_one(self.db.pool())
            .await?;
        Ok(found != 0)
    }

    /// Insert a row, assigning id and both timestamps
    ///
    /// # Returns
    /// * `Ok(E)` - the stored row
    /// * `Err(AppError::ConstraintViolation)` - a unique or foreign key constraint failed
    pub async fn create(&self, fields: Fields) -> Result<E, AppError> {
        let now = Utc::now();
        let columns = Self::known_fields(&fields);

        let mut qb = QueryBuilder::<Sqlite>::new("INSERT INTO ");
        qb.push(E::TABLE).push(" (");
        for (column, _) in &columns {
            qb.push(*column).push(", ");
        }
        qb.push("created_at, updated_at) VALUES (");
        for (_, value) in &columns {
            push_value(&mut qb, value);
            qb.push(", ");
        }
        qb.push_bind(now).push(", ").push_bind(now).push(") RETURNING *");

        let mut tx = self.db.pool().begin().await?;
        let row = qb.build_query_as::<E>().fetch_one(&mut *tx).await?;
        tx.commit().await?;

        debug!(table = E::TABLE, id = row.id(), "Created row");
        Ok(row)
    }

    /// Apply a partial update; unspecified columns stay unchanged
    ///
    /// The modification timestamp always moves forward, even when no field
    /// is supplied.
    ///
    /// # Returns
    /// * `Ok(Some(E))` - the updated row
    /// * `Ok(None)` - no row with this id
    pub async fn update(&self, id: i64, fields: Fields) -> Result<Option<E>, AppError> {
        let columns = Self::known_fields(&fields);
        let mut tx = self.db.pool().begin().await?;

        let sql = format!("SELECT updated_at FROM {} WHERE id = ?", E::TABLE);
        let previous: Option<DateTime<Utc>> = sqlx::query_scalar(&sql)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        let Some(previous) = previous else {
            return Ok(None);
        };

        let mut qb = QueryBuilder::<Sqlite>::new("UPDATE ");
        qb.push(E::TABLE).push(" SET ");
        for (column, value) in &columns {
            qb.push(*column).push(" = ");
            push_value(&mut qb, value);
            qb.push(", ");
        }
        qb.push("updated_at = ")
            .push_bind(next_modification(previous))
            .push(" WHERE id = ")
            .push_bind(id)
            .push(" RETURNING *");

        let row = qb.build_query_as::<E>().fetch_one(&mut *tx).await?;
        tx.commit().await?;

        debug!(table = E::TABLE, id, fields = columns.len(), "Updated row");
        Ok(Some(row))
    }

    /// Delete a row; children declared `ON DELETE CASCADE` go with it
    ///
    /// # Returns
    /// * `Ok(true)` - the row was removed
    /// * `Ok(false)` - no row with this id
    pub async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let sql = format!("DELETE FROM {} WHERE id = ?", E::TABLE);
        let mut tx = self.db.pool().begin().await?;
        let result = sqlx::query(&sql).bind(id).execute(&mut *tx).await?;
        tx.commit().await?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            debug!(table = E::TABLE, id, "Deleted row");
        }
        Ok(deleted)
    }

    /// Paginated search; filters are ANDed, text values match by
    /// case-insensitive substring, other values by equality. Unknown filter
    /// keys are ignored.
    pub async fn search(
        &self,
        filters: &Filters,
        request: PageRequest,
    ) -> Result<Page<E>, AppError> {
        self.paginate(Criteria::AllOf(filters), request).await
    }

    /// Paginated search matching `term` as a case-insensitive substring of
    /// any of `columns`
    pub async fn search_text(
        &self,
        columns: &[&str],
        term: &str,
        request: PageRequest,
    ) -> Result<Page<E>, AppError> {
        self.paginate(Criteria::AnyText(columns, term), request).await
    }

    /// Unpaginated filtered fetch in the given order (insertion order when `None`)
    ///
    /// `order_by` is a fixed SQL ordering fragment supplied by the caller's
    /// code, never by request input.
    pub async fn find_all(
        &self,
        filters: &Filters,
        order_by: Option<&'static str>,
    ) -> Result<Vec<E>, AppError> {
        self.fetch(Criteria::AllOf(filters), order_by).await
    }

    /// Unpaginated substring match over any of `columns`
    pub async fn find_text(
        &self,
        columns: &[&str],
        term: &str,
        order_by: Option<&'static str>,
    ) -> Result<Vec<E>, AppError> {
        self.fetch(Criteria::AnyText(columns, term), order_by).await
    }

    /// First row whose column equals `value` exactly (case-sensitive for text)
    pub async fn find_exact(
        &self,
        column: &str,
        value: impl Into<FieldValue>,
    ) -> Result<Option<E>, AppError> {
        let Some(column) = Self::column(column) else {
            return Ok(None);
        };
        let mut qb = QueryBuilder::<Sqlite>::new("SELECT * FROM ");
        qb.push(E::TABLE).push(" WHERE ").push(column).push(" = ");
        push_value(&mut qb, &value.into());
        qb.push(" ORDER BY id LIMIT 1");

        let row = qb.build_query_as::<E>().fetch_optional(self.db.pool()).await?;
        Ok(row)
    }

    /// Number of rows whose column equals `value` exactly
    pub async fn count_exact(
        &self,
        column: &str,
        value: impl Into<FieldValue>,
    ) -> Result<u64, AppError> {
        let Some(column) = Self::column(column) else {
            return Ok(0);
        };
        let mut qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM ");
        qb.push(E::TABLE).push(" WHERE ").push(column).push(" = ");
        push_value(&mut qb, &value.into());

        let count: i64 = qb.build_query_scalar().fetch_one(self.db.pool()).await?;
        Ok(count as u64)
    }

    async fn paginate(
        &self,
        criteria: Criteria<'_>,
        request: PageRequest,
    ) -> Result<Page<E>, AppError> {
        let mut count_qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM ");
        count_qb.push(E::TABLE);
        Self::push_criteria(&mut count_qb, &criteria);
        let total: i64 = count_qb
            .build_query_scalar()
            .fetch_one(self.db.pool())
            .await?;

        let mut qb = QueryBuilder::<Sqlite>::new("SELECT * FROM ");
        qb.push(E::TABLE);
        Self::push_criteria(&mut qb, &criteria);
        qb.push(" ORDER BY id LIMIT ")
            .push_bind(request.limit())
            .push(" OFFSET ")
            .push_bind(request.offset());
        let items = qb.build_query_as::<E>().fetch_all(self.db.pool()).await?;

        Ok(Page::new(items, total as u64, request))
    }

    async fn fetch(
        &self,
        criteria: Criteria<'_>,
        order_by: Option<&'static str>,
    ) -> Result<Vec<E>, AppError> {
        let mut qb = QueryBuilder::<Sqlite>::new("SELECT * FROM ");
        qb.push(E::TABLE);
        Self::push_criteria(&mut qb, &criteria);
        qb.push(" ORDER BY ").push(order_by.unwrap_or("id"));
        let rows = qb.build_query_as::<E>().fetch_all(self.db.pool()).await?;
        Ok(rows)
    }

    fn push_criteria(qb: &mut QueryBuilder<'_, Sqlite>, criteria: &Criteria<'_>) {
        match criteria {
            Criteria::AllOf(filters) => {
                let mut first = true;
                for (name, value) in filters.iter() {
                    let Some(column) = Self::column(name) else {
                        debug!(table = E::TABLE, filter = name, "Ignoring unknown filter");
                        continue;
                    };
                    qb.push(if first { " WHERE " } else { " AND " });
                    first = false;
                    qb.push(column);
                    match value {
                        FieldValue::Text(text) => {
                            qb.push(" REGEXP ").push_bind(contains_pattern(text));
                        }
                        other => {
                            qb.push(" = ");
                            push_value(qb, other);
                        }
                    }
                }
            }
            Criteria::AnyText(columns, term) => {
                let known: Vec<&'static str> =
                    columns.iter().filter_map(|c| Self::column(c)).collect();
                if known.is_empty() {
                    return;
                }
                let pattern = contains_pattern(term);
                qb.push(" WHERE (");
                for (i, column) in known.iter().enumerate() {
                    if i > 0 {
                        qb.push(" OR ");
                    }
                    qb.push(*column)
                        .push(" REGEXP ")
                        .push_bind(pattern.clone());
                }
                qb.push(")");
            }
        }
    }

    /// Resolve a caller-supplied column name to the schema's own name
    fn column(name: &str) -> Option<&'static str> {
        if name == "id" {
            return Some("id");
        }
        E::COLUMNS.iter().copied().find(|c| *c == name)
    }

    fn known_fields(fields: &Fields) -> Vec<(&'static str, &FieldValue)> {
        fields
            .iter()
            .filter(|(name, _)| *name != "id")
            .filter_map(|(name, value)| match Self::column(name) {
                Some(column) => Some((column, value)),
                None => {
                    debug!(table = E::TABLE, field = name, "Ignoring unknown field");
                    None
                }
            })
            .collect()
    }
}

/// Modification timestamp strictly after `previous`
fn next_modification(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = Utc::now();
    if now > previous {
        now
    } else {
        previous + chrono::Duration::microseconds(1)
    }
}
