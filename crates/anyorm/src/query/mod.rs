//! Fluent SELECT builder.
//!
//! [`QueryBuilder`] accumulates a [`QuerySpec`] through `&mut self` chaining
//! and renders it for its [`Dialect`] on demand. Placeholders are always `?`;
//! executors translate them for their driver.
//!
//! # Example
//! ```ignore
//! use anyorm::QueryBuilder;
//!
//! let mut q = QueryBuilder::for_dialect("users u", "mysql");
//! q.select("u.id, u.name")
//!     .left_join("teams t", "t.id = u.team_id")
//!     .and_eq("u.status", "active")
//!     .order_desc("u.created_at")
//!     .page(2, 20);
//!
//! let total = q.count(&conn).await?;
//! let users: Vec<User> = q.fetch_all(&conn).await?;
//! ```

mod spec;

pub use spec::{Aggregate, AggregateFunc, JoinClause, JoinKind, QuerySpec};

use std::mem;
use std::sync::Arc;

use crate::condition::Condition;
use crate::config::{MaterializeOptions, PagerConfig};
use crate::dialect::{self, Ansi, Dialect, LockMode};
use crate::error::{OrmResult, Stage};
use crate::executor::{Executor, log_statement};
use crate::materialize::{Destination, Fetched, FromValue, Record, Scalar, materialize};
use crate::order::{OrderBy, OrderItem};
use crate::rendered::Rendered;
use crate::rewrite::{Page, PageRequest, Pager};
use crate::value::Value;

/// Fluent SELECT query builder.
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    spec: QuerySpec,
    dialect: Arc<dyn Dialect>,
    options: MaterializeOptions,
    config: PagerConfig,
}

impl QueryBuilder {
    /// A builder rendering ANSI SQL.
    pub fn new(table: impl Into<String>) -> Self {
        Self::with_dialect(table, Arc::new(Ansi))
    }

    pub fn with_dialect(table: impl Into<String>, dialect: Arc<dyn Dialect>) -> Self {
        Self {
            spec: QuerySpec::new(table),
            dialect,
            options: MaterializeOptions::default(),
            config: PagerConfig::default(),
        }
    }

    /// A builder for the dialect registered under `name`.
    pub fn for_dialect(table: impl Into<String>, name: &str) -> Self {
        Self::with_dialect(table, dialect::lookup(name))
    }

    pub fn spec(&self) -> &QuerySpec {
        &self.spec
    }

    pub fn dialect(&self) -> &dyn Dialect {
        &*self.dialect
    }

    /// Options used when materializing results.
    pub fn materialize_options(&mut self, options: MaterializeOptions) -> &mut Self {
        self.options = options;
        self
    }

    /// Log truncation and page-size limits used by execution and [`QueryBuilder::paginate`].
    pub fn config(&mut self, config: PagerConfig) -> &mut Self {
        self.config = config;
        self
    }

    // ==================== Projection ====================

    /// Replace the column list with a single expression.
    pub fn select(&mut self, cols: &str) -> &mut Self {
        self.spec.columns = vec![cols.to_string()];
        self.spec.column_params.clear();
        self
    }

    pub fn select_cols(&mut self, cols: &[&str]) -> &mut Self {
        self.spec.columns = cols.iter().map(|c| c.to_string()).collect();
        self.spec.column_params.clear();
        self
    }

    /// Append one column, replacing the default `*`.
    pub fn add_select(&mut self, col: &str) -> &mut Self {
        if self.spec.columns.len() == 1 && self.spec.columns[0] == "*" {
            self.spec.columns[0] = col.to_string();
        } else {
            self.spec.columns.push(col.to_string());
        }
        self
    }

    /// Append a column expression containing `?` placeholders.
    pub fn select_expr(&mut self, expr: &str, params: Vec<Value>) -> &mut Self {
        self.add_select(expr);
        self.spec.column_params.extend(params);
        self
    }

    pub fn distinct(&mut self) -> &mut Self {
        self.spec.distinct = true;
        self
    }

    pub fn alias(&mut self, alias: &str) -> &mut Self {
        self.spec.alias = Some(alias.to_string());
        self
    }

    /// Project an aggregate instead of the column list.
    pub fn aggregate(&mut self, func: AggregateFunc, expr: &str) -> &mut Self {
        self.spec.aggregate = Some(Aggregate::new(func, expr));
        self
    }

    pub fn clear_aggregate(&mut self) -> &mut Self {
        self.spec.aggregate = None;
        self
    }

    // ==================== Joins ====================

    pub fn join(&mut self, kind: JoinKind, table: &str, on: &str) -> &mut Self {
        self.spec.joins.push(JoinClause::new(kind, table, on));
        self
    }

    pub fn inner_join(&mut self, table: &str, on: &str) -> &mut Self {
        self.join(JoinKind::Inner, table, on)
    }

    pub fn left_join(&mut self, table: &str, on: &str) -> &mut Self {
        self.join(JoinKind::Left, table, on)
    }

    pub fn right_join(&mut self, table: &str, on: &str) -> &mut Self {
        self.join(JoinKind::Right, table, on)
    }

    pub fn full_join(&mut self, table: &str, on: &str) -> &mut Self {
        self.join(JoinKind::Full, table, on)
    }

    /// Append a complete join clause that binds parameters.
    pub fn join_raw(&mut self, sql: &str, params: Vec<Value>) -> &mut Self {
        self.spec.joins.push(JoinClause::raw(sql, params));
        self
    }

    // ==================== Conditions ====================

    /// Direct access to the WHERE tree.
    pub fn conditions(&mut self) -> &mut Condition {
        &mut self.spec.conditions
    }

    /// Build the WHERE tree in a closure.
    pub fn filter(&mut self, build: impl FnOnce(&mut Condition)) -> &mut Self {
        build(&mut self.spec.conditions);
        self
    }

    pub fn and_where(&mut self, sql: &str, params: Vec<Value>) -> &mut Self {
        self.spec.conditions.and_where(sql, params);
        self
    }

    pub fn or_where(&mut self, sql: &str, params: Vec<Value>) -> &mut Self {
        self.spec.conditions.or_where(sql, params);
        self
    }

    pub fn and_eq(&mut self, col: &str, val: impl Into<Value>) -> &mut Self {
        self.spec.conditions.and_eq(col, val);
        self
    }

    pub fn and_ne(&mut self, col: &str, val: impl Into<Value>) -> &mut Self {
        self.spec.conditions.and_ne(col, val);
        self
    }

    pub fn gt(&mut self, col: &str, val: impl Into<Value>) -> &mut Self {
        self.spec.conditions.gt(col, val);
        self
    }

    pub fn gte(&mut self, col: &str, val: impl Into<Value>) -> &mut Self {
        self.spec.conditions.gte(col, val);
        self
    }

    pub fn lt(&mut self, col: &str, val: impl Into<Value>) -> &mut Self {
        self.spec.conditions.lt(col, val);
        self
    }

    pub fn lte(&mut self, col: &str, val: impl Into<Value>) -> &mut Self {
        self.spec.conditions.lte(col, val);
        self
    }

    pub fn like(&mut self, col: &str, pattern: impl Into<Value>) -> &mut Self {
        self.spec.conditions.like(col, pattern);
        self
    }

    pub fn is_null(&mut self, col: &str) -> &mut Self {
        self.spec.conditions.is_null(col);
        self
    }

    pub fn is_not_null(&mut self, col: &str) -> &mut Self {
        self.spec.conditions.is_not_null(col);
        self
    }

    pub fn in_list<V: Into<Value>>(&mut self, col: &str, values: impl IntoIterator<Item = V>) -> &mut Self {
        self.spec.conditions.in_list(col, values);
        self
    }

    pub fn not_in<V: Into<Value>>(&mut self, col: &str, values: impl IntoIterator<Item = V>) -> &mut Self {
        self.spec.conditions.not_in(col, values);
        self
    }

    pub fn between(&mut self, col: &str, from: impl Into<Value>, to: impl Into<Value>) -> &mut Self {
        self.spec.conditions.between(col, from, to);
        self
    }

    pub fn and_group(&mut self, build: impl FnOnce(&mut Condition)) -> &mut Self {
        self.spec.conditions.and_group(build);
        self
    }

    pub fn or_group(&mut self, build: impl FnOnce(&mut Condition)) -> &mut Self {
        self.spec.conditions.or_group(build);
        self
    }

    // ==================== Grouping ====================

    pub fn group_by(&mut self, expr: &str) -> &mut Self {
        self.spec.group_by = Some(expr.to_string());
        self
    }

    /// AND a HAVING predicate containing `?` placeholders.
    pub fn having(&mut self, sql: &str, params: Vec<Value>) -> &mut Self {
        self.spec.having.and_where(sql, params);
        self
    }

    // ==================== Ordering ====================

    /// Append raw ORDER BY text.
    pub fn order_by(&mut self, clause: &str) -> &mut Self {
        self.spec.order.raw(clause);
        self
    }

    pub fn order_asc(&mut self, expr: &str) -> &mut Self {
        self.spec.order.asc(expr);
        self
    }

    pub fn order_desc(&mut self, expr: &str) -> &mut Self {
        self.spec.order.desc(expr);
        self
    }

    pub fn order_item(&mut self, item: OrderItem) -> &mut Self {
        self.spec.order.push(item);
        self
    }

    /// Replace the ordering.
    pub fn order(&mut self, order: OrderBy) -> &mut Self {
        self.spec.order = order;
        self
    }

    // ==================== Paging & locking ====================

    /// `0` removes the limit.
    pub fn limit(&mut self, limit: u64) -> &mut Self {
        self.spec.limit = limit;
        self
    }

    pub fn offset(&mut self, offset: u64) -> &mut Self {
        self.spec.offset = offset;
        self
    }

    /// 1-based page helper. Both arguments are clamped to at least 1.
    pub fn page(&mut self, page: u64, size: u64) -> &mut Self {
        let page = page.max(1);
        let size = size.max(1);
        self.spec.limit = size;
        self.spec.offset = (page - 1).saturating_mul(size);
        self
    }

    /// Request a row lock; the last call wins.
    pub fn lock(&mut self, mode: LockMode) -> &mut Self {
        self.spec.lock = Some(mode);
        self
    }

    pub fn for_update(&mut self) -> &mut Self {
        self.lock(LockMode::Exclusive)
    }

    pub fn for_share(&mut self) -> &mut Self {
        self.lock(LockMode::Shared)
    }

    // ==================== Rendering ====================

    /// Render the statement and its parameters.
    pub fn render(&self) -> Rendered {
        self.spec.render(&*self.dialect)
    }

    /// Render with `projection` in place of the column list, without
    /// ordering, offset or lock, and with the given limit. `None` keeps the
    /// projection. The builder is restored before returning.
    fn render_projected(&mut self, projection: Option<&str>, limit: u64) -> Rendered {
        let saved = projection.map(|p| {
            (
                mem::replace(&mut self.spec.columns, vec![p.to_string()]),
                mem::take(&mut self.spec.column_params),
                self.spec.aggregate.take(),
            )
        });
        let order = mem::take(&mut self.spec.order);
        let saved_limit = mem::replace(&mut self.spec.limit, limit);
        let offset = mem::replace(&mut self.spec.offset, 0);
        let lock = self.spec.lock.take();

        let rendered = self.spec.render(&*self.dialect);

        if let Some((columns, column_params, aggregate)) = saved {
            self.spec.columns = columns;
            self.spec.column_params = column_params;
            self.spec.aggregate = aggregate;
        }
        self.spec.order = order;
        self.spec.limit = saved_limit;
        self.spec.offset = offset;
        self.spec.lock = lock;
        rendered
    }

    /// Render the COUNT(*) statement used by [`QueryBuilder::count`].
    ///
    /// Grouped or DISTINCT queries are counted through a derived table.
    pub fn render_count(&mut self) -> Rendered {
        if self.spec.is_grouped() {
            let inner = self.render_projected(None, 0);
            let (sql, params) = inner.into_parts();
            return Rendered::new(format!("SELECT COUNT(*) FROM ({}) AS t", sql), params);
        }
        self.render_projected(Some("COUNT(*)"), 0)
    }

    // ==================== Execution ====================

    async fn run<D, E>(&self, exec: &E, rendered: Rendered, stage: Stage, dest: &mut D) -> OrmResult<Fetched>
    where
        D: Destination + ?Sized,
        E: Executor,
    {
        rendered.verify().map_err(|e| e.at(Stage::Building))?;
        log_statement(stage, &rendered.sql, rendered.params.len(), self.config.max_sql_log_length);
        let set = exec
            .query_rows(&rendered.sql, &rendered.params)
            .await
            .map_err(|e| e.at(stage))?;
        materialize(set, dest, &self.options).map_err(|e| e.at(Stage::Materializing))
    }

    async fn scalar<T, E>(&self, exec: &E, rendered: Rendered, stage: Stage) -> OrmResult<Option<T>>
    where
        T: FromValue,
        E: Executor,
    {
        let mut out = Scalar::new();
        self.run(exec, rendered, stage, &mut out).await?;
        Ok(out.into_inner())
    }

    /// Execute and map every row into `dest`.
    pub async fn fetch_into<D, E>(&self, exec: &E, dest: &mut D) -> OrmResult<Fetched>
    where
        D: Destination + ?Sized,
        E: Executor,
    {
        self.run(exec, self.render(), Stage::Paging, dest).await
    }

    pub async fn fetch_all<T: Record, E: Executor>(&self, exec: &E) -> OrmResult<Vec<T>> {
        let mut out = Vec::new();
        self.fetch_into(exec, &mut out).await?;
        Ok(out)
    }

    /// First row, or `None` when the query returns nothing.
    pub async fn fetch_optional<T: Record, E: Executor>(&self, exec: &E) -> OrmResult<Option<T>> {
        let mut out = None;
        self.fetch_into(exec, &mut out).await?;
        Ok(out)
    }

    /// Number of rows the query matches, ignoring paging.
    pub async fn count<E: Executor>(&mut self, exec: &E) -> OrmResult<u64> {
        let rendered = self.render_count();
        Ok(self.scalar::<u64, E>(exec, rendered, Stage::Counting).await?.unwrap_or(0))
    }

    /// `SUM(expr)`; `None` when there are no rows.
    pub async fn sum<E: Executor>(&mut self, exec: &E, expr: &str) -> OrmResult<Option<f64>> {
        self.aggregate_value(exec, AggregateFunc::Sum, expr).await
    }

    /// `AVG(expr)`; `None` when there are no rows.
    pub async fn avg<E: Executor>(&mut self, exec: &E, expr: &str) -> OrmResult<Option<f64>> {
        self.aggregate_value(exec, AggregateFunc::Avg, expr).await
    }

    pub async fn max<T: FromValue, E: Executor>(&mut self, exec: &E, expr: &str) -> OrmResult<Option<T>> {
        self.aggregate_value(exec, AggregateFunc::Max, expr).await
    }

    pub async fn min<T: FromValue, E: Executor>(&mut self, exec: &E, expr: &str) -> OrmResult<Option<T>> {
        self.aggregate_value(exec, AggregateFunc::Min, expr).await
    }

    async fn aggregate_value<T: FromValue, E: Executor>(
        &mut self,
        exec: &E,
        func: AggregateFunc,
        expr: &str,
    ) -> OrmResult<Option<T>> {
        let projection = Aggregate::new(func, expr).to_sql();
        let rendered = self.render_projected(Some(&projection), 0);
        self.scalar(exec, rendered, Stage::Counting).await
    }

    /// Whether at least one row matches.
    pub async fn exists<E: Executor>(&mut self, exec: &E) -> OrmResult<bool> {
        let rendered = self.render_projected(Some("1"), 1);
        let mut out: Scalar<Value> = Scalar::new();
        let fetched = self.run(exec, rendered, Stage::Counting, &mut out).await?;
        Ok(fetched.is_found())
    }

    /// Count and fetch one page through the rewriter, using this builder's
    /// dialect. Limit, offset and lock set on the builder are ignored.
    pub async fn paginate<T: Record, E: Executor>(
        &self,
        exec: &E,
        page: u64,
        size: u64,
    ) -> OrmResult<Page<T>> {
        let pager = Pager::new()
            .with_dialect(self.dialect.clone())
            .with_config(self.config.clone())
            .with_options(self.options);
        self.paginate_with(exec, &pager, page, size).await
    }

    /// Like [`QueryBuilder::paginate`] with an explicit [`Pager`].
    pub async fn paginate_with<T: Record, E: Executor>(
        &self,
        exec: &E,
        pager: &Pager,
        page: u64,
        size: u64,
    ) -> OrmResult<Page<T>> {
        let mut spec = self.spec.clone();
        spec.limit = 0;
        spec.offset = 0;
        spec.lock = None;
        let req = PageRequest::from_rendered(spec.render(&*self.dialect)).page(page, size);
        pager.fetch(exec, &req).await
    }
}

#[cfg(test)]
mod tests;
