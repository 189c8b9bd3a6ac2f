//! The statement executor contract.
//!
//! The core never opens connections. Everything that touches a database goes
//! through an [`Executor`], which accepts SQL text with `?` placeholders plus
//! positional [`Value`]s and hands back backend-neutral rows.

#[cfg(test)]
pub(crate) mod mock;
#[cfg(feature = "postgres")]
mod postgres;

use crate::error::{OrmResult, Stage};
use crate::value::Value;

/// Outcome of a statement that returns no rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExecResult {
    pub rows_affected: u64,
    /// Generated key of the last inserted row, when the backend reports one.
    pub last_insert_id: Option<i64>,
}

/// Column names plus row values, in column order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResultSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl ResultSet {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Self { columns, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Index of the first column named `name` (case-insensitive).
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.eq_ignore_ascii_case(name))
    }

    /// First column of the first row, or `Null` when there are no rows.
    pub fn into_scalar(self) -> Value {
        self.rows
            .into_iter()
            .next()
            .and_then(|row| row.into_iter().next())
            .unwrap_or(Value::Null)
    }
}

/// Runs SQL on behalf of the core.
///
/// Implementations receive SQL using `?` placeholders and must adapt them to
/// their driver's syntax.
pub trait Executor: Send + Sync {
    /// Execute a statement and report affected rows.
    fn execute(
        &self,
        sql: &str,
        params: &[Value],
    ) -> impl std::future::Future<Output = OrmResult<ExecResult>> + Send;

    /// Execute a query and return all rows.
    fn query_rows(
        &self,
        sql: &str,
        params: &[Value],
    ) -> impl std::future::Future<Output = OrmResult<ResultSet>> + Send;

    /// Execute a query and return the first column of the first row.
    ///
    /// Returns `Value::Null` when the query yields no rows.
    fn query_scalar(
        &self,
        sql: &str,
        params: &[Value],
    ) -> impl std::future::Future<Output = OrmResult<Value>> + Send {
        async move {
            let set = self.query_rows(sql, params).await?;
            Ok(set.into_scalar())
        }
    }
}

pub(crate) fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}

/// Emit the statement the core is about to hand to an executor.
pub(crate) fn log_statement(stage: Stage, sql: &str, param_count: usize, max_len: Option<usize>) {
    match max_len {
        Some(max) if sql.len() > max => tracing::debug!(
            target: "anyorm.sql",
            stage = stage.as_str(),
            param_count,
            sql = %format_args!("{}...", truncate_sql_bytes(sql, max)),
        ),
        _ => tracing::debug!(
            target: "anyorm.sql",
            stage = stage.as_str(),
            param_count,
            sql,
        ),
    }
}
