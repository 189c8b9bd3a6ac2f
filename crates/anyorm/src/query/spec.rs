use crate::condition::Condition;
use crate::dialect::{Dialect, LockMode};
use crate::order::OrderBy;
use crate::rendered::Rendered;
use crate::value::Value;

/// JOIN flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
    Right,
    Full,
    Cross,
}

impl JoinKind {
    fn keyword(self) -> &'static str {
        match self {
            JoinKind::Inner => "INNER JOIN",
            JoinKind::Left => "LEFT JOIN",
            JoinKind::Right => "RIGHT JOIN",
            JoinKind::Full => "FULL OUTER JOIN",
            JoinKind::Cross => "CROSS JOIN",
        }
    }
}

/// A complete JOIN clause and the parameters bound inside it.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinClause {
    pub sql: String,
    pub params: Vec<Value>,
}

impl JoinClause {
    pub fn new(kind: JoinKind, table: &str, on: &str) -> Self {
        let sql = match kind {
            JoinKind::Cross => format!("{} {}", kind.keyword(), table),
            _ => format!("{} {} ON {}", kind.keyword(), table, on),
        };
        Self {
            sql,
            params: Vec::new(),
        }
    }

    pub fn raw(sql: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }
}

/// Aggregate function for [`Aggregate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateFunc {
    Count,
    Sum,
    Avg,
    Min,
    Max,
}

impl AggregateFunc {
    pub fn as_sql(self) -> &'static str {
        match self {
            AggregateFunc::Count => "COUNT",
            AggregateFunc::Sum => "SUM",
            AggregateFunc::Avg => "AVG",
            AggregateFunc::Min => "MIN",
            AggregateFunc::Max => "MAX",
        }
    }
}

/// An aggregate projection that replaces the column list when set.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregate {
    pub func: AggregateFunc,
    pub expr: String,
}

impl Aggregate {
    pub fn new(func: AggregateFunc, expr: impl Into<String>) -> Self {
        Self {
            func,
            expr: expr.into(),
        }
    }

    pub fn to_sql(&self) -> String {
        format!("{}({})", self.func.as_sql(), self.expr)
    }
}

/// Builder state for a single SELECT.
///
/// Pure data: rendering never mutates it, so the same spec always renders to
/// the same statement.
#[derive(Debug, Clone, PartialEq)]
pub struct QuerySpec {
    pub(crate) table: String,
    pub(crate) alias: Option<String>,
    pub(crate) columns: Vec<String>,
    /// Parameters for placeholders inside the column expressions.
    pub(crate) column_params: Vec<Value>,
    pub(crate) joins: Vec<JoinClause>,
    pub(crate) conditions: Condition,
    pub(crate) group_by: Option<String>,
    pub(crate) having: Condition,
    pub(crate) order: OrderBy,
    /// `0` means no limit.
    pub(crate) limit: u64,
    pub(crate) offset: u64,
    pub(crate) lock: Option<LockMode>,
    pub(crate) distinct: bool,
    pub(crate) aggregate: Option<Aggregate>,
}

impl QuerySpec {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            alias: None,
            columns: vec!["*".to_string()],
            column_params: Vec::new(),
            joins: Vec::new(),
            conditions: Condition::new(),
            group_by: None,
            having: Condition::new(),
            order: OrderBy::new(),
            limit: 0,
            offset: 0,
            lock: None,
            distinct: false,
            aggregate: None,
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn conditions(&self) -> &Condition {
        &self.conditions
    }

    pub fn order(&self) -> &OrderBy {
        &self.order
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn lock(&self) -> Option<LockMode> {
        self.lock
    }

    pub fn aggregate(&self) -> Option<&Aggregate> {
        self.aggregate.as_ref()
    }

    /// `true` when the statement yields one row per group or distinct tuple.
    pub(crate) fn is_grouped(&self) -> bool {
        self.group_by.is_some() || !self.having.is_empty() || self.distinct
    }

    fn render_body(&self, sql: &mut String, params: &mut Vec<Value>) {
        sql.push_str("SELECT ");
        if self.distinct {
            sql.push_str("DISTINCT ");
        }
        match &self.aggregate {
            Some(aggregate) => sql.push_str(&aggregate.to_sql()),
            None => {
                sql.push_str(&self.columns.join(", "));
                params.extend(self.column_params.iter().cloned());
            }
        }

        sql.push_str(" FROM ");
        sql.push_str(&self.table);
        if let Some(alias) = &self.alias {
            sql.push_str(" AS ");
            sql.push_str(alias);
        }

        for join in &self.joins {
            sql.push(' ');
            sql.push_str(&join.sql);
            params.extend(join.params.iter().cloned());
        }

        if !self.conditions.is_empty() {
            sql.push_str(" WHERE ");
            self.conditions.render_into(sql, params);
        }

        if let Some(group) = &self.group_by {
            sql.push_str(" GROUP BY ");
            sql.push_str(group);
        }

        if !self.having.is_empty() {
            sql.push_str(" HAVING ");
            self.having.render_into(sql, params);
        }
    }

    /// Render the full statement for `dialect`.
    pub fn render(&self, dialect: &dyn Dialect) -> Rendered {
        let mut sql = String::new();
        let mut params = Vec::new();
        self.render_body(&mut sql, &mut params);
        self.order.append_to(&mut sql);

        if self.limit > 0 {
            sql = dialect.paginate(&sql, self.offset, self.limit);
        }

        if let Some(mode) = self.lock {
            let clause = dialect.lock_clause(mode);
            if !clause.is_empty() {
                sql.push(' ');
                sql.push_str(clause);
            }
        }

        Rendered::new(sql, params)
    }
}
