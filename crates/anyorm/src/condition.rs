//! Ordered WHERE/HAVING condition trees.
//!
//! A [`Condition`] is a sequence of fragments. Each fragment is either a
//! predicate with its `?` parameters or a nested group, and records whether it
//! joins the previous fragment with `AND` or `OR`. Rendering walks the
//! fragments in insertion order, so parameters always line up with their
//! placeholders no matter how deeply groups are nested.
//!
//! # Example
//! ```ignore
//! use anyorm::Condition;
//!
//! let mut cond = Condition::new();
//! cond.and_eq("status", "active")
//!     .or_group(|g| {
//!         g.and_eq("role", "admin").gt("reputation", 100);
//!     });
//! // status = ? OR (role = ? AND reputation > ?)
//! ```

use crate::value::Value;

/// How a fragment joins the fragment before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Joiner {
    And,
    Or,
}

impl Joiner {
    fn as_sql(self) -> &'static str {
        match self {
            Joiner::And => " AND ",
            Joiner::Or => " OR ",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Predicate { sql: String, params: Vec<Value> },
    Group(Condition),
}

#[derive(Debug, Clone, PartialEq)]
struct Fragment {
    joiner: Joiner,
    node: Node,
}

/// An ordered, nestable WHERE tree.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Condition {
    fragments: Vec<Fragment>,
}

impl Condition {
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` if rendering would produce no SQL.
    pub fn is_empty(&self) -> bool {
        self.fragments.iter().all(|f| match &f.node {
            Node::Predicate { .. } => false,
            Node::Group(g) => g.is_empty(),
        })
    }

    /// Number of top-level fragments.
    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    fn push(&mut self, joiner: Joiner, sql: String, params: Vec<Value>) -> &mut Self {
        self.fragments.push(Fragment {
            joiner,
            node: Node::Predicate { sql, params },
        });
        self
    }

    // ==================== Raw predicates ====================

    /// AND a predicate containing `?` placeholders.
    pub fn and_where(&mut self, sql: impl Into<String>, params: Vec<Value>) -> &mut Self {
        self.push(Joiner::And, sql.into(), params)
    }

    /// OR a predicate containing `?` placeholders.
    pub fn or_where(&mut self, sql: impl Into<String>, params: Vec<Value>) -> &mut Self {
        self.push(Joiner::Or, sql.into(), params)
    }

    /// AND a raw predicate without parameters.
    pub fn raw(&mut self, sql: impl Into<String>) -> &mut Self {
        self.push(Joiner::And, sql.into(), Vec::new())
    }

    // ==================== Comparisons (AND) ====================

    fn compare(&mut self, joiner: Joiner, column: &str, op: &str, value: Value) -> &mut Self {
        self.push(joiner, format!("{} {} ?", column, op), vec![value])
    }

    /// column = value
    pub fn and_eq(&mut self, column: &str, value: impl Into<Value>) -> &mut Self {
        self.compare(Joiner::And, column, "=", value.into())
    }

    /// column != value
    pub fn and_ne(&mut self, column: &str, value: impl Into<Value>) -> &mut Self {
        self.compare(Joiner::And, column, "!=", value.into())
    }

    /// column > value
    pub fn gt(&mut self, column: &str, value: impl Into<Value>) -> &mut Self {
        self.compare(Joiner::And, column, ">", value.into())
    }

    /// column >= value
    pub fn gte(&mut self, column: &str, value: impl Into<Value>) -> &mut Self {
        self.compare(Joiner::And, column, ">=", value.into())
    }

    /// column < value
    pub fn lt(&mut self, column: &str, value: impl Into<Value>) -> &mut Self {
        self.compare(Joiner::And, column, "<", value.into())
    }

    /// column <= value
    pub fn lte(&mut self, column: &str, value: impl Into<Value>) -> &mut Self {
        self.compare(Joiner::And, column, "<=", value.into())
    }

    /// column LIKE pattern
    pub fn like(&mut self, column: &str, pattern: impl Into<Value>) -> &mut Self {
        self.compare(Joiner::And, column, "LIKE", pattern.into())
    }

    /// column NOT LIKE pattern
    pub fn not_like(&mut self, column: &str, pattern: impl Into<Value>) -> &mut Self {
        self.compare(Joiner::And, column, "NOT LIKE", pattern.into())
    }

    /// column IS NULL
    pub fn is_null(&mut self, column: &str) -> &mut Self {
        self.push(Joiner::And, format!("{} IS NULL", column), Vec::new())
    }

    /// column IS NOT NULL
    pub fn is_not_null(&mut self, column: &str) -> &mut Self {
        self.push(Joiner::And, format!("{} IS NOT NULL", column), Vec::new())
    }

    /// column IN (values...). An empty list renders as `1=0`.
    pub fn in_list<V: Into<Value>>(
        &mut self,
        column: &str,
        values: impl IntoIterator<Item = V>,
    ) -> &mut Self {
        self.membership(column, values, false)
    }

    /// column NOT IN (values...). An empty list renders as `1=1`.
    pub fn not_in<V: Into<Value>>(
        &mut self,
        column: &str,
        values: impl IntoIterator<Item = V>,
    ) -> &mut Self {
        self.membership(column, values, true)
    }

    fn membership<V: Into<Value>>(
        &mut self,
        column: &str,
        values: impl IntoIterator<Item = V>,
        negated: bool,
    ) -> &mut Self {
        let params: Vec<Value> = values.into_iter().map(Into::into).collect();
        if params.is_empty() {
            let always = if negated { "1=1" } else { "1=0" };
            return self.push(Joiner::And, always.to_string(), params);
        }
        let placeholders = vec!["?"; params.len()].join(", ");
        let op = if negated { "NOT IN" } else { "IN" };
        self.push(
            Joiner::And,
            format!("{} {} ({})", column, op, placeholders),
            params,
        )
    }

    /// column BETWEEN from AND to
    pub fn between(
        &mut self,
        column: &str,
        from: impl Into<Value>,
        to: impl Into<Value>,
    ) -> &mut Self {
        self.push(
            Joiner::And,
            format!("{} BETWEEN ? AND ?", column),
            vec![from.into(), to.into()],
        )
    }

    /// column NOT BETWEEN from AND to
    pub fn not_between(
        &mut self,
        column: &str,
        from: impl Into<Value>,
        to: impl Into<Value>,
    ) -> &mut Self {
        self.push(
            Joiner::And,
            format!("{} NOT BETWEEN ? AND ?", column),
            vec![from.into(), to.into()],
        )
    }

    // ==================== OR comparisons ====================

    /// OR column = value
    pub fn or_eq(&mut self, column: &str, value: impl Into<Value>) -> &mut Self {
        self.compare(Joiner::Or, column, "=", value.into())
    }

    /// OR column LIKE pattern
    pub fn or_like(&mut self, column: &str, pattern: impl Into<Value>) -> &mut Self {
        self.compare(Joiner::Or, column, "LIKE", pattern.into())
    }

    /// OR column IS NULL
    pub fn or_is_null(&mut self, column: &str) -> &mut Self {
        self.push(Joiner::Or, format!("{} IS NULL", column), Vec::new())
    }

    /// `(c1 LIKE ? OR c2 LIKE ? ...)` with the same pattern bound for each column.
    pub fn multi_like(&mut self, columns: &[&str], pattern: impl Into<Value>) -> &mut Self {
        if columns.is_empty() {
            return self;
        }
        let pattern = pattern.into();
        self.and_group(|g| {
            for col in columns {
                g.compare(Joiner::Or, col, "LIKE", pattern.clone());
            }
        })
    }

    // ==================== Optional helpers ====================

    /// column = value, only when `value` is `Some`.
    pub fn eq_opt<T: Into<Value>>(&mut self, column: &str, value: Option<T>) -> &mut Self {
        match value {
            Some(v) => self.and_eq(column, v),
            None => self,
        }
    }

    /// column LIKE pattern, only when `pattern` is `Some`.
    pub fn like_opt<T: Into<Value>>(&mut self, column: &str, pattern: Option<T>) -> &mut Self {
        match pattern {
            Some(v) => self.like(column, v),
            None => self,
        }
    }

    // ==================== Groups ====================

    /// AND a parenthesized sub-condition built by `build`.
    pub fn and_group(&mut self, build: impl FnOnce(&mut Condition)) -> &mut Self {
        let mut group = Condition::new();
        build(&mut group);
        self.push_group(Joiner::And, group)
    }

    /// OR a parenthesized sub-condition built by `build`.
    pub fn or_group(&mut self, build: impl FnOnce(&mut Condition)) -> &mut Self {
        let mut group = Condition::new();
        build(&mut group);
        self.push_group(Joiner::Or, group)
    }

    /// Attach an already-built condition as a nested group.
    pub fn push_group(&mut self, joiner: Joiner, group: Condition) -> &mut Self {
        self.fragments.push(Fragment {
            joiner,
            node: Node::Group(group),
        });
        self
    }

    // ==================== Rendering ====================

    /// Render to SQL (without the `WHERE` keyword) and its parameters.
    pub fn render(&self) -> (String, Vec<Value>) {
        let mut sql = String::new();
        let mut params = Vec::new();
        self.render_into(&mut sql, &mut params);
        (sql, params)
    }

    /// Append the rendered SQL and parameters to existing buffers.
    pub fn render_into(&self, sql: &mut String, params: &mut Vec<Value>) {
        let mut first = true;
        for fragment in &self.fragments {
            match &fragment.node {
                Node::Predicate { sql: pred, params: p } => {
                    if !first {
                        sql.push_str(fragment.joiner.as_sql());
                    }
                    sql.push_str(pred);
                    params.extend(p.iter().cloned());
                }
                Node::Group(group) => {
                    if group.is_empty() {
                        continue;
                    }
                    if !first {
                        sql.push_str(fragment.joiner.as_sql());
                    }
                    sql.push('(');
                    group.render_into(sql, params);
                    sql.push(')');
                }
            }
            first = false;
        }
    }
}
