//! ORDER BY accumulation.

/// Sort direction for ORDER BY.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDir {
    #[default]
    Asc,
    Desc,
}

impl SortDir {
    fn to_sql(self) -> &'static str {
        match self {
            SortDir::Asc => "ASC",
            SortDir::Desc => "DESC",
        }
    }
}

/// NULLS ordering for ORDER BY.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NullsOrder {
    First,
    Last,
}

impl NullsOrder {
    fn to_sql(self) -> &'static str {
        match self {
            NullsOrder::First => "NULLS FIRST",
            NullsOrder::Last => "NULLS LAST",
        }
    }
}

/// A single ORDER BY item.
#[derive(Debug, Clone, PartialEq)]
pub enum OrderItem {
    Column {
        expr: String,
        dir: SortDir,
        nulls: Option<NullsOrder>,
    },
    /// Raw order text, emitted verbatim (e.g. `"score DESC, id"`).
    Raw(String),
}

impl OrderItem {
    pub fn new(expr: impl Into<String>, dir: SortDir) -> Self {
        Self::Column {
            expr: expr.into(),
            dir,
            nulls: None,
        }
    }

    pub fn raw(sql: impl Into<String>) -> Self {
        Self::Raw(sql.into())
    }

    /// Set NULLS ordering (no-op for raw items).
    pub fn nulls(mut self, order: NullsOrder) -> Self {
        if let OrderItem::Column { nulls, .. } = &mut self {
            *nulls = Some(order);
        }
        self
    }

    fn write(&self, sql: &mut String) {
        match self {
            OrderItem::Column { expr, dir, nulls } => {
                sql.push_str(expr);
                sql.push(' ');
                sql.push_str(dir.to_sql());
                if let Some(nulls) = nulls {
                    sql.push(' ');
                    sql.push_str(nulls.to_sql());
                }
            }
            OrderItem::Raw(s) => sql.push_str(s),
        }
    }
}

/// ORDER BY clause builder.
///
/// # Example
/// ```ignore
/// use anyorm::{OrderBy, SortDir, NullsOrder};
///
/// let mut order = OrderBy::new();
/// order.asc("created_at").desc("priority");
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OrderBy {
    items: Vec<OrderItem>,
}

impl OrderBy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn asc(&mut self, expr: impl Into<String>) -> &mut Self {
        self.push(OrderItem::new(expr, SortDir::Asc))
    }

    pub fn desc(&mut self, expr: impl Into<String>) -> &mut Self {
        self.push(OrderItem::new(expr, SortDir::Desc))
    }

    pub fn raw(&mut self, sql: impl Into<String>) -> &mut Self {
        self.push(OrderItem::raw(sql))
    }

    pub fn push(&mut self, item: OrderItem) -> &mut Self {
        self.items.push(item);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn items(&self) -> &[OrderItem] {
        &self.items
    }

    /// Render `ORDER BY ...`, or an empty string when there are no items.
    pub fn to_sql(&self) -> String {
        let mut sql = String::new();
        self.append_to(&mut sql);
        sql.trim_start().to_string()
    }

    /// Append ` ORDER BY ...` to `sql`; does nothing when empty.
    pub fn append_to(&self, sql: &mut String) {
        if self.items.is_empty() {
            return;
        }
        sql.push_str(" ORDER BY ");
        for (i, item) in self.items.iter().enumerate() {
            if i > 0 {
                sql.push_str(", ");
            }
            item.write(sql);
        }
    }
}
