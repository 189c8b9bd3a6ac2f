//! Count and page derivation for arbitrary SELECT statements.
//!
//! [`Pager`] takes a target (a table name or a hand-written statement), page
//! parameters, optional sort expressions and a loosely-typed filter, and
//! derives two statements from the resulting text: one that counts every
//! matching row and one that returns the requested page. Counting runs
//! first; an empty result skips the page query entirely.
//!
//! ```ignore
//! use anyorm::rewrite::{PageRequest, Pager};
//!
//! let pager = Pager::for_dialect("postgres");
//! let req = PageRequest::new("SELECT id, name FROM users")
//!     .page(2, 20)
//!     .sort("name")
//!     .filter("status = ?")
//!     .filter("active");
//! let page = pager.fetch::<User, _>(&client, &req).await?;
//! ```

mod filter;
mod scan;

pub use filter::FilterArg;
pub(crate) use scan::has_top_level_order_by;
pub use scan::{apply_sort, derive_count, derive_page, ensure_where, is_complex, strip_order_by};

use std::sync::Arc;

use crate::config::{MaterializeOptions, PagerConfig};
use crate::dialect::{self, Dialect};
use crate::error::{OrmError, OrmResult, Stage};
use crate::executor::{Executor, log_statement};
use crate::materialize::{Destination, FromValue, Record, materialize};
use crate::rendered::Rendered;
use crate::value::Value;
use filter::Filter;

/// Page size used when a request does not set one.
pub const DEFAULT_PAGE_SIZE: u64 = 20;

/// What to paginate.
#[derive(Debug, Clone, PartialEq)]
pub struct PageRequest {
    /// Table name or complete SELECT statement.
    pub target: String,
    /// Parameters bound to placeholders in `target`.
    pub params: Vec<Value>,
    /// 1-based page number.
    pub page: u64,
    pub size: u64,
    /// Sort expressions, used only when the statement has no ORDER BY.
    pub sort: Vec<String>,
    pub filter: Vec<FilterArg>,
}

impl PageRequest {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            params: Vec::new(),
            page: 1,
            size: DEFAULT_PAGE_SIZE,
            sort: Vec::new(),
            filter: Vec::new(),
        }
    }

    /// Target statement together with its parameters.
    pub fn from_rendered(rendered: Rendered) -> Self {
        let (sql, params) = rendered.into_parts();
        Self::new(sql).params(params)
    }

    pub fn params(mut self, params: Vec<Value>) -> Self {
        self.params = params;
        self
    }

    pub fn page(mut self, page: u64, size: u64) -> Self {
        self.page = page;
        self.size = size;
        self
    }

    pub fn sort(mut self, expr: impl Into<String>) -> Self {
        self.sort.push(expr.into());
        self
    }

    /// Append one filter argument.
    pub fn filter(mut self, arg: impl Into<FilterArg>) -> Self {
        self.filter.push(arg.into());
        self
    }
}

/// The statements derived for one request.
#[derive(Debug, Clone, PartialEq)]
pub struct PagePlan {
    /// Target with filter and sort applied.
    pub statement: Rendered,
    pub count: Rendered,
    pub page: Rendered,
    /// Whether the count wraps the statement in a derived table.
    pub complex: bool,
    pub page_number: u64,
    pub page_size: u64,
}

/// Paging metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageMeta {
    pub total: u64,
    pub page: u64,
    pub size: u64,
    pub pages: u64,
}

impl PageMeta {
    pub fn new(total: u64, page: u64, size: u64) -> Self {
        Self {
            total,
            page,
            size,
            pages: total.div_ceil(size.max(1)),
        }
    }

    pub fn has_next(&self) -> bool {
        self.page < self.pages
    }
}

/// One page of records.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub meta: PageMeta,
}

/// Derives and runs count/page statements.
#[derive(Debug, Clone, Default)]
pub struct Pager {
    dialect: Option<Arc<dyn Dialect>>,
    config: PagerConfig,
    options: MaterializeOptions,
}

impl Pager {
    /// A pager that pages with plain `LIMIT n OFFSET m`.
    pub fn new() -> Self {
        Self::default()
    }

    /// A pager using the named dialect's pagination syntax.
    pub fn for_dialect(name: &str) -> Self {
        Self::new().with_dialect(dialect::lookup(name))
    }

    pub fn with_dialect(mut self, dialect: Arc<dyn Dialect>) -> Self {
        self.dialect = Some(dialect);
        self
    }

    pub fn with_config(mut self, config: PagerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_options(mut self, options: MaterializeOptions) -> Self {
        self.options = options;
        self
    }

    pub fn config(&self) -> &PagerConfig {
        &self.config
    }

    /// Derive the count and page statements without executing anything.
    pub fn prepare(&self, req: &PageRequest) -> OrmResult<PagePlan> {
        let target = req.target.trim();
        if target.is_empty() {
            return Err(OrmError::validation("pagination target is empty"));
        }

        let (filter, filter_params) = filter::normalize(req.filter.clone())?;
        let target_is_statement = scan::is_full_statement(target);
        let (sql, params) = match filter {
            Filter::None => {
                let sql = if target_is_statement {
                    target.to_string()
                } else {
                    format!("SELECT * FROM {}", target)
                };
                (sql, req.params.clone())
            }
            Filter::Statement(stmt) => (stmt, filter_params),
            Filter::Predicate(pred) if !target_is_statement => {
                let mut params = req.params.clone();
                params.extend(filter_params);
                (format!("SELECT * FROM {} WHERE {}", target, pred), params)
            }
            Filter::Predicate(pred) => {
                let (sql, before) = scan::and_predicate(target, &pred);
                let mut params = req.params.clone();
                let at = before.min(params.len());
                params.splice(at..at, filter_params);
                (sql, params)
            }
        };
        let sql = scan::apply_sort(&sql, &req.sort);

        let statement = Rendered::new(sql, params);
        statement.verify()?;

        let page_number = req.page.max(1);
        let page_size = self.config.clamp_page_size(req.size);
        let offset = (page_number - 1).saturating_mul(page_size);

        let complex = scan::is_complex(&statement.sql);
        let count = Rendered::new(
            scan::derive_count(&statement.sql, &self.config.count_alias),
            statement.params.clone(),
        );
        let page = Rendered::new(
            scan::derive_page(&statement.sql, self.dialect.as_deref(), offset, page_size),
            statement.params.clone(),
        );

        Ok(PagePlan {
            statement,
            count,
            page,
            complex,
            page_number,
            page_size,
        })
    }

    /// Count, then fetch the page into `dest`.
    pub async fn fetch_into<D, E>(&self, exec: &E, req: &PageRequest, dest: &mut D) -> OrmResult<PageMeta>
    where
        D: Destination + ?Sized,
        E: Executor,
    {
        let plan = self.prepare(req).map_err(|e| e.at(Stage::Building))?;
        let max_len = self.config.max_sql_log_length;

        log_statement(Stage::Counting, &plan.count.sql, plan.count.params.len(), max_len);
        let total = exec
            .query_scalar(&plan.count.sql, &plan.count.params)
            .await
            .map_err(|e| e.at(Stage::Counting))?;
        let total = Option::<u64>::from_value(total)
            .map_err(|e| OrmError::decode("total", "count", e).at(Stage::Counting))?
            .unwrap_or(0);

        let meta = PageMeta::new(total, plan.page_number, plan.page_size);
        if total == 0 {
            tracing::debug!(target: "anyorm.sql", "count is zero, skipping page query");
            return Ok(meta);
        }

        log_statement(Stage::Paging, &plan.page.sql, plan.page.params.len(), max_len);
        let rows = exec
            .query_rows(&plan.page.sql, &plan.page.params)
            .await
            .map_err(|e| e.at(Stage::Paging))?;
        materialize(rows, dest, &self.options).map_err(|e| e.at(Stage::Materializing))?;
        Ok(meta)
    }

    /// Count, then fetch the page as records.
    pub async fn fetch<T, E>(&self, exec: &E, req: &PageRequest) -> OrmResult<Page<T>>
    where
        T: Record,
        E: Executor,
    {
        let mut items = Vec::new();
        let meta = self.fetch_into(exec, req, &mut items).await?;
        Ok(Page { items, meta })
    }
}
