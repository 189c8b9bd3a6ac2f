//! # anyorm
//!
//! A dialect-aware SQL toolkit: build statements, paginate arbitrary SQL and
//! map result rows onto plain Rust values.
//!
//! ## Features
//!
//! - **Dialect registry**: quoting, placeholders, pagination, upserts, DDL and
//!   introspection for PostgreSQL, MySQL, SQLite, SQL Server and Oracle,
//!   looked up by name
//! - **Query builder**: fluent SELECT construction with nested conditions and
//!   COUNT/SUM/AVG/MAX/MIN/EXISTS shortcuts
//! - **Pagination rewriter**: derive COUNT and page statements from any SQL
//! - **Materializer**: rows → records, collections or scalars via `Record`
//!   and `FromValue`
//! - **Executor seam**: plug in any driver; `tokio-postgres` support behind the
//!   `postgres` feature
//!
//! ## Query Builder
//!
//! ```ignore
//! use anyorm::prelude::*;
//!
//! #[derive(Debug, Default, Record)]
//! struct User {
//!     id: i64,
//!     #[orm(column = "user_name")]
//!     name: String,
//! }
//!
//! let mut q = QueryBuilder::for_dialect("users", "postgres");
//! q.and_eq("status", "active").order_desc("created_at").limit(10);
//!
//! let users: Vec<User> = q.fetch_all(&client).await?;
//! let total = q.count(&client).await?;
//! ```
//!
//! ## Pagination
//!
//! ```ignore
//! let page: Page<User> = Pager::for_dialect("mysql")
//!     .fetch(
//!         &client,
//!         &PageRequest::new("SELECT * FROM users WHERE team_id = ?")
//!             .params(params![7])
//!             .filter("created_at > ?")
//!             .filter(since)
//!             .sort("created_at DESC")
//!             .page(2, 20),
//!     )
//!     .await?;
//! ```

pub mod condition;
pub mod config;
pub mod dialect;
pub mod error;
pub mod executor;
pub mod materialize;
pub mod order;
pub mod prelude;
pub mod query;
pub mod rendered;
pub mod rewrite;
pub mod value;

pub use condition::{Condition, Joiner};
pub use config::{MaterializeOptions, PagerConfig};
pub use dialect::{Dialect, DialectRegistry, LockMode};
pub use error::{CoerceError, OrmError, OrmResult, Stage};
pub use executor::{ExecResult, Executor, ResultSet};
pub use materialize::{
    Destination, Fetched, FieldMeta, FromValue, OutputShape, Record, Scalar, materialize,
};
pub use order::{NullsOrder, OrderBy, OrderItem, SortDir};
pub use query::{AggregateFunc, JoinKind, QueryBuilder, QuerySpec};
pub use rendered::Rendered;
pub use rewrite::{FilterArg, Page, PageMeta, PagePlan, PageRequest, Pager};
pub use value::Value;

#[cfg(feature = "derive")]
pub use anyorm_derive::Record;
