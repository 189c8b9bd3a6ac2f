//! Convenient imports for typical `anyorm` usage.
//!
//! ```ignore
//! use anyorm::prelude::*;
//! ```

pub use crate::{
    Condition, Executor, FromValue, OrderBy, OrmError, OrmResult, Page, PageRequest, Pager,
    QueryBuilder, Record, Value, params,
};
