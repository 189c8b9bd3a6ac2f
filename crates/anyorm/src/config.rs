//! Runtime options for pagination and materialization.
//!
//! Both structs are plain data with builder-style setters and derive
//! `serde` traits so host applications can embed them in their own config.

use serde::{Deserialize, Serialize};

/// Default alias for the derived table used when counting complex statements.
pub const DEFAULT_COUNT_ALIAS: &str = "anyorm_count";

/// Options for [`Pager`](crate::rewrite::Pager).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PagerConfig {
    /// Alias given to `SELECT COUNT(*) FROM (...) AS <alias>`.
    pub count_alias: String,
    /// Upper bound applied to requested page sizes. `None` means unbounded.
    pub max_page_size: Option<u64>,
    /// Truncate logged SQL (in bytes). `None` logs statements in full.
    pub max_sql_log_length: Option<usize>,
}

impl Default for PagerConfig {
    fn default() -> Self {
        Self {
            count_alias: DEFAULT_COUNT_ALIAS.to_string(),
            max_page_size: None,
            max_sql_log_length: Some(200),
        }
    }
}

impl PagerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_count_alias(mut self, alias: impl Into<String>) -> Self {
        self.count_alias = alias.into();
        self
    }

    /// Clamp requested page sizes to `size` (at least 1).
    pub fn with_max_page_size(mut self, size: u64) -> Self {
        self.max_page_size = Some(size.max(1));
        self
    }

    pub fn with_max_sql_log_length(mut self, len: usize) -> Self {
        self.max_sql_log_length = Some(len);
        self
    }

    /// Log statements without truncation.
    pub fn no_truncate(mut self) -> Self {
        self.max_sql_log_length = None;
        self
    }

    /// Apply the 1-minimum and the optional maximum to a page size.
    pub(crate) fn clamp_page_size(&self, size: u64) -> u64 {
        let size = size.max(1);
        match self.max_page_size {
            Some(max) => size.min(max),
            None => size,
        }
    }
}

/// Options for [`materialize`](crate::materialize::materialize).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterializeOptions {
    /// Fail with [`OrmError::TooManyRows`](crate::OrmError::TooManyRows) when a
    /// single-record or scalar destination receives more than one row. When
    /// unset the first row is used.
    pub strict_single_row: bool,
}

impl MaterializeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn strict() -> Self {
        Self {
            strict_single_row: true,
        }
    }
}
