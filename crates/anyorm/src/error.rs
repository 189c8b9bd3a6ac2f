//! Error types for anyorm

use std::fmt;
use thiserror::Error;

/// Result type alias for anyorm operations
pub type OrmResult<T> = Result<T, OrmError>;

/// The phase of a multi-step operation that produced an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Rendering or verifying a statement.
    Building,
    /// Running the derived COUNT statement.
    Counting,
    /// Running the page-limited statement.
    Paging,
    /// Mapping result rows into the destination.
    Materializing,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Building => "building",
            Stage::Counting => "counting",
            Stage::Paging => "paging",
            Stage::Materializing => "materializing",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A value that could not be converted into a field's declared type.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("cannot convert {from} into {to}: {message}")]
pub struct CoerceError {
    /// Source value variant (`"text"`, `"integer"`, ...).
    pub from: &'static str,
    /// Destination type description (`"i32"`, `"timestamp"`, ...).
    pub to: &'static str,
    pub message: String,
}

impl CoerceError {
    pub fn new(from: &'static str, to: &'static str, message: impl Into<String>) -> Self {
        Self {
            from,
            to,
            message: message.into(),
        }
    }
}

/// Error types for query building, execution and materialization
#[derive(Debug, Error)]
pub enum OrmError {
    /// A precondition was violated before any SQL was built or executed
    /// (empty target, malformed filter, unusable destination).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Rendered SQL and its parameter list disagree.
    #[error("Placeholder mismatch: {placeholders} placeholder(s) but {params} parameter(s)")]
    PlaceholderMismatch { placeholders: usize, params: usize },

    /// An error annotated with the stage it happened in.
    #[error("{stage} failed: {source}")]
    Stage {
        stage: Stage,
        #[source]
        source: Box<OrmError>,
    },

    /// Statement execution failed inside the executor.
    #[error("Query error: {0}")]
    Query(String),

    /// A column value could not be coerced into the destination field.
    #[error("Decode error on field '{field}' (column '{column}'): {source}")]
    Coerce {
        field: String,
        column: String,
        #[source]
        source: CoerceError,
    },

    /// A strict single-row destination received more than one row.
    #[error("Too many rows: expected {expected}, got {got}")]
    TooManyRows { expected: usize, got: usize },

    /// Error reported by the PostgreSQL driver.
    #[cfg(feature = "postgres")]
    #[error("Postgres error: {0}")]
    Postgres(#[from] tokio_postgres::Error),

    /// Pool error
    #[cfg(feature = "pool")]
    #[error("Pool error: {0}")]
    Pool(String),
}

impl OrmError {
    /// Create a validation (precondition) error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create an executor-side query error
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query(message.into())
    }

    /// Create a coercion error for a specific field/column pair
    pub fn decode(field: impl Into<String>, column: impl Into<String>, source: CoerceError) -> Self {
        Self::Coerce {
            field: field.into(),
            column: column.into(),
            source,
        }
    }

    pub fn too_many_rows(expected: usize, got: usize) -> Self {
        Self::TooManyRows { expected, got }
    }

    /// Wrap this error with a stage label.
    ///
    /// Errors that already carry a stage are returned unchanged.
    pub fn at(self, stage: Stage) -> Self {
        match self {
            already @ Self::Stage { .. } => already,
            other => Self::Stage {
                stage,
                source: Box::new(other),
            },
        }
    }

    /// The stage label, if this error carries one.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Self::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// The innermost error, with any stage wrapping removed.
    pub fn root(&self) -> &OrmError {
        match self {
            Self::Stage { source, .. } => source.root(),
            other => other,
        }
    }

    /// Check if this is a precondition violation
    pub fn is_validation(&self) -> bool {
        matches!(self.root(), Self::Validation(_))
    }

    /// Check if this is a coercion error
    pub fn is_coerce(&self) -> bool {
        matches!(self.root(), Self::Coerce { .. })
    }
}

#[cfg(feature = "pool")]
impl From<deadpool_postgres::PoolError> for OrmError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        Self::Pool(err.to_string())
    }
}
