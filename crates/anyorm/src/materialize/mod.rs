//! Mapping result rows into caller-chosen output shapes.
//!
//! A [`Destination`] reports its [`OutputShape`] and receives a
//! [`ResultSet`]:
//!
//! - `Vec<T: Record>`: one record per row (appended).
//! - `Option<T: Record>`: the first row; `None` plus [`Fetched::NotFound`] when empty.
//! - [`Scalar<T>`]: the single column of the single row.
//!
//! Columns are matched to record fields by tag, then by case-insensitive
//! name. Unmatched columns are ignored and unmatched fields keep their
//! default value. A NULL cell leaves its field untouched. The first failed
//! coercion aborts the whole call.

mod coerce;
mod record;

pub use coerce::{FromValue, parse_datetime};
pub use record::{FieldMeta, Record};

use crate::config::MaterializeOptions;
use crate::error::{OrmError, OrmResult};
use crate::executor::ResultSet;
use crate::value::Value;

/// The shape a destination expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputShape {
    Scalar,
    Record(&'static [FieldMeta]),
    Collection(&'static [FieldMeta]),
}

impl OutputShape {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputShape::Scalar => "scalar",
            OutputShape::Record(_) => "record",
            OutputShape::Collection(_) => "collection",
        }
    }
}

/// Outcome of a successful materialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fetched {
    /// Number of rows mapped into the destination.
    Rows(usize),
    /// A single-row destination received no rows.
    NotFound,
}

impl Fetched {
    pub fn is_found(&self) -> bool {
        matches!(self, Fetched::Rows(_))
    }
}

/// Something [`materialize`] can write into.
pub trait Destination {
    fn shape(&self) -> OutputShape;

    fn fill(&mut self, set: ResultSet, options: &MaterializeOptions) -> OrmResult<Fetched>;
}

/// Map `set` into `dest`.
pub fn materialize<D: Destination + ?Sized>(
    set: ResultSet,
    dest: &mut D,
    options: &MaterializeOptions,
) -> OrmResult<Fetched> {
    let shape = dest.shape();
    if let OutputShape::Record(fields) | OutputShape::Collection(fields) = shape {
        if fields.is_empty() {
            return Err(OrmError::validation(format!(
                "{} destination has no fields to populate",
                shape.as_str()
            )));
        }
    }
    tracing::trace!(
        target: "anyorm.sql",
        shape = shape.as_str(),
        rows = set.rows.len(),
        columns = set.columns.len(),
        "materializing result set"
    );
    dest.fill(set, options)
}

/// Pick the single row for a record or scalar destination.
fn single_row(set: ResultSet, options: &MaterializeOptions) -> OrmResult<Option<Vec<Value>>> {
    let got = set.rows.len();
    if got > 1 {
        if options.strict_single_row {
            return Err(OrmError::too_many_rows(1, got));
        }
        tracing::warn!(
            target: "anyorm.sql",
            rows = got,
            "single-row destination received multiple rows, using the first"
        );
    }
    Ok(set.rows.into_iter().next())
}

fn build_record<T: Record>(
    plan: &[Option<usize>],
    columns: &[String],
    row: Vec<Value>,
) -> OrmResult<T> {
    let fields = T::fields();
    let mut record = T::default();
    for (idx, value) in row.into_iter().enumerate() {
        let Some(Some(field)) = plan.get(idx) else {
            continue;
        };
        if value.is_null() {
            continue;
        }
        record
            .set_field(*field, value)
            .map_err(|e| OrmError::decode(fields[*field].name, columns[idx].as_str(), e))?;
    }
    Ok(record)
}

impl<T: Record> Destination for Vec<T> {
    fn shape(&self) -> OutputShape {
        OutputShape::Collection(T::fields())
    }

    fn fill(&mut self, set: ResultSet, _options: &MaterializeOptions) -> OrmResult<Fetched> {
        let plan = record::plan_columns(T::fields(), &set.columns);
        let n = set.rows.len();
        self.reserve(n);
        for row in set.rows {
            self.push(build_record(&plan, &set.columns, row)?);
        }
        Ok(Fetched::Rows(n))
    }
}

impl<T: Record> Destination for Option<T> {
    fn shape(&self) -> OutputShape {
        OutputShape::Record(T::fields())
    }

    fn fill(&mut self, set: ResultSet, options: &MaterializeOptions) -> OrmResult<Fetched> {
        let plan = record::plan_columns(T::fields(), &set.columns);
        let columns = set.columns.clone();
        match single_row(set, options)? {
            Some(row) => {
                *self = Some(build_record(&plan, &columns, row)?);
                Ok(Fetched::Rows(1))
            }
            None => {
                *self = None;
                Ok(Fetched::NotFound)
            }
        }
    }
}

/// Destination for a single-column, single-row result.
///
/// The value stays `None` when no row is returned or the cell is NULL.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Scalar<T>(pub Option<T>);

impl<T> Scalar<T> {
    pub fn new() -> Self {
        Self(None)
    }

    pub fn into_inner(self) -> Option<T> {
        self.0
    }
}

impl<T: FromValue> Destination for Scalar<T> {
    fn shape(&self) -> OutputShape {
        OutputShape::Scalar
    }

    fn fill(&mut self, set: ResultSet, options: &MaterializeOptions) -> OrmResult<Fetched> {
        if set.columns.len() > 1 {
            return Err(OrmError::validation(format!(
                "scalar destination expects one column, got {}",
                set.columns.len()
            )));
        }
        let column = set.columns.first().cloned().unwrap_or_default();
        let Some(row) = single_row(set, options)? else {
            return Ok(Fetched::NotFound);
        };
        if row.len() != 1 {
            return Err(OrmError::validation(format!(
                "scalar destination expects one column, got {}",
                row.len()
            )));
        }
        if let Some(value) = row.into_iter().next().filter(|v| !v.is_null()) {
            let value = T::from_value(value).map_err(|e| OrmError::decode("<scalar>", column, e))?;
            self.0 = Some(value);
        }
        Ok(Fetched::Rows(1))
    }
}

#[cfg(test)]
mod tests;
