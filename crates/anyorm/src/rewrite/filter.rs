//! Normalization of the loosely-typed filter argument list.

use std::collections::{BTreeMap, HashMap};

use super::scan;
use crate::error::{OrmError, OrmResult};
use crate::value::Value;

/// One filter argument.
///
/// The first argument decides how the rest are read:
///
/// | first argument                 | meaning                                         |
/// |--------------------------------|-------------------------------------------------|
/// | none                           | no filter                                       |
/// | text with `SELECT` and `FROM`  | full statement, replaces the target             |
/// | other text                     | predicate; remaining arguments are parameters   |
/// | list starting with text        | unwrapped; its remaining items are parameters   |
/// | map                            | `k1 = ? AND k2 = ?` over sorted keys            |
#[derive(Debug, Clone, PartialEq)]
pub enum FilterArg {
    Text(String),
    Value(Value),
    List(Vec<FilterArg>),
    Map(BTreeMap<String, Value>),
}

impl From<&str> for FilterArg {
    fn from(v: &str) -> Self {
        FilterArg::Text(v.to_string())
    }
}

impl From<String> for FilterArg {
    fn from(v: String) -> Self {
        FilterArg::Text(v)
    }
}

impl From<Value> for FilterArg {
    fn from(v: Value) -> Self {
        FilterArg::Value(v)
    }
}

macro_rules! filter_arg_from_value {
    ($($t:ty),*) => {
        $(
            impl From<$t> for FilterArg {
                fn from(v: $t) -> Self {
                    FilterArg::Value(Value::from(v))
                }
            }
        )*
    };
}

filter_arg_from_value!(i32, i64, u32, u64, f64, bool);

impl<T: Into<FilterArg>> From<Vec<T>> for FilterArg {
    fn from(v: Vec<T>) -> Self {
        FilterArg::List(v.into_iter().map(Into::into).collect())
    }
}

impl From<BTreeMap<String, Value>> for FilterArg {
    fn from(v: BTreeMap<String, Value>) -> Self {
        FilterArg::Map(v)
    }
}

impl From<HashMap<String, Value>> for FilterArg {
    fn from(v: HashMap<String, Value>) -> Self {
        FilterArg::Map(v.into_iter().collect())
    }
}

/// What the filter contributes to the statement.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Filter {
    None,
    /// Replaces the target statement.
    Statement(String),
    /// ANDed into the WHERE clause.
    Predicate(String),
}

/// Resolve `args` into a filter and its parameters.
pub(crate) fn normalize(mut args: Vec<FilterArg>) -> OrmResult<(Filter, Vec<Value>)> {
    if args.is_empty() {
        return Ok((Filter::None, Vec::new()));
    }
    let rest = args.split_off(1);
    match args.remove(0) {
        FilterArg::Text(text) => {
            let params = collect_params(rest)?;
            let text = text.trim();
            if text.is_empty() {
                if !params.is_empty() {
                    return Err(OrmError::validation("filter parameters given without a predicate"));
                }
                return Ok((Filter::None, params));
            }
            let filter = if scan::is_full_statement(text) {
                Filter::Statement(text.to_string())
            } else {
                Filter::Predicate(text.to_string())
            };
            Ok((filter, params))
        }
        FilterArg::List(items) => {
            if !rest.is_empty() {
                return Err(OrmError::validation(
                    "a list filter must be the only filter argument",
                ));
            }
            match items.first() {
                Some(FilterArg::Text(_)) => normalize(items),
                Some(_) => Err(OrmError::validation(
                    "the first element of a list filter must be text",
                )),
                None => Ok((Filter::None, Vec::new())),
            }
        }
        FilterArg::Map(map) => {
            if !rest.is_empty() {
                return Err(OrmError::validation(
                    "a map filter must be the only filter argument",
                ));
            }
            if map.is_empty() {
                return Ok((Filter::None, Vec::new()));
            }
            let predicate = map
                .keys()
                .map(|k| format!("{} = ?", k))
                .collect::<Vec<_>>()
                .join(" AND ");
            Ok((Filter::Predicate(predicate), map.into_values().collect()))
        }
        FilterArg::Value(v) => Err(OrmError::validation(format!(
            "a filter cannot start with a {} value",
            v.kind_name()
        ))),
    }
}

fn collect_params(args: Vec<FilterArg>) -> OrmResult<Vec<Value>> {
    let mut params = Vec::with_capacity(args.len());
    for arg in args {
        match arg {
            FilterArg::Text(s) => params.push(Value::Text(s)),
            FilterArg::Value(v) => params.push(v),
            FilterArg::List(items) => params.extend(collect_params(items)?),
            FilterArg::Map(_) => {
                return Err(OrmError::validation("a map cannot be used as a filter parameter"));
            }
        }
    }
    Ok(params)
}
