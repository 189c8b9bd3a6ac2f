use crate::error::CoerceError;
use crate::value::Value;

/// Static description of one record field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldMeta {
    /// Rust field name.
    pub name: &'static str,
    /// Persistence tag (`#[orm(column = "...")]`), matched exactly.
    pub tag: Option<&'static str>,
    /// Destination type, as reported by [`FromValue::KIND`](super::FromValue::KIND).
    pub kind: &'static str,
    /// Whether the field is an `Option<_>`.
    pub nullable: bool,
}

impl FieldMeta {
    pub const fn new(
        name: &'static str,
        tag: Option<&'static str>,
        kind: &'static str,
        nullable: bool,
    ) -> Self {
        Self {
            name,
            tag,
            kind,
            nullable,
        }
    }
}

/// A type whose fields can be populated column by column.
///
/// Usually implemented with `#[derive(Record)]`:
///
/// ```ignore
/// use anyorm::Record;
///
/// #[derive(Debug, Default, Record)]
/// struct User {
///     id: i64,
///     #[orm(column = "user_name")]
///     name: String,
///     email: Option<String>,
/// }
/// ```
pub trait Record: Default {
    /// Field table, in declaration order.
    fn fields() -> &'static [FieldMeta];

    /// Coerce `value` into the field at `index` of [`Record::fields`].
    ///
    /// Never called with `Value::Null`; NULL leaves the field at its current value.
    fn set_field(&mut self, index: usize, value: Value) -> Result<(), CoerceError>;
}

/// Map each result column to the field it populates.
///
/// A column matches a field whose tag equals it exactly, otherwise a field
/// whose name equals it ignoring ASCII case. Unmatched columns map to `None`.
pub(crate) fn plan_columns(fields: &[FieldMeta], columns: &[String]) -> Vec<Option<usize>> {
    columns
        .iter()
        .map(|column| {
            fields
                .iter()
                .position(|f| f.tag == Some(column.as_str()))
                .or_else(|| {
                    fields
                        .iter()
                        .position(|f| f.name.eq_ignore_ascii_case(column))
                })
        })
        .collect()
}
