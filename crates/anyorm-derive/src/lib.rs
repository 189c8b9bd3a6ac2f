//! Derive macros for anyorm
//!
//! Provides `#[derive(Record)]`.

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod record;

/// Derive the `Record` trait for a struct.
///
/// The struct must also implement `Default`; fields without a matching
/// column, or whose column is NULL, keep their default value.
///
/// # Example
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
///     #[orm(skip)]
///     cached: Vec<String>,
/// }
/// ```
///
/// # Attributes
///
/// - `#[orm(column = "name")]` - Match this column name exactly before
///   falling back to the case-insensitive field name
/// - `#[orm(skip)]` - Never populate this field
#[proc_macro_derive(Record, attributes(orm))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    record::expand(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
