//! Rendered statements: SQL text plus positional parameters.

use crate::error::{OrmError, OrmResult};
use crate::value::Value;

/// SQL text with `?` placeholders and the parameters bound to them, in order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Rendered {
    pub sql: String,
    pub params: Vec<Value>,
}

impl Rendered {
    pub fn new(sql: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }

    /// Number of `?` placeholders in the SQL text.
    pub fn placeholder_count(&self) -> usize {
        count_placeholders(&self.sql)
    }

    /// Check that placeholder and parameter counts agree.
    pub fn verify(&self) -> OrmResult<()> {
        let placeholders = self.placeholder_count();
        if placeholders != self.params.len() {
            return Err(OrmError::PlaceholderMismatch {
                placeholders,
                params: self.params.len(),
            });
        }
        Ok(())
    }

    pub fn into_parts(self) -> (String, Vec<Value>) {
        (self.sql, self.params)
    }
}

/// Count `?` placeholders, ignoring any inside quoted literals or identifiers.
pub fn count_placeholders(sql: &str) -> usize {
    let mut count = 0;
    let mut quote: Option<char> = None;
    for ch in sql.chars() {
        match quote {
            Some(q) if ch == q => quote = None,
            Some(_) => {}
            None => match ch {
                '\'' | '"' | '`' => quote = Some(ch),
                '?' => count += 1,
                _ => {}
            },
        }
    }
    count
}
