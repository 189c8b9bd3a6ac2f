//! Per-backend SQL syntax.
//!
//! A [`Dialect`] renders the fragments whose syntax differs between database
//! backends: identifier and literal quoting, pagination, upserts, DDL shapes,
//! row locks and schema-introspection statements. The trait's default methods
//! are ANSI-leaning; each backend is an independent unit struct overriding
//! only what differs, and backends are looked up by name through a
//! [`DialectRegistry`].
//!
//! Dialect methods never fail. Where a backend has no equivalent for a
//! statement the method returns an empty string and leaves error reporting to
//! whatever executes the SQL.
//!
//! # Example
//! ```ignore
//! let mysql = anyorm::dialect::lookup("MySQL");
//! assert_eq!(mysql.quote_ident("users"), "`users`");
//! assert_eq!(mysql.paginate("SELECT * FROM users", 20, 10), "SELECT * FROM users LIMIT 10 OFFSET 20");
//! ```

mod mssql;
mod mysql;
mod oracle;
mod postgres;
mod registry;
mod sqlite;

pub use mssql::SqlServer;
pub use mysql::MySql;
pub use oracle::Oracle;
pub use postgres::Postgres;
pub use registry::{DialectFactory, DialectRegistry, global, lookup, register};
pub use sqlite::Sqlite;

use std::fmt;

/// Row lock requested by a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockMode {
    /// Exclusive row lock (`FOR UPDATE`).
    Exclusive,
    /// Shared row lock (`FOR SHARE`).
    Shared,
}

/// Column shape used by the DDL helpers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: String,
    /// Backend type text, emitted verbatim (`BIGINT`, `VARCHAR(64)`, ...).
    pub sql_type: String,
    pub nullable: bool,
    pub primary_key: bool,
    pub auto_increment: bool,
    /// Default expression, emitted verbatim.
    pub default: Option<String>,
}

impl ColumnDef {
    pub fn new(name: impl Into<String>, sql_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sql_type: sql_type.into(),
            nullable: true,
            primary_key: false,
            auto_increment: false,
            default: None,
        }
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.nullable = false;
        self
    }

    pub fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self
    }

    pub fn default_expr(mut self, expr: impl Into<String>) -> Self {
        self.default = Some(expr.into());
        self
    }
}

/// Index shape used by [`Dialect::create_index`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexDef {
    pub name: String,
    pub table: String,
    pub columns: Vec<String>,
    pub unique: bool,
}

impl IndexDef {
    pub fn new(name: impl Into<String>, table: impl Into<String>, columns: &[&str]) -> Self {
        Self {
            name: name.into(),
            table: table.into(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            unique: false,
        }
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }
}

/// SQL rendering rules for one database backend.
///
/// Introspection statements that filter by table embed a single placeholder
/// (in the backend's own placeholder syntax) to which the caller binds the
/// table name.
pub trait Dialect: Send + Sync + fmt::Debug {
    /// Registry identifier (`"postgres"`, `"mysql"`, ...).
    fn name(&self) -> &'static str;

    // ==================== Quoting ====================

    /// Quote an identifier. Dotted names are quoted part by part and `*` is left bare.
    fn quote_ident(&self, ident: &str) -> String {
        quote_parts(ident, '"', '"')
    }

    fn quote_table(&self, table: &str) -> String {
        self.quote_ident(table)
    }

    fn quote_column(&self, column: &str) -> String {
        self.quote_ident(column)
    }

    /// Quote a string literal, doubling embedded single quotes.
    fn quote_value(&self, value: &str) -> String {
        format!("'{}'", value.replace('\'', "''"))
    }

    /// Placeholder for the `index`-th (1-based) bind parameter.
    fn placeholder(&self, index: usize) -> String {
        let _ = index;
        "?".to_string()
    }

    // ==================== Pagination ====================

    /// Apply offset/limit to a complete statement. `limit == 0` means no limit.
    fn paginate(&self, sql: &str, offset: u64, limit: u64) -> String {
        let mut out = sql.to_string();
        if limit > 0 {
            out.push_str(&format!(" LIMIT {}", limit));
        }
        if offset > 0 {
            out.push_str(&format!(" OFFSET {}", offset));
        }
        out
    }

    // ==================== Sequences & savepoints ====================

    /// Statement fetching the next value of a sequence.
    fn next_sequence_value(&self, sequence: &str) -> String {
        format!("SELECT NEXT VALUE FOR {}", self.quote_ident(sequence))
    }

    fn supports_savepoints(&self) -> bool {
        true
    }

    fn savepoint(&self, name: &str) -> String {
        format!("SAVEPOINT {}", self.quote_ident(name))
    }

    fn rollback_to_savepoint(&self, name: &str) -> String {
        format!("ROLLBACK TO SAVEPOINT {}", self.quote_ident(name))
    }

    fn release_savepoint(&self, name: &str) -> String {
        format!("RELEASE SAVEPOINT {}", self.quote_ident(name))
    }

    // ==================== DDL ====================

    /// Keyword(s) appended to an auto-increment column definition.
    fn auto_increment_keyword(&self) -> &'static str {
        "GENERATED BY DEFAULT AS IDENTITY"
    }

    fn column_definition(&self, column: &ColumnDef) -> String {
        let mut sql = format!("{} {}", self.quote_column(&column.name), column.sql_type);
        if !column.nullable && !column.primary_key {
            sql.push_str(" NOT NULL");
        }
        if let Some(default) = &column.default {
            sql.push_str(" DEFAULT ");
            sql.push_str(default);
        }
        if column.primary_key {
            sql.push_str(" PRIMARY KEY");
        }
        if column.auto_increment {
            sql.push(' ');
            sql.push_str(self.auto_increment_keyword());
        }
        sql
    }

    fn create_table(&self, table: &str, columns: &[ColumnDef]) -> String {
        let defs: Vec<String> = columns.iter().map(|c| self.column_definition(c)).collect();
        format!(
            "CREATE TABLE {} ({})",
            self.quote_table(table),
            defs.join(", ")
        )
    }

    fn drop_table(&self, table: &str, if_exists: bool) -> String {
        if if_exists {
            format!("DROP TABLE IF EXISTS {}", self.quote_table(table))
        } else {
            format!("DROP TABLE {}", self.quote_table(table))
        }
    }

    fn add_column(&self, table: &str, column: &ColumnDef) -> String {
        format!(
            "ALTER TABLE {} ADD COLUMN {}",
            self.quote_table(table),
            self.column_definition(column)
        )
    }

    fn create_index(&self, index: &IndexDef) -> String {
        let cols: Vec<String> = index.columns.iter().map(|c| self.quote_column(c)).collect();
        format!(
            "CREATE {}INDEX {} ON {} ({})",
            if index.unique { "UNIQUE " } else { "" },
            self.quote_ident(&index.name),
            self.quote_table(&index.table),
            cols.join(", ")
        )
    }

    fn truncate_table(&self, table: &str) -> String {
        format!("TRUNCATE TABLE {}", self.quote_table(table))
    }

    // ==================== Upsert ====================

    fn supports_upsert(&self) -> bool {
        false
    }

    /// Insert-or-update statement with one placeholder per column.
    ///
    /// `conflict` names the unique key columns; an empty slice asks for the
    /// backend's insert-or-replace form where one exists.
    fn upsert(&self, table: &str, columns: &[&str], conflict: &[&str]) -> String {
        let _ = (table, columns, conflict);
        String::new()
    }

    // ==================== Locking ====================

    /// Trailing lock clause for a SELECT, or `""` when unsupported.
    fn lock_clause(&self, mode: LockMode) -> &'static str {
        match mode {
            LockMode::Exclusive => "FOR UPDATE",
            LockMode::Shared => "FOR SHARE",
        }
    }

    // ==================== Introspection ====================

    fn list_tables(&self) -> String {
        "SELECT table_name FROM information_schema.tables WHERE table_type = 'BASE TABLE' ORDER BY table_name".to_string()
    }

    fn describe_table(&self, table: &str) -> String {
        let _ = table;
        format!(
            "SELECT column_name, data_type, is_nullable, column_default FROM information_schema.columns WHERE table_name = {} ORDER BY ordinal_position",
            self.placeholder(1)
        )
    }

    fn list_indexes(&self, table: &str) -> String {
        let _ = table;
        String::new()
    }

    fn list_foreign_keys(&self, table: &str) -> String {
        let _ = table;
        format!(
            "SELECT constraint_name FROM information_schema.table_constraints WHERE constraint_type = 'FOREIGN KEY' AND table_name = {}",
            self.placeholder(1)
        )
    }

    fn current_database(&self) -> String {
        String::new()
    }

    fn server_version(&self) -> String {
        String::new()
    }
}

/// The ANSI-leaning fallback returned for unknown dialect names.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ansi;

impl Dialect for Ansi {
    fn name(&self) -> &'static str {
        "ansi"
    }
}

/// Quote each dot-separated part of `ident`, doubling any embedded `close` char.
pub(crate) fn quote_parts(ident: &str, open: char, close: char) -> String {
    let escaped_close = format!("{close}{close}");
    ident
        .split('.')
        .map(|part| {
            if part == "*" {
                part.to_string()
            } else {
                format!(
                    "{open}{}{close}",
                    part.replace(close, &escaped_close)
                )
            }
        })
        .collect::<Vec<_>>()
        .join(".")
}

/// `INSERT ... ON CONFLICT` shared by PostgreSQL and SQLite.
pub(crate) fn on_conflict_upsert(
    dialect: &dyn Dialect,
    table: &str,
    columns: &[&str],
    conflict: &[&str],
    excluded: &str,
) -> String {
    let mut sql = insert_values(dialect, "INSERT INTO", table, columns);
    if conflict.is_empty() {
        sql.push_str(" ON CONFLICT DO NOTHING");
        return sql;
    }
    let keys: Vec<String> = conflict.iter().map(|c| dialect.quote_column(c)).collect();
    let updates: Vec<String> = columns
        .iter()
        .filter(|c| !conflict.contains(*c))
        .map(|c| {
            let q = dialect.quote_column(c);
            format!("{q} = {excluded}.{q}")
        })
        .collect();
    sql.push_str(&format!(" ON CONFLICT ({})", keys.join(", ")));
    if updates.is_empty() {
        sql.push_str(" DO NOTHING");
    } else {
        sql.push_str(&format!(" DO UPDATE SET {}", updates.join(", ")));
    }
    sql
}

/// `MERGE INTO ... USING (SELECT ...)` shared by SQL Server and Oracle.
pub(crate) fn merge_upsert(
    dialect: &dyn Dialect,
    table: &str,
    columns: &[&str],
    conflict: &[&str],
    source_suffix: &str,
    terminator: &str,
) -> String {
    let source_cols: Vec<String> = columns
        .iter()
        .enumerate()
        .map(|(i, c)| format!("{} AS {}", dialect.placeholder(i + 1), dialect.quote_column(c)))
        .collect();
    let on: Vec<String> = conflict
        .iter()
        .map(|c| {
            let q = dialect.quote_column(c);
            format!("target.{q} = source.{q}")
        })
        .collect();
    let updates: Vec<String> = columns
        .iter()
        .filter(|c| !conflict.contains(*c))
        .map(|c| {
            let q = dialect.quote_column(c);
            format!("target.{q} = source.{q}")
        })
        .collect();
    let insert_cols: Vec<String> = columns.iter().map(|c| dialect.quote_column(c)).collect();
    let insert_vals: Vec<String> = columns
        .iter()
        .map(|c| format!("source.{}", dialect.quote_column(c)))
        .collect();

    let mut sql = format!(
        "MERGE INTO {} target USING (SELECT {}{}) source ON ({})",
        dialect.quote_table(table),
        source_cols.join(", "),
        source_suffix,
        on.join(" AND ")
    );
    if !updates.is_empty() {
        sql.push_str(&format!(" WHEN MATCHED THEN UPDATE SET {}", updates.join(", ")));
    }
    sql.push_str(&format!(
        " WHEN NOT MATCHED THEN INSERT ({}) VALUES ({}){}",
        insert_cols.join(", "),
        insert_vals.join(", "),
        terminator
    ));
    sql
}

/// `<verb> <table> (<cols>) VALUES (<placeholders>)`.
pub(crate) fn insert_values(dialect: &dyn Dialect, verb: &str, table: &str, columns: &[&str]) -> String {
    let cols: Vec<String> = columns.iter().map(|c| dialect.quote_column(c)).collect();
    let placeholders: Vec<String> = (1..=columns.len()).map(|i| dialect.placeholder(i)).collect();
    format!(
        "{} {} ({}) VALUES ({})",
        verb,
        dialect.quote_table(table),
        cols.join(", "),
        placeholders.join(", ")
    )
}

#[cfg(test)]
mod tests;
