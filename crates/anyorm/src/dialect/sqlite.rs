use super::{ColumnDef, Dialect, LockMode, insert_values, on_conflict_upsert};

/// SQLite 3.24+.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sqlite;

impl Dialect for Sqlite {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn paginate(&self, sql: &str, offset: u64, limit: u64) -> String {
        match (limit, offset) {
            (0, 0) => sql.to_string(),
            (0, offset) => format!("{} LIMIT -1 OFFSET {}", sql, offset),
            (limit, 0) => format!("{} LIMIT {}", sql, limit),
            (limit, offset) => format!("{} LIMIT {} OFFSET {}", sql, limit, offset),
        }
    }

    fn next_sequence_value(&self, _sequence: &str) -> String {
        String::new()
    }

    fn auto_increment_keyword(&self) -> &'static str {
        "AUTOINCREMENT"
    }

    /// AUTOINCREMENT is only legal on an `INTEGER PRIMARY KEY` column.
    fn column_definition(&self, column: &ColumnDef) -> String {
        let sql_type = if column.auto_increment {
            "INTEGER"
        } else {
            column.sql_type.as_str()
        };
        let mut sql = format!("{} {}", self.quote_column(&column.name), sql_type);
        if !column.nullable && !column.primary_key {
            sql.push_str(" NOT NULL");
        }
        if let Some(default) = &column.default {
            sql.push_str(" DEFAULT ");
            sql.push_str(default);
        }
        if column.primary_key || column.auto_increment {
            sql.push_str(" PRIMARY KEY");
        }
        if column.auto_increment {
            sql.push_str(" AUTOINCREMENT");
        }
        sql
    }

    fn truncate_table(&self, table: &str) -> String {
        format!("DELETE FROM {}", self.quote_table(table))
    }

    fn supports_upsert(&self) -> bool {
        true
    }

    fn upsert(&self, table: &str, columns: &[&str], conflict: &[&str]) -> String {
        if conflict.is_empty() {
            return insert_values(self, "INSERT OR REPLACE INTO", table, columns);
        }
        on_conflict_upsert(self, table, columns, conflict, "excluded")
    }

    /// SQLite locks the whole database; there is no row-level lock clause.
    fn lock_clause(&self, _mode: LockMode) -> &'static str {
        ""
    }

    fn list_tables(&self) -> String {
        "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name".to_string()
    }

    fn describe_table(&self, _table: &str) -> String {
        "SELECT name, type, \"notnull\", dflt_value, pk FROM pragma_table_info(?)".to_string()
    }

    fn list_indexes(&self, _table: &str) -> String {
        "SELECT name, \"unique\" FROM pragma_index_list(?)".to_string()
    }

    fn list_foreign_keys(&self, _table: &str) -> String {
        "SELECT id, \"table\", \"from\", \"to\" FROM pragma_foreign_key_list(?)".to_string()
    }

    fn current_database(&self) -> String {
        "SELECT file FROM pragma_database_list WHERE name = 'main'".to_string()
    }

    fn server_version(&self) -> String {
        "SELECT sqlite_version()".to_string()
    }
}
