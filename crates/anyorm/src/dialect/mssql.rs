use super::{Dialect, LockMode, merge_upsert, quote_parts};
use crate::rewrite::has_top_level_order_by;

/// Microsoft SQL Server 2012+.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlServer;

impl Dialect for SqlServer {
    fn name(&self) -> &'static str {
        "sqlserver"
    }

    fn quote_ident(&self, ident: &str) -> String {
        quote_parts(ident, '[', ']')
    }

    fn placeholder(&self, index: usize) -> String {
        format!("@p{}", index)
    }

    /// `OFFSET ... FETCH` requires an ORDER BY; a neutral one is added when missing.
    fn paginate(&self, sql: &str, offset: u64, limit: u64) -> String {
        if limit == 0 && offset == 0 {
            return sql.to_string();
        }
        let mut out = sql.to_string();
        if !has_top_level_order_by(sql) {
            out.push_str(" ORDER BY (SELECT NULL)");
        }
        out.push_str(&format!(" OFFSET {} ROWS", offset));
        if limit > 0 {
            out.push_str(&format!(" FETCH NEXT {} ROWS ONLY", limit));
        }
        out
    }

    fn savepoint(&self, name: &str) -> String {
        format!("SAVE TRANSACTION {}", self.quote_ident(name))
    }

    fn rollback_to_savepoint(&self, name: &str) -> String {
        format!("ROLLBACK TRANSACTION {}", self.quote_ident(name))
    }

    /// Savepoints are released with the enclosing transaction.
    fn release_savepoint(&self, _name: &str) -> String {
        String::new()
    }

    fn auto_increment_keyword(&self) -> &'static str {
        "IDENTITY(1,1)"
    }

    fn add_column(&self, table: &str, column: &super::ColumnDef) -> String {
        format!(
            "ALTER TABLE {} ADD {}",
            self.quote_table(table),
            self.column_definition(column)
        )
    }

    fn supports_upsert(&self) -> bool {
        true
    }

    fn upsert(&self, table: &str, columns: &[&str], conflict: &[&str]) -> String {
        if conflict.is_empty() {
            return String::new();
        }
        merge_upsert(self, table, columns, conflict, "", ";")
    }

    /// Row locks are table hints (`WITH (UPDLOCK)`), not a trailing clause.
    fn lock_clause(&self, _mode: LockMode) -> &'static str {
        ""
    }

    fn list_tables(&self) -> String {
        "SELECT TABLE_NAME FROM INFORMATION_SCHEMA.TABLES WHERE TABLE_TYPE = 'BASE TABLE' ORDER BY TABLE_NAME".to_string()
    }

    fn describe_table(&self, _table: &str) -> String {
        "SELECT COLUMN_NAME, DATA_TYPE, IS_NULLABLE, COLUMN_DEFAULT FROM INFORMATION_SCHEMA.COLUMNS WHERE TABLE_NAME = @p1 ORDER BY ORDINAL_POSITION".to_string()
    }

    fn list_indexes(&self, _table: &str) -> String {
        "SELECT name, is_unique FROM sys.indexes WHERE object_id = OBJECT_ID(@p1) AND name IS NOT NULL ORDER BY name".to_string()
    }

    fn list_foreign_keys(&self, _table: &str) -> String {
        "SELECT name, OBJECT_NAME(referenced_object_id) AS foreign_table FROM sys.foreign_keys WHERE parent_object_id = OBJECT_ID(@p1)".to_string()
    }

    fn current_database(&self) -> String {
        "SELECT DB_NAME()".to_string()
    }

    fn server_version(&self) -> String {
        "SELECT @@VERSION".to_string()
    }
}
