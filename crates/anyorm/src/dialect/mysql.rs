use super::{Dialect, LockMode, insert_values, quote_parts};

/// MySQL and MariaDB.
#[derive(Debug, Clone, Copy, Default)]
pub struct MySql;

impl Dialect for MySql {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn quote_ident(&self, ident: &str) -> String {
        quote_parts(ident, '`', '`')
    }

    /// MySQL treats backslash as an escape character inside literals.
    fn quote_value(&self, value: &str) -> String {
        format!("'{}'", value.replace('\\', "\\\\").replace('\'', "''"))
    }

    fn paginate(&self, sql: &str, offset: u64, limit: u64) -> String {
        match (limit, offset) {
            (0, 0) => sql.to_string(),
            // OFFSET is only valid after LIMIT; use the documented "all rows" maximum.
            (0, offset) => format!("{} LIMIT 18446744073709551615 OFFSET {}", sql, offset),
            (limit, 0) => format!("{} LIMIT {}", sql, limit),
            (limit, offset) => format!("{} LIMIT {} OFFSET {}", sql, limit, offset),
        }
    }

    /// MySQL has no sequences.
    fn next_sequence_value(&self, _sequence: &str) -> String {
        String::new()
    }

    fn auto_increment_keyword(&self) -> &'static str {
        "AUTO_INCREMENT"
    }

    fn supports_upsert(&self) -> bool {
        true
    }

    fn upsert(&self, table: &str, columns: &[&str], conflict: &[&str]) -> String {
        if conflict.is_empty() {
            return insert_values(self, "REPLACE INTO", table, columns);
        }
        let updates: Vec<String> = columns
            .iter()
            .filter(|c| !conflict.contains(*c))
            .map(|c| {
                let q = self.quote_column(c);
                format!("{q} = VALUES({q})")
            })
            .collect();
        if updates.is_empty() {
            return insert_values(self, "INSERT IGNORE INTO", table, columns);
        }
        format!(
            "{} ON DUPLICATE KEY UPDATE {}",
            insert_values(self, "INSERT INTO", table, columns),
            updates.join(", ")
        )
    }

    fn lock_clause(&self, mode: LockMode) -> &'static str {
        match mode {
            LockMode::Exclusive => "FOR UPDATE",
            LockMode::Shared => "LOCK IN SHARE MODE",
        }
    }

    fn list_tables(&self) -> String {
        "SELECT table_name FROM information_schema.tables WHERE table_schema = DATABASE() AND table_type = 'BASE TABLE' ORDER BY table_name".to_string()
    }

    fn describe_table(&self, _table: &str) -> String {
        "SELECT column_name, data_type, is_nullable, column_default FROM information_schema.columns WHERE table_schema = DATABASE() AND table_name = ? ORDER BY ordinal_position".to_string()
    }

    fn list_indexes(&self, _table: &str) -> String {
        "SELECT index_name, column_name, non_unique FROM information_schema.statistics WHERE table_schema = DATABASE() AND table_name = ? ORDER BY index_name, seq_in_index".to_string()
    }

    fn list_foreign_keys(&self, _table: &str) -> String {
        "SELECT constraint_name, column_name, referenced_table_name, referenced_column_name FROM information_schema.key_column_usage WHERE table_schema = DATABASE() AND table_name = ? AND referenced_table_name IS NOT NULL".to_string()
    }

    fn current_database(&self) -> String {
        "SELECT DATABASE()".to_string()
    }

    fn server_version(&self) -> String {
        "SELECT VERSION()".to_string()
    }
}
