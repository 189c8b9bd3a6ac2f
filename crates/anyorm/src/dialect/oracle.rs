use super::{Dialect, LockMode, merge_upsert};

/// Oracle Database. Pagination uses `ROWNUM` so it also works before 12c.
#[derive(Debug, Clone, Copy, Default)]
pub struct Oracle;

impl Dialect for Oracle {
    fn name(&self) -> &'static str {
        "oracle"
    }

    fn placeholder(&self, index: usize) -> String {
        format!(":{}", index)
    }

    fn paginate(&self, sql: &str, offset: u64, limit: u64) -> String {
        match (limit, offset) {
            (0, 0) => sql.to_string(),
            (limit, 0) => format!("SELECT * FROM ({}) WHERE ROWNUM <= {}", sql, limit),
            (0, offset) => format!(
                "SELECT * FROM (SELECT inner_.*, ROWNUM rnum_ FROM ({}) inner_) WHERE rnum_ > {}",
                sql, offset
            ),
            (limit, offset) => format!(
                "SELECT * FROM (SELECT inner_.*, ROWNUM rnum_ FROM ({}) inner_ WHERE ROWNUM <= {}) WHERE rnum_ > {}",
                sql,
                offset + limit,
                offset
            ),
        }
    }

    fn next_sequence_value(&self, sequence: &str) -> String {
        format!("SELECT {}.NEXTVAL FROM DUAL", self.quote_ident(sequence))
    }

    fn release_savepoint(&self, _name: &str) -> String {
        String::new()
    }

    fn drop_table(&self, table: &str, _if_exists: bool) -> String {
        format!("DROP TABLE {}", self.quote_table(table))
    }

    fn add_column(&self, table: &str, column: &super::ColumnDef) -> String {
        format!(
            "ALTER TABLE {} ADD ({})",
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
        merge_upsert(self, table, columns, conflict, " FROM DUAL", "")
    }

    fn lock_clause(&self, mode: LockMode) -> &'static str {
        match mode {
            LockMode::Exclusive => "FOR UPDATE",
            LockMode::Shared => "",
        }
    }

    fn list_tables(&self) -> String {
        "SELECT table_name FROM user_tables ORDER BY table_name".to_string()
    }

    fn describe_table(&self, _table: &str) -> String {
        "SELECT column_name, data_type, nullable, data_default FROM user_tab_columns WHERE table_name = :1 ORDER BY column_id".to_string()
    }

    fn list_indexes(&self, _table: &str) -> String {
        "SELECT index_name, uniqueness FROM user_indexes WHERE table_name = :1 ORDER BY index_name".to_string()
    }

    fn list_foreign_keys(&self, _table: &str) -> String {
        "SELECT constraint_name, r_constraint_name FROM user_constraints WHERE constraint_type = 'R' AND table_name = :1".to_string()
    }

    fn current_database(&self) -> String {
        "SELECT SYS_CONTEXT('USERENV', 'DB_NAME') FROM DUAL".to_string()
    }

    fn server_version(&self) -> String {
        "SELECT banner FROM v$version WHERE ROWNUM = 1".to_string()
    }
}
