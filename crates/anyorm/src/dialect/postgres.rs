use super::{Dialect, on_conflict_upsert};

/// PostgreSQL (also used for CockroachDB).
#[derive(Debug, Clone, Copy, Default)]
pub struct Postgres;

impl Dialect for Postgres {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn placeholder(&self, index: usize) -> String {
        format!("${}", index)
    }

    fn next_sequence_value(&self, sequence: &str) -> String {
        format!("SELECT nextval({})", self.quote_value(sequence))
    }

    fn supports_upsert(&self) -> bool {
        true
    }

    fn upsert(&self, table: &str, columns: &[&str], conflict: &[&str]) -> String {
        on_conflict_upsert(self, table, columns, conflict, "EXCLUDED")
    }

    fn list_tables(&self) -> String {
        "SELECT table_name FROM information_schema.tables WHERE table_schema = current_schema() AND table_type = 'BASE TABLE' ORDER BY table_name".to_string()
    }

    fn describe_table(&self, _table: &str) -> String {
        "SELECT column_name, data_type, is_nullable, column_default FROM information_schema.columns WHERE table_schema = current_schema() AND table_name = $1 ORDER BY ordinal_position".to_string()
    }

    fn list_indexes(&self, _table: &str) -> String {
        "SELECT indexname, indexdef FROM pg_indexes WHERE schemaname = current_schema() AND tablename = $1 ORDER BY indexname".to_string()
    }

    fn list_foreign_keys(&self, _table: &str) -> String {
        concat!(
            "SELECT tc.constraint_name, kcu.column_name, ccu.table_name AS foreign_table, ccu.column_name AS foreign_column ",
            "FROM information_schema.table_constraints tc ",
            "JOIN information_schema.key_column_usage kcu ON tc.constraint_name = kcu.constraint_name AND tc.table_schema = kcu.table_schema ",
            "JOIN information_schema.constraint_column_usage ccu ON ccu.constraint_name = tc.constraint_name AND ccu.table_schema = tc.table_schema ",
            "WHERE tc.constraint_type = 'FOREIGN KEY' AND tc.table_schema = current_schema() AND tc.table_name = $1"
        )
        .to_string()
    }

    fn current_database(&self) -> String {
        "SELECT current_database()".to_string()
    }

    fn server_version(&self) -> String {
        "SELECT version()".to_string()
    }
}
