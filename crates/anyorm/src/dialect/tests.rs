use super::*;
use std::sync::Arc;

#[test]
fn lookup_is_case_insensitive_with_aliases() {
    let registry = DialectRegistry::with_builtins();
    assert_eq!(registry.lookup("PostgreSQL").name(), "postgres");
    assert_eq!(registry.lookup("pg").name(), "postgres");
    assert_eq!(registry.lookup("MariaDB").name(), "mysql");
    assert_eq!(registry.lookup("sqlite3").name(), "sqlite");
    assert_eq!(registry.lookup("MSSQL").name(), "sqlserver");
    assert_eq!(registry.lookup("oracle").name(), "oracle");
}

#[test]
fn unknown_name_falls_back_to_ansi() {
    let registry = DialectRegistry::with_builtins();
    let d = registry.lookup("db2");
    assert_eq!(d.name(), "ansi");
    assert_eq!(d.quote_ident("users"), "\"users\"");
    assert_eq!(d.paginate("SELECT 1", 0, 5), "SELECT 1 LIMIT 5");
}

#[test]
fn empty_registry_still_resolves() {
    let registry = DialectRegistry::new();
    assert!(registry.names().is_empty());
    assert_eq!(registry.lookup("postgres").name(), "ansi");
}

#[derive(Debug)]
struct Custom;

impl Dialect for Custom {
    fn name(&self) -> &'static str {
        "custom"
    }

    fn placeholder(&self, index: usize) -> String {
        format!("%{}", index)
    }
}

#[test]
fn register_overwrites_existing_name() {
    let registry = DialectRegistry::with_builtins();
    registry.register("MySQL", Arc::new(|| Arc::new(Custom)));
    assert_eq!(registry.lookup("mysql").name(), "custom");
    // Aliases are independent entries.
    assert_eq!(registry.lookup("mariadb").name(), "mysql");
    assert!(registry.contains("MYSQL"));
}

#[test]
fn global_registry_accepts_custom_dialects() {
    register("test-custom", Arc::new(|| Arc::new(Custom)));
    assert_eq!(lookup("TEST-CUSTOM").placeholder(2), "%2");
    assert!(global().names().contains(&"test-custom".to_string()));
}

#[test]
fn identifier_quoting() {
    assert_eq!(Postgres.quote_ident("public.users"), "\"public\".\"users\"");
    assert_eq!(Postgres.quote_ident("u.*"), "\"u\".*");
    assert_eq!(Postgres.quote_ident("we\"ird"), "\"we\"\"ird\"");
    assert_eq!(MySql.quote_ident("db.users"), "`db`.`users`");
    assert_eq!(SqlServer.quote_ident("dbo.users"), "[dbo].[users]");
    assert_eq!(SqlServer.quote_ident("a]b"), "[a]]b]");
}

#[test]
fn literal_quoting() {
    assert_eq!(Postgres.quote_value("it's"), "'it''s'");
    assert_eq!(MySql.quote_value("a\\b'c"), "'a\\\\b''c'");
}

#[test]
fn placeholders() {
    assert_eq!(Ansi.placeholder(3), "?");
    assert_eq!(MySql.placeholder(3), "?");
    assert_eq!(Postgres.placeholder(3), "$3");
    assert_eq!(SqlServer.placeholder(3), "@p3");
    assert_eq!(Oracle.placeholder(3), ":3");
}

#[test]
fn limit_offset_pagination() {
    let sql = "SELECT * FROM t";
    assert_eq!(Postgres.paginate(sql, 0, 0), sql);
    assert_eq!(Postgres.paginate(sql, 20, 10), "SELECT * FROM t LIMIT 10 OFFSET 20");
    assert_eq!(Postgres.paginate(sql, 20, 0), "SELECT * FROM t OFFSET 20");
    assert_eq!(MySql.paginate(sql, 0, 10), "SELECT * FROM t LIMIT 10");
    assert_eq!(
        MySql.paginate(sql, 5, 0),
        "SELECT * FROM t LIMIT 18446744073709551615 OFFSET 5"
    );
    assert_eq!(Sqlite.paginate(sql, 5, 0), "SELECT * FROM t LIMIT -1 OFFSET 5");
}

#[test]
fn sqlserver_pagination_adds_order_by_when_missing() {
    assert_eq!(
        SqlServer.paginate("SELECT * FROM t", 10, 5),
        "SELECT * FROM t ORDER BY (SELECT NULL) OFFSET 10 ROWS FETCH NEXT 5 ROWS ONLY"
    );
    assert_eq!(
        SqlServer.paginate("SELECT * FROM t ORDER BY id", 0, 5),
        "SELECT * FROM t ORDER BY id OFFSET 0 ROWS FETCH NEXT 5 ROWS ONLY"
    );
}

#[test]
fn sqlserver_pagination_ignores_nested_order_by() {
    let dialect = lookup("mssql");
    assert_eq!(
        dialect.paginate("SELECT id, ROW_NUMBER() OVER (ORDER BY id) AS rn FROM t", 10, 5),
        "SELECT id, ROW_NUMBER() OVER (ORDER BY id) AS rn FROM t ORDER BY (SELECT NULL) OFFSET 10 ROWS FETCH NEXT 5 ROWS ONLY"
    );
    assert_eq!(
        dialect.paginate("SELECT * FROM t WHERE id IN (SELECT id FROM u ORDER BY id)", 0, 5),
        "SELECT * FROM t WHERE id IN (SELECT id FROM u ORDER BY id) ORDER BY (SELECT NULL) OFFSET 0 ROWS FETCH NEXT 5 ROWS ONLY"
    );
    assert_eq!(
        dialect.paginate("SELECT * FROM t WHERE note = 'order by'", 0, 5),
        "SELECT * FROM t WHERE note = 'order by' ORDER BY (SELECT NULL) OFFSET 0 ROWS FETCH NEXT 5 ROWS ONLY"
    );
}

#[test]
fn oracle_pagination_nests_rownum() {
    assert_eq!(
        Oracle.paginate("SELECT * FROM t", 0, 5),
        "SELECT * FROM (SELECT * FROM t) WHERE ROWNUM <= 5"
    );
    assert_eq!(
        Oracle.paginate("SELECT * FROM t", 10, 5),
        "SELECT * FROM (SELECT inner_.*, ROWNUM rnum_ FROM (SELECT * FROM t) inner_ WHERE ROWNUM <= 15) WHERE rnum_ > 10"
    );
}

#[test]
fn postgres_upsert() {
    assert_eq!(
        Postgres.upsert("users", &["id", "name"], &["id"]),
        "INSERT INTO \"users\" (\"id\", \"name\") VALUES ($1, $2) ON CONFLICT (\"id\") DO UPDATE SET \"name\" = EXCLUDED.\"name\""
    );
    assert_eq!(
        Postgres.upsert("tags", &["id"], &["id"]),
        "INSERT INTO \"tags\" (\"id\") VALUES ($1) ON CONFLICT (\"id\") DO NOTHING"
    );
}

#[test]
fn mysql_upsert_forms() {
    assert_eq!(
        MySql.upsert("users", &["id", "name"], &["id"]),
        "INSERT INTO `users` (`id`, `name`) VALUES (?, ?) ON DUPLICATE KEY UPDATE `name` = VALUES(`name`)"
    );
    assert_eq!(
        MySql.upsert("users", &["id", "name"], &[]),
        "REPLACE INTO `users` (`id`, `name`) VALUES (?, ?)"
    );
    assert_eq!(
        MySql.upsert("tags", &["id"], &["id"]),
        "INSERT IGNORE INTO `tags` (`id`) VALUES (?)"
    );
}

#[test]
fn sqlite_upsert_forms() {
    assert_eq!(
        Sqlite.upsert("users", &["id", "name"], &["id"]),
        "INSERT INTO \"users\" (\"id\", \"name\") VALUES (?, ?) ON CONFLICT (\"id\") DO UPDATE SET \"name\" = excluded.\"name\""
    );
    assert_eq!(
        Sqlite.upsert("users", &["id"], &[]),
        "INSERT OR REPLACE INTO \"users\" (\"id\") VALUES (?)"
    );
}

#[test]
fn merge_upserts() {
    assert_eq!(
        SqlServer.upsert("users", &["id", "name"], &["id"]),
        "MERGE INTO [users] target USING (SELECT @p1 AS [id], @p2 AS [name]) source ON (target.[id] = source.[id]) \
         WHEN MATCHED THEN UPDATE SET target.[name] = source.[name] \
         WHEN NOT MATCHED THEN INSERT ([id], [name]) VALUES (source.[id], source.[name]);"
    );
    let oracle = Oracle.upsert("users", &["id", "name"], &["id"]);
    assert!(oracle.starts_with("MERGE INTO \"users\" target USING (SELECT :1 AS \"id\", :2 AS \"name\" FROM DUAL) source"));
    assert!(!oracle.ends_with(';'));
    assert!(!Ansi.supports_upsert());
    assert_eq!(Ansi.upsert("t", &["a"], &["a"]), "");
}

#[test]
fn lock_clauses() {
    assert_eq!(Postgres.lock_clause(LockMode::Shared), "FOR SHARE");
    assert_eq!(MySql.lock_clause(LockMode::Shared), "LOCK IN SHARE MODE");
    assert_eq!(Sqlite.lock_clause(LockMode::Exclusive), "");
    assert_eq!(SqlServer.lock_clause(LockMode::Exclusive), "");
    assert_eq!(Oracle.lock_clause(LockMode::Exclusive), "FOR UPDATE");
    assert_eq!(Oracle.lock_clause(LockMode::Shared), "");
}

#[test]
fn sequences_and_savepoints() {
    assert_eq!(Postgres.next_sequence_value("order_seq"), "SELECT nextval('order_seq')");
    assert_eq!(Oracle.next_sequence_value("order_seq"), "SELECT \"order_seq\".NEXTVAL FROM DUAL");
    assert_eq!(MySql.next_sequence_value("order_seq"), "");
    assert_eq!(SqlServer.savepoint("sp1"), "SAVE TRANSACTION [sp1]");
    assert_eq!(SqlServer.release_savepoint("sp1"), "");
    assert_eq!(Postgres.rollback_to_savepoint("sp1"), "ROLLBACK TO SAVEPOINT \"sp1\"");
}

#[test]
fn ddl_shapes() {
    let cols = [
        ColumnDef::new("id", "BIGINT").primary_key().auto_increment(),
        ColumnDef::new("email", "VARCHAR(255)").not_null(),
    ];
    assert_eq!(
        MySql.create_table("users", &cols),
        "CREATE TABLE `users` (`id` BIGINT PRIMARY KEY AUTO_INCREMENT, `email` VARCHAR(255) NOT NULL)"
    );
    assert_eq!(
        Sqlite.create_table("users", &cols),
        "CREATE TABLE \"users\" (\"id\" INTEGER PRIMARY KEY AUTOINCREMENT, \"email\" VARCHAR(255) NOT NULL)"
    );
    assert_eq!(Sqlite.truncate_table("users"), "DELETE FROM \"users\"");
    assert_eq!(Oracle.drop_table("users", true), "DROP TABLE \"users\"");
    assert_eq!(Postgres.drop_table("users", true), "DROP TABLE IF EXISTS \"users\"");
    assert_eq!(
        Postgres.create_index(&IndexDef::new("ux_email", "users", &["email"]).unique()),
        "CREATE UNIQUE INDEX \"ux_email\" ON \"users\" (\"email\")"
    );
}

#[test]
fn introspection_uses_native_placeholders() {
    assert!(Postgres.describe_table("users").contains("$1"));
    assert!(SqlServer.describe_table("users").contains("@p1"));
    assert!(Oracle.describe_table("users").contains(":1"));
    assert!(Ansi.describe_table("users").contains("= ?"));
    assert_eq!(Ansi.list_indexes("users"), "");
    assert_eq!(Sqlite.server_version(), "SELECT sqlite_version()");
}
