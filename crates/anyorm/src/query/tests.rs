use super::*;
use crate::dialect::{MySql, Postgres, SqlServer};
use crate::error::{CoerceError, OrmError};
use crate::executor::ResultSet;
use crate::executor::mock::MockExecutor;
use crate::materialize::FieldMeta;
use crate::params;

#[derive(Debug, Default, PartialEq)]
struct Order {
    id: i64,
    total: f64,
}

impl Record for Order {
    fn fields() -> &'static [FieldMeta] {
        const FIELDS: &[FieldMeta] = &[
            FieldMeta::new("id", None, <i64 as FromValue>::KIND, false),
            FieldMeta::new("total", None, <f64 as FromValue>::KIND, false),
        ];
        FIELDS
    }

    fn set_field(&mut self, index: usize, value: Value) -> Result<(), CoerceError> {
        match index {
            0 => self.id = FromValue::from_value(value)?,
            1 => self.total = FromValue::from_value(value)?,
            _ => {}
        }
        Ok(())
    }
}

fn orders() -> QueryBuilder {
    let mut q = QueryBuilder::new("orders o");
    q.select("o.id, o.total")
        .and_eq("o.status", "paid")
        .gt("o.total", 10)
        .order_desc("o.created_at")
        .limit(5)
        .offset(10)
        .for_update();
    q
}

#[test]
fn renders_clauses_in_order() {
    let mut q = QueryBuilder::new("orders o");
    q.select("o.id")
        .select_expr("? AS tag", params!["x"])
        .join_raw("LEFT JOIN items i ON i.order_id = o.id AND i.kind = ?", params![2])
        .inner_join("users u", "u.id = o.user_id")
        .and_eq("o.status", "paid")
        .or_group(|g| {
            g.lt("o.total", 5).or_where("o.total > ?", params![100]);
        })
        .group_by("o.id")
        .having("COUNT(i.id) > ?", params![3])
        .order_asc("o.id")
        .limit(10);

    let r = q.render();
    assert_eq!(
        r.sql,
        "SELECT o.id, ? AS tag FROM orders o \
         LEFT JOIN items i ON i.order_id = o.id AND i.kind = ? \
         INNER JOIN users u ON u.id = o.user_id \
         WHERE o.status = ? OR (o.total < ? OR o.total > ?) \
         GROUP BY o.id HAVING COUNT(i.id) > ? ORDER BY o.id ASC LIMIT 10"
    );
    assert_eq!(r.params, params!["x", 2, "paid", 5, 100, 3]);
    assert!(r.verify().is_ok());
}

#[test]
fn render_is_idempotent() {
    let q = orders();
    assert_eq!(q.render(), q.render());
}

#[test]
fn alias_distinct_and_cross_join() {
    let mut q = QueryBuilder::new("orders");
    q.alias("o").distinct().select_cols(&["o.user_id", "o.region"]);
    q.join(JoinKind::Cross, "regions r", "");
    assert_eq!(
        q.render().sql,
        "SELECT DISTINCT o.user_id, o.region FROM orders AS o CROSS JOIN regions r"
    );
}

#[test]
fn add_select_replaces_default_star() {
    let mut q = QueryBuilder::new("t");
    q.add_select("a").add_select("b");
    assert_eq!(q.render().sql, "SELECT a, b FROM t");
}

#[test]
fn aggregate_replaces_columns() {
    let mut q = QueryBuilder::new("t");
    q.select("a").aggregate(AggregateFunc::Max, "a");
    assert_eq!(q.render().sql, "SELECT MAX(a) FROM t");
    q.clear_aggregate();
    assert_eq!(q.render().sql, "SELECT a FROM t");
}

#[test]
fn page_computes_offset_and_clamps() {
    let mut q = QueryBuilder::new("t");
    q.page(2, 5);
    assert_eq!((q.spec().limit(), q.spec().offset()), (5, 5));
    q.page(0, 0);
    assert_eq!((q.spec().limit(), q.spec().offset()), (1, 0));
}

#[test]
fn last_lock_wins() {
    let mut q = QueryBuilder::with_dialect("t", Arc::new(MySql));
    q.for_update().for_share();
    assert_eq!(q.render().sql, "SELECT * FROM t LOCK IN SHARE MODE");
}

#[test]
fn dialect_paginates() {
    let mut q = QueryBuilder::with_dialect("t", Arc::new(SqlServer));
    q.limit(10).offset(20);
    assert_eq!(
        q.render().sql,
        "SELECT * FROM t ORDER BY (SELECT NULL) OFFSET 20 ROWS FETCH NEXT 10 ROWS ONLY"
    );

    let named = QueryBuilder::for_dialect("t", "PostgreSQL");
    assert_eq!(named.dialect().name(), "postgres");
}

fn nest(c: &mut Condition, level: usize) {
    c.and_eq("x", level as i64).or_eq("y", "v");
    if level > 1 {
        c.or_group(|g| nest(g, level - 1));
    }
}

#[test]
fn nested_groups_keep_placeholders_and_params_aligned() {
    for depth in 1..=3 {
        let mut q = QueryBuilder::new("t");
        q.and_eq("a", 0);
        q.and_group(|g| nest(g, depth));
        let r = q.render();
        assert_eq!(r.placeholder_count(), r.params.len(), "depth {}", depth);
        assert_eq!(r.params.len(), 1 + depth * 2);
    }
}

#[test]
fn count_strips_order_paging_and_lock() {
    let mut q = orders();
    let r = q.render_count();
    assert_eq!(
        r.sql,
        "SELECT COUNT(*) FROM orders o WHERE o.status = ? AND o.total > ?"
    );
    assert_eq!(r.params, params!["paid", 10]);
    assert_eq!(q.spec(), orders().spec());
}

#[test]
fn count_wraps_grouped_queries() {
    let mut q = QueryBuilder::with_dialect("orders", Arc::new(Postgres));
    q.select("user_id").group_by("user_id").limit(3);
    let r = q.render_count();
    assert_eq!(
        r.sql,
        "SELECT COUNT(*) FROM (SELECT user_id FROM orders GROUP BY user_id) AS t"
    );
    assert_eq!(q.spec().limit(), 3);
}

#[tokio::test]
async fn shortcuts_restore_state() {
    let mut q = orders();
    let before = q.spec().clone();
    let exec = MockExecutor::new()
        .respond_scalar(7)
        .respond_scalar(Value::Float(12.5))
        .respond_scalar(Value::Null)
        .respond_scalar(99)
        .respond_scalar(1);

    assert_eq!(q.count(&exec).await.unwrap(), 7);
    assert_eq!(q.sum(&exec, "o.total").await.unwrap(), Some(12.5));
    assert_eq!(q.avg(&exec, "o.total").await.unwrap(), None);
    assert_eq!(q.max::<i64, _>(&exec, "o.id").await.unwrap(), Some(99));
    assert!(q.exists(&exec).await.unwrap());
    assert_eq!(q.spec(), &before);

    let calls = exec.calls();
    assert_eq!(
        calls[1].0,
        "SELECT SUM(o.total) FROM orders o WHERE o.status = ? AND o.total > ?"
    );
    assert_eq!(
        calls[4].0,
        "SELECT 1 FROM orders o WHERE o.status = ? AND o.total > ? LIMIT 1"
    );
    assert!(calls.iter().all(|(_, p)| p == &params!["paid", 10]));
}

#[tokio::test]
async fn shortcut_failure_restores_state() {
    let mut q = orders();
    let before = q.spec().clone();
    let exec = MockExecutor::new().fail("connection reset");

    let err = q.count(&exec).await.unwrap_err();
    assert_eq!(err.stage(), Some(Stage::Counting));
    assert!(matches!(err.root(), OrmError::Query(_)));
    assert_eq!(q.spec(), &before);
}

#[tokio::test]
async fn exists_is_false_without_rows() {
    let mut q = QueryBuilder::new("t");
    let exec = MockExecutor::new().respond(ResultSet::new(vec!["1".into()], vec![]));
    assert!(!q.exists(&exec).await.unwrap());
}

#[tokio::test]
async fn fetch_all_and_optional() {
    let q = orders();
    let rows = ResultSet::new(
        vec!["id".into(), "total".into()],
        vec![
            vec![Value::Int(1), Value::Float(20.0)],
            vec![Value::Int(2), Value::Text("30.5".into())],
        ],
    );
    let exec = MockExecutor::new()
        .respond(rows)
        .respond(ResultSet::new(vec!["id".into(), "total".into()], vec![]));

    let all: Vec<Order> = q.fetch_all(&exec).await.unwrap();
    assert_eq!(all, vec![Order { id: 1, total: 20.0 }, Order { id: 2, total: 30.5 }]);

    let none: Option<Order> = q.fetch_optional(&exec).await.unwrap();
    assert!(none.is_none());

    let calls = exec.calls();
    assert_eq!(calls[0].0, q.render().sql);
    assert_eq!(calls[0].1, q.render().params);
}

#[tokio::test]
async fn coercion_failure_is_tagged_materializing() {
    let q = QueryBuilder::new("orders");
    let rows = ResultSet::new(
        vec!["id".into(), "total".into()],
        vec![vec![Value::Text("abc".into()), Value::Float(1.0)]],
    );
    let exec = MockExecutor::new().respond(rows);
    let err = q.fetch_all::<Order, _>(&exec).await.unwrap_err();
    assert_eq!(err.stage(), Some(Stage::Materializing));
    assert!(err.is_coerce());
}

#[tokio::test]
async fn mismatched_select_expr_fails_before_execution() {
    let mut q = QueryBuilder::new("t");
    q.select_expr("? AS a, ? AS b", params![1]);
    let exec = MockExecutor::new();
    let err = q.fetch_all::<Order, _>(&exec).await.unwrap_err();
    assert_eq!(err.stage(), Some(Stage::Building));
    assert!(exec.calls().is_empty());
}

#[tokio::test]
async fn paginate_ignores_builder_paging() {
    let q = orders();
    let exec = MockExecutor::new()
        .respond_scalar(12)
        .respond(ResultSet::new(
            vec!["id".into(), "total".into()],
            vec![vec![Value::Int(3), Value::Float(1.5)]],
        ));

    let page: crate::rewrite::Page<Order> = q.paginate(&exec, 3, 5).await.unwrap();
    assert_eq!(page.meta.total, 12);
    assert_eq!(page.meta.pages, 3);
    assert!(!page.meta.has_next());
    assert_eq!(page.items.len(), 1);

    let calls = exec.calls();
    assert_eq!(
        calls[0].0,
        "SELECT COUNT(*) FROM orders o WHERE o.status = ? AND o.total > ?"
    );
    assert_eq!(
        calls[1].0,
        "SELECT o.id, o.total FROM orders o WHERE o.status = ? AND o.total > ? \
         ORDER BY o.created_at DESC LIMIT 5 OFFSET 10"
    );
    assert_eq!(calls[1].1, params!["paid", 10]);
}

#[test]
fn equality_helpers_on_builder_and_condition() {
    let mut q = QueryBuilder::new("users");
    q.and_eq("status", "active").and_ne("role", "guest");
    q.conditions().and_eq("tenant", 3).and_ne("deleted", true);
    let r = q.render();
    assert_eq!(
        r.sql,
        "SELECT * FROM users WHERE status = ? AND role != ? AND tenant = ? AND deleted != ?"
    );
    assert_eq!(r.params, params!["active", "guest", 3, true]);
}
