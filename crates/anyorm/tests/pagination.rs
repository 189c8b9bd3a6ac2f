mod common;

use anyorm::{FilterArg, Page, PageRequest, Pager, PagerConfig, Record, Stage, Value, params};
use common::{Recorder, text};
use std::collections::BTreeMap;

#[derive(Debug, Default, Record)]
struct Ticket {
    id: i64,
    title: String,
}

#[tokio::test]
async fn mysql_page_with_predicate_and_sort() {
    let exec = Recorder::new()
        .scalar(41)
        .rows(
            &["id", "title"],
            vec![vec![Value::Int(21), text("a")], vec![Value::Int(22), text("b")]],
        );

    let req = PageRequest::new("SELECT id, title FROM tickets WHERE project_id = ?")
        .params(params![3])
        .filter("status = ?")
        .filter("open")
        .sort("id")
        .page(3, 10);
    let page: Page<Ticket> = Pager::for_dialect("mariadb").fetch(&exec, &req).await.unwrap();

    assert_eq!(page.meta.total, 41);
    assert_eq!(page.meta.pages, 5);
    assert!(page.meta.has_next());
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.items[1].title, "b");

    let statements = exec.statements();
    assert_eq!(
        statements[0],
        "SELECT COUNT(*) FROM tickets WHERE (project_id = ?) AND (status = ?)"
    );
    assert_eq!(
        statements[1],
        "SELECT id, title FROM tickets WHERE (project_id = ?) AND (status = ?) ORDER BY id LIMIT 10 OFFSET 20"
    );
    assert_eq!(exec.params(0), params![3, "open"]);
    assert_eq!(exec.params(1), params![3, "open"]);
}

#[tokio::test]
async fn map_filter_on_table_target() {
    let exec = Recorder::new().scalar(0);
    let mut filter = BTreeMap::new();
    filter.insert("team".to_string(), Value::from("core"));
    filter.insert("assignee".to_string(), Value::from(7));

    let req = PageRequest::new("tickets").filter(FilterArg::Map(filter));
    let page: Page<Ticket> = Pager::new().fetch(&exec, &req).await.unwrap();

    assert!(page.items.is_empty());
    assert_eq!(page.meta.pages, 0);
    assert_eq!(
        exec.statements(),
        ["SELECT COUNT(*) FROM tickets WHERE assignee = ? AND team = ?"]
    );
    assert_eq!(exec.params(0), params![7, "core"]);
}

#[tokio::test]
async fn grouped_statement_counts_through_derived_table() {
    let exec = Recorder::new().scalar(2).rows(&["id", "title"], vec![]);
    let req = PageRequest::new("SELECT project_id AS id, MAX(title) AS title FROM tickets GROUP BY project_id")
        .page(1, 50);
    let pager = Pager::for_dialect("postgres")
        .with_config(PagerConfig::new().with_count_alias("c").with_max_page_size(25));

    let plan = pager.prepare(&req).unwrap();
    assert!(plan.complex);
    assert_eq!(plan.page_size, 25);
    assert_eq!(
        plan.count.sql,
        "SELECT COUNT(*) FROM (SELECT project_id AS id, MAX(title) AS title FROM tickets GROUP BY project_id) AS c"
    );

    let page: Page<Ticket> = pager.fetch(&exec, &req).await.unwrap();
    assert_eq!(page.meta.total, 2);
    assert!(exec.statements()[1].ends_with("GROUP BY project_id LIMIT 25"));
}

#[tokio::test]
async fn sql_server_page_gets_stable_order() {
    let exec = Recorder::new().scalar(5).rows(&["id", "title"], vec![]);
    let req = PageRequest::new("tickets").page(2, 2);
    let _: Page<Ticket> = Pager::for_dialect("mssql").fetch(&exec, &req).await.unwrap();
    assert_eq!(
        exec.statements()[1],
        "SELECT * FROM tickets ORDER BY (SELECT NULL) OFFSET 2 ROWS FETCH NEXT 2 ROWS ONLY"
    );
}

#[tokio::test]
async fn errors_carry_their_stage() {
    let empty = Recorder::new();
    let err = Pager::new()
        .fetch::<Ticket, _>(&empty, &PageRequest::new("  "))
        .await
        .unwrap_err();
    assert_eq!(err.stage(), Some(Stage::Building));
    assert!(err.is_validation());
    assert!(empty.statements().is_empty());

    let failing = Recorder::new().scalar(3).error("deadlock detected");
    let err = Pager::new()
        .fetch::<Ticket, _>(&failing, &PageRequest::new("tickets"))
        .await
        .unwrap_err();
    assert_eq!(err.stage(), Some(Stage::Paging));
    assert!(err.to_string().contains("deadlock detected"));
}
