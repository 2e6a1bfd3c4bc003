mod common;

use baserepo::{Columns, Condition, Havings, Operator, Orders, Repository, SimpleSelect};
use common::{employee, names, setup};
use sea_orm::Order;
use serde_json::json;
use std::collections::HashMap;

#[tokio::test]
async fn test_simple_select_filters_columns_and_limits() {
    let conn = setup().await;
    let repo = Repository::new(employee::Entity, &conn);

    let rows = repo
        .simple_select(
            SimpleSelect::new(json!({"department": "test", "age": [">", 30]}))
                .columns(["age", "name"])
                .limits(15),
        )
        .await
        .unwrap();

    let mut found = names(&rows);
    found.sort();
    assert_eq!(found, vec!["alice", "erin"]);
    for row in &rows {
        let row = row.as_object().unwrap();
        assert_eq!(row.len(), 2);
        assert!(row.contains_key("age"));
    }
}

#[tokio::test]
async fn test_search_from_json_spec() {
    let conn = setup().await;
    let repo = Repository::new(employee::Entity, &conn);

    let spec = SimpleSelect::from_json(json!({
        "wheres": [["department", "=", "develop"], ["age", ">=", 30]],
        "orders": {"age": "desc"},
        "limits": 1
    }))
    .unwrap();
    let rows = repo.search(spec).await.unwrap();

    assert_eq!(names(&rows), vec!["carol"]);
}

#[tokio::test]
async fn test_or_where_and_precedence() {
    let conn = setup().await;
    let repo = Repository::new(employee::Entity, &conn);

    let rows = repo
        .wheres(json!({"department": "sales"}))
        .or_where(Condition::eq("name", "bob"))
        .orders(json!({"name": "asc"}))
        .get()
        .await
        .unwrap();
    assert_eq!(names(&rows), vec!["bob", "frank"]);

    // department = 'test' OR (age > 40 AND department = 'develop')
    let rows = repo
        .wheres(json!([
            ["department", "=", "test"],
            ["age", ">", 40, "or"],
            ["department", "=", "develop"]
        ]))
        .orders(json!({"name": "asc"}))
        .get()
        .await
        .unwrap();
    assert_eq!(names(&rows), vec!["alice", "bob", "carol", "erin"]);
}

#[tokio::test]
async fn test_or_wheres() {
    let conn = setup().await;
    let repo = Repository::new(employee::Entity, &conn);

    let count = repo
        .wheres(json!({"name": "alice"}))
        .or_wheres(json!([["age", "<", 30], ["department", "sales"]]))
        .count()
        .await
        .unwrap();
    // alice, bob (age 28), frank (sales)
    assert_eq!(count, 3);
}

#[tokio::test]
async fn test_membership_conditions() {
    let conn = setup().await;
    let repo = Repository::new(employee::Entity, &conn);

    let count = repo
        .and_where(Condition::is_in("name", ["alice", "dave"]))
        .count()
        .await
        .unwrap();
    assert_eq!(count, 2);

    let rows = repo
        .wheres(json!({"age": ["in", [30, 35]]}))
        .orders(json!(["name asc"]))
        .get()
        .await
        .unwrap();
    assert_eq!(names(&rows), vec!["alice", "dave", "frank"]);

    let rows = repo
        .wheres(json!([["age", "in", [30, 35]]]))
        .orders(json!(["name asc"]))
        .get()
        .await
        .unwrap();
    assert_eq!(names(&rows), vec!["alice", "dave", "frank"]);

    let count = repo
        .wheres(json!([["department", "not in", ["test", "develop"]]]))
        .count()
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn test_null_comparisons() {
    let conn = setup().await;
    let repo = Repository::new(employee::Entity, &conn);

    assert_eq!(repo.wheres(json!([["email", "=", null]])).count().await.unwrap(), 0);
    assert_eq!(repo.wheres(json!([["email", "!=", null]])).count().await.unwrap(), 6);
    assert_eq!(repo.wheres(json!({"email": null})).count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_like_condition() {
    let conn = setup().await;
    let repo = Repository::new(employee::Entity, &conn);

    let rows = repo
        .wheres(json!({"name": ["like", "%a%"]}))
        .orders(json!({"name": "asc"}))
        .get()
        .await
        .unwrap();
    assert_eq!(names(&rows), vec!["alice", "carol", "dave", "frank"]);
}

#[tokio::test]
async fn test_orders_and_limits() {
    let conn = setup().await;
    let repo = Repository::new(employee::Entity, &conn);

    let rows = repo
        .orders(Orders::keyed([("age", Order::Desc)]))
        .limits([1, 2])
        .get()
        .await
        .unwrap();
    assert_eq!(names(&rows), vec!["carol", "alice"]);

    let first = repo.orders(json!(["age asc", "name desc"])).first().await.unwrap();
    assert_eq!(first.unwrap()["name"], "bob");

    let rows = repo.orders(json!(["name asc"])).limits(2).get().await.unwrap();
    assert_eq!(names(&rows), vec!["alice", "bob"]);
}

#[tokio::test]
async fn test_keyed_orders_apply_in_given_order() {
    let conn = setup().await;
    let repo = Repository::new(employee::Entity, &conn);

    let rows = repo
        .orders(json!({"department": "asc", "age": "desc"}))
        .get()
        .await
        .unwrap();
    assert_eq!(names(&rows), vec!["carol", "dave", "frank", "erin", "alice", "bob"]);

    let rows = repo
        .orders(json!({"age": "desc", "department": "asc"}))
        .get()
        .await
        .unwrap();
    assert_eq!(names(&rows), vec!["erin", "carol", "alice", "dave", "frank", "bob"]);
}

#[tokio::test]
async fn test_select_raw_columns() {
    let conn = setup().await;
    let repo = Repository::new(employee::Entity, &conn);

    let row = repo
        .select("name as label, age")
        .wheres(json!({"name": "dave"}))
        .first()
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row, json!({"label": "dave", "age": 30}));
}

#[tokio::test]
async fn test_groups_and_havings() {
    let conn = setup().await;
    let repo = Repository::new(employee::Entity, &conn);

    let rows = repo
        .select(Columns::raw("department, count(*) as total"))
        .groups(["department"])
        .havings(Havings::new().raw("count(*) > 1"))
        .orders(json!(["department asc"]))
        .get()
        .await
        .unwrap();
    assert_eq!(
        rows,
        vec![
            json!({"department": "develop", "total": 2}),
            json!({"department": "test", "total": 3}),
        ]
    );

    let rows = repo
        .select(Columns::raw("department, count(*) as total"))
        .groups(["department"])
        .havings(Havings::new().condition(Condition::new("total", Operator::Gt, json!(2)).unwrap()))
        .get()
        .await
        .unwrap();
    assert_eq!(rows, vec![json!({"department": "test", "total": 3})]);
}

#[tokio::test]
async fn test_pluck_and_value() {
    let conn = setup().await;
    let repo = Repository::new(employee::Entity, &conn);

    let plucked = repo
        .wheres(json!({"department": "develop"}))
        .orders(json!({"name": "asc"}))
        .pluck("employees.name")
        .await
        .unwrap();
    assert_eq!(plucked, vec![json!("carol"), json!("dave")]);

    let oldest = repo.orders(json!({"age": "desc"})).value("age").await.unwrap();
    assert_eq!(oldest, Some(json!(45)));

    let missing = repo.wheres(json!({"name": "nobody"})).value("age").await.unwrap();
    assert_eq!(missing, None);
}

#[tokio::test]
async fn test_typed_models() {
    let conn = setup().await;
    let repo = Repository::new(employee::Entity, &conn);

    let models = repo.wheres(json!({"department": "sales"})).get_models().await.unwrap();
    assert_eq!(models.len(), 1);
    assert_eq!(models[0].name, "frank");
    assert_eq!(models[0].email.as_deref(), Some("frank@example.com"));

    let model = repo.wheres(json!({"name": "nobody"})).first_model().await.unwrap();
    assert!(model.is_none());
}

#[tokio::test]
async fn test_paginate() {
    let conn = setup().await;
    let repo = Repository::new(employee::Entity, &conn);

    let page = repo.paginate(4, 2).await.unwrap();
    assert_eq!(page.total, 6);
    assert_eq!(page.len(), 2);
    assert_eq!(page.current_page, 2);
    assert_eq!(page.last_page, 2);
    assert!(!page.has_more_pages());
    assert_eq!(page.page_name, "p");

    // 0 falls back to the configured page size
    let page = repo.paginate(0, 1).await.unwrap();
    assert_eq!(page.per_page, 10);
    assert_eq!(page.len(), 6);
    assert_eq!(page.last_page, 1);

    let page = repo.wheres(json!({"department": "test"})).paginate(2, 0).await.unwrap();
    assert_eq!(page.current_page, 1);
    assert_eq!(page.total, 3);
    assert_eq!(page.next_page(), Some(2));
}

#[tokio::test]
async fn test_paginate_from_query() {
    let conn = setup().await;
    let repo = Repository::new(employee::Entity, &conn);

    let params = HashMap::from([("p".to_string(), "2".to_string())]);
    let page = repo
        .orders(json!({"name": "asc"}))
        .paginate_from_query(4, &params)
        .await
        .unwrap();
    assert_eq!(page.current_page, 2);
    assert_eq!(names(&page.items), vec!["erin", "frank"]);
}

#[tokio::test]
async fn test_chunk() {
    let conn = setup().await;
    let repo = Repository::new(employee::Entity, &conn);

    let mut sizes = Vec::new();
    let finished = repo
        .query()
        .chunk(4, |rows| {
            sizes.push(rows.len());
            true
        })
        .await
        .unwrap();
    assert!(finished);
    assert_eq!(sizes, vec![4, 2]);

    let mut calls = 0;
    let finished = repo
        .query()
        .chunk(2, |_| {
            calls += 1;
            false
        })
        .await
        .unwrap();
    assert!(!finished);
    assert_eq!(calls, 1);
}

#[tokio::test]
async fn test_delete_by_conditions() {
    let conn = setup().await;
    let repo = Repository::new(employee::Entity, &conn);

    let deleted = repo.wheres(json!({"department": "test"})).delete().await.unwrap();
    assert_eq!(deleted, 3);
    assert_eq!(repo.query().count().await.unwrap(), 3);

    let deleted = repo.wheres(json!({"department": "test"})).delete().await.unwrap();
    assert_eq!(deleted, 0);
}

#[tokio::test]
async fn test_chain_state_does_not_leak() {
    let conn = setup().await;
    let repo = Repository::new(employee::Entity, &conn);

    let count = repo.wheres(json!({"department": "test"})).count().await.unwrap();
    assert_eq!(count, 3);

    // A new chain starts empty after the terminal call above.
    assert!(repo.query().conditions().is_empty());
    assert_eq!(repo.query().count().await.unwrap(), 6);
    assert_eq!(repo.and_where(Condition::eq("name", "bob")).conditions().len(), 1);
}

#[tokio::test]
async fn test_error_messages_are_lifo() {
    let conn = setup().await;
    let mut repo = Repository::new(employee::Entity, &conn);

    repo.add_err_msg("first");
    repo.add_err_msg("second");
    repo.add_err_msg("   ");

    assert_eq!(repo.get_err_msg().as_deref(), Some("second"));
    assert_eq!(repo.get_err_msg().as_deref(), Some("first"));
    assert_eq!(repo.get_err_msg(), None);
}

#[tokio::test]
async fn test_sql_dump_in_debug_mode() {
    let conn = setup().await;
    let repo = Repository::with_config(employee::Entity, &conn, common::debug_config());

    repo.wheres(json!({"department": "sales"})).get().await.unwrap();
    repo.query().count().await.unwrap();

    let dump = repo.sql_dump();
    assert_eq!(dump.len(), 2);
    assert!(dump[0].contains("FROM \"employees\""));
    assert!(dump[0].contains("sales"));
    assert!(dump[1].starts_with("SELECT COUNT(*) AS \"num_items\""));
    assert_eq!(repo.query_log().map(|log| log.len()), Some(2));
}

#[tokio::test]
async fn test_sql_dump_records_executed_statements() {
    let conn = setup().await;
    let repo = Repository::with_config(employee::Entity, &conn, common::debug_config());

    repo.query().first().await.unwrap();
    let dump = repo.sql_dump();
    assert_eq!(dump.len(), 1);
    assert!(dump[0].ends_with("LIMIT 1"));

    let page = repo.orders(json!(["name asc"])).paginate(2, 2).await.unwrap();
    assert_eq!(page.total, 6);
    let dump = repo.sql_dump();
    assert_eq!(dump.len(), 3);
    assert!(dump[1].contains("COUNT(*)"));
    assert!(!dump[1].contains("ORDER BY"));
    assert!(dump[2].ends_with("LIMIT 2 OFFSET 2"));

    repo.query().chunk(4, |_| true).await.unwrap();
    let dump = repo.sql_dump();
    assert_eq!(dump.len(), 5);
    assert!(dump[3].ends_with("LIMIT 4 OFFSET 0"));
    assert!(dump[4].ends_with("LIMIT 4 OFFSET 4"));
}
