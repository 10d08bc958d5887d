use canopy::core::OrderBy;
use canopy::prelude::*;
use canopy::sqlite::pragma;
use rusqlite::Connection;

use crate::common::{categories, setup_db};

fn set_up(
    conn: &Connection,
    table: &str,
    config: SetupConfig<(), (), SQLiteValue>,
) -> canopy::Result<Composer<SqliteQuery, (), ()>> {
    let mut composer = Composer::new(TableRef::new(table.to_string()));
    composer.setup(&pragma::table_info(conn, table)?, config)?;
    Ok(composer)
}

fn ids(rows: &[Record], column: &str) -> Vec<String> {
    rows.iter().filter_map(|row| row.key(column)).collect()
}

#[test]
fn single_primary_key_sorts_descending() {
    let conn = setup_db();
    let composer = set_up(&conn, "categories", SetupConfig::new()).unwrap();

    assert!(composer.is_default_sort_resolved());
    assert_eq!(composer.default_sort(), &[SortTerm::desc("id")]);

    let rows: Vec<Record> = Db::new(&conn)
        .select(&composer.select(&(), &()).unwrap())
        .unwrap();
    assert_eq!(ids(&rows, "id"), vec!["e2", "e1"]);
}

#[test]
fn composite_key_falls_back_to_created_at() {
    let conn = setup_db();
    conn.execute_batch(
        "INSERT INTO memberships VALUES
            (1, 10, '2024-01-01'),
            (2, 10, '2024-03-01'),
            (1, 20, '2024-02-01');",
    )
    .unwrap();
    let composer = set_up(&conn, "memberships", SetupConfig::new()).unwrap();

    let sort = composer.default_sort();
    assert_eq!(sort.len(), 1);
    assert_eq!(sort[0].column, "created_at");
    assert_eq!(sort[0].direction, OrderBy::Desc);

    let rows: Vec<Record> = Db::new(&conn)
        .select(&composer.select(&(), &()).unwrap())
        .unwrap();
    assert_eq!(
        ids(&rows, "created_at"),
        vec!["2024-03-01", "2024-02-01", "2024-01-01"]
    );
}

#[test]
fn renamed_created_at_column_is_used() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch("CREATE TABLE log (line TEXT, inserted TEXT);")
        .unwrap();
    let composer = set_up(&conn, "log", SetupConfig::new().created_at_column("inserted")).unwrap();
    assert_eq!(composer.default_sort(), &[SortTerm::desc("inserted")]);
}

#[test]
fn nothing_to_derive_means_no_ordering() {
    let conn = setup_db();
    let composer = set_up(&conn, "events", SetupConfig::new()).unwrap();
    assert!(composer.default_sort().is_empty());
    assert!(composer.is_default_sort_resolved());

    let sql = composer.select(&(), &()).unwrap().to_sql().sql();
    assert!(!sql.contains("ORDER BY"), "{sql}");
}

#[test]
fn empty_explicit_sort_disables_ordering() {
    let conn = setup_db();
    let composer =
        set_up(&conn, "categories", SetupConfig::new().default_sort(Vec::new())).unwrap();
    assert!(composer.default_sort().is_empty());

    let sql = composer.select(&(), &()).unwrap().to_sql().sql();
    assert!(!sql.contains("ORDER BY"), "{sql}");
}

#[test]
fn explicit_sort_replaces_the_derived_one() {
    let conn = setup_db();
    let composer = set_up(
        &conn,
        "categories",
        SetupConfig::new().default_sort(vec![SortTerm::asc("position")]),
    )
    .unwrap();

    let rows: Vec<Record> = Db::new(&conn)
        .select(&composer.select(&(), &()).unwrap())
        .unwrap();
    assert_eq!(ids(&rows, "id"), vec!["e1", "e2"]);
}

#[test]
fn unknown_sort_column_is_a_configuration_error() {
    let conn = setup_db();
    let err = set_up(
        &conn,
        "categories",
        SetupConfig::new().default_sort(vec![SortTerm::asc("rank")]),
    )
    .err()
    .unwrap();

    assert!(matches!(
        err,
        CanopyError::InvalidSortColumn { ref column, ref entity }
            if column == "rank" && entity == "categories"
    ));
    assert!(err.is_configuration());
}

#[test]
fn tree_reads_order_by_the_default_sort() {
    let conn = setup_db();
    let endpoint = ReadEndpoint::<(), ()>::builder(categories(&conn))
        .setup(SetupConfig::new().default_sort(vec![SortTerm::asc("position")]))
        .build()
        .unwrap();
    let rows: Vec<Record> = Db::new(&conn)
        .retrieve(endpoint.hierarchy(), endpoint.composer(), &(), &(), Selection::Entity)
        .unwrap();
    assert_eq!(ids(&rows, "id"), vec!["e1", "e2"]);
}
