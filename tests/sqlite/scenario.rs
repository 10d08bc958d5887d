use canopy::prelude::*;

use crate::common::helpers::{Search, Viewer, names, search};
use crate::common::{categories, setup_db};

fn endpoint(conn: &rusqlite::Connection) -> ReadEndpoint<Search, Viewer> {
    ReadEndpoint::builder(categories(conn))
        .setup(SetupConfig::new().criteria(search))
        .mapping(ColumnMapping::new().id("id").parent_id("parent_id"))
        .build()
        .unwrap()
}

#[test]
fn flat_read_returns_every_row() {
    let conn = setup_db();
    let rows = endpoint(&conn)
        .list(Db::new(&conn), &Search::default(), &Viewer::default())
        .unwrap();
    let mut found = names(&rows);
    found.sort();
    assert_eq!(found, vec!["Electronics", "Phones"]);
}

#[test]
fn tree_nests_phones_under_electronics() {
    let conn = setup_db();
    let tree = endpoint(&conn)
        .tree(Db::new(&conn), &Search::default(), &Viewer::default())
        .unwrap();

    assert_eq!(tree.len(), 1);
    let root = &tree[0];
    assert_eq!(root.record.get_as::<String>("name").unwrap(), "Electronics");
    assert_eq!(root.children.len(), 1);
    assert_eq!(
        root.children[0].record.get_as::<String>("name").unwrap(),
        "Phones"
    );
    assert!(root.children[0].is_leaf());
}

#[test]
fn seed_match_pulls_in_unmatched_descendants() {
    let conn = setup_db();
    let tree = endpoint(&conn)
        .tree(Db::new(&conn), &Search::named("Electronics"), &Viewer::default())
        .unwrap();

    assert_eq!(tree.len(), 1);
    assert_eq!(tree[0].len(), 2);
}

#[test]
fn options_use_the_name_column_as_label() {
    let conn = setup_db();
    let items = endpoint(&conn)
        .options(Db::new(&conn), &Search::default(), &Viewer::default(), None)
        .unwrap();

    let labels: Vec<_> = items.iter().map(|item| item.label.to_string()).collect();
    assert_eq!(labels, vec!["Phones", "Electronics"]);
    assert_eq!(items[1].value, SQLiteValue::from("e1"));
    assert_eq!(items[0].parent_id.as_deref(), Some("e1"));
}

#[cfg(feature = "serde")]
#[test]
fn option_tree_serializes_as_nested_json() {
    let conn = setup_db();
    let tree = endpoint(&conn)
        .option_tree(Db::new(&conn), &Search::default(), &Viewer::default(), None)
        .unwrap();

    assert_eq!(
        serde_json::to_value(&tree).unwrap(),
        serde_json::json!([{
            "label": "Electronics",
            "value": "e1",
            "id": "e1",
            "children": [{
                "label": "Phones",
                "value": "e2",
                "id": "e2",
                "parent_id": "e1"
            }]
        }])
    );
}
