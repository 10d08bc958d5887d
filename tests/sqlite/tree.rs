use canopy::core::flatten;
use canopy::prelude::*;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::common::helpers::tree_ids;
use crate::common::{categories, seed_random_categories, setup_db};

#[derive(Clone, Debug, PartialEq)]
struct Row {
    id: u32,
    parent: Option<u32>,
}

fn random_forest(rng: &mut StdRng, count: u32) -> Vec<Row> {
    (0..count)
        .map(|id| {
            let parent = (id > 0 && rng.random_bool(0.9)).then(|| rng.random_range(0..id));
            Row { id, parent }
        })
        .collect()
}

fn check_links(node: &TreeNode<Row>) {
    for child in &node.children {
        assert_eq!(child.record.parent, Some(node.record.id));
        check_links(child);
    }
}

#[test]
fn every_record_lands_exactly_once() {
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..20 {
        let mut rows = random_forest(&mut rng, 500);
        rows.shuffle(&mut rng);

        let forest = build_tree(rows.clone(), |row| row.id, |row| row.parent);
        for root in &forest {
            assert!(root.record.parent.is_none());
            check_links(root);
        }

        let mut flat: Vec<u32> = flatten(forest).into_iter().map(|row| row.id).collect();
        flat.sort_unstable();
        assert_eq!(flat, (0..500).collect::<Vec<_>>());
    }
}

#[test]
fn siblings_keep_input_order() {
    let rows = vec![
        Row { id: 3, parent: Some(1) },
        Row { id: 1, parent: None },
        Row { id: 2, parent: Some(1) },
        Row { id: 4, parent: None },
    ];
    let forest = build_tree(rows, |row| row.id, |row| row.parent);

    let roots: Vec<u32> = forest.iter().map(|node| node.record.id).collect();
    assert_eq!(roots, vec![1, 4]);
    let children: Vec<u32> = forest[0].children.iter().map(|node| node.record.id).collect();
    assert_eq!(children, vec![3, 2]);
}

#[test]
fn orphans_become_roots() {
    let rows = vec![
        Row { id: 2, parent: Some(99) },
        Row { id: 3, parent: Some(2) },
    ];
    let forest = build_tree(rows, |row| row.id, |row| row.parent);
    assert_eq!(forest.len(), 1);
    assert_eq!(forest[0].record.id, 2);
    assert_eq!(forest[0].children[0].record.id, 3);
}

#[test]
fn deep_chains_do_not_recurse() {
    let rows: Vec<Row> = (0..100_000)
        .map(|id| Row {
            id,
            parent: id.checked_sub(1),
        })
        .collect();
    let forest = build_tree(rows, |row| row.id, |row| row.parent);
    assert_eq!(forest.len(), 1);
    assert_eq!(forest[0].depth(), 100_000);
    assert_eq!(flatten(forest).len(), 100_000);
}

#[test]
fn empty_input_is_an_empty_forest() {
    let forest = build_tree(Vec::<Row>::new(), |row| row.id, |row| row.parent);
    assert!(forest.is_empty());
}

#[test]
fn database_rows_round_trip_through_the_tree() {
    let conn = setup_db();
    let mut expected = seed_random_categories(&conn, 150, 21);
    expected.extend(["e1", "e2"].map(String::from));
    expected.sort();

    let endpoint = ReadEndpoint::<(), ()>::builder(categories(&conn))
        .build()
        .unwrap();
    let tree = endpoint.tree(Db::new(&conn), &(), &()).unwrap();

    let mut found = tree_ids(&tree);
    found.sort();
    assert_eq!(found, expected);
    assert_eq!(tree.len(), 1);
}

#[test]
fn transforms_run_over_the_assembled_tree() {
    let conn = setup_db();
    seed_random_categories(&conn, 10, 1);
    let endpoint = ReadEndpoint::<(), ()>::builder(categories(&conn))
        .transform_tree(|mut forest| {
            for root in &mut forest {
                root.children.clear();
            }
            Some(forest)
        })
        .transform_list(|_| None)
        .build()
        .unwrap();

    let tree = endpoint.tree(Db::new(&conn), &(), &()).unwrap();
    assert_eq!(tree.len(), 1);
    assert!(tree[0].is_leaf());
    assert!(endpoint.list(Db::new(&conn), &(), &()).unwrap().is_empty());
}

#[cfg(feature = "serde")]
#[test]
fn leaves_serialize_without_children() {
    let conn = setup_db();
    let endpoint = ReadEndpoint::<(), ()>::builder(categories(&conn))
        .build()
        .unwrap();
    let tree = endpoint.tree(Db::new(&conn), &(), &()).unwrap();

    let json = serde_json::to_value(&tree).unwrap();
    assert_eq!(json[0]["name"], "Electronics");
    assert_eq!(json[0]["children"][0]["name"], "Phones");
    assert!(json[0]["children"][0].get("children").is_none());
}
