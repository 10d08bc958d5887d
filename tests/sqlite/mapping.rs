use canopy::prelude::*;

use crate::common::helpers::{Search, Viewer, search};
use crate::common::{categories, setup_db};

fn endpoint(conn: &rusqlite::Connection, mapping: ColumnMapping) -> ReadEndpoint<Search, Viewer> {
    ReadEndpoint::builder(categories(conn))
        .setup(SetupConfig::new().criteria(search))
        .mapping(mapping)
        .build()
        .unwrap()
}

#[test]
fn request_beats_endpoint_beats_system_defaults() {
    let conn = setup_db();
    let endpoint = endpoint(&conn, ColumnMapping::new().label("owner").sort("position"));

    let resolved = endpoint.resolve(None).unwrap();
    assert_eq!(resolved.label.as_deref(), Some("owner"));
    assert_eq!(resolved.value.as_deref(), Some("id"));
    assert_eq!(resolved.sort.as_deref(), Some("position"));
    assert_eq!(resolved.description, None);

    let requested = ColumnMapping::new().label("name").description("owner");
    let resolved = endpoint.resolve(Some(&requested)).unwrap();
    assert_eq!(resolved.label.as_deref(), Some("name"));
    assert_eq!(resolved.description.as_deref(), Some("owner"));
    assert_eq!(resolved.value.as_deref(), Some("id"));
}

#[test]
fn empty_requested_columns_fall_through() {
    let conn = setup_db();
    let endpoint = endpoint(&conn, ColumnMapping::new().label("owner"));
    let requested = ColumnMapping::new().label("").value("");
    let resolved = endpoint.resolve(Some(&requested)).unwrap();
    assert_eq!(resolved.label.as_deref(), Some("owner"));
    assert_eq!(resolved.value.as_deref(), Some("id"));
}

#[test]
fn unknown_requested_column_is_reported() {
    let conn = setup_db();
    let endpoint = endpoint(&conn, ColumnMapping::new());
    let requested = ColumnMapping::new().label("nonexistent_field").value("id");

    let err = endpoint.resolve(Some(&requested)).unwrap_err();
    assert!(matches!(
        err,
        CanopyError::ColumnNotFound { field: "label", ref column, ref entity }
            if column == "nonexistent_field" && entity == "categories"
    ));
    assert!(err.to_string().contains("nonexistent_field"));
    assert!(!err.is_configuration());

    let err = endpoint
        .options(Db::new(&conn), &Search::default(), &Viewer::default(), Some(&requested))
        .unwrap_err();
    assert!(matches!(err, CanopyError::ColumnNotFound { .. }));
}

#[test]
fn column_names_match_case_insensitively() {
    let conn = setup_db();
    let endpoint = endpoint(&conn, ColumnMapping::new());
    let requested = ColumnMapping::new().label("NAME");
    let items = endpoint
        .options(
            Db::new(&conn),
            &Search::named("Electronics"),
            &Viewer::default(),
            Some(&requested),
        )
        .unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].label, SQLiteValue::from("Electronics"));
}

#[test]
fn projection_reads_description_and_sort() {
    let conn = setup_db();
    let endpoint = endpoint(
        &conn,
        ColumnMapping::new()
            .label("name")
            .description("owner")
            .sort("position"),
    );
    let items = endpoint
        .options(Db::new(&conn), &Search::default(), &Viewer::default(), None)
        .unwrap();

    let labels: Vec<_> = items.iter().map(|item| item.label.to_string()).collect();
    assert_eq!(labels, vec!["Electronics", "Phones"]);
    assert_eq!(items[0].description, SQLiteValue::from("alice"));
    assert_eq!(items[1].description, SQLiteValue::from("bob"));
    assert_eq!(items[0].value, SQLiteValue::from("e1"));
}

#[test]
fn overrides_can_be_switched_off() {
    let conn = setup_db();
    let endpoint = ReadEndpoint::<Search, Viewer>::builder(categories(&conn))
        .mapping(ColumnMapping::new().label("owner"))
        .allow_override(false)
        .build()
        .unwrap();

    let requested = ColumnMapping::new().label("nonexistent_field");
    let resolved = endpoint.resolve(Some(&requested)).unwrap();
    assert_eq!(resolved.label.as_deref(), Some("owner"));
}

#[test]
fn invalid_endpoint_mapping_fails_at_build() {
    let conn = setup_db();
    let err = ReadEndpoint::<Search, Viewer>::builder(categories(&conn))
        .mapping(ColumnMapping::new().description("summary"))
        .build()
        .err()
        .unwrap();
    assert!(matches!(
        err,
        CanopyError::ColumnNotFound { field: "description", ref column, .. } if column == "summary"
    ));
}

#[test]
fn option_tree_requires_id_and_parent_columns() {
    let conn = setup_db();
    let endpoint = endpoint(&conn, ColumnMapping::new().id("id"));
    let err = endpoint
        .option_tree(Db::new(&conn), &Search::default(), &Viewer::default(), None)
        .unwrap_err();
    assert!(matches!(
        err,
        CanopyError::MissingTreeColumn { field: "parent_id", .. }
    ));
}

#[cfg(feature = "serde")]
#[test]
fn mappings_deserialize_from_request_json() {
    let conn = setup_db();
    let endpoint = endpoint(&conn, ColumnMapping::new());
    let requested: ColumnMapping =
        serde_json::from_str(r#"{"label": "owner", "parent_id": ""}"#).unwrap();

    let resolved = endpoint.resolve(Some(&requested)).unwrap();
    assert_eq!(resolved.label.as_deref(), Some("owner"));
    assert_eq!(resolved.parent_id, None);
}
